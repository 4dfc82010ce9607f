// src/types.rs

//! Plain data shared by the catalog, the executor and the engine.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How a task's external command is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// Run through the platform shell (`sh -c` / `cmd /C`).
    Shell(String),
    /// Spawn `program` directly with `args`.
    ///
    /// When `stdout_to` is set, the child's stdout is redirected into that
    /// file and only its stderr ends up in the captured output.
    Exec {
        program: PathBuf,
        args: Vec<String>,
        stdout_to: Option<PathBuf>,
    },
}

impl CommandLine {
    pub fn shell(cmd: impl Into<String>) -> Self {
        CommandLine::Shell(cmd.into())
    }

    pub fn exec<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine::Exec {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            stdout_to: None,
        }
    }

    /// Redirect stdout of an `Exec` command into `path`.
    ///
    /// Shell commands express redirection themselves, so this is a no-op
    /// for [`CommandLine::Shell`].
    pub fn with_stdout_to(self, path: impl Into<PathBuf>) -> Self {
        match self {
            CommandLine::Exec { program, args, .. } => CommandLine::Exec {
                program,
                args,
                stdout_to: Some(path.into()),
            },
            shell => shell,
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandLine::Shell(cmd) => f.write_str(cmd),
            CommandLine::Exec {
                program,
                args,
                stdout_to,
            } => {
                write!(f, "{}", program.display())?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                if let Some(path) = stdout_to {
                    write!(f, " > {}", path.display())?;
                }
                Ok(())
            }
        }
    }
}

/// Where a task's log block ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// A file owned by exactly one task.
    File(PathBuf),
    /// The harness's own stdout, shared by every task that uses it.
    Stdout,
}

impl LogDestination {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        LogDestination::File(path.into())
    }
}

impl fmt::Display for LogDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogDestination::File(path) => write!(f, "{}", path.display()),
            LogDestination::Stdout => f.write_str("<stdout>"),
        }
    }
}

/// One external-command invocation plus where its log goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub command: CommandLine,
    pub log: LogDestination,
}

impl Task {
    pub fn new(name: impl Into<String>, command: CommandLine, log: LogDestination) -> Self {
        Self {
            name: name.into(),
            command,
            log,
        }
    }
}

/// Merged stdout/stderr of one finished process, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapturedOutput {
    pub lines: Vec<String>,
    pub exit_status: i32,
}

/// Monotonic start/end of one task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingRecord {
    pub started: Instant,
    pub finished: Instant,
}

impl TimingRecord {
    pub fn new(started: Instant, finished: Instant) -> Self {
        Self { started, finished }
    }

    pub fn elapsed(&self) -> Duration {
        self.finished.saturating_duration_since(self.started)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}
