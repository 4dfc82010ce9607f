// src/exec/command.rs

//! Command executor: one child process per call, stdin closed, stdout and
//! stderr merged into a single pipe so lines keep the order the child wrote
//! them in.

use std::fs::File;
use std::io::{BufRead, BufReader, PipeReader, PipeWriter};
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::errors::ExecError;
use crate::types::{CapturedOutput, CommandLine};

/// Run `command` to completion.
///
/// - exit 0 → `Ok` with the captured lines
/// - non-zero exit (or killed by a signal, reported as -1) →
///   [`ExecError::CommandFailed`] carrying everything printed so far
/// - could not start → [`ExecError::Spawn`]
pub async fn run_command(command: &CommandLine) -> Result<CapturedOutput, ExecError> {
    let shown = command.to_string();
    let spawn_err = |source| ExecError::Spawn {
        command: shown.clone(),
        source,
    };

    let (reader, writer) = std::io::pipe().map_err(spawn_err)?;
    let mut cmd = build_command(command, writer).map_err(spawn_err)?;
    cmd.stdin(Stdio::piped()).kill_on_drop(true);

    let mut child = cmd.spawn().map_err(spawn_err)?;
    // The command still owns the parent's copies of the write end; the
    // reader only sees EOF once those are gone.
    drop(cmd);
    debug!(cmd = %shown, pid = child.id(), "spawned child process");

    // Empty input: close the pipe straight away so the child sees EOF.
    drop(child.stdin.take());

    let (line_tx, line_rx) = mpsc::unbounded_channel::<String>();
    tokio::task::spawn_blocking(move || forward_lines(reader, line_tx));

    let (status, lines) = tokio::join!(child.wait(), collect_lines(line_rx));
    let status = status.map_err(|source| ExecError::Wait {
        command: shown.clone(),
        source,
    })?;

    let output = CapturedOutput {
        lines,
        exit_status: status.code().unwrap_or(-1),
    };

    debug!(
        cmd = %shown,
        exit_code = output.exit_status,
        lines = output.lines.len(),
        "child process exited"
    );

    if status.success() {
        Ok(output)
    } else {
        Err(ExecError::failed(output))
    }
}

/// Build the child with `output` as its stderr, and as its stdout too
/// unless stdout is redirected into a file.
fn build_command(command: &CommandLine, output: PipeWriter) -> std::io::Result<Command> {
    let mut cmd = match command {
        CommandLine::Shell(line) => {
            // Build a shell command appropriate for the platform.
            let mut cmd = if cfg!(windows) {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(line);
                c
            } else {
                let mut c = Command::new("sh");
                c.arg("-c").arg(line);
                c
            };
            cmd.stdout(output.try_clone()?);
            cmd
        }
        CommandLine::Exec {
            program,
            args,
            stdout_to,
        } => {
            let mut cmd = Command::new(program);
            cmd.args(args);
            match stdout_to {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    cmd.stdout(File::create(path)?);
                }
                None => {
                    cmd.stdout(output.try_clone()?);
                }
            }
            cmd
        }
    };
    cmd.stderr(output);
    Ok(cmd)
}

/// Push every line of `reader` into `tx` until EOF.
///
/// Invalid UTF-8 is replaced rather than treated as end of stream, so the
/// pipe is always drained and the child never blocks on a full buffer.
fn forward_lines(reader: PipeReader, tx: mpsc::UnboundedSender<String>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                trace!(%line, "captured line");
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!(error = %e, "stopped reading child output");
                break;
            }
        }
    }
}

async fn collect_lines(mut rx: mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(line) = rx.recv().await {
        lines.push(line);
    }
    lines
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_of_successful_command() {
        let out = run_command(&CommandLine::shell("echo one; echo two"))
            .await
            .unwrap();
        assert_eq!(out.lines, vec!["one", "two"]);
        assert_eq!(out.exit_status, 0);
    }

    #[tokio::test]
    async fn merges_stderr_into_the_same_buffer() {
        let out = run_command(&CommandLine::shell("echo out; echo err >&2"))
            .await
            .unwrap();
        assert_eq!(out.lines, vec!["out", "err"]);
    }

    #[tokio::test]
    async fn interleaved_streams_keep_write_order() {
        let script = "i=1; while [ $i -le 200 ]; do echo o$i; echo e$i >&2; i=$((i+1)); done";
        let expected: Vec<String> = (1..=200)
            .flat_map(|i| [format!("o{i}"), format!("e{i}")])
            .collect();

        for _ in 0..10 {
            let out = run_command(&CommandLine::shell(script)).await.unwrap();
            assert_eq!(out.lines, expected);
        }
    }

    #[tokio::test]
    async fn non_zero_exit_keeps_captured_output() {
        let err = run_command(&CommandLine::shell("echo partial; exit 4"))
            .await
            .unwrap_err();
        match err {
            ExecError::CommandFailed {
                exit_status,
                output,
            } => {
                assert_eq!(exit_status, 4);
                assert_eq!(output.lines, vec!["partial"]);
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stdin_is_empty_not_interactive() {
        // `cat` would hang forever if stdin were inherited from a terminal.
        let out = run_command(&CommandLine::shell("cat; echo done")).await.unwrap();
        assert_eq!(out.lines, vec!["done"]);
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let err = run_command(&CommandLine::exec("/definitely/not/a/binary", ["x"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }), "got {err:?}");
        assert_eq!(err.exit_status(), None);
    }

    #[tokio::test]
    async fn exec_stdout_redirect_only_captures_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out.txt");

        let cmd = CommandLine::exec("sh", ["-c", "echo artifact; echo note >&2"])
            .with_stdout_to(&target);
        let out = run_command(&cmd).await.unwrap();

        assert_eq!(out.lines, vec!["note"]);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "artifact\n");
    }
}
