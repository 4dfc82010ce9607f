// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SamplegenError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SamplegenError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_categories(cfg)?;
    validate_global_config(cfg)?;
    validate_generator(cfg)?;
    validate_setup(cfg)?;
    Ok(())
}

fn ensure_has_categories(cfg: &RawConfigFile) -> Result<()> {
    if cfg.category.is_empty() {
        return Err(config_error(
            "config must contain at least one [category.<name>] section",
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.jobs == Some(0) {
        return Err(config_error("[config].jobs must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_generator(cfg: &RawConfigFile) -> Result<()> {
    let generator = &cfg.generator;

    if generator.path.as_os_str().is_empty() {
        return Err(config_error("[generator].path must not be empty"));
    }
    if generator.output_suffix.is_empty() || generator.log_suffix.is_empty() {
        return Err(config_error(
            "[generator].output_suffix and [generator].log_suffix must not be empty",
        ));
    }
    if generator.output_suffix == generator.log_suffix {
        return Err(config_error(format!(
            "[generator].output_suffix and [generator].log_suffix are both '{}'; \
             the log would overwrite the generated file",
            generator.output_suffix
        )));
    }
    if let Some(flag) = &generator.input_flag {
        if flag.trim().is_empty() {
            return Err(config_error("[generator].input_flag must not be blank"));
        }
    }
    Ok(())
}

fn validate_setup(cfg: &RawConfigFile) -> Result<()> {
    for (idx, step) in cfg.setup.iter().enumerate() {
        if step.cmd.trim().is_empty() {
            return Err(config_error(format!(
                "[[setup]] entry #{} has an empty `cmd`",
                idx + 1
            )));
        }
    }
    Ok(())
}

fn config_error(msg: impl Into<String>) -> SamplegenError {
    SamplegenError::ConfigError(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> std::result::Result<ConfigFile, SamplegenError> {
        let raw: RawConfigFile = toml::from_str(toml_src).unwrap();
        ConfigFile::try_from(raw)
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = parse(
            r#"
[generator]
path = "genpolicy"

[category.default]
"#,
        )
        .unwrap();

        assert_eq!(cfg.config.jobs, None);
        assert!(!cfg.config.log_to_stdout);
        assert_eq!(cfg.generator.output_suffix, "-rego.txt");
        assert_eq!(cfg.generator.log_suffix, "-log.txt");
        assert!(cfg.category["default"].verify_inputs);
        assert!(cfg.setup.is_empty());
    }

    #[test]
    fn zero_jobs_is_rejected() {
        let err = parse(
            r#"
[config]
jobs = 0

[generator]
path = "genpolicy"

[category.default]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SamplegenError::ConfigError(msg) if msg.contains("jobs")));
    }

    #[test]
    fn config_without_categories_is_rejected() {
        let err = parse(
            r#"
[generator]
path = "genpolicy"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SamplegenError::ConfigError(msg) if msg.contains("[category.")));
    }

    #[test]
    fn identical_suffixes_are_rejected() {
        let err = parse(
            r#"
[generator]
path = "genpolicy"
output_suffix = ".txt"
log_suffix = ".txt"

[category.default]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SamplegenError::ConfigError(msg) if msg.contains("overwrite")));
    }

    #[test]
    fn blank_setup_command_is_rejected() {
        let err = parse(
            r#"
[generator]
path = "genpolicy"

[[setup]]
cmd = "make"

[[setup]]
cmd = "   "

[category.default]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SamplegenError::ConfigError(msg) if msg.contains("#2")));
    }
}
