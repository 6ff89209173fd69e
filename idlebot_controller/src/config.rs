//! Controller configuration loading.
//!
//! Reads the TOML file through [`ConfigLoader`], validates it and builds the
//! actuator profiles the ramp engine starts from.
//!
//! Loading happens before the log level is known, so nothing here logs; the
//! binary reports [`LoadedConfig::describe`] once tracing is up.

use std::path::{Path, PathBuf};

use idlebot_common::config::{ConfigError, ConfigLoader};
use idlebot_common::controller::config::ControllerConfig;

use crate::motion::ActuatorProfile;

/// Validated configuration plus the profiles built from it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Full controller configuration.
    pub config: ControllerConfig,
    /// One profile per `[[actuators]]` entry, at rest.
    pub profiles: Vec<ActuatorProfile>,
    /// File the configuration came from, if any.
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// One-line summary for the startup log.
    pub fn describe(&self) -> String {
        let source = match &self.source {
            Some(path) => path.display().to_string(),
            None => "inline configuration".to_string(),
        };
        format!(
            "Loaded {source} ({} actuator(s), driver '{}')",
            self.profiles.len(),
            self.config.driver.name
        )
    }
}

/// Load and validate the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let mut loaded = finish(ControllerConfig::load(path)?)?;
    loaded.source = Some(path.to_path_buf());
    Ok(loaded)
}

/// Load and validate configuration from a TOML string.
pub fn load_config_from_str(text: &str) -> Result<LoadedConfig, ConfigError> {
    finish(ControllerConfig::from_toml(text)?)
}

fn finish(config: ControllerConfig) -> Result<LoadedConfig, ConfigError> {
    config.validate()?;
    let profiles = config.actuators.iter().map(ActuatorProfile::from).collect();
    Ok(LoadedConfig {
        config,
        profiles,
        source: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[[actuators]]
channel = 0
rest_angle = 135
engage_angle = 75
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let loaded = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(loaded.profiles, vec![ActuatorProfile::new(0, 135, 75)]);
        assert_eq!(loaded.config.timing.poll_interval_ms, 100);
        assert_eq!(loaded.config.timing.ramp_step_ms, 10);
        assert_eq!(loaded.config.dwell.rest.min_s, 45);
        assert_eq!(loaded.config.dwell.engaged.max_s, 10);
        assert_eq!(loaded.config.driver.name, "pca9685");
    }

    #[test]
    fn file_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[shared]
log_level = "debug"
service_name = "desk-bot"

[timing]
poll_interval_ms = 50

[driver]
name = "simulation"

[[actuators]]
channel = 2
rest_angle = 90
engage_angle = 30

[[actuators]]
channel = 5
rest_angle = 10
engage_angle = 170
"#
        )
        .unwrap();
        file.flush().unwrap();

        let loaded = load_config(file.path()).unwrap();
        assert_eq!(loaded.source.as_deref(), Some(file.path()));
        assert_eq!(loaded.config.shared.service_name, "desk-bot");
        assert_eq!(loaded.config.timing.poll_interval_ms, 50);
        assert_eq!(loaded.config.timing.stopped_poll_ms, 500);
        assert_eq!(loaded.profiles.len(), 2);
        assert_eq!(loaded.profiles[1].channel(), 5);
        assert_eq!(loaded.profiles[1].current_angle(), 10);
    }

    #[test]
    fn missing_actuators_rejected() {
        assert!(matches!(
            load_config_from_str("[timing]\npoll_interval_ms = 100\n"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            load_config_from_str("actuators = []\n"),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn out_of_range_angle_rejected() {
        let text = MINIMAL.replace("rest_angle = 135", "rest_angle = 200");
        assert!(matches!(
            load_config_from_str(&text),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn shipped_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/idlebot.toml");
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.profiles, vec![ActuatorProfile::new(0, 135, 75)]);
        assert_eq!(loaded.config.driver.address, 0x40);
    }

    #[test]
    fn missing_file_reported() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/idlebot.toml")),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn describe_names_source_and_driver() {
        let inline = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(
            inline.describe(),
            "Loaded inline configuration (1 actuator(s), driver 'pca9685')"
        );

        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/idlebot.toml");
        let loaded = load_config(&path).unwrap();
        assert!(loaded.describe().starts_with(&format!("Loaded {}", path.display())));
    }
}
