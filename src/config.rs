//! Runtime configuration, loaded from YAML and checked with `validator`.

use crate::model::{ChatId, Locale};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationErrors),
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "DispatchConfig::validate_channels"))]
pub struct DispatchConfig {
    /// Seconds between synchronizer scans.
    #[serde(default = "DispatchConfig::default_poll_interval_secs")]
    #[validate(range(min = 1, max = 3600))]
    pub poll_interval_secs: u64,
    /// Group chat where orders are announced to drivers.
    pub driver_channel: ChatId,
    /// Chat that receives freeform rider questions.
    pub admin_channel: ChatId,
    #[serde(default)]
    pub default_locale: Locale,
    /// Directory for the sled database. Stores are volatile when unset.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    #[serde(default = "DispatchConfig::default_channel_buffer")]
    #[validate(range(min = 1))]
    pub channel_buffer: usize,
}

impl DispatchConfig {
    pub fn new(driver_channel: ChatId, admin_channel: ChatId) -> Self {
        Self {
            poll_interval_secs: Self::default_poll_interval_secs(),
            driver_channel,
            admin_channel,
            default_locale: Locale::default(),
            storage_path: None,
            channel_buffer: Self::default_channel_buffer(),
        }
    }

    pub fn load_from_yaml<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let conf_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Config file read from {}", path.display());
        Self::from_yaml(&conf_str)
    }

    pub fn from_yaml(conf_str: &str) -> Result<Self, ConfigError> {
        trace!("Read config: {conf_str}");
        let conf: DispatchConfig = serde_yaml::from_str(conf_str)?;
        trace!("Loaded config: {conf:?}");
        conf.validate()?;
        Ok(conf)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    fn default_poll_interval_secs() -> u64 {
        5
    }

    fn default_channel_buffer() -> usize {
        32
    }

    fn validate_channels(&self) -> Result<(), ValidationError> {
        if self.driver_channel == self.admin_channel {
            Err(ValidationError::new("driver_and_admin_channels_must_differ"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let conf = DispatchConfig::from_yaml(
            r#"
driver_channel: -1001
admin_channel: -1002
"#,
        )
        .unwrap();

        assert_eq!(conf.poll_interval(), Duration::from_secs(5));
        assert_eq!(conf.driver_channel, ChatId(-1001));
        assert_eq!(conf.default_locale, Locale::En);
        assert_eq!(conf.storage_path, None);
        assert_eq!(conf.channel_buffer, 32);
    }

    #[test]
    fn full_config_is_read() {
        let conf = DispatchConfig::from_yaml(
            r#"
poll_interval_secs: 10
driver_channel: -1001
admin_channel: 42
default_locale: ru
storage_path: /var/lib/taxi
channel_buffer: 8
"#,
        )
        .unwrap();

        assert_eq!(conf.poll_interval_secs, 10);
        assert_eq!(conf.default_locale, Locale::Ru);
        assert_eq!(conf.storage_path, Some(PathBuf::from("/var/lib/taxi")));
        assert_eq!(conf.channel_buffer, 8);
    }

    #[test]
    fn shared_channel_is_rejected() {
        let result = DispatchConfig::from_yaml("driver_channel: 5\nadmin_channel: 5\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for yaml in [
            "driver_channel: 1\nadmin_channel: 2\npoll_interval_secs: 0\n",
            "driver_channel: 1\nadmin_channel: 2\npoll_interval_secs: 7200\n",
            "driver_channel: 1\nadmin_channel: 2\nchannel_buffer: 0\n",
        ] {
            assert!(
                matches!(DispatchConfig::from_yaml(yaml), Err(ConfigError::Invalid(_))),
                "{yaml}"
            );
        }
    }

    #[test]
    fn missing_channel_is_a_parse_error() {
        let result = DispatchConfig::from_yaml("driver_channel: 1\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn unreadable_file_reports_its_path() {
        let err = DispatchConfig::load_from_yaml("/nonexistent/dispatch.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dispatch.yaml"));
    }
}
