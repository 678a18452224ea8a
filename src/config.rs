//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! command line overrides applied by the caller.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}'", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{}'", .0.display())]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint serving the daily summary and station pages.
    pub base_url: String,
    /// OGIMET state selector for the summary table.
    pub state: String,
    /// Synoptic hour (UTC) the daily summary is requested for.
    pub hour: u32,
    pub timeout_secs: u64,
    /// Extra attempts after a request times out.
    pub retries: u32,
    pub retry_delay_secs: u64,
    pub user_agent: String,
    /// Cell values meaning "no measurement".
    pub missing_sentinels: Vec<String>,
    /// Precipitation cell values meaning "trace amount".
    pub trace_sentinels: Vec<String>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.ogimet.com/cgi-bin/gsynres".to_string(),
            state: "Indon".to_string(),
            hour: 12,
            timeout_secs: 10,
            retries: 1,
            retry_delay_secs: 2,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
            missing_sentinels: ["", "-", "--", "---", "----", "-----", "////"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trace_sentinels: ["Tr", "TR", "tr", "Trace"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Config {
    /// Location of the per-user config file, whether or not it exists.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ogimet").join("config.json"))
    }

    /// Loads defaults overlaid with `path`, or with the per-user file when
    /// no path is given and that file exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_path = Self::default_config_path().filter(|p| p.exists());

        let config = match path.or(default_path.as_deref()) {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            None => {
                debug!("No config file, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".to_string()));
        }
        if self.hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "hour must be between 0 and 23, got {}",
                self.hour
            )));
        }
        if let Some(both) = self
            .trace_sentinels
            .iter()
            .map(|s| s.trim())
            .find(|t| self.missing_sentinels.iter().any(|m| m.trim() == *t))
        {
            return Err(ConfigError::Invalid(format!(
                "'{}' is both a missing and a trace sentinel",
                both
            )));
        }

        Ok(())
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn should_validate_defaults() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hour, 12);
        assert!(config.missing_sentinels.contains(&"---".to_string()));
        assert!(config.trace_sentinels.contains(&"Tr".to_string()));
    }

    #[test]
    fn should_overlay_partial_file_on_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "hour": 6, "trace_sentinels": ["TT"] }}"#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.hour, 6);
        assert_eq!(config.trace_sentinels, vec!["TT".to_string()]);
        assert_eq!(config.state, "Indon");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn should_reject_hour_out_of_range() {
        let config = Config {
            hour: 24,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn should_reject_sentinel_in_both_tables() {
        let mut config = Config::default();
        config.trace_sentinels.push("---".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn should_compare_sentinels_after_trimming() {
        let mut config = Config::default();
        config.trace_sentinels.push(" ---".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn should_report_unparseable_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = Config::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_, _))));
    }
}
