//! Session configuration.
//!
//! Loaded from TOML; every field is optional:
//!
//! ```toml
//! max_selection = 5
//! missing_token = "—"
//! default_range = "last:10"
//! expansion = { only = ["TUS_SLEEP"] }
//! reference_year = 2024
//! ```

use crate::compose::ExpansionPolicy;
use crate::domain::TimeRangeSpec;
use crate::selection::DEFAULT_SELECTION_LIMIT;
use crate::view::MISSING_CELL;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Maximum number of simultaneously selected series.
    pub max_selection: usize,

    /// Table token for periods with no data.
    pub missing_token: String,

    /// Range the session starts with.
    pub default_range: TimeRangeSpec,

    /// Which series are broken out by dimension.
    pub expansion: ExpansionPolicy,

    /// Year `last:<n>` ranges count back from. Defaults to the current year.
    pub reference_year: Option<i32>,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            max_selection: DEFAULT_SELECTION_LIMIT,
            missing_token: MISSING_CELL.to_string(),
            default_range: TimeRangeSpec::AllTime,
            expansion: ExpansionPolicy::Never,
            reference_year: None,
        }
    }
}

impl CompositorConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_selection == 0 {
            return Err(ConfigError::Invalid(
                "max_selection must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// `reference_year`, or the current local year when unset.
    pub fn resolved_reference_year(&self) -> i32 {
        self.reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Identifier;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = CompositorConfig::from_toml_str("").unwrap();
        assert_eq!(config, CompositorConfig::default());
        assert_eq!(config.max_selection, 5);
        assert_eq!(config.missing_token, "—");
    }

    #[test]
    fn parses_all_fields() {
        let config = CompositorConfig::from_toml_str(
            r#"
            max_selection = 3
            missing_token = "n/a"
            default_range = "last:10"
            expansion = { only = ["TUS_SLEEP"] }
            reference_year = 2024
            "#,
        )
        .unwrap();
        assert_eq!(config.max_selection, 3);
        assert_eq!(config.missing_token, "n/a");
        assert_eq!(config.default_range, TimeRangeSpec::LastYears(10));
        assert!(config.expansion.applies_to(&Identifier::new("TUS_SLEEP")));
        assert_eq!(config.resolved_reference_year(), 2024);
    }

    #[test]
    fn zero_selection_is_invalid() {
        let err = CompositorConfig::from_toml_str("max_selection = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_range_is_a_parse_error() {
        let err = CompositorConfig::from_toml_str(r#"default_range = "forever""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CompositorConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
