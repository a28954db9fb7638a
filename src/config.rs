//! Dashboard configuration.
//!
//! Everything has a default, so an empty YAML document is a valid
//! configuration pointing at a backend on the local machine.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:10000";
pub const DEFAULT_LOG_DIRECTIVES: &str = "info,app::client=debug";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Origin serving the `/api/*` endpoints.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    #[serde(default = "default_log_directives")]
    pub directives: String,

    /// Directory for the daily rolling log file. Stderr only when absent.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_log_directives() -> String {
    DEFAULT_LOG_DIRECTIVES.to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directives: default_log_directives(),
            log_dir: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_yaml_str(source: &str) -> AppResult<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(source)
            .map_err(|err| AppError::config(format!("invalid dashboard config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        let base = self.api_base.trim();
        if base.is_empty() {
            return Err(AppError::config("apiBase must not be empty"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(AppError::config(format!(
                "apiBase must be an http(s) URL, got {base}"
            )));
        }
        Ok(())
    }
}
