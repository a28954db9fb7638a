pub mod controller;
pub mod page;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{error, warn};

use crate::error::AppError;

pub type CommandResult<T> = Result<T, CommandError>;

/// User-facing form of an [`AppError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        let details = error.details();
        match error {
            AppError::Http { status, .. } => {
                CommandError::new("HTTP_ERROR", format!("HTTP {status}"), details)
            }
            AppError::Parse { message, .. } => CommandError::new(
                "PARSE_ERROR",
                format!("Invalid response from server: {message}"),
                details,
            ),
            AppError::MissingMount { ids } => CommandError::new(
                "MISSING_MOUNT",
                format!("Dashboard layout is incomplete (missing: {})", ids.join(", ")),
                details,
            ),
            AppError::Reasoning { message } => {
                CommandError::new("REASONING_ERROR", message, None)
            }
            AppError::Transport { message, .. } => {
                warn!(target: "app::command", %message, "network error in command");
                CommandError::new("NETWORK_ERROR", format!("Network error: {message}"), details)
            }
            AppError::Config(message) => CommandError::new("CONFIG_ERROR", message, None),
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "File system access failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}
