use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP {status}")]
    Http { endpoint: String, status: u16 },

    #[error("invalid response from {endpoint}: {message}")]
    Parse { endpoint: String, message: String },

    #[error("missing mount points: {}", .ids.join(", "))]
    MissingMount { ids: Vec<String> },

    #[error("{message}")]
    Reasoning { message: String },

    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn http(endpoint: impl Into<String>, status: u16) -> Self {
        let endpoint = endpoint.into();
        warn!(target: "app::error", %endpoint, status, "non-success response");
        AppError::Http { endpoint, status }
    }

    pub fn parse(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let message = message.into();
        warn!(target: "app::error", %endpoint, %message, "response failed structural checks");
        AppError::Parse { endpoint, message }
    }

    pub fn missing_mount(ids: Vec<String>) -> Self {
        error!(target: "app::error", ids = ?ids, "required mount points missing");
        AppError::MissingMount { ids }
    }

    pub fn reasoning(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::error", %message, "reasoning fetch failed");
        AppError::Reasoning { message }
    }

    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let message = message.into();
        warn!(target: "app::error", %endpoint, %message, "transport error");
        AppError::Transport { endpoint, message }
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::error", %message, "configuration error");
        AppError::Config(message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::error", %message, "other error");
        AppError::Other(message)
    }

    pub fn details(&self) -> Option<JsonValue> {
        match self {
            AppError::Http { endpoint, status } => {
                Some(serde_json::json!({ "endpoint": endpoint, "status": status }))
            }
            AppError::Parse { endpoint, .. } | AppError::Transport { endpoint, .. } => {
                Some(serde_json::json!({ "endpoint": endpoint }))
            }
            AppError::MissingMount { ids } => Some(serde_json::json!({ "ids": ids })),
            _ => None,
        }
    }
}
