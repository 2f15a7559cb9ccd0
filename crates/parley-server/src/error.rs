use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley::errors::ChatError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },
    #[error("Invalid socket address: {0}")]
    InvalidAddress(String),
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Environment variable that sets a settings field. The provider credential
/// is conventionally read from `OPENAI_API_KEY`.
pub fn to_env_var(field: &str) -> String {
    if field.ends_with("api_key") {
        return "OPENAI_API_KEY".to_string();
    }
    format!("PARLEY_{}", field.to_uppercase().replace('.', "__"))
}

/// An error on its way back to an HTTP caller as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_client_error() {
            warn!(status = status.as_u16(), "rejecting chat request: {}", err);
        } else {
            error!(status = status.as_u16(), "chat request failed: {}", err);
        }
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
