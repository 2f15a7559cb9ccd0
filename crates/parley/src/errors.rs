use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Provider error ({}): {message}", status.map(|s| s.to_string()).unwrap_or_else(|| "no status".to_string()))]
    Provider {
        /// HTTP status reported by the provider, when the call got that far
        status: Option<u16>,
        message: String,
    },

    #[error("Could not process search arguments: {0}")]
    ToolArguments(String),

    #[error("Model tried to use an unknown tool: {0}")]
    UnknownTool(String),

    #[error("Stream transport error: {0}")]
    Transport(String),

    #[error("Could not decode stream record: {0}")]
    Decode(String),

    #[error("A message is already in flight")]
    Busy,
}

impl ChatError {
    pub fn provider<S: Into<String>>(status: Option<u16>, message: S) -> Self {
        ChatError::Provider {
            status,
            message: message.into(),
        }
    }

    /// Status to surface to an HTTP caller. Provider failures mirror the
    /// upstream status when there is one.
    pub fn status_code(&self) -> u16 {
        match self {
            ChatError::MalformedInput(_) => 400,
            ChatError::Provider {
                status: Some(status),
                ..
            } if *status >= 400 => *status,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Provider {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
