use std::time::Duration;

pub const OPENAI_HOST: &str = "https://api.openai.com";

/// Connection settings for an openai compatible completion endpoint
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    /// Upper bound on a whole request, including reading a streamed body
    pub timeout: Duration,
}

impl OpenAiProviderConfig {
    pub fn new<H: Into<String>, K: Into<String>>(host: H, api_key: K) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(600),
        }
    }
}
