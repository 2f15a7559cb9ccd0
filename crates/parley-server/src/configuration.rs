use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment, File};
use parley::agent::{DirectReply, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use parley::providers::configs::{OpenAiProviderConfig, OPENAI_HOST};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_openai_host")]
    pub host: String,
    pub api_key: String,
    /// Used when a request does not name a model
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn to_config(&self) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            host: self.host.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatSettings {
    /// Whether answers given without a tool call are sent as JSON or as a stream
    #[serde(default)]
    pub direct_reply: DirectReply,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub chat: ChatSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults
            .set_default("provider.host", default_openai_host())?
            .set_default("provider.model", default_model())?;

        // The single provider secret, unless overridden below
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            builder = builder.set_default("provider.api_key", api_key)?;
        }

        let config = builder
            // Optional parley.toml next to the binary's working directory
            .add_source(File::with_name("parley").required(false))
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("PARLEY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                // serde reports these as "missing field `api_key`"
                let error_str = err.to_string();
                if let Some(rest) = error_str.split("missing field `").nth(1) {
                    let field = rest.split('`').next().unwrap_or(rest);
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_openai_host() -> String {
    OPENAI_HOST.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("PARLEY_") {
                env::remove_var(&key);
            }
        }
        env::remove_var("OPENAI_API_KEY");
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();
        env::set_var("OPENAI_API_KEY", "test-key");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.provider.host, "https://api.openai.com");
        assert_eq!(settings.provider.api_key, "test-key");
        assert_eq!(settings.provider.model, "gpt-4-turbo");
        assert_eq!(settings.provider.temperature, 0.7);
        assert_eq!(settings.provider.timeout_secs, 600);
        assert_eq!(settings.chat.direct_reply, DirectReply::Json);

        clean_env();
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("OPENAI_API_KEY", "from-openai-var");
        env::set_var("PARLEY_PROVIDER__API_KEY", "from-parley-var");
        env::set_var("PARLEY_SERVER__PORT", "8080");
        env::set_var("PARLEY_PROVIDER__HOST", "https://custom.openai.com");
        env::set_var("PARLEY_PROVIDER__MODEL", "gpt-4o");
        env::set_var("PARLEY_PROVIDER__TEMPERATURE", "0.2");
        env::set_var("PARLEY_CHAT__DIRECT_REPLY", "stream");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.provider.api_key, "from-parley-var");
        assert_eq!(settings.provider.host, "https://custom.openai.com");
        assert_eq!(settings.provider.model, "gpt-4o");
        assert_eq!(settings.provider.temperature, 0.2);
        assert_eq!(settings.chat.direct_reply, DirectReply::Stream);

        let config = settings.provider.to_config();
        assert_eq!(config.api_key, "from-parley-var");
        assert_eq!(config.timeout, Duration::from_secs(600));

        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_api_key() {
        clean_env();

        match Settings::new() {
            Err(ConfigError::MissingEnvVar { env_var }) => {
                assert_eq!(env_var, "OPENAI_API_KEY");
            }
            other => panic!("Expected MissingEnvVar, got {:?}", other),
        }
    }

    #[test]
    fn test_socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3000,
        };
        let addr = server_settings.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");

        let bad = ServerSettings {
            host: "not a host".to_string(),
            port: 3000,
        };
        assert!(matches!(bad.socket_addr(), Err(ConfigError::InvalidAddress(_))));
    }
}
