use std::{env, time::Duration};

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use mealmate_assistant::OpenAiConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub root: Option<RootConfig>,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `*` allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn lifetime_seconds(&self) -> u64 {
        self.expiration_hours * 60 * 60
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_ai_temperature")]
    pub temperature: f32,
    #[serde(default = "default_ai_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_ai_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_ai_base_url(),
            api_key: None,
            model: default_ai_model(),
            temperature: default_ai_temperature(),
            max_tokens: default_ai_max_tokens(),
            timeout_secs: default_ai_timeout_secs(),
            max_concurrency: default_ai_max_concurrency(),
        }
    }
}

impl AiConfig {
    /// Client settings, `None` when no API key is configured.
    pub fn client_config(&self) -> Option<OpenAiConfig> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())?;

        Some(OpenAiConfig {
            base_url: self.base_url.to_owned(),
            api_key: api_key.to_owned(),
            model: self.model.to_owned(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".to_owned()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_owned()
}

fn default_ai_temperature() -> f32 {
    0.7
}

fn default_ai_max_tokens() -> u32 {
    2000
}

fn default_ai_timeout_secs() -> u64 {
    60
}

fn default_ai_max_concurrency() -> usize {
    2
}

/// Admin account created or promoted on `serve`.
#[derive(Debug, Deserialize, Clone)]
pub struct RootConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy variables (DATABASE_URL, JWT_SECRET, CORS_ORIGINS, AI_API_KEY)
    /// 2. Environment variables (MEALMATE__DATABASE__URL, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "sqlite:mealmate.db")?
            .set_default("database.max_connections", 5)?
            .set_default("jwt.expiration_hours", 24 * 7)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_owned());

        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("MEALMATE")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .try_parsing(true),
        );

        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }
        if let Ok(jwt_secret) = env::var("JWT_SECRET") {
            builder = builder.set_override("jwt.secret", jwt_secret)?;
        }
        if let Ok(origins) = env::var("CORS_ORIGINS") {
            builder = builder.set_override("server.cors_origins", split_list(&origins))?;
        }
        if let Ok(api_key) = env::var("AI_API_KEY") {
            builder = builder.set_override("ai.api_key", api_key)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.jwt.secret.len() < 32 {
            return Err("JWT secret must be at least 32 characters long".to_owned());
        }
        if self.jwt.expiration_hours == 0 {
            return Err("JWT expiration_hours must be at least 1".to_owned());
        }
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_owned());
        }
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_owned());
        }
        if self.ai.max_concurrency < 1 {
            return Err("AI max_concurrency must be at least 1".to_owned());
        }
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err("AI temperature must be between 0 and 2".to_owned());
        }
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_owned(),
                port: 3000,
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                url: "sqlite:test.db".to_owned(),
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: "test_secret_key_minimum_32_characters_long".to_owned(),
                expiration_hours: 24,
            },
            ai: AiConfig::default(),
            root: None,
            observability: ObservabilityConfig::default(),
        }
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validation_short_secret() {
        let mut config = valid();
        config.jwt.secret = "short".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_port() {
        let mut config = valid();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_connections() {
        let mut config = valid();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_concurrency() {
        let mut config = valid();
        config.ai.max_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ai_client_requires_key() {
        let mut config = valid();
        assert!(config.ai.client_config().is_none());

        config.ai.api_key = Some("  ".to_owned());
        assert!(config.ai.client_config().is_none());

        config.ai.api_key = Some("sk-test".to_owned());
        let client = config.ai.client_config().unwrap();
        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("http://a.test, ,http://b.test "),
            vec!["http://a.test", "http://b.test"]
        );
    }
}
