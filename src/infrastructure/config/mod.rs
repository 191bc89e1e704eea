//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub luis: Option<LuisConfig>,
    pub cards: CardsConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// LUIS application settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LuisConfig {
    pub app_id: Option<String>,
    /// Region name, or a full `https://` endpoint
    pub region: Option<String>,
    pub endpoint_key: Option<String>,
    #[serde(default)]
    pub min_score: f32,
}

impl LuisConfig {
    /// Prediction endpoint base URL
    pub fn endpoint(&self) -> String {
        match self.region.as_deref() {
            Some(region) if region.starts_with("https://") => region.trim_end_matches('/').to_string(),
            Some(region) => format!("https://{}.api.cognitive.microsoft.com", region),
            None => "https://westus.api.cognitive.microsoft.com".to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.app_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CardsConfig {
    /// Directory of `<asset>.json` card templates
    pub directory: Option<PathBuf>,
    pub image_base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SecurityConfig {
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
}

/// Deployment upload settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PublishConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub archive_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "cake-bot".to_string(),
                id: "cake-bot".to_string(),
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3978,
            },
            luis: None,
            cards: CardsConfig {
                directory: Some(PathBuf::from("./cards")),
                image_base_url: "http://localhost:3978/images".to_string(),
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                path: PathBuf::from("cake-bot.db"),
            },
            security: SecurityConfig {
                rate_limit: RateLimitConfig {
                    max_requests: 30,
                    window_seconds: 60,
                },
            },
            publish: PublishConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Defaults with environment overrides
    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment variables win over file values
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(app_id) = var("LUIS_APP_ID") {
            self.luis.get_or_insert_with(LuisConfig::default).app_id = Some(app_id);
        }
        if let Some(key) = var("LUIS_ENDPOINT_KEY") {
            self.luis.get_or_insert_with(LuisConfig::default).endpoint_key = Some(key);
        }
        if let Some(region) = var("LUIS_REGION") {
            self.luis.get_or_insert_with(LuisConfig::default).region = Some(region);
        }

        if let Some(port) = var("BOT_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid BOT_PORT: {}", port),
            }
        }

        if let Some(url) = var("PUBLISH_URL") {
            self.publish.url = Some(url);
        }
        if let Some(username) = var("PUBLISH_USERNAME") {
            self.publish.username = Some(username);
        }
        if let Some(password) = var("PUBLISH_PASSWORD") {
            self.publish.password = Some(password);
        }
    }

    /// Check values that would only fail later at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.rate_limit.max_requests == 0 {
            return Err(ConfigError::InvalidValue("security.rate-limit.max-requests must be positive".to_string()));
        }
        if let Some(luis) = &self.luis {
            if luis.is_configured() && luis.endpoint_key.is_none() {
                return Err(ConfigError::MissingField("luis.endpoint-key".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_roundtrips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.server.port, 3978);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_kebab_case_file() {
        let yaml = r#"
bot:
  name: cakes
  id: cakes-bot
server:
  host: 127.0.0.1
  port: 8080
luis:
  app-id: abc
  region: westeurope
  endpoint-key: secret
  min-score: 0.4
cards:
  directory: ./cards
  image-base-url: https://img.example
storage:
  backend: sqlite
  path: state.db
security:
  rate-limit:
    max-requests: 5
    window-seconds: 10
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let luis = config.luis.as_ref().unwrap();
        assert_eq!(luis.endpoint(), "https://westeurope.api.cognitive.microsoft.com");
        assert_eq!(luis.min_score, 0.4);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert!(config.publish.url.is_none());
    }

    #[test]
    fn test_full_endpoint_region_is_used_as_is() {
        let luis = LuisConfig {
            region: Some("https://luis.example.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(luis.endpoint(), "https://luis.example.com");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LUIS_APP_ID", "app"),
            ("LUIS_ENDPOINT_KEY", "key"),
            ("BOT_PORT", "9000"),
            ("PUBLISH_PASSWORD", "hunter2"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_vars(|name| vars.get(name).map(|v| v.to_string()));

        assert!(config.luis.as_ref().unwrap().is_configured());
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.publish.password.as_deref(), Some("hunter2"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_luis_without_key_is_invalid() {
        let mut config = Config::default();
        config.luis = Some(LuisConfig {
            app_id: Some("app".to_string()),
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_password_is_not_written_out() {
        let mut config = Config::default();
        config.publish.password = Some("hunter2".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("hunter2"));
    }
}
