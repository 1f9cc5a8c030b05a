use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use contracts::enums::marketplace_type::MarketplaceType;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub marketplaces: MarketplacesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketplacesConfig {
    /// Таймаут одного запроса к API маркетплейса
    pub request_timeout_secs: u64,
    /// Размер единственной запрашиваемой страницы товаров
    pub page_limit: u32,
    /// Сколько демо-товаров подставлять при ошибке API
    pub fallback_count: usize,
    /// Показывать демо-данные, когда учетные данные не заданы
    pub preview_mode: bool,
    /// Переопределение адресов API (ключ — код маркетплейса)
    pub base_urls: HashMap<String, String>,
}

impl Default for MarketplacesConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            page_limit: 100,
            fallback_count: 10,
            preview_mode: false,
            base_urls: HashMap::new(),
        }
    }
}

impl MarketplacesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn base_url(&self, marketplace: MarketplaceType) -> Option<&str> {
        self.base_urls
            .get(marketplace.code())
            .map(|url| url.trim_end_matches('/'))
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 5000

[marketplaces]
request_timeout_secs = 30
page_limit = 100
fallback_count = 10
preview_mode = false
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}
