use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data_api: DataApiConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080 }
    }
}

/// Where the data API lives and how to talk to it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DataApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Page size hint for paged feeds (audit events, users).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Directory holding per-framework section declarations.
    pub root: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self { root: "content".into() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SessionConfig {
    /// HS256 key shared with the login service that issues session cookies.
    #[serde(default)]
    pub secret: String,
}

fn default_connect_timeout() -> u64 { 5 }
fn default_request_timeout() -> u64 { 30 }
fn default_page_size() -> u32 { 100 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.data_api.normalize_from_env();
        self.data_api.validate()?;
        self.session.normalize_from_env();
        self.session.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        Ok(())
    }
}

impl DataApiConfig {
    /// Fill missing fields from environment variables.
    pub fn normalize_from_env(&mut self) {
        if self.base_url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATA_API_URL") {
                self.base_url = url;
            }
        }
        if self.auth_token.trim().is_empty() {
            if let Ok(token) = std::env::var("DATA_API_TOKEN") {
                self.auth_token = token;
            }
        }
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(anyhow!(
                "data_api.base_url is empty; set it in config.toml or DATA_API_URL"
            ));
        }
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("data_api.base_url must start with http:// or https://"));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(anyhow!("data_api timeouts must be positive seconds"));
        }
        if self.page_size == 0 {
            return Err(anyhow!("data_api.page_size must be >= 1"));
        }
        Ok(())
    }
}

impl SessionConfig {
    pub fn normalize_from_env(&mut self) {
        if self.secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("SESSION_SECRET") {
                self.secret = secret;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.secret.trim().is_empty() {
            return Err(anyhow!(
                "session.secret is empty; set it in config.toml or SESSION_SECRET"
            ));
        }
        Ok(())
    }
}
