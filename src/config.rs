use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const ENV_PROJECT_ID: &str = "CHAT_ENGINE_PROJECT_ID";
pub const ENV_PRIVATE_KEY: &str = "CHAT_ENGINE_API_KEY";
pub const ENV_MAIL_PASSWORD: &str = "EMAIL_PASS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat_engine: ChatEngineConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatEngineConfig {
    #[serde(default = "default_chat_engine_url")]
    pub base_url: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub private_key: String,
    /// Request timeout; unset leaves the transport default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "default_sender")]
    pub sender: String,
    /// Empty disables SMTP; verification links are logged instead
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_verify_base_url")]
    pub verify_base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    /// `"*"` mirrors any request origin
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "./data/accounts".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_chat_engine_url() -> String {
    "https://api.chatengine.io".to_string()
}

fn default_smtp_host() -> String {
    "smtp.office365.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_sender() -> String {
    "no-reply@example.com".to_string()
}

fn default_verify_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            db_path: default_db_path(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ChatEngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_chat_engine_url(),
            project_id: String::new(),
            private_key: String::new(),
            timeout_secs: None,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            sender: default_sender(),
            password: String::new(),
            verify_base_url: default_verify_base_url(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_origins(),
            allow_credentials: true,
        }
    }
}

impl MailConfig {
    pub fn smtp_enabled(&self) -> bool {
        !self.password.trim().is_empty()
    }
}

impl GatewayConfig {
    /// Strict load: a missing or malformed file is an error
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&s)?)
    }

    pub fn load_or_default(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            match Self::load(path) {
                Ok(c) => {
                    info!("Config loaded from {}", path);
                    c
                }
                Err(e) => {
                    warn!("{}. Using defaults.", e);
                    Self::default()
                }
            }
        } else {
            info!("Config file not found at '{}'. Creating default.", path);
            let config = Self::default();
            if let Err(e) = config.write(path) {
                warn!("Could not write default config: {}", e);
            }
            config
        }
    }

    pub fn write(&self, path: &str) -> Result<(), ConfigError> {
        let s = toml::to_string_pretty(self)?;
        std::fs::write(path, s)?;
        Ok(())
    }

    /// Secrets supplied through the environment win over the file
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ENV_PROJECT_ID) {
            self.chat_engine.project_id = v;
        }
        if let Some(v) = lookup(ENV_PRIVATE_KEY) {
            self.chat_engine.private_key = v;
        }
        if let Some(v) = lookup(ENV_MAIL_PASSWORD) {
            self.mail.password = v;
        }
    }
}
