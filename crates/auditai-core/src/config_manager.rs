use crate::types::Network;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for AuditAI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuditConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Block explorer lookup settings
    #[serde(default)]
    pub explorer: ExplorerConfig,

    /// Generative model settings
    #[serde(default)]
    pub llm: LLMConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Block explorer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Explorer API key, shared by every network endpoint
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_explorer_timeout_secs")]
    pub timeout_secs: u64,

    /// API endpoint per network
    #[serde(default)]
    pub endpoints: ExplorerEndpoints,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_secs: default_explorer_timeout_secs(),
            endpoints: ExplorerEndpoints::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExplorerEndpoints {
    #[serde(default = "default_etherscan_url")]
    pub ethereum: String,
    #[serde(default = "default_bscscan_url")]
    pub bsc: String,
    #[serde(default = "default_polygonscan_url")]
    pub polygon: String,
    #[serde(default = "default_snowtrace_url")]
    pub avalanche: String,
}

impl Default for ExplorerEndpoints {
    fn default() -> Self {
        Self {
            ethereum: default_etherscan_url(),
            bsc: default_bscscan_url(),
            polygon: default_polygonscan_url(),
            avalanche: default_snowtrace_url(),
        }
    }
}

impl ExplorerEndpoints {
    pub fn endpoint_for(&self, network: Network) -> &str {
        match network {
            Network::Ethereum => &self.ethereum,
            Network::Bsc => &self.bsc,
            Network::Polygon => &self.polygon,
            Network::Avalanche => &self.avalanche,
        }
    }

    fn endpoint_mut(&mut self, network: Network) -> &mut String {
        match network {
            Network::Ethereum => &mut self.ethereum,
            Network::Bsc => &mut self.bsc,
            Network::Polygon => &mut self.polygon,
            Network::Avalanche => &mut self.avalanche,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// LLM provider: "gemini", "openai", "openai-compatible"
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Model identifier
    /// For Gemini: model name (e.g., "gemini-2.0-flash")
    /// For OpenAI: model name (e.g., "gpt-4o")
    /// For OpenAI-compatible: custom model name (required)
    #[serde(default)]
    pub model: Option<String>,

    /// API key for the selected provider
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Base URL override (required for "openai-compatible")
    #[serde(default)]
    pub base_url: Option<String>,

    /// Sampling temperature; provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum output tokens; provider default when unset
    #[serde(default)]
    pub max_tokens: Option<usize>,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: None,
            api_key: None,
            base_url: None,
            temperature: None,
            max_tokens: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl LLMConfig {
    /// Whether the selected provider can run without an API key.
    pub fn api_key_optional(&self) -> bool {
        self.provider == "openai-compatible"
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_explorer_timeout_secs() -> u64 {
    30
}
fn default_etherscan_url() -> String {
    "https://api.etherscan.io/api".to_string()
}
fn default_bscscan_url() -> String {
    "https://api.bscscan.com/api".to_string()
}
fn default_polygonscan_url() -> String {
    "https://api.polygonscan.com/api".to_string()
}
fn default_snowtrace_url() -> String {
    "https://api.snowtrace.io/api".to_string()
}
fn default_llm_provider() -> String {
    "gemini".to_string()
}
fn default_llm_timeout_secs() -> u64 {
    120
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager. Keys must be supplied explicitly; there are no
/// built-in fallback credentials.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: AuditConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.auditai.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Same as [`ConfigManager::load`], reading the given config file instead
    /// of searching the default locations.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        info!("🔧 Loading AuditAI configuration...");

        Self::load_dotenv();

        let (config, config_path) = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.display().to_string()));
                }
                (Self::read_toml_file(path)?, Some(path.to_path_buf()))
            }
            None => Self::load_config_file()?,
        };

        let config = Self::apply_env_overrides(config, |key| std::env::var(key).ok());
        let manager = Self::from_config(config)?.with_path(config_path);

        info!("✅ Configuration loaded successfully");
        match manager.config_path() {
            Some(path) => info!("   📄 Config file: {}", path.display()),
            None => info!("   📄 Config file: NONE (using defaults)"),
        }
        info!(
            "   🤖 LLM provider: {} ({})",
            manager.config.llm.provider,
            manager.config.llm.model.as_deref().unwrap_or("default model")
        );
        info!(
            "   🌐 Listening address: {}:{}",
            manager.config.server.host, manager.config.server.port
        );

        Ok(manager)
    }

    /// Build a manager from an in-memory configuration, validating it.
    pub fn from_config(config: AuditConfig) -> Result<Self, ConfigError> {
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    fn with_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("📋 Loaded .env file from current directory");
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".auditai.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .auditai.env: {}", e);
                } else {
                    info!("📋 Loaded .auditai.env from home directory");
                }
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.auditai.toml (current directory)
    /// 2. ~/.auditai/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(AuditConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".auditai.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".auditai").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        info!("📋 No config file found, using defaults");
        Ok((AuditConfig::default(), None))
    }

    /// Read TOML config file
    pub fn read_toml_file(path: &Path) -> Result<AuditConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment variable overrides, reading variables through `lookup`.
    pub fn apply_env_overrides<F>(mut config: AuditConfig, lookup: F) -> AuditConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("AUDITAI_HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("AUDITAI_PORT").or_else(|| lookup("PORT")) {
            match port.parse() {
                Ok(p) => config.server.port = p,
                Err(_) => warn!("Ignoring invalid port override: {}", port),
            }
        }

        // Block explorer
        if let Some(key) = lookup("ETHERSCAN_API_KEY") {
            config.explorer.api_key = Some(SecretString::from(key));
        }
        for network in Network::ALL {
            let var = format!(
                "AUDITAI_EXPLORER_{}_URL",
                network.as_str().to_uppercase()
            );
            if let Some(url) = lookup(&var) {
                *config.explorer.endpoints.endpoint_mut(network) = url;
            }
        }

        // LLM
        if let Some(provider) = lookup("AUDITAI_LLM_PROVIDER") {
            config.llm.provider = provider.to_lowercase();
        }
        if let Some(model) = lookup("AUDITAI_MODEL") {
            config.llm.model = Some(model);
        }
        if let Some(url) = lookup("AUDITAI_LLM_BASE_URL") {
            config.llm.base_url = Some(url);
        }
        let provider_key = match config.llm.provider.as_str() {
            "gemini" => lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY")),
            "openai" | "openai-compatible" => lookup("OPENAI_API_KEY"),
            _ => None,
        };
        if let Some(key) = lookup("AUDITAI_LLM_API_KEY").or(provider_key) {
            config.llm.api_key = Some(SecretString::from(key));
        }

        // Logging
        if let Some(level) = lookup("AUDITAI_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = lookup("AUDITAI_LOG_FORMAT") {
            config.logging.format = format;
        }

        config
    }

    /// Validate configuration
    pub fn validate_config(config: &AuditConfig) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be non-zero".to_string(),
            ));
        }

        if !has_secret(&config.explorer.api_key) {
            return Err(ConfigError::ValidationError(
                "Block explorer API key is required. Set 'explorer.api_key' in config \
                 or ETHERSCAN_API_KEY environment variable"
                    .to_string(),
            ));
        }

        match config.llm.provider.as_str() {
            "gemini" | "openai" => {}
            "openai-compatible" => {
                if config.llm.base_url.is_none() || config.llm.model.is_none() {
                    return Err(ConfigError::ValidationError(
                        "openai-compatible provider requires 'llm.base_url' and 'llm.model'"
                            .to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid LLM provider: {}. Must be one of: gemini, openai, openai-compatible",
                    other
                )))
            }
        }

        if !config.llm.api_key_optional() && !has_secret(&config.llm.api_key) {
            return Err(ConfigError::ValidationError(format!(
                "API key for LLM provider '{}' is required. Set 'llm.api_key' in config \
                 or the provider's API key environment variable",
                config.llm.provider
            )));
        }

        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

fn has_secret(secret: &Option<SecretString>) -> bool {
    secret
        .as_ref()
        .map(|s| !s.expose_secret().trim().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn configured() -> AuditConfig {
        let vars = env(&[("ETHERSCAN_API_KEY", "explorer-key"), ("GEMINI_API_KEY", "model-key")]);
        ConfigManager::apply_env_overrides(AuditConfig::default(), |k| vars.get(k).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(
            config.explorer.endpoints.endpoint_for(Network::Polygon),
            "https://api.polygonscan.com/api"
        );
    }

    #[test]
    fn test_defaults_fail_fast_without_keys() {
        let err = ConfigManager::validate_config(&AuditConfig::default()).unwrap_err();
        assert!(err.to_string().contains("explorer API key"));

        let mut config = AuditConfig::default();
        config.explorer.api_key = Some(SecretString::from("explorer-key".to_string()));
        let err = ConfigManager::validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("gemini"));
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("ETHERSCAN_API_KEY", "explorer-key"),
            ("API_KEY", "legacy-gemini-key"),
            ("AUDITAI_PORT", "8080"),
            ("AUDITAI_EXPLORER_BSC_URL", "http://localhost:9000/api"),
            ("AUDITAI_MODEL", "gemini-1.5-pro"),
        ]);
        let config =
            ConfigManager::apply_env_overrides(AuditConfig::default(), |k| vars.get(k).cloned());

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.explorer.endpoints.bsc, "http://localhost:9000/api");
        assert_eq!(config.llm.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(
            config.llm.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("legacy-gemini-key".to_string())
        );
        assert!(ConfigManager::validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_port_override_is_ignored() {
        let vars = env(&[("AUDITAI_PORT", "not-a-port")]);
        let config =
            ConfigManager::apply_env_overrides(AuditConfig::default(), |k| vars.get(k).cloned());
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_config_validation() {
        let config = configured();
        assert!(ConfigManager::validate_config(&config).is_ok());

        let mut bad = config.clone();
        bad.llm.provider = "invalid".to_string();
        assert!(ConfigManager::validate_config(&bad).is_err());

        let mut bad = config.clone();
        bad.logging.format = "xml".to_string();
        assert!(ConfigManager::validate_config(&bad).is_err());

        let mut bad = config;
        bad.llm.provider = "openai-compatible".to_string();
        assert!(ConfigManager::validate_config(&bad).is_err());
        bad.llm.base_url = Some("http://localhost:1234/v1".to_string());
        bad.llm.model = Some("local-model".to_string());
        bad.llm.api_key = None;
        assert!(ConfigManager::validate_config(&bad).is_ok());
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let config = configured();
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("explorer-key"));
        assert!(!rendered.contains("model-key"));
    }
}
