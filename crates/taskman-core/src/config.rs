//! Taskman Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEV_JWT_SECRET: &str = "development-secret-key-change-in-production";

/// Longest accepted token lifetime (30 days)
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Token signing and credential rules
    pub auth: AuthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Initial administrator account
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            config.server.port = parse_var("API_PORT", port)?;
        }

        // CORS origins from environment variable (comma-separated)
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Auth
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }
        if let Ok(secs) = std::env::var("JWT_EXPIRATION_SECS") {
            config.auth.token_ttl_secs = parse_var("JWT_EXPIRATION_SECS", secs)?;
        }
        if let Ok(len) = std::env::var("PASSWORD_MIN_LENGTH") {
            config.auth.password_min_length = parse_var("PASSWORD_MIN_LENGTH", len)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_var("LOG_JSON", json)?;
        }

        // Bootstrap admin
        if let Ok(email) = std::env::var("ADMIN_EMAIL") {
            config.bootstrap.admin_email = Some(email);
        }
        if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
            config.bootstrap.admin_password = Some(password);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        // Only override if env values differ from defaults
        if env_config.server.host != ServerConfig::default().host {
            self.server.host = env_config.server.host;
        }
        if env_config.server.port != ServerConfig::default().port {
            self.server.port = env_config.server.port;
        }
        if env_config.auth.token_ttl_secs != AuthConfig::default().token_ttl_secs {
            self.auth.token_ttl_secs = env_config.auth.token_ttl_secs;
        }
        if env_config.auth.password_min_length != AuthConfig::default().password_min_length {
            self.auth.password_min_length = env_config.auth.password_min_length;
        }
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }
        if !env_config.server.cors_origins.is_empty() {
            self.server.cors_origins = env_config.server.cors_origins;
        }

        // Always use env for sensitive values
        if env_config.auth.jwt_secret != DEV_JWT_SECRET {
            self.auth.jwt_secret = env_config.auth.jwt_secret;
        }
        if env_config.bootstrap.admin_email.is_some() {
            self.bootstrap = env_config.bootstrap;
        }

        Ok(self)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("auth.jwt_secret".to_string()));
        }
        if self.auth.token_ttl_secs == 0 || self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::InvalidValue {
                key: "auth.token_ttl_secs".to_string(),
                value: self.auth.token_ttl_secs.to_string(),
            });
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            // Empty by default - set via CORS_ORIGINS env var
            cors_origins: vec![],
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for token signing (must be at least 256 bits in production)
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub token_ttl_secs: u64,

    /// Minimum accepted password length at registration
    pub password_min_length: usize,
}

impl AuthConfig {
    /// True while tokens are signed with the built-in development secret
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_secs: 3600, // 1 hour
            password_min_length: 8,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Administrator created at startup when absent
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.auth.password_min_length, 8);
        assert!(config.bootstrap.admin_email.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [auth]
            jwt_secret = "from-file"

            [bootstrap]
            admin_email = "root@test.io"
            admin_password = "rootpassword"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.jwt_secret, "from-file");
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.bootstrap.admin_email.as_deref(), Some("root@test.io"));
    }

    #[test]
    fn test_validate_rejects_empty_secret_and_zero_ttl() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret.clear();
        assert!(matches!(config.validate(), Err(ConfigError::MissingRequired(_))));

        let mut config = AppConfig::default();
        config.auth.token_ttl_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validate_bounds_token_ttl() {
        let mut config = AppConfig::default();
        config.auth.token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());

        config.auth.token_ttl_secs = MAX_TOKEN_TTL_SECS + 1;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));

        config.auth.token_ttl_secs = u64::MAX;
        match config.validate() {
            Err(ConfigError::InvalidValue { key, value }) => {
                assert_eq!(key, "auth.token_ttl_secs");
                assert_eq!(value, u64::MAX.to_string());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_dev_secret_is_detected() {
        let mut config = AppConfig::default();
        assert!(config.auth.uses_dev_secret());

        config.auth.jwt_secret = "a-real-production-secret".to_string();
        assert!(!config.auth.uses_dev_secret());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = AppConfig::from_file("/nonexistent/taskman.toml");
        assert!(matches!(result, Err(ConfigError::FileReadError { .. })));
    }
}
