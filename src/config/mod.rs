//! Configuration management for the medibook service
//!
//! Configuration is loaded from environment variables with sensible
//! defaults, and validated before the server starts.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Production mode: error responses omit internal detail
    pub production: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Enable CORS for the API
    pub enable_cors: bool,

    /// Enable per-request tracing
    pub enable_request_logging: bool,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub token_ttl_secs: u64,

    /// Bcrypt work factor
    pub bcrypt_cost: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0:5000".parse().expect("valid default address"),
                enable_cors: true,
                enable_request_logging: true,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                token_ttl_secs: 3600,
                bcrypt_cost: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
            production: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("MEDIBOOK_BIND_ADDRESS") {
            config.server.bind_address = addr
                .parse()
                .map_err(|_| Error::config(format!("Invalid bind address: {addr}")))?;
        } else if let Ok(port) = std::env::var("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| Error::config(format!("Invalid port: {port}")))?;
            config.server.bind_address = SocketAddr::from(([0, 0, 0, 0], port));
        }

        if let Ok(v) = std::env::var("MEDIBOOK_ENABLE_CORS") {
            config.server.enable_cors = v != "false" && v != "0";
        }

        config.auth.jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();

        if let Some(ttl) = std::env::var("MEDIBOOK_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.auth.token_ttl_secs = ttl;
        }

        if let Some(cost) = std::env::var("MEDIBOOK_BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.auth.bcrypt_cost = cost;
        }

        if let Ok(level) = std::env::var("MEDIBOOK_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("MEDIBOOK_LOG_FORMAT") {
            config.logging.format = format;
        }

        config.production = std::env::var("NODE_ENV")
            .or_else(|_| std::env::var("MEDIBOOK_ENV"))
            .map(|v| v == "production")
            .unwrap_or(false);

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(Error::config("JWT_SECRET must be set"));
        }
        if !(4..=16).contains(&self.auth.bcrypt_cost) {
            return Err(Error::config("Bcrypt cost must be between 4 and 16"));
        }
        if self.auth.token_ttl_secs == 0 {
            return Err(Error::config("Token TTL must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.auth.jwt_secret = "secret".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind_address.port(), 5000);
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert!(!config.production);
    }

    #[test]
    fn test_validate_requires_secret() {
        let config = Config::default();
        assert!(config.validate().is_err());
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_bcrypt_cost_range() {
        let mut config = valid_config();
        config.auth.bcrypt_cost = 2;
        assert!(config.validate().is_err());

        config.auth.bcrypt_cost = 31;
        assert!(config.validate().is_err());

        config.auth.bcrypt_cost = 12;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_token_ttl() {
        let mut config = valid_config();
        config.auth.token_ttl_secs = 0;
        assert!(config.validate().is_err());
    }
}
