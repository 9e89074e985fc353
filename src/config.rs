//! Configuration module
//!
//! Startup configuration built from defaults, an optional `config.toml`,
//! and the `PORT` environment variable. The configuration is constructed
//! once in `main` and owned by the server state for the process lifetime.

use config::ConfigError;
use serde::Deserialize;
use std::net::SocketAddr;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
}

impl Config {
    /// Load configuration from `config.toml` (if present) and the process
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from the given file path (without extension).
    ///
    /// `PORT` overrides the configured port when set and non-empty. An
    /// unparsable or zero value is a hard error so a misconfigured process
    /// fails before binding instead of silently listening on the default.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.access_log", true)?;

        if let Ok(port) = std::env::var("PORT") {
            if !port.is_empty() {
                builder = builder.set_override("server.port", port)?;
            }
        }

        let cfg: Self = builder.build()?.try_deserialize()?;

        if cfg.server.port == 0 {
            return Err(ConfigError::Message(
                "PORT must be a valid non-zero TCP port".to_string(),
            ));
        }

        Ok(cfg)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid listen address: {e}")))
    }
}
