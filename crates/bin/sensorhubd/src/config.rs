//! Daemon configuration: optional `sensorhub.toml`, then `SENSORHUB_*`
//! environment overrides.

use serde::Deserialize;

use sensorhub_adapter_mqtt::config::MqttConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    /// Disabled by default; readings are then published in-process.
    pub mqtt: MqttConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL; `{shard}` is replaced by the shard number.
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding uploaded images, one sub-directory per sensor.
    pub photo_root: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub filter: String,
}

impl Config {
    /// Read `sensorhub.toml` (if present), apply `SENSORHUB_*` overrides,
    /// then validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string("sensorhub.toml") {
            Ok(content) => toml::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(err.into()),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up by variable name. `RUST_LOG` wins over
    /// `SENSORHUB_LOG`, and `SENSORHUB_BIND` over host and port.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("SENSORHUB_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("SENSORHUB_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some((host, port)) = var("SENSORHUB_BIND")
            .as_deref()
            .and_then(|bind| bind.rsplit_once(':'))
            .and_then(|(host, port)| Some((host.to_string(), port.parse::<u16>().ok()?)))
        {
            self.server.host = host;
            self.server.port = port;
        }
        if let Some(url) = var("SENSORHUB_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(root) = var("SENSORHUB_PHOTO_ROOT") {
            self.storage.photo_root = root;
        }
        if let Some(filter) = var("RUST_LOG").or_else(|| var("SENSORHUB_LOG")) {
            self.logging.filter = filter;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.storage.photo_root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "photo_root must not be empty".to_string(),
            ));
        }
        if self.mqtt.enabled && self.mqtt.broker_host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "mqtt.broker_host is required when mqtt is enabled".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:sensorhub-{shard}.db?mode=rwc".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            photo_root: "photos".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,tower_http=debug,sqlx=warn".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse sensorhub.toml")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read sensorhub.toml")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}
