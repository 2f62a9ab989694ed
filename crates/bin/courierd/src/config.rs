//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `courier.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;

use serde::Deserialize;

use courier_app::optimizer::OrderingPolicy;
use courier_domain::vehicle::Vehicle;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Background monitor settings.
    pub monitor: MonitorConfig,
    /// Route optimizer settings.
    pub optimizer: OptimizerConfig,
    /// Vehicle selection.
    pub vehicle: VehicleConfig,
    /// Output directories for backups and exports.
    pub paths: PathsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Background monitor configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between evaluation passes.
    pub interval_seconds: u64,
    /// Whether to run the monitor at all.
    pub enabled: bool,
}

/// Route optimizer configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Which sort key dominates when ordering pending stops.
    pub ordering: OrderingPolicy,
}

/// Vehicle selection.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// A built-in preset label, e.g. `"Ford Transit"`. Used only when the
    /// store holds no persisted vehicle yet.
    pub preset: String,
}

/// Output directories.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory for database backups.
    pub backups: PathBuf,
    /// Directory for batch export files.
    pub exports: PathBuf,
}

impl Config {
    /// Load configuration from `courier.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// the resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("courier.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("COURIER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("COURIER_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("COURIER_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("COURIER_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("COURIER_MONITOR_INTERVAL")
            && let Ok(seconds) = val.parse()
        {
            self.monitor.interval_seconds = seconds;
        }
        if let Ok(val) = std::env::var("COURIER_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.monitor.interval_seconds == 0 {
            return Err(ConfigError::Validation(
                "monitor interval must be at least one second".to_string(),
            ));
        }
        if Vehicle::preset_named(&self.vehicle.preset).is_none() {
            return Err(ConfigError::Validation(format!(
                "unknown vehicle preset {:?}",
                self.vehicle.preset
            )));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Extract the database file path from the URL, if it names a file.
    #[must_use]
    pub fn database_file(&self) -> Option<PathBuf> {
        let rest = self.database.url.strip_prefix("sqlite:")?;
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path == ":memory:" {
            None
        } else {
            Some(PathBuf::from(path))
        }
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
            url: "sqlite:courier.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "courierd=info,courier=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            enabled: true,
        }
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            preset: "Ford Transit".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            backups: PathBuf::from("backups"),
            exports: PathBuf::from("exports"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:courier.db?mode=rwc");
        assert_eq!(config.monitor.interval_seconds, 60);
        assert!(config.monitor.enabled);
        assert_eq!(config.optimizer.ordering, OrderingPolicy::PriorityFirst);
        assert_eq!(config.vehicle.preset, "Ford Transit");
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [monitor]
            interval_seconds = 30
            enabled = false

            [optimizer]
            ordering = 'window_first'

            [vehicle]
            preset = 'Mercedes Sprinter'

            [paths]
            backups = 'var/backups'
            exports = 'var/exports'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.monitor.interval_seconds, 30);
        assert!(!config.monitor.enabled);
        assert_eq!(config.optimizer.ordering, OrderingPolicy::WindowFirst);
        assert_eq!(config.vehicle.preset, "Mercedes Sprinter");
        assert_eq!(config.paths.backups, PathBuf::from("var/backups"));
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [server]
            port = 8080
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.monitor.interval_seconds, 60);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_monitor_interval() {
        let mut config = Config::default();
        config.monitor.interval_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_unknown_vehicle_preset() {
        let mut config = Config::default();
        config.vehicle.preset = "Acme Unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_format_bind_addr() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9090;
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn should_extract_database_file_from_url() {
        let config = Config::default();
        assert_eq!(config.database_file(), Some(PathBuf::from("courier.db")));
    }

    #[test]
    fn should_return_no_database_file_for_memory_url() {
        let mut config = Config::default();
        config.database.url = "sqlite::memory:".to_string();
        assert_eq!(config.database_file(), None);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
