//! # Configuration Management for DocHaus
//!
//! This crate provides the configuration structures used to reach the document
//! database, plus the connection URI resolution rules shared by every
//! DocHaus component.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::DatabaseConfig;
//!
//! let db_config = DatabaseConfig::new("mydb".to_string())
//!     .with_uri("mongodb://localhost:27017".to_string())
//!     .with_app_name("people-service".to_string());
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [database]
//! uri = "mongodb://localhost:27017"
//! database = "mydb"
//! app_name = "people-service"
//! connect_timeout_ms = 5000
//! server_selection_timeout_ms = 5000
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from .env + dochaus.toml (falls back to defaults)
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```
//!
//! ## URI resolution
//!
//! The connection URI is resolved in this order:
//! 1. an explicit URI (passed by the caller or set in the config file)
//! 2. the `MONGODB_URI` environment variable
//! 3. [`DEFAULT_URI`]

use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./dochaus.toml";

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "DOCHAUS_CONFIG";

/// Environment variable naming the target server
pub const URI_ENV: &str = "MONGODB_URI";

/// Environment variable overriding the database name
pub const DATABASE_ENV: &str = "MONGODB_DATABASE";

/// Compiled-in fallback server
pub const DEFAULT_URI: &str = "mongodb://localhost:27017";

pub const DEFAULT_DATABASE: &str = "dochaus";

/// MongoDB rejects database names of 64 bytes or more
const MAX_DATABASE_NAME_LENGTH: usize = 63;

const URI_SCHEMES: &[&str] = &["mongodb://", "mongodb+srv://"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Invalid connection URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Explicit connection URI; wins over `MONGODB_URI` when set
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub server_selection_timeout_ms: Option<u64>,
}

/// Fully resolved settings handed to a connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub uri: String,
    pub database: String,
    pub app_name: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub server_selection_timeout: Option<Duration>,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

impl AppConfig {
    /// Load configuration from `.env`, then the TOML file it points at
    ///
    /// A missing `.env` file is fine. When neither `DOCHAUS_CONFIG` nor
    /// `./dochaus.toml` exists the defaults are used.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let mut config = if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            Self::from_file(&config_path)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };

        if let Ok(database) = env::var(DATABASE_ENV) {
            if !database.is_empty() {
                config.database.database = database;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(default_database())
    }
}

impl DatabaseConfig {
    /// Create a new database configuration with no explicit URI
    pub fn new(database: String) -> Self {
        Self {
            uri: None,
            database,
            app_name: None,
            connect_timeout_ms: None,
            server_selection_timeout_ms: None,
        }
    }

    pub fn with_uri(mut self, uri: String) -> Self {
        self.uri = Some(uri);
        self
    }

    pub fn with_app_name(mut self, app_name: String) -> Self {
        self.app_name = Some(app_name);
        self
    }

    pub fn with_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_server_selection_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.server_selection_timeout_ms = Some(timeout_ms);
        self
    }

    /// Resolve the connection URI against the process environment
    pub fn resolve_uri(&self, explicit: Option<&str>) -> String {
        self.resolve_uri_with(explicit, |key| env::var(key).ok())
    }

    /// Resolve the connection URI using `lookup` for environment access
    ///
    /// Empty values at any level count as unset.
    pub fn resolve_uri_with<F>(&self, explicit: Option<&str>, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        explicit
            .filter(|uri| !uri.is_empty())
            .map(str::to_string)
            .or_else(|| self.uri.clone().filter(|uri| !uri.is_empty()))
            .or_else(|| lookup(URI_ENV).filter(|uri| !uri.is_empty()))
            .unwrap_or_else(|| DEFAULT_URI.to_string())
    }

    /// Build connector settings, resolving the URI from the environment
    pub fn settings(&self, explicit: Option<&str>) -> Result<ConnectionSettings, ConfigError> {
        self.settings_with(explicit, |key| env::var(key).ok())
    }

    /// Build connector settings using `lookup` for environment access
    pub fn settings_with<F>(
        &self,
        explicit: Option<&str>,
        lookup: F,
    ) -> Result<ConnectionSettings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.validate()?;
        let uri = self.resolve_uri_with(explicit, lookup);
        check_uri_scheme(&uri)?;

        Ok(ConnectionSettings {
            uri,
            database: self.database.clone(),
            app_name: self.app_name.clone(),
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
            server_selection_timeout: self.server_selection_timeout_ms.map(Duration::from_millis),
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.is_empty() {
            return Err(ConfigError::Invalid(
                "Database name cannot be empty".to_string(),
            ));
        }
        if self.database.len() > MAX_DATABASE_NAME_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "Database name '{}' exceeds {} bytes",
                self.database, MAX_DATABASE_NAME_LENGTH
            )));
        }
        if let Some(c) = self
            .database
            .chars()
            .find(|c| matches!(*c, '/' | '\\' | '.' | ' ' | '"' | '$' | '*' | '<' | '>' | ':' | '|' | '?' | '\0'))
        {
            return Err(ConfigError::Invalid(format!(
                "Database name '{}' contains forbidden character {:?}",
                self.database, c
            )));
        }
        if let Some(uri) = &self.uri {
            check_uri_scheme(uri)?;
        }
        if self.connect_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "Database connect_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.server_selection_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "Database server_selection_timeout_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_uri_scheme(uri: &str) -> Result<(), ConfigError> {
    match URI_SCHEMES.iter().find(|scheme| uri.starts_with(*scheme)) {
        Some(scheme) if uri.len() > scheme.len() => Ok(()),
        Some(_) => Err(ConfigError::InvalidUri {
            uri: uri.to_string(),
            reason: "missing host".to_string(),
        }),
        None => Err(ConfigError::InvalidUri {
            uri: uri.to_string(),
            reason: format!("scheme must be one of {}", URI_SCHEMES.join(", ")),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_uri_precedence() {
        let env_lookup = |key: &str| (key == URI_ENV).then(|| "mongodb://env-host:27017".to_string());
        let config = DatabaseConfig::new("mydb".to_string());

        assert_eq!(
            config.resolve_uri_with(Some("mongodb://explicit:1"), env_lookup),
            "mongodb://explicit:1"
        );
        assert_eq!(
            config.resolve_uri_with(None, env_lookup),
            "mongodb://env-host:27017"
        );
        assert_eq!(config.resolve_uri_with(None, no_env), DEFAULT_URI);
    }

    #[test]
    fn test_configured_uri_counts_as_explicit() {
        let env_lookup = |_: &str| Some("mongodb://env-host:27017".to_string());
        let config =
            DatabaseConfig::new("mydb".to_string()).with_uri("mongodb://file-host".to_string());

        assert_eq!(config.resolve_uri_with(None, env_lookup), "mongodb://file-host");
        assert_eq!(
            config.resolve_uri_with(Some("mongodb://arg-host"), env_lookup),
            "mongodb://arg-host"
        );
    }

    #[test]
    fn test_empty_values_are_unset() {
        let env_lookup = |_: &str| Some(String::new());
        let config = DatabaseConfig::new("mydb".to_string());

        assert_eq!(config.resolve_uri_with(Some(""), env_lookup), DEFAULT_URI);
    }

    #[test]
    fn test_settings_reject_bad_scheme() {
        let config = DatabaseConfig::new("mydb".to_string());
        let err = config
            .settings_with(Some("postgres://localhost"), no_env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUri { .. }));

        let err = config.settings_with(Some("mongodb://"), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUri { .. }));
    }

    #[test]
    fn test_settings_convert_timeouts() {
        let config = DatabaseConfig::new("mydb".to_string())
            .with_connect_timeout_ms(1500)
            .with_server_selection_timeout_ms(250);
        let settings = config.settings_with(None, no_env).unwrap();

        assert_eq!(settings.uri, DEFAULT_URI);
        assert_eq!(settings.database, "mydb");
        assert_eq!(settings.connect_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(settings.server_selection_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_invalid_database_names() {
        for name in ["", "my.db", "my db", "a/b", "cash$"] {
            let config = DatabaseConfig::new(name.to_string());
            assert!(config.validate().is_err(), "Should reject database name: {:?}", name);
        }
        assert!(DatabaseConfig::new("a".repeat(64)).validate().is_err());
        assert!(DatabaseConfig::new("products-api".to_string()).validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = DatabaseConfig::new("mydb".to_string()).with_connect_timeout_ms(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_toml_defaults() {
        let config = AppConfig::from_toml_str("[database]\n").unwrap();
        assert_eq!(config.database.database, DEFAULT_DATABASE);
        assert!(config.database.uri.is_none());

        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.database.database, DEFAULT_DATABASE);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[database]
uri = "mongodb://db.internal:27017"
database = "products-api"
app_name = "catalog"
connect_timeout_ms = 2000
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database.uri.as_deref(), Some("mongodb://db.internal:27017"));
        assert_eq!(config.database.database, "products-api");
        assert_eq!(config.database.app_name.as_deref(), Some("catalog"));
        assert_eq!(config.database.connect_timeout_ms, Some(2000));
    }

    #[test]
    fn test_database_override_keeps_resolved_uri() {
        let env = |key: &str| (key == URI_ENV).then(|| "mongodb://from-dotenv:27017".to_string());

        let mut config = AppConfig::from_toml_str("[database]\ndatabase = \"people\"\n")
            .unwrap()
            .database;
        config.database = "products-api".to_string();

        let settings = config.settings_with(None, env).unwrap();
        assert_eq!(settings.uri, "mongodb://from-dotenv:27017");
        assert_eq!(settings.database, "products-api");
    }

    #[test]
    fn test_from_file_rejects_bad_uri() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nuri = \"localhost:27017\"").unwrap();

        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::InvalidUri { .. })
        ));
    }
}
