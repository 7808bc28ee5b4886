//! Connection configuration.
//!
//! ```toml
//! [database]
//! url = "postgres://postgres@localhost/app"
//! table_prefix = "app_"
//! dialect = "standard"
//! caching = true
//! cache_lifetime_secs = 60
//! ```

use crate::database::{Dialect, Quoter};
use crate::error::{DbError, DbResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Settings for one named connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection name, used in result cache keys.
    pub name: String,
    /// Driver connection string.
    pub url: String,
    /// Prefix applied to every quoted table name.
    pub table_prefix: String,
    /// Quoting dialect.
    pub dialect: Dialect,
    /// Enable the in-memory result cache.
    pub caching: bool,
    /// Default lifetime for `cached()` statements that use [`DatabaseConfig::cache_lifetime`].
    pub cache_lifetime_secs: u64,
    /// Maximum number of cached results.
    pub cache_capacity: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            url: String::new(),
            table_prefix: String::new(),
            dialect: Dialect::Standard,
            caching: false,
            cache_lifetime_secs: 60,
            cache_capacity: 256,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    database: DatabaseConfig,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Parse TOML, either a bare table or one wrapped in `[database]`.
    pub fn from_toml_str(raw: &str) -> DbResult<Self> {
        let value: toml::Table =
            toml::from_str(raw).map_err(|e| DbError::config(format!("failed to parse config: {e}")))?;
        let config = if value.contains_key("database") {
            toml::from_str::<ConfigFile>(raw).map(|file| file.database)
        } else {
            toml::from_str::<DatabaseConfig>(raw)
        };
        config.map_err(|e| DbError::config(format!("failed to parse config: {e}")))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DbError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.caching = enabled;
        self
    }

    pub fn cache_lifetime(&self) -> Duration {
        Duration::from_secs(self.cache_lifetime_secs)
    }

    /// The quoting rules described by this config.
    pub fn quoter(&self) -> Quoter {
        Quoter::new(self.dialect).with_prefix(self.table_prefix.clone())
    }
}
