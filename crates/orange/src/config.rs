//! Explicit session configuration.

use crate::error::{OrmError, OrmResult};
use crate::schema::LoadFn;
use std::fmt;
use tracing::Level;

/// Environment variable holding the connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable holding the dialect name.
pub const DIALECT_ENV: &str = "ORANGE_DIALECT";

const DEFAULT_DIALECT: &str = "postgres";

/// Configuration for a root [`Session`](crate::Session).
///
/// Nothing is read from global state: the dialect, the schema loader and logging
/// are all chosen here.
#[derive(Clone)]
pub struct Config {
    /// Adopter name, e.g. `postgres`.
    pub dialect: String,
    /// Connection string used by [`open_with`](crate::open_with).
    pub database_url: Option<String>,
    /// Level at which executed statements are logged.
    pub log_level: Level,
    /// Truncate logged SQL (in bytes). `None` logs it whole.
    pub max_sql_length: Option<usize>,
    /// Custom schema loader; `None` uses [`load_table`](crate::schema::load_table).
    pub load_fn: Option<LoadFn>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: DEFAULT_DIALECT.to_string(),
            database_url: None,
            log_level: Level::DEBUG,
            max_sql_length: Some(200),
            load_fn: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("dialect", &self.dialect)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("log_level", &self.log_level)
            .field("max_sql_length", &self.max_sql_length)
            .field("load_fn", &self.load_fn.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `DATABASE_URL` and `ORANGE_DIALECT` (default `postgres`).
    pub fn from_env() -> OrmResult<Self> {
        let database_url = std::env::var(DATABASE_URL_ENV).map_err(|_| {
            OrmError::Connection(format!("{DATABASE_URL_ENV} is not set"))
        })?;
        let dialect =
            std::env::var(DIALECT_ENV).unwrap_or_else(|_| DEFAULT_DIALECT.to_string());
        Ok(Self::new().dialect(dialect).database_url(database_url))
    }

    pub fn dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Log every executed statement at INFO.
    pub fn verbose(mut self) -> Self {
        self.log_level = Level::INFO;
        self
    }

    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Replace the default schema loader.
    pub fn load_fn(mut self, load_fn: LoadFn) -> Self {
        self.load_fn = Some(load_fn);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new();
        assert_eq!(config.dialect, "postgres");
        assert_eq!(config.log_level, Level::DEBUG);
        assert!(config.load_fn.is_none());
    }

    #[test]
    fn builder_chain() {
        let config = Config::new()
            .dialect("postgresql")
            .database_url("postgres://localhost/orange_test")
            .verbose()
            .no_truncate();
        assert_eq!(config.dialect, "postgresql");
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.max_sql_length.is_none());
        assert!(format!("{config:?}").contains("<set>"));
    }
}
