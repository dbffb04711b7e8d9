//! Connection pool helpers.
//!
//! A pooled client implements [`GenericClient`](crate::GenericClient), so it can be
//! handed to any terminal session operation.

use crate::config::Config;
use crate::error::{OrmError, OrmResult};
use crate::session::Session;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

const DEFAULT_MAX_SIZE: usize = 16;

/// Create a pool from a database URL with default settings.
///
/// ```ignore
/// let pool = orange::create_pool("postgres://postgres@localhost/orange_test")?;
/// let client = pool.get().await?;
/// db.automigrate(&client).await?;
/// ```
pub fn create_pool(database_url: &str) -> OrmResult<Pool> {
    create_pool_with_config(database_url, DEFAULT_MAX_SIZE)
}

/// Create a pool holding at most `max_size` connections.
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> OrmResult<Pool> {
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| OrmError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(mgr)
        .max_size(max_size)
        .build()
        .map_err(|e| OrmError::Pool(e.to_string()))
}

/// Root session plus a pool, both built from `config`.
///
/// No connection is made until the pool hands out its first client.
pub fn open_pool(config: Config) -> OrmResult<(Session, Pool)> {
    let session = Session::new(config)?;
    let url = session
        .config()
        .database_url
        .clone()
        .ok_or_else(|| OrmError::Connection("no database url configured".to_string()))?;
    let pool = create_pool(&url)?;
    Ok((session, pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_is_connection_error() {
        let result = create_pool("postgres://localhost:notaport/orange");
        assert!(matches!(result, Err(OrmError::Connection(_))));
    }

    #[test]
    fn unknown_dialect_fails_before_pool() {
        let result = open_pool(Config::new().dialect("oracle").database_url("postgres://x/y"));
        assert!(matches!(result, Err(OrmError::UnsupportedDialect(_))));
    }

    #[test]
    fn builds_without_connecting() {
        let (session, pool) = open_pool(
            Config::new().database_url("postgres://postgres@localhost/orange_test"),
        )
        .unwrap();
        assert_eq!(session.adopter().name(), "postgres");
        assert_eq!(pool.status().max_size, DEFAULT_MAX_SIZE);
    }
}
