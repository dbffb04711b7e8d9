//! Dialect plugins.
//!
//! An [`Adopter`] turns table descriptions into DDL and supplies the dialect's
//! parameter placeholder syntax. The core never hardcodes a dialect; everything
//! dialect-specific goes through this trait.

mod postgres;

pub use postgres::Postgres;

use crate::error::{OrmError, OrmResult};
use crate::schema::{Field, Table};
use std::fmt::Debug;
use std::sync::Arc;

/// Database-specific SQL generation.
pub trait Adopter: Send + Sync + Debug {
    /// Dialect identifier, e.g. `postgres`.
    fn name(&self) -> &'static str;

    /// Statement creating `table` if it does not exist.
    fn create_ddl(&self, table: &Table) -> OrmResult<String>;

    /// Statement dropping `table`.
    fn drop_ddl(&self, table: &Table) -> OrmResult<String>;

    /// Column definition for `field`.
    ///
    /// Fails with [`OrmError::UnsupportedType`] for kinds the dialect cannot map.
    fn column_ddl(&self, field: &Field) -> OrmResult<String>;

    /// Parameter marker for the 1-based `position`.
    ///
    /// Postgres uses `$1`, MySQL and SQLite use `?`.
    fn placeholder(&self, position: usize) -> String;

    fn supports_prepared_statements(&self) -> bool;

    /// Query returning the name of the database the connection is using.
    fn current_database_sql(&self) -> &'static str;
}

/// Look up a built-in adopter by dialect name.
pub fn by_name(name: &str) -> OrmResult<Arc<dyn Adopter>> {
    match name {
        "postgres" | "postgresql" => Ok(Arc::new(Postgres)),
        other => Err(OrmError::UnsupportedDialect(other.to_string())),
    }
}
