//! Error types for orange

use thiserror::Error;

/// Result type alias for orange operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for schema loading, query building and execution
#[derive(Debug, Error)]
pub enum OrmError {
    /// The record cannot be described as a table
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// The operation references a record type that was never registered
    #[error("Table for `{0}` is not registered")]
    UnregisteredTable(String),

    /// A field kind has no mapping in the active dialect
    #[error("Unsupported type for field `{field}`: {kind}")]
    UnsupportedType { field: String, kind: String },

    /// The bind destination cannot receive the result
    #[error("Invalid bind target: {0}")]
    InvalidTarget(String),

    /// Row to value assignment failed
    #[error("Scan error: {0}")]
    Scan(String),

    /// No adopter is known under the requested name
    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// The composed statement is not well formed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl OrmError {
    /// Create an invalid model error
    pub fn invalid_model(message: impl Into<String>) -> Self {
        Self::InvalidModel(message.into())
    }

    /// Create an unsupported type error for a field
    pub fn unsupported_type(field: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnsupportedType {
            field: field.into(),
            kind: kind.into(),
        }
    }

    /// Create a scan error
    pub fn scan(message: impl Into<String>) -> Self {
        Self::Scan(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is an unregistered table error
    pub fn is_unregistered(&self) -> bool {
        matches!(self, Self::UnregisteredTable(_))
    }

    /// Check if this is a scan error
    pub fn is_scan(&self) -> bool {
        matches!(self, Self::Scan(_))
    }

    /// Map a driver error raised while executing a statement.
    ///
    /// A closed connection is reported as [`OrmError::Connection`]; everything else
    /// keeps the original driver error.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if err.is_closed() {
            return Self::Connection(err.to_string());
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
