//! # orange
//!
//! Map Rust records to relational tables and build parameterized SQL from a
//! chainable session.
//!
//! ## Features
//!
//! - **Derived schemas**: `#[derive(Record)]` describes a struct; table and column
//!   names are mangled to snake case unless a `#[orange(sql = "...")]` tag overrides them
//! - **Immutable chains**: every chain step returns a new [`Session`], so a base session
//!   can be reused without clauses leaking between queries
//! - **Parameterized SQL**: values never end up in the SQL text; conditions use `?`
//!   and the dialect picks the placeholder
//! - **Pluggable dialects**: DDL and placeholders come from an [`Adopter`]
//! - **Transaction-friendly**: pass a transaction anywhere a [`GenericClient`] is expected
//!
//! ```ignore
//! use orange::{Record, Value};
//!
//! #[derive(Record, Default)]
//! struct Golangster {
//!     id: i64,
//!     name: String,
//! }
//!
//! let (db, client) = orange::open("postgres", &url).await?;
//! db.register::<Golangster>()?;
//! db.automigrate(&client).await?;
//!
//! let mut name = String::new();
//! db.select_sql("name FROM golangster", [])
//!     .filter_sql("id = ?", [Value::from(1i64)])
//!     .bind_scalar(&client, &mut name)
//!     .await?;
//! ```

extern crate self as orange;

pub mod adopter;
pub mod bind;
pub mod clause;
pub mod client;
pub mod config;
pub mod error;
pub mod log;
pub mod naming;
pub mod record;
pub mod registry;
pub mod render;
pub mod schema;
pub mod session;
pub mod value;
mod write;

#[cfg(feature = "pool")]
pub mod pool;

pub use adopter::{Adopter, Postgres};
pub use bind::{ScanTarget, check_target, scan_record};
pub use clause::{Clause, Clauses, Condition, Selection};
pub use client::GenericClient;
pub use config::Config;
pub use error::{OrmError, OrmResult};
pub use log::StatementKind;
pub use naming::mangle;
pub use record::{FieldDescriptor, Record, RecordInfo};
pub use registry::Registry;
pub use render::BuiltQuery;
pub use schema::{Field, LoadFn, Table, Tag, load_table};
pub use session::{Session, open, open_with};
pub use value::{ColumnValue, Kind, Value, ValueSet};

#[cfg(feature = "derive")]
pub use orange_derive::Record;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config, open_pool};
