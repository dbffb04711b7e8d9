//! Derive macros for orange
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod record;

/// Derive `Record` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use orange::Record;
///
/// #[derive(Record, Default)]
/// struct Golangster {
///     id: i64,
///     #[orange(sql = "full_name,notnull")]
///     name: String,
///     #[orange(skip)]
///     cache: Vec<u8>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orange(sql = "...")]` - Comma-separated tags; the first non-empty one names the column
/// - `#[orange(sql = "-")]` or `#[orange(skip)]` - Leave the field out of the table
///
/// Every mapped field type must implement `orange::ColumnValue`.
#[proc_macro_derive(Record, attributes(orange))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
