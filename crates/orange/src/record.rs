//! Record types: the static description that replaces runtime reflection.

use crate::error::OrmResult;
use crate::value::{Kind, Value, ValueSet};

/// Annotation value that excludes a field from its table.
pub const IGNORE_MARKER: &str = "-";

/// Compile-time description of one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Declared identifier.
    pub name: &'static str,
    pub kind: Kind,
    /// Rust type as written in the declaration.
    pub type_name: &'static str,
    /// Raw comma-separated annotation (`#[orange(sql = "...")]`), empty if absent.
    pub annotation: &'static str,
}

impl FieldDescriptor {
    pub const fn new(
        name: &'static str,
        kind: Kind,
        type_name: &'static str,
        annotation: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            type_name,
            annotation,
        }
    }

    /// Whether the annotation excludes this field.
    pub fn is_ignored(&self) -> bool {
        self.annotation.trim() == IGNORE_MARKER
    }
}

/// Everything a loader needs to build a table for a record type.
#[derive(Debug, Clone, Copy)]
pub struct RecordInfo {
    pub type_name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

/// A record that maps to a table.
///
/// Usually derived:
///
/// ```ignore
/// use orange::Record;
///
/// #[derive(Record, Default)]
/// struct Golangster {
///     id: i64,
///     name: String,
///     #[orange(sql = "-")]
///     scratch: Vec<u8>,
/// }
/// ```
pub trait Record: Send + Sync + 'static {
    /// Declared type name; the default table name is derived from it.
    const TYPE_NAME: &'static str;

    /// All declared fields, ignored ones included, in declaration order.
    fn fields() -> &'static [FieldDescriptor];

    /// Current values of the mapped fields keyed by declared name.
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Write decoded values back by declared name.
    ///
    /// Implementations convert every value first and assign afterwards. Names the
    /// record does not map stay in `values` untouched; struct-mode binding rejects
    /// such tables with [`check_target`](crate::bind::check_target) before decoding.
    fn apply(&mut self, values: &mut ValueSet) -> OrmResult<()>;

    fn info() -> RecordInfo
    where
        Self: Sized,
    {
        RecordInfo {
            type_name: Self::TYPE_NAME,
            fields: Self::fields(),
        }
    }
}
