//! Query clauses accumulated on a session.
//!
//! Literal conditions mark their parameters with `?`; the renderer turns each marker
//! into the adopter's placeholder. A `?` inside a quoted literal (`'?'`) is not a marker. Record-derived clauses stay unresolved until render
//! time, when the table for their type is looked up.

use crate::record::{Record, RecordInfo};
use crate::value::Value;

/// Marker for a positional argument inside a literal condition.
pub const ARG_MARKER: char = '?';

/// A literal SQL fragment with its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub condition: String,
    pub args: Vec<Value>,
}

impl Clause {
    pub fn new(condition: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            condition: condition.into(),
            args: args.into_iter().collect(),
        }
    }
}

/// Byte offsets of the `?` markers in `condition`.
///
/// Markers inside single-quoted literals and double-quoted identifiers are plain text.
/// A doubled quote inside a quoted segment closes and reopens it, which leaves the
/// segment quoted.
pub(crate) fn marker_positions(condition: &str) -> Vec<usize> {
    let mut quote = None;
    let mut out = Vec::new();
    for (pos, ch) in condition.char_indices() {
        match (quote, ch) {
            (None, '\'' | '"') => quote = Some(ch),
            (Some(open), _) if ch == open => quote = None,
            (None, ARG_MARKER) => out.push(pos),
            _ => {}
        }
    }
    out
}

/// A WHERE condition: literal text or equality on a record's non-zero fields.
#[derive(Debug, Clone)]
pub enum Condition {
    Sql(Clause),
    Match {
        info: RecordInfo,
        values: Vec<(&'static str, Value)>,
    },
}

impl Condition {
    /// Literal condition, e.g. `Condition::sql("name = ? AND id > ?", [..])`.
    pub fn sql(condition: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Self {
        Condition::Sql(Clause::new(condition, args))
    }

    /// Literal condition without arguments.
    pub fn raw(condition: impl Into<String>) -> Self {
        Condition::Sql(Clause::new(condition, []))
    }

    /// Equality on every non-zero field of `record`.
    pub fn matching<M: Record>(record: &M) -> Self {
        Condition::Match {
            info: M::info(),
            values: record.values(),
        }
    }
}

impl<M: Record> From<&M> for Condition {
    fn from(record: &M) -> Self {
        Condition::matching(record)
    }
}

/// Source of the SELECT clause.
#[derive(Debug, Clone)]
pub enum Selection {
    /// `* FROM <table>` for a registered record type.
    Table { type_name: &'static str },
    Sql(Clause),
}

/// Clause set of one session. Absent clauses are `None`.
#[derive(Debug, Clone, Default)]
pub struct Clauses {
    pub select: Option<Selection>,
    pub filter: Option<Condition>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub count: Option<String>,
}

impl Clauses {
    pub fn is_empty(&self) -> bool {
        self.select.is_none()
            && self.filter.is_none()
            && self.limit.is_none()
            && self.offset.is_none()
            && self.count.is_none()
    }
}
