//! Semantic column kinds and the values bound to them.
//!
//! [`Kind`] is the closed set of field types the core understands. [`Value`] carries one
//! field value in and out of the database; it implements [`ToSql`] so rendered queries
//! pass their arguments to the driver out-of-band.

use crate::error::{OrmError, OrmResult};
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;
use tokio_postgres::Row;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// Semantic type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Text,
    Bool,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Timestamp with time zone.
    Timestamp,
    /// A type the core cannot map to a column.
    Unsupported,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Text => "text",
            Kind::Bool => "bool",
            Kind::Integer => "integer",
            Kind::BigInt => "bigint",
            Kind::Timestamp => "timestamp",
            Kind::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single bound value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Bool(bool),
    Integer(i32),
    BigInt(i64),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Whether this is the zero value of its kind.
    ///
    /// Zero values are indistinguishable from "unset" and are skipped when deriving
    /// conditions, inserts and updates from a record.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::Bool(b) => !b,
            Value::Integer(n) => *n == 0,
            Value::BigInt(n) => *n == 0,
            Value::Timestamp(ts) => *ts == DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Read column `idx` of `row` as a value of `kind`.
    pub fn decode(row: &Row, idx: usize, kind: Kind) -> OrmResult<Value> {
        fn get<T>(row: &Row, idx: usize) -> OrmResult<Option<T>>
        where
            T: for<'a> tokio_postgres::types::FromSql<'a>,
        {
            row.try_get::<_, Option<T>>(idx)
                .map_err(|e| OrmError::scan(format!("column {idx}: {e}")))
        }

        let value = match kind {
            Kind::Text => get::<String>(row, idx)?.map(Value::Text),
            Kind::Bool => get::<bool>(row, idx)?.map(Value::Bool),
            Kind::Integer => get::<i32>(row, idx)?.map(Value::Integer),
            Kind::BigInt => get::<i64>(row, idx)?.map(Value::BigInt),
            Kind::Timestamp => get::<DateTime<Utc>>(row, idx)?.map(Value::Timestamp),
            Kind::Unsupported => {
                return Err(OrmError::scan(format!(
                    "column {idx}: cannot decode an unsupported kind"
                )));
            }
        };
        Ok(value.unwrap_or(Value::Null))
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Text(s) => s.to_sql_checked(ty, out),
            Value::Bool(b) => b.to_sql_checked(ty, out),
            Value::Integer(n) => n.to_sql_checked(ty, out),
            Value::BigInt(n) => n.to_sql_checked(ty, out),
            Value::Timestamp(ts) => ts.to_sql_checked(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <String as ToSql>::accepts(ty)
            || <bool as ToSql>::accepts(ty)
            || <i32 as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <DateTime<Utc> as ToSql>::accepts(ty)
    }

    // Each variant checks against its own Rust type in `to_sql`.
    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        self.to_sql(ty, out)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A Rust type that can live in a record field.
///
/// Implemented for `String`, `bool`, `i32`, `i64`, `DateTime<Utc>` and `Option` of
/// any of them. `#[derive(Record)]` requires it for every mapped field.
pub trait ColumnValue: Sized {
    /// Semantic kind used for DDL and decoding.
    const KIND: Kind;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> OrmResult<Self>;
}

macro_rules! column_value {
    ($ty:ty, $kind:ident) => {
        impl ColumnValue for $ty {
            const KIND: Kind = Kind::$kind;

            fn to_value(&self) -> Value {
                Value::$kind(self.clone())
            }

            fn from_value(value: Value) -> OrmResult<Self> {
                match value {
                    Value::$kind(v) => Ok(v),
                    Value::Null => Err(OrmError::scan(concat!(
                        "NULL cannot be assigned to ",
                        stringify!($ty)
                    ))),
                    other => Err(OrmError::scan(format!(
                        "expected {}, got {:?}",
                        Kind::$kind,
                        other
                    ))),
                }
            }
        }
    };
}

column_value!(String, Text);
column_value!(bool, Bool);
column_value!(i32, Integer);
column_value!(i64, BigInt);
column_value!(DateTime<Utc>, Timestamp);

impl<T: ColumnValue> ColumnValue for Option<T> {
    const KIND: Kind = T::KIND;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ColumnValue::to_value)
    }

    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Decoded values waiting to be written into a record, keyed by field name.
///
/// Generated `Record::apply` implementations take every value they know out of the
/// set before assigning anything, so a failed conversion leaves the record untouched.
#[derive(Debug, Default)]
pub struct ValueSet {
    entries: Vec<(String, Value)>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.entries.push((field.into(), value));
    }

    /// Remove the value for `field` and convert it.
    ///
    /// Returns `Ok(None)` when the set has no entry for the field.
    pub fn take<T: ColumnValue>(&mut self, field: &str) -> OrmResult<Option<T>> {
        let Some(pos) = self.entries.iter().position(|(name, _)| name == field) else {
            return Ok(None);
        };
        let (_, value) = self.entries.remove(pos);
        T::from_value(value).map(Some).map_err(|e| match e {
            OrmError::Scan(msg) => OrmError::scan(format!("field `{field}`: {msg}")),
            other => other,
        })
    }

    /// Field names still held by the set.
    pub fn remaining(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
