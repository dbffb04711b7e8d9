//! Table and field descriptions derived from record types.
//!
//! [`load_table`] is the default schema loader: the table name is the mangled record
//! type name, fields keep declaration order, ignored fields are dropped and each field
//! carries the tags parsed from its annotation.

use crate::error::{OrmError, OrmResult};
use crate::naming::mangle;
use crate::record::{FieldDescriptor, Record, RecordInfo};
use crate::value::{Kind, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Annotation group every parsed tag belongs to.
pub const TAG_GROUP: &str = "sql";

/// A schema loader: record description in, table out.
///
/// A custom loader replaces [`load_table`] for registration and binding. Its tables
/// are used as given; nothing assumes they follow the default naming.
pub type LoadFn = Arc<dyn Fn(&RecordInfo) -> OrmResult<Table> + Send + Sync>;

/// Opaque annotation attached to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Split an annotation into tags, one per comma-separated token.
pub fn parse_tags(annotation: &str) -> Vec<Tag> {
    if annotation.is_empty() {
        return Vec::new();
    }
    annotation
        .split(',')
        .map(|token| Tag::new(TAG_GROUP, "", token.trim()))
        .collect()
}

/// One column-mapped member of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Declared identifier.
    pub name: String,
    pub column_name: String,
    pub kind: Kind,
    pub type_name: String,
    pub tags: Vec<Tag>,
}

impl Field {
    /// Build a field with the default column name.
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        let name = name.into();
        Self {
            column_name: mangle(&name),
            type_name: kind.as_str().to_string(),
            name,
            kind,
            tags: Vec::new(),
        }
    }

    fn from_descriptor(desc: &FieldDescriptor) -> Self {
        let tags = parse_tags(desc.annotation);
        // The first token, when present, names the column.
        let column_name = match tags.first() {
            Some(tag) if !tag.value.is_empty() => tag.value.clone(),
            _ => mangle(desc.name),
        };
        Self {
            name: desc.name.to_string(),
            column_name,
            kind: desc.kind,
            type_name: desc.type_name.to_string(),
            tags,
        }
    }

    pub fn with_column_name(mut self, column: impl Into<String>) -> Self {
        self.column_name = column.into();
        self
    }

    /// Whether this field is the identifier column.
    pub fn is_id(&self) -> bool {
        self.column_name.eq_ignore_ascii_case("id")
    }
}

/// Schema descriptor for a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Table {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.column_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Default schema loader.
pub fn load_table(info: &RecordInfo) -> OrmResult<Table> {
    let name = mangle(info.type_name);
    if name.is_empty() {
        return Err(OrmError::invalid_model("record type name is empty"));
    }

    let mut fields = Vec::with_capacity(info.fields.len());
    let mut seen = HashSet::with_capacity(info.fields.len());
    for desc in info.fields.iter().filter(|d| !d.is_ignored()) {
        if desc.name.is_empty() {
            return Err(OrmError::invalid_model(format!(
                "`{}` declares a field without a name",
                info.type_name
            )));
        }
        let field = Field::from_descriptor(desc);
        if !seen.insert(field.column_name.clone()) {
            return Err(OrmError::invalid_model(format!(
                "`{}` maps more than one field to column `{}`",
                info.type_name, field.column_name
            )));
        }
        fields.push(field);
    }

    Ok(Table { name, fields })
}

/// Column names and values of the non-zero fields of `record`, in table order.
///
/// Zero values cannot be told apart from unset ones, so they never appear here; a
/// literal condition is the only way to match or write them.
pub fn values<M: Record>(table: &Table, record: &M) -> (Vec<String>, Vec<Value>) {
    non_zero_columns(table, &record.values())
}

/// Pair `current` values (keyed by declared field name) with their columns, dropping
/// zero values and names the table does not map.
pub fn non_zero_columns(
    table: &Table,
    current: &[(&'static str, Value)],
) -> (Vec<String>, Vec<Value>) {
    let mut cols = Vec::new();
    let mut vals = Vec::new();
    for field in &table.fields {
        let Some((_, value)) = current.iter().find(|(name, _)| *name == field.name) else {
            continue;
        };
        if value.is_zero() {
            continue;
        }
        cols.push(field.column_name.clone());
        vals.push(value.clone());
    }
    (cols, vals)
}
