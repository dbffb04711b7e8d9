//! INSERT and UPDATE statements derived from a record's non-zero fields.

use crate::adopter::Adopter;
use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::render::{BuiltQuery, SqlWriter};
use crate::schema::{Table, values};

/// `INSERT INTO t (c1, c2) VALUES ($1, $2);`
///
/// A record whose fields are all zero inserts `DEFAULT VALUES`.
pub(crate) fn insert_statement<M: Record>(
    adopter: &dyn Adopter,
    table: &Table,
    record: &M,
) -> BuiltQuery {
    let (cols, vals) = values(table, record);
    let mut w = SqlWriter::new(adopter);
    w.push("INSERT INTO ").push(&table.name);
    if cols.is_empty() {
        w.push(" DEFAULT VALUES;");
        return w.finish();
    }
    w.push(" (").push(&cols.join(", ")).push(") VALUES (");
    for (i, val) in vals.into_iter().enumerate() {
        if i > 0 {
            w.push(", ");
        }
        w.push_bind(val);
    }
    w.push(");");
    w.finish()
}

/// `UPDATE t SET c1 = $1, c2 = $2 WHERE id = $3;`
///
/// The id-like column is the key, every other non-zero field is assigned.
pub(crate) fn update_statement<M: Record>(
    adopter: &dyn Adopter,
    table: &Table,
    record: &M,
) -> OrmResult<BuiltQuery> {
    let id_columns: Vec<_> = table.fields.iter().filter(|f| f.is_id()).collect();
    if id_columns.len() > 1 {
        return Err(OrmError::invalid_model(format!(
            "`{}` has more than one id column",
            table.name
        )));
    }

    let (cols, vals) = values(table, record);
    let mut key = None;
    let mut set_cols = Vec::with_capacity(cols.len());
    let mut set_vals = Vec::with_capacity(vals.len());
    for (col, val) in cols.into_iter().zip(vals) {
        if col.eq_ignore_ascii_case("id") {
            key = Some((col, val));
        } else {
            set_cols.push(col);
            set_vals.push(val);
        }
    }

    let Some((key_col, key_val)) = key else {
        return Err(OrmError::validation(format!(
            "UPDATE {} requires a non-zero id",
            table.name
        )));
    };
    if set_cols.is_empty() {
        return Err(OrmError::validation(format!(
            "UPDATE {} has no non-zero fields to set",
            table.name
        )));
    }

    let mut w = SqlWriter::new(adopter);
    w.push("UPDATE ").push(&table.name).push(" SET ");
    w.push_assignments(&set_cols, set_vals, ", ");
    w.push(" WHERE ").push(&key_col).push(" = ").push_bind(key_val);
    w.push(";");
    Ok(w.finish())
}
