//! Copying result rows into destination values.
//!
//! Struct mode decodes one column per table field (by field kind) and writes the values
//! back by field name. Scalar mode decodes leading columns straight into the given
//! destinations.

use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::schema::Table;
use crate::value::{ColumnValue, Value, ValueSet};
use tokio_postgres::Row;

/// Destination for scalar-mode binding.
///
/// Implemented for every [`ColumnValue`] (reads column 0) and for tuples of up to
/// four of them (reads columns `0..n`).
pub trait ScanTarget {
    /// Number of columns consumed.
    const WIDTH: usize;

    fn scan(&mut self, row: &Row) -> OrmResult<()>;
}

/// The row must carry exactly as many columns as there are destinations.
fn check_width(columns: usize, expected: usize) -> OrmResult<()> {
    if columns != expected {
        return Err(OrmError::scan(format!(
            "expected {expected} column(s), got {columns}"
        )));
    }
    Ok(())
}

fn decode<T: ColumnValue>(row: &Row, idx: usize) -> OrmResult<T> {
    T::from_value(Value::decode(row, idx, T::KIND)?)
}

macro_rules! scalar_target {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ScanTarget for $ty {
                const WIDTH: usize = 1;

                fn scan(&mut self, row: &Row) -> OrmResult<()> {
                    check_width(row.len(), Self::WIDTH)?;
                    *self = decode(row, 0)?;
                    Ok(())
                }
            }

            impl ScanTarget for Option<$ty> {
                const WIDTH: usize = 1;

                fn scan(&mut self, row: &Row) -> OrmResult<()> {
                    check_width(row.len(), Self::WIDTH)?;
                    *self = decode(row, 0)?;
                    Ok(())
                }
            }
        )*
    };
}

scalar_target!(String, bool, i32, i64, chrono::DateTime<chrono::Utc>);

macro_rules! tuple_target {
    ($width:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name: ColumnValue),+> ScanTarget for ($($name,)+) {
            const WIDTH: usize = $width;

            fn scan(&mut self, row: &Row) -> OrmResult<()> {
                check_width(row.len(), Self::WIDTH)?;
                // Decode everything before assigning anything.
                let decoded = ($(decode::<$name>(row, $idx)?,)+);
                *self = decoded;
                Ok(())
            }
        }
    };
}

tuple_target!(1; A: 0);
tuple_target!(2; A: 0, B: 1);
tuple_target!(3; A: 0, B: 1, C: 2);
tuple_target!(4; A: 0, B: 1, C: 2, D: 3);

/// Every field of `table` must be a mapped field of `M`.
pub fn check_target<M: Record>(table: &Table) -> OrmResult<()> {
    let declared = M::fields();
    match table
        .fields
        .iter()
        .find(|f| !declared.iter().any(|d| d.name == f.name && !d.is_ignored()))
    {
        Some(unknown) => Err(OrmError::InvalidTarget(format!(
            "`{}` has no mapped field `{}`",
            M::TYPE_NAME,
            unknown.name
        ))),
        None => Ok(()),
    }
}

/// Struct mode: decode `row` by `table` and write the values into `dest`.
///
/// Nothing is written unless every field decodes and every table field exists on
/// the destination.
pub fn scan_record<M: Record>(row: &Row, table: &Table, dest: &mut M) -> OrmResult<()> {
    check_target::<M>(table)?;
    check_width(row.len(), table.len())?;

    let mut staged = ValueSet::new();
    for (idx, field) in table.fields.iter().enumerate() {
        staged.insert(field.name.clone(), Value::decode(row, idx, field.kind)?);
    }
    dest.apply(&mut staged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_count_must_match() {
        assert!(check_width(2, 2).is_ok());
        assert!(check_width(1, 2).unwrap_err().is_scan());
        assert!(check_width(3, 2).unwrap_err().is_scan());
    }

    #[test]
    fn widths() {
        assert_eq!(<i64 as ScanTarget>::WIDTH, 1);
        assert_eq!(<Option<String> as ScanTarget>::WIDTH, 1);
        assert_eq!(<(i64, String, bool) as ScanTarget>::WIDTH, 3);
    }
}
