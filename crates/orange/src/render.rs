//! Clause assembly into one parameterized statement.

use crate::adopter::Adopter;
use crate::clause::{ARG_MARKER, Clause, Clauses, Condition, Selection, marker_positions};
use crate::error::{OrmError, OrmResult};
use crate::schema::non_zero_columns;
use crate::session::Shared;
use crate::value::Value;
use tokio_postgres::types::ToSql;

/// A rendered statement and its arguments in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BuiltQuery {
    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }
}

/// Accumulates SQL text while numbering placeholders through the adopter.
pub(crate) struct SqlWriter<'a> {
    adopter: &'a dyn Adopter,
    sql: String,
    params: Vec<Value>,
}

impl<'a> SqlWriter<'a> {
    pub(crate) fn new(adopter: &'a dyn Adopter) -> Self {
        Self {
            adopter,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Start a new keyword section, separated by one space from what came before.
    pub(crate) fn section(&mut self, keyword: &str) -> &mut Self {
        if !self.sql.is_empty() {
            self.sql.push(' ');
        }
        self.sql.push_str(keyword);
        self
    }

    pub(crate) fn push_bind(&mut self, value: Value) -> &mut Self {
        self.params.push(value);
        let marker = self.adopter.placeholder(self.params.len());
        self.sql.push_str(&marker);
        self
    }

    /// Append a literal clause, replacing each `?` marker with the next placeholder.
    pub(crate) fn push_clause(&mut self, clause: &Clause) -> OrmResult<()> {
        let markers = marker_positions(&clause.condition);
        if markers.len() != clause.args.len() {
            return Err(OrmError::validation(format!(
                "condition `{}` has {} placeholder(s) but {} argument(s)",
                clause.condition,
                markers.len(),
                clause.args.len()
            )));
        }
        let mut start = 0;
        for (pos, arg) in markers.into_iter().zip(&clause.args) {
            self.push(&clause.condition[start..pos]);
            self.push_bind(arg.clone());
            start = pos + ARG_MARKER.len_utf8();
        }
        self.push(&clause.condition[start..]);
        Ok(())
    }

    /// Append `col1 = $1<sep>col2 = $2...`.
    pub(crate) fn push_assignments(&mut self, cols: &[String], vals: Vec<Value>, sep: &str) {
        for (i, (col, val)) in cols.iter().zip(vals).enumerate() {
            if i > 0 {
                self.push(sep);
            }
            self.push(col).push(" = ").push_bind(val);
        }
    }

    pub(crate) fn finish(self) -> BuiltQuery {
        BuiltQuery {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Byte offset of the first standalone `FROM` keyword, ignoring case.
///
/// The keyword must start the text or follow whitespace, and be followed by whitespace
/// or the end of the text, so identifiers such as `date_from` never match.
fn find_from(condition: &str) -> Option<usize> {
    let bytes = condition.as_bytes();
    (0..bytes.len()).find(|&i| {
        bytes
            .get(i..i + 4)
            .is_some_and(|word| word.eq_ignore_ascii_case(b"FROM"))
            && (i == 0 || bytes[i - 1].is_ascii_whitespace())
            && bytes.get(i + 4).is_none_or(|b| b.is_ascii_whitespace())
    })
}

/// Render the select condition, rewritten for COUNT when one is set.
fn select_clause(shared: &Shared, selection: &Selection, count: Option<&str>) -> OrmResult<Clause> {
    let clause = match selection {
        Selection::Table { type_name } => {
            let table = shared
                .registry
                .lookup(type_name)
                .ok_or_else(|| OrmError::UnregisteredTable(type_name.to_string()))?;
            Clause::new(format!("* FROM {}", table.name), [])
        }
        Selection::Sql(clause) => clause.clone(),
    };

    let Some(count) = count else {
        return Ok(clause);
    };
    match find_from(&clause.condition) {
        Some(n) if n > 0 => {
            // Arguments of the discarded column list go with it.
            let dropped = marker_positions(&clause.condition[..n]).len();
            Ok(Clause {
                condition: format!("COUNT({count}) {}", &clause.condition[n..]),
                args: clause.args.into_iter().skip(dropped).collect(),
            })
        }
        _ => Ok(Clause {
            condition: format!("COUNT({count}) {}", clause.condition),
            args: clause.args,
        }),
    }
}

fn push_condition(shared: &Shared, w: &mut SqlWriter<'_>, condition: &Condition) -> OrmResult<()> {
    match condition {
        Condition::Sql(clause) => {
            w.section("WHERE ");
            w.push_clause(clause)
        }
        Condition::Match { info, values } => {
            let table = shared.table_for(info)?;
            let (cols, vals) = non_zero_columns(&table, values);
            // All-zero records constrain nothing.
            if !cols.is_empty() {
                w.section("WHERE ");
                w.push_assignments(&cols, vals, " AND ");
            }
            Ok(())
        }
    }
}

/// Assemble `clauses` in fixed order: SELECT, WHERE, OFFSET, LIMIT, then `;`.
pub(crate) fn build_query(shared: &Shared, clauses: &Clauses) -> OrmResult<BuiltQuery> {
    let mut w = SqlWriter::new(shared.adopter.as_ref());

    match (&clauses.select, &clauses.count) {
        (Some(selection), count) => {
            let clause = select_clause(shared, selection, count.as_deref())?;
            w.section("SELECT ");
            w.push_clause(&clause)?;
        }
        (None, Some(count)) => {
            w.section("SELECT ").push(&format!("COUNT({count})"));
        }
        (None, None) => {}
    }

    if let Some(condition) = &clauses.filter {
        push_condition(shared, &mut w, condition)?;
    }
    if let Some(offset) = clauses.offset {
        w.section(&format!("OFFSET {offset}"));
    }
    if let Some(limit) = clauses.limit {
        w.section(&format!("LIMIT {limit}"));
    }
    w.push(";");
    Ok(w.finish())
}
