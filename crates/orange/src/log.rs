//! `tracing` output for executed statements.

use crate::config::Config;
use tracing::Level;

/// The kind of statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Ddl,
    Raw,
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Emit one event on target `orange.sql` before a statement runs.
pub(crate) fn statement(config: &Config, kind: StatementKind, sql: &str, param_count: usize) {
    /// Dispatch a tracing event at a runtime-determined level.
    macro_rules! emit_at_level {
        ($level:expr, $($field:tt)*) => {
            match $level {
                Level::ERROR => tracing::error!($($field)*),
                Level::WARN  => tracing::warn!($($field)*),
                Level::INFO  => tracing::info!($($field)*),
                Level::DEBUG => tracing::debug!($($field)*),
                Level::TRACE => tracing::trace!($($field)*),
            }
        };
    }

    let sql = match config.max_sql_length {
        Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
        _ => sql.to_string(),
    };
    emit_at_level!(
        config.log_level,
        target: "orange.sql",
        kind = ?kind,
        dialect = %config.dialect,
        param_count,
        sql = %sql,
        "executing statement"
    );
}
