use super::Adopter;
use crate::error::{OrmError, OrmResult};
use crate::schema::{Field, Table};
use crate::value::Kind;

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Adopter for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn create_ddl(&self, table: &Table) -> OrmResult<String> {
        let columns = table
            .fields
            .iter()
            .map(|f| self.column_ddl(f))
            .collect::<OrmResult<Vec<_>>>()?;
        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            table.name,
            columns.join(",")
        ))
    }

    fn drop_ddl(&self, table: &Table) -> OrmResult<String> {
        Ok(format!("DROP TABLE IF EXISTS {};", table.name))
    }

    fn column_ddl(&self, field: &Field) -> OrmResult<String> {
        let sql_type = match field.kind {
            Kind::Text => "text",
            Kind::Bool => "boolean",
            Kind::Integer if field.is_id() => "serial",
            Kind::Integer => "integer",
            Kind::BigInt if field.is_id() => "bigserial",
            Kind::BigInt => "bigint",
            Kind::Timestamp => "timestamp with time zone",
            Kind::Unsupported => {
                return Err(OrmError::unsupported_type(&field.name, &field.type_name));
            }
        };
        Ok(format!("{} {}", field.column_name, sql_type))
    }

    fn placeholder(&self, position: usize) -> String {
        format!("${position}")
    }

    fn supports_prepared_statements(&self) -> bool {
        true
    }

    fn current_database_sql(&self) -> &'static str {
        "SELECT current_database();"
    }
}
