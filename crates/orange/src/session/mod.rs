//! The chainable session.
//!
//! A root [`Session`] owns the shared pieces (registry, adopter, configuration). Chain
//! methods never mutate: each returns a new session carrying its own clause set, so any
//! session can serve as the base of several queries without them seeing each other's
//! clauses.
//!
//! ```ignore
//! let (db, client) = orange::open("postgres", &url).await?;
//! db.register::<Golangster>()?;
//! db.automigrate(&client).await?;
//!
//! db.create(&client, &Golangster { name: "hello".into(), ..Default::default() }).await?;
//!
//! let mut total = 0i64;
//! db.select::<Golangster>().count("*").bind_scalar(&client, &mut total).await?;
//!
//! let mut found = Golangster::default();
//! db.find_by(&client, &mut found, &Golangster { name: "hello".into(), ..Default::default() })
//!     .await?;
//! ```

use crate::adopter::{self, Adopter};
use crate::bind::{ScanTarget, check_target, scan_record};
use crate::clause::{Clause, Clauses, Condition, Selection};
use crate::client::GenericClient;
use crate::config::Config;
use crate::error::{OrmError, OrmResult};
use crate::log::{self, StatementKind};
use crate::record::{Record, RecordInfo};
use crate::registry::Registry;
use crate::render::{self, BuiltQuery};
use crate::schema::{Table, load_table};
use crate::value::Value;
use crate::write;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// State shared by a root session and every session derived from it.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) registry: Registry,
    pub(crate) adopter: Arc<dyn Adopter>,
    pub(crate) config: Config,
}

impl Shared {
    fn load(&self, info: &RecordInfo) -> OrmResult<Table> {
        match &self.config.load_fn {
            Some(load_fn) => load_fn(info),
            None => load_table(info),
        }
    }

    /// Registered table for `info`, or a freshly loaded one when the type is unknown.
    pub(crate) fn table_for(&self, info: &RecordInfo) -> OrmResult<Arc<Table>> {
        match self.registry.lookup(info.type_name) {
            Some(table) => Ok(table),
            None => self.load(info).map(Arc::new),
        }
    }
}

/// Chainable query handle.
#[derive(Debug, Clone)]
#[must_use]
pub struct Session {
    shared: Arc<Shared>,
    clauses: Clauses,
}

impl Session {
    /// Create a root session for the dialect named in `config`.
    pub fn new(config: Config) -> OrmResult<Self> {
        let adopter = adopter::by_name(&config.dialect)?;
        Ok(Self::with_adopter(adopter, config))
    }

    /// Create a root session with an explicit adopter.
    pub fn with_adopter(adopter: Arc<dyn Adopter>, config: Config) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: Registry::new(),
                adopter,
                config,
            }),
            clauses: Clauses::default(),
        }
    }

    pub fn adopter(&self) -> &dyn Adopter {
        self.shared.adopter.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn registry(&self) -> &Registry {
        &self.shared.registry
    }

    /// Clauses accumulated on this session.
    pub fn clauses(&self) -> &Clauses {
        &self.clauses
    }

    // ==================== Registration ====================

    /// Load the table for `M` and register it under `M::TYPE_NAME`.
    ///
    /// Registering the same type again replaces the earlier table.
    pub fn register<M: Record>(&self) -> OrmResult<Arc<Table>> {
        self.register_info(&M::info())
    }

    pub fn register_info(&self, info: &RecordInfo) -> OrmResult<Arc<Table>> {
        let table = self.shared.load(info)?;
        Ok(self.shared.registry.register(info.type_name, table))
    }

    /// The registered table for `M`.
    pub fn table<M: Record>(&self) -> Option<Arc<Table>> {
        self.shared.registry.lookup(M::TYPE_NAME)
    }

    // ==================== Chain ====================

    fn derive(&self, update: impl FnOnce(&mut Clauses)) -> Self {
        let mut clauses = self.clauses.clone();
        update(&mut clauses);
        Self {
            shared: Arc::clone(&self.shared),
            clauses,
        }
    }

    /// A session sharing registry and adopter, with no clauses.
    pub fn fresh(&self) -> Self {
        self.derive(|c| *c = Clauses::default())
    }

    /// `SELECT * FROM <table of M>`. `M` must be registered by the time the query
    /// is built.
    pub fn select<M: Record>(&self) -> Self {
        self.derive(|c| {
            c.select = Some(Selection::Table {
                type_name: M::TYPE_NAME,
            })
        })
    }

    /// Literal select condition, e.g. `select_sql("name FROM golangster", [])`.
    pub fn select_sql(&self, condition: &str, args: impl IntoIterator<Item = Value>) -> Self {
        let clause = Clause::new(condition, args);
        self.derive(|c| c.select = Some(Selection::Sql(clause)))
    }

    /// Set the WHERE clause, replacing any previous one.
    ///
    /// Accepts a [`Condition`] or a record reference; a record yields equalities on
    /// its non-zero fields.
    pub fn filter(&self, condition: impl Into<Condition>) -> Self {
        let condition = condition.into();
        self.derive(|c| c.filter = Some(condition))
    }

    /// Literal WHERE condition with `?` argument markers.
    pub fn filter_sql(&self, condition: &str, args: impl IntoIterator<Item = Value>) -> Self {
        self.filter(Condition::sql(condition, args))
    }

    pub fn limit(&self, limit: i64) -> Self {
        self.derive(|c| c.limit = Some(limit))
    }

    pub fn offset(&self, offset: i64) -> Self {
        self.derive(|c| c.offset = Some(offset))
    }

    /// Count `column` instead of selecting rows: `SELECT COUNT(column) FROM ...`.
    pub fn count(&self, column: &str) -> Self {
        let column = column.to_string();
        self.derive(|c| c.count = Some(column))
    }

    /// Render the accumulated clauses.
    pub fn build_query(&self) -> OrmResult<BuiltQuery> {
        render::build_query(&self.shared, &self.clauses)
    }

    // ==================== Execution ====================

    async fn fetch_row(&self, conn: &impl GenericClient, query: &BuiltQuery) -> OrmResult<Row> {
        log::statement(
            &self.shared.config,
            StatementKind::Select,
            &query.sql,
            query.params.len(),
        );
        conn.query_opt(&query.sql, &query.params_ref())
            .await?
            .ok_or_else(|| OrmError::scan("query returned no rows"))
    }

    async fn run(
        &self,
        conn: &impl GenericClient,
        kind: StatementKind,
        query: &BuiltQuery,
    ) -> OrmResult<u64> {
        log::statement(&self.shared.config, kind, &query.sql, query.params.len());
        conn.execute(&query.sql, &query.params_ref()).await
    }

    /// Run the composed query and write its first row into `dest` (struct mode).
    pub async fn bind<M: Record>(&self, conn: &impl GenericClient, dest: &mut M) -> OrmResult<()> {
        let table = self.shared.table_for(&M::info())?;
        check_target::<M>(&table)?;
        let query = self.build_query()?;
        let row = self.fetch_row(conn, &query).await?;
        scan_record(&row, &table, dest)
    }

    /// Run the composed query and decode the leading columns of its first row into
    /// `dest` (scalar mode). Use a tuple for several destinations.
    pub async fn bind_scalar<S: ScanTarget>(
        &self,
        conn: &impl GenericClient,
        dest: &mut S,
    ) -> OrmResult<()> {
        let query = self.build_query()?;
        let row = self.fetch_row(conn, &query).await?;
        dest.scan(&row)
    }

    /// Select from `dest`'s table and bind the first row.
    pub async fn find<M: Record>(&self, conn: &impl GenericClient, dest: &mut M) -> OrmResult<()> {
        self.select::<M>().bind(conn, dest).await
    }

    /// Like [`find`](Self::find), with `condition` as the WHERE clause.
    pub async fn find_by<M: Record>(
        &self,
        conn: &impl GenericClient,
        dest: &mut M,
        condition: impl Into<Condition>,
    ) -> OrmResult<()> {
        self.select::<M>().filter(condition).bind(conn, dest).await
    }

    /// Insert `record`'s non-zero fields. Returns the affected row count.
    pub async fn create<M: Record>(&self, conn: &impl GenericClient, record: &M) -> OrmResult<u64> {
        let query = self.create_query(record)?;
        self.run(conn, StatementKind::Insert, &query).await
    }

    /// The INSERT statement [`create`](Self::create) would run.
    pub fn create_query<M: Record>(&self, record: &M) -> OrmResult<BuiltQuery> {
        let table = self.shared.table_for(&M::info())?;
        Ok(write::insert_statement(self.adopter(), &table, record))
    }

    /// Update `record` by its id column. Returns the affected row count.
    pub async fn update<M: Record>(&self, conn: &impl GenericClient, record: &M) -> OrmResult<u64> {
        let query = self.update_query(record)?;
        self.run(conn, StatementKind::Update, &query).await
    }

    /// The UPDATE statement [`update`](Self::update) would run.
    pub fn update_query<M: Record>(&self, record: &M) -> OrmResult<BuiltQuery> {
        let table = self.shared.table_for(&M::info())?;
        write::update_statement(self.adopter(), &table, record)
    }

    // ==================== Schema ====================

    /// Create every registered table that does not exist yet.
    ///
    /// All statements are rendered before the first one runs, so a table the dialect
    /// cannot express fails the call with nothing executed. Execution stops at the
    /// first failing statement; tables created before it stay created.
    pub async fn automigrate(&self, conn: &impl GenericClient) -> OrmResult<()> {
        let statements = self
            .shared
            .registry
            .tables()
            .iter()
            .map(|(_, table)| self.adopter().create_ddl(table))
            .collect::<OrmResult<Vec<_>>>()?;
        for sql in &statements {
            self.execute_ddl(conn, sql).await?;
        }
        Ok(())
    }

    /// Drop the table registered for `M`.
    pub async fn drop_table<M: Record>(&self, conn: &impl GenericClient) -> OrmResult<()> {
        let table = self
            .table::<M>()
            .ok_or_else(|| OrmError::UnregisteredTable(M::TYPE_NAME.to_string()))?;
        let sql = self.adopter().drop_ddl(&table)?;
        self.execute_ddl(conn, &sql).await
    }

    async fn execute_ddl(&self, conn: &impl GenericClient, sql: &str) -> OrmResult<()> {
        log::statement(&self.shared.config, StatementKind::Ddl, sql, 0);
        conn.execute(sql, &[]).await?;
        Ok(())
    }

    /// Name of the database the connection is using.
    pub async fn current_database(&self, conn: &impl GenericClient) -> OrmResult<String> {
        let sql = self.adopter().current_database_sql();
        log::statement(&self.shared.config, StatementKind::Raw, sql, 0);
        let row = conn
            .query_opt(sql, &[])
            .await?
            .ok_or_else(|| OrmError::scan("current database query returned no rows"))?;
        let mut name = String::new();
        name.scan(&row)?;
        Ok(name)
    }

    // ==================== Raw passthrough ====================

    /// Run a raw query; no clause processing happens.
    pub async fn query(
        &self,
        conn: &impl GenericClient,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> OrmResult<Vec<Row>> {
        log::statement(&self.shared.config, StatementKind::Raw, sql, params.len());
        conn.query(sql, params).await
    }

    /// Execute a raw statement; no clause processing happens.
    pub async fn execute(
        &self,
        conn: &impl GenericClient,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> OrmResult<u64> {
        log::statement(&self.shared.config, StatementKind::Raw, sql, params.len());
        conn.execute(sql, params).await
    }
}

/// Open a connection for `dialect` and create its root session.
pub async fn open(
    dialect: &str,
    database_url: &str,
) -> OrmResult<(Session, tokio_postgres::Client)> {
    open_with(Config::new().dialect(dialect).database_url(database_url)).await
}

/// Open a connection as described by `config`.
///
/// The dialect is checked before any connection attempt. The connection task is
/// spawned on the current tokio runtime.
pub async fn open_with(config: Config) -> OrmResult<(Session, tokio_postgres::Client)> {
    let session = Session::new(config)?;
    let url = session
        .config()
        .database_url
        .clone()
        .ok_or_else(|| OrmError::Connection("no database url configured".to_string()))?;

    let (client, connection) = tokio_postgres::connect(&url, tokio_postgres::NoTls)
        .await
        .map_err(|e| OrmError::Connection(e.to_string()))?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::warn!(target: "orange", error = %e, "connection closed with error");
        }
    });
    Ok((session, client))
}

#[cfg(all(test, feature = "derive"))]
mod tests;
