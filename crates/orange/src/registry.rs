//! Name-keyed store of loaded tables.

use crate::schema::Table;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of tables keyed by record type name.
///
/// Registration takes the write lock, lookups the read lock. Both only guard the map
/// access, so the registry can be shared freely across threads and sessions.
#[derive(Debug, Default)]
pub struct Registry {
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `table` under `type_name`, replacing any earlier registration.
    pub fn register(&self, type_name: impl Into<String>, table: Table) -> Arc<Table> {
        let table = Arc::new(table);
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_name.into(), Arc::clone(&table));
        table
    }

    pub fn lookup(&self, type_name: &str) -> Option<Arc<Table>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
            .cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(type_name)
    }

    /// Snapshot of all registrations, ordered by type name.
    pub fn tables(&self) -> Vec<(String, Arc<Table>)> {
        let mut out: Vec<_> = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, table)| (name.clone(), Arc::clone(table)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn len(&self) -> usize {
        self.tables.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
