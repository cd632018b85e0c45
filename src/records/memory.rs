use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Record, RecordStore};
use crate::{entity::EntityKind, error::RecResult};

/// In-process record store keyed by table
///
/// Rows come back in hash order, never in the requested order, like a real
/// database without an ORDER BY.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    tables: Arc<RwLock<HashMap<String, HashMap<String, Record>>>>,
    queries: Arc<AtomicUsize>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, kind: &EntityKind, record: Record) {
        let mut tables = self.tables.write().await;
        tables
            .entry(kind.table.clone())
            .or_default()
            .insert(record.id.clone(), record);
    }

    pub async fn remove(&self, kind: &EntityKind, id: &str) -> Option<Record> {
        let mut tables = self.tables.write().await;
        tables.get_mut(&kind.table).and_then(|rows| rows.remove(id))
    }

    /// Number of lookups served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_by_ids(&self, kind: &EntityKind, ids: &[String]) -> RecResult<Vec<Record>> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let tables = self.tables.read().await;
        let Some(rows) = tables.get(&kind.table) else {
            return Ok(Vec::new());
        };

        Ok(rows
            .values()
            .filter(|row| ids.contains(&row.id))
            .cloned()
            .collect())
    }
}
