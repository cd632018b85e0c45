//! Materialization of ranked ids into records
//!
//! The record store returns rows in its own order. [`RecordGateway`] fetches by id
//! set and restores the ranking the caller handed in, before paginating.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    entity::{EntityKind, Page},
    error::RecResult,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// A row of the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub data: serde_json::Value,
}

/// Canonical storage for rater and item rows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows of `kind` whose id is in `ids`, in any order; unknown ids are skipped
    async fn fetch_by_ids(&self, kind: &EntityKind, ids: &[String]) -> RecResult<Vec<Record>>;
}

/// Fetches records in exactly the order of a given id list
#[derive(Clone)]
pub struct RecordGateway {
    store: Arc<dyn RecordStore>,
}

impl RecordGateway {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Materializes `ordered_ids`, then applies `page` to the ordered result
    ///
    /// Ids missing from the store are dropped before the page is taken, so the
    /// window always counts existing records. An empty id list never reaches the store.
    #[instrument(skip(self, kind, ordered_ids), fields(kind = %kind, ids = ordered_ids.len()))]
    pub async fn fetch(
        &self,
        kind: &EntityKind,
        ordered_ids: &[String],
        page: Page,
    ) -> RecResult<Vec<Record>> {
        if ordered_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.store.fetch_by_ids(kind, ordered_ids).await?;
        Ok(page.apply(order_by_ids(ordered_ids, rows)))
    }
}

/// Reorders `rows` to follow `ordered_ids`; each id yields at most one row
pub fn order_by_ids(ordered_ids: &[String], rows: Vec<Record>) -> Vec<Record> {
    let mut by_id: HashMap<String, Record> =
        rows.into_iter().map(|row| (row.id.clone(), row)).collect();

    ordered_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecError;
    use serde_json::json;

    fn record(id: &str) -> Record {
        Record {
            id: id.to_string(),
            data: json!({ "id": id }),
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn movies() -> EntityKind {
        EntityKind::new("Movie", "movies").unwrap()
    }

    #[test]
    fn test_order_by_ids_restores_ranking() {
        let rows = vec![record("1"), record("3"), record("2")];
        let ordered = order_by_ids(&ids(&["3", "1", "2"]), rows);
        let got: Vec<&str> = ordered.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_order_by_ids_skips_missing_and_duplicates() {
        let rows = vec![record("1"), record("2")];
        let ordered = order_by_ids(&ids(&["9", "2", "2", "1"]), rows);
        let got: Vec<&str> = ordered.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["2", "1"]);
    }

    #[tokio::test]
    async fn test_empty_ids_never_query_the_store() {
        let mut store = MockRecordStore::new();
        store.expect_fetch_by_ids().times(0);

        let gateway = RecordGateway::new(Arc::new(store));
        let rows = gateway.fetch(&movies(), &[], Page::default()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_page_applies_after_reordering() {
        let mut store = MockRecordStore::new();
        store
            .expect_fetch_by_ids()
            .times(1)
            .returning(|_, _| Ok(vec![record("a"), record("b"), record("c"), record("d")]));

        let gateway = RecordGateway::new(Arc::new(store));
        let rows = gateway
            .fetch(&movies(), &ids(&["d", "missing", "c", "b", "a"]), Page::new(2, 1))
            .await
            .unwrap();
        let got: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_store_errors_surface() {
        let mut store = MockRecordStore::new();
        store
            .expect_fetch_by_ids()
            .returning(|_, _| Err(RecError::Record(sqlx::Error::PoolTimedOut)));

        let gateway = RecordGateway::new(Arc::new(store));
        let result = gateway.fetch(&movies(), &ids(&["1"]), Page::default()).await;
        assert!(matches!(result, Err(RecError::Record(_))));
    }
}
