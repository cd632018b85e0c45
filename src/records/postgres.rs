use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use super::{Record, RecordStore};
use crate::{entity::EntityKind, error::RecResult};

/// Record store over a PostgreSQL pool
///
/// Each row comes back as its id (cast to text) and the whole row as JSON, so any
/// table can be materialized without a per-kind struct.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Builds the lookup query; identifiers were validated when the kind was built
fn select_by_ids_sql(kind: &EntityKind) -> String {
    let table = kind
        .table
        .split('.')
        .map(|part| format!("\"{}\"", part))
        .collect::<Vec<_>>()
        .join(".");

    format!(
        "SELECT t.\"{id}\"::text AS id, to_jsonb(t) AS data FROM {table} AS t WHERE t.\"{id}\"::text = ANY($1)",
        id = kind.id_column,
        table = table,
    )
}

#[async_trait]
impl RecordStore for PgRecordStore {
    #[instrument(skip(self, kind, ids), fields(kind = %kind, ids = ids.len()))]
    async fn fetch_by_ids(&self, kind: &EntityKind, ids: &[String]) -> RecResult<Vec<Record>> {
        let sql = select_by_ids_sql(kind);
        let rows = sqlx::query_as::<_, (String, serde_json::Value)>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, data)| Record { id, data })
            .collect())
    }
}
