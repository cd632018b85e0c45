use std::collections::BTreeSet;

use async_trait::async_trait;
use redis::aio::{ConnectionLike, ConnectionManager};
use redis::AsyncCommands;
use tracing::instrument;

use super::{Batch, BatchOp, RankedMember, ScoreStore};
use crate::{error::RecResult, keys::SetShape};

/// Redis-backed score store
///
/// Wraps a connection manager owned by the host; cloning the manager shares the
/// underlying multiplexed connection, so this type never opens or closes it.
#[derive(Clone)]
pub struct RedisScoreStore {
    conn: ConnectionManager,
}

impl RedisScoreStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

/// Keys requested per SCAN page
const SCAN_COUNT: usize = 500;

/// Walks the keyspace with `SCAN MATCH` until the cursor returns to 0
///
/// Every page goes through `?`, so a failure partway through is an error rather
/// than a short key list. SCAN may repeat keys; the set dedupes them.
async fn scan_keys<C>(conn: &mut C, pattern: &str) -> RecResult<BTreeSet<String>>
where
    C: ConnectionLike + Send,
{
    let mut keys = BTreeSet::new();
    let mut cursor: u64 = 0;

    loop {
        let (next, page): (u64, Vec<String>) = redis::cmd("SCAN")
            .cursor_arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(SCAN_COUNT)
            .query_async(&mut *conn)
            .await?;

        keys.extend(page);
        if next == 0 {
            return Ok(keys);
        }
        cursor = next;
    }
}

#[async_trait]
impl ScoreStore for RedisScoreStore {
    #[instrument(skip(self))]
    async fn range_descending(&self, key: &str, with_scores: bool) -> RecResult<Vec<RankedMember>> {
        let mut conn = self.conn.clone();

        if with_scores {
            let members: Vec<(String, f64)> = conn.zrevrange_withscores(key, 0, -1).await?;
            Ok(members
                .into_iter()
                .map(|(id, score)| RankedMember {
                    id,
                    score: Some(score),
                })
                .collect())
        } else {
            let ids: Vec<String> = conn.zrevrange(key, 0, -1).await?;
            Ok(ids
                .into_iter()
                .map(|id| RankedMember { id, score: None })
                .collect())
        }
    }

    #[instrument(skip(self))]
    async fn cardinality(&self, key: &str, shape: SetShape) -> RecResult<u64> {
        let mut conn = self.conn.clone();
        let count: u64 = match shape {
            SetShape::Ranked => conn.zcard(key).await?,
            SetShape::Plain => conn.scard(key).await?,
        };
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn keys_matching(&self, pattern: &str) -> RecResult<BTreeSet<String>> {
        let mut conn = self.conn.clone();
        let keys = scan_keys(&mut conn, pattern).await?;

        tracing::debug!(pattern, matched = keys.len(), "Enumerated keys");
        Ok(keys)
    }

    #[instrument(skip(self))]
    async fn remove_member(&self, key: &str, shape: SetShape, member: &str) -> RecResult<()> {
        let mut conn = self.conn.clone();
        let _: i64 = match shape {
            SetShape::Ranked => conn.zrem(key, member).await?,
            SetShape::Plain => conn.srem(key, member).await?,
        };
        Ok(())
    }

    /// Sends the batch as one MULTI/EXEC pipeline
    #[instrument(skip(self, batch), fields(ops = batch.len()))]
    async fn execute_batch(&self, batch: Batch) -> RecResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();

        for op in batch.ops() {
            match op {
                BatchOp::RemoveMember {
                    key,
                    shape: SetShape::Ranked,
                    member,
                } => {
                    pipe.zrem(key, member).ignore();
                }
                BatchOp::RemoveMember {
                    key,
                    shape: SetShape::Plain,
                    member,
                } => {
                    pipe.srem(key, member).ignore();
                }
                BatchOp::DeleteKeys(keys) => {
                    pipe.del(keys).ignore();
                }
            }
        }

        let mut conn = self.conn.clone();
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }
}
