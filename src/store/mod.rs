//! Sorted-score store abstraction
//!
//! The store ranks members by floating scores. Both the similarity rankings and the
//! recommendation rankings are written by external scorers; this layer only reads,
//! trims and tears them down.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::{error::RecResult, keys::SetShape};

pub mod memory;
pub mod redis;

pub use self::memory::MemoryScoreStore;
pub use self::redis::RedisScoreStore;

/// A member of a ranked set, with its score when requested
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMember {
    pub id: String,
    pub score: Option<f64>,
}

/// One queued operation of a [`Batch`]
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    /// Remove `member` from the set at `key`; no-op if absent
    RemoveMember {
        key: String,
        shape: SetShape,
        member: String,
    },
    /// Delete whole keys; missing keys are ignored
    DeleteKeys(Vec<String>),
}

/// Operations submitted together in one round trip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    ops: Vec<BatchOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_member(&mut self, key: impl Into<String>, shape: SetShape, member: &str) -> &mut Self {
        self.ops.push(BatchOp::RemoveMember {
            key: key.into(),
            shape,
            member: member.to_string(),
        });
        self
    }

    pub fn delete_keys(&mut self, keys: Vec<String>) -> &mut Self {
        if !keys.is_empty() {
            self.ops.push(BatchOp::DeleteKeys(keys));
        }
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Remote sorted-set key/value store
///
/// Implementations surface every connectivity or protocol failure as
/// [`RecError::Store`](crate::error::RecError::Store) and never return partial results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// All members of `key`, highest score first; empty if the key is absent
    async fn range_descending(&self, key: &str, with_scores: bool) -> RecResult<Vec<RankedMember>>;

    /// Number of members in the set at `key`, 0 if absent
    async fn cardinality(&self, key: &str, shape: SetShape) -> RecResult<u64>;

    /// Every key matching a glob `pattern`
    async fn keys_matching(&self, pattern: &str) -> RecResult<BTreeSet<String>>;

    /// Removes `member` from the set at `key`; no-op if absent
    async fn remove_member(&self, key: &str, shape: SetShape, member: &str) -> RecResult<()>;

    /// Submits every queued operation in a single round trip
    async fn execute_batch(&self, batch: Batch) -> RecResult<()>;
}
