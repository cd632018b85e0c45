use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::instrument;

use crate::{
    entity::{ClassRegistry, EntityKind},
    error::RecResult,
    keys::{ClassSet, KeySchema, Owner, SetShape},
    store::{Batch, ScoreStore},
};

/// Keys touched by a rater teardown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownPlan {
    /// Other raters' similarity sets that may hold the rater as a member
    pub similarity_keys: BTreeSet<String>,
    /// Liked-by/disliked-by sets that may hold the rater as a member
    pub rated_by_keys: BTreeSet<String>,
    /// Sets the rater owns, deleted outright
    pub owned_keys: Vec<String>,
}

impl TeardownPlan {
    /// Queues member removal for every fan-out key and deletion of every owned key
    pub fn into_batch(self, rater_id: &str) -> Batch {
        let mut batch = Batch::new();
        for key in self.similarity_keys {
            batch.remove_member(key, SetShape::Ranked, rater_id);
        }
        for key in self.rated_by_keys {
            batch.remove_member(key, SetShape::Plain, rater_id);
        }
        batch.delete_keys(self.owned_keys);
        batch
    }
}

/// Outcome of [`ConsistencyMaintainer::remove_from_recommendable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownSummary {
    pub fan_out_keys: usize,
    pub owned_keys: usize,
}

/// Write side: retracting recommendations and tearing down deleted raters
pub struct ConsistencyMaintainer {
    store: Arc<dyn ScoreStore>,
    keys: KeySchema,
    classes: ClassRegistry,
}

impl ConsistencyMaintainer {
    pub fn new(store: Arc<dyn ScoreStore>, keys: KeySchema, classes: ClassRegistry) -> Self {
        Self {
            store,
            keys,
            classes,
        }
    }

    /// Drops `item_id` from the rater's recommendations for `class`
    ///
    /// Succeeds whether or not the item was recommended.
    #[instrument(skip(self, class), fields(class = %class))]
    pub async fn unrecommend(
        &self,
        rater_id: &str,
        class: &EntityKind,
        item_id: &str,
    ) -> RecResult<()> {
        let key = self.keys.recommended_set(class, rater_id);
        self.store.remove_member(&key, SetShape::Ranked, item_id).await
    }

    /// Every set `rater_id` owns: its similarity set and its per-class sets
    pub fn owned_keys(&self, rater_id: &str) -> Vec<String> {
        let mut keys = vec![self.keys.similarity_set(rater_id)];
        for class in self.classes.iter() {
            for kind in ClassSet::OWNED_BY_RATER {
                keys.push(self.keys.class_key(kind, class, Owner::Id(rater_id)));
            }
        }
        keys
    }

    /// Enumerates the keys a teardown of `rater_id` must touch
    pub async fn plan_teardown(&self, rater_id: &str) -> RecResult<TeardownPlan> {
        let own_similarity = self.keys.similarity_set(rater_id);
        let mut similarity_keys = self
            .store
            .keys_matching(&self.keys.similarity_pattern())
            .await?;
        similarity_keys.remove(&own_similarity);

        let mut rated_by_keys = BTreeSet::new();
        for class in self.classes.iter() {
            rated_by_keys.extend(
                self.store
                    .keys_matching(&self.keys.liked_by_pattern(class))
                    .await?,
            );
            rated_by_keys.extend(
                self.store
                    .keys_matching(&self.keys.disliked_by_pattern(class))
                    .await?,
            );
        }

        Ok(TeardownPlan {
            similarity_keys,
            rated_by_keys,
            owned_keys: self.owned_keys(rater_id),
        })
    }

    /// Removes every trace of a deleted rater in one batch
    ///
    /// The rater is removed as a member from every other rater's similarity set
    /// and every liked-by/disliked-by set, and its own sets are deleted. Running it
    /// again is a no-op. A store error leaves the batch unapplied or fully applied
    /// and is returned for the caller to retry.
    #[instrument(skip(self))]
    pub async fn remove_from_recommendable(&self, rater_id: &str) -> RecResult<TeardownSummary> {
        let plan = self.plan_teardown(rater_id).await?;
        let summary = TeardownSummary {
            fan_out_keys: plan.similarity_keys.len() + plan.rated_by_keys.len(),
            owned_keys: plan.owned_keys.len(),
        };

        self.store.execute_batch(plan.into_batch(rater_id)).await?;

        tracing::info!(
            fan_out_keys = summary.fan_out_keys,
            owned_keys = summary.owned_keys,
            "Removed rater from recommendable"
        );
        Ok(summary)
    }
}
