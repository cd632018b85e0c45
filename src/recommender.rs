use std::sync::Arc;

use tracing::instrument;

use crate::{
    activity::RatingActivity,
    entity::{ClassRegistry, EntityKind, Page},
    error::RecResult,
    keys::{KeySchema, SetShape},
    records::{Record, RecordGateway},
    store::ScoreStore,
};

/// Read side: similar raters and recommended items, in score-rank order
///
/// Whole ranked sets are read from the score store and the page is taken after
/// materialization, so the ranking survives offset/limit.
#[derive(Clone)]
pub struct Recommender {
    store: Arc<dyn ScoreStore>,
    records: RecordGateway,
    activity: Arc<dyn RatingActivity>,
    keys: KeySchema,
    raters: EntityKind,
    classes: ClassRegistry,
}

impl Recommender {
    pub fn new(
        store: Arc<dyn ScoreStore>,
        records: RecordGateway,
        activity: Arc<dyn RatingActivity>,
        keys: KeySchema,
        raters: EntityKind,
        classes: ClassRegistry,
    ) -> Self {
        Self {
            store,
            records,
            activity,
            keys,
            raters,
            classes,
        }
    }

    /// Raters most similar to `rater_id`, highest similarity first
    #[instrument(skip(self))]
    pub async fn similar_raters(&self, rater_id: &str, page: Page) -> RecResult<Vec<Record>> {
        let key = self.keys.similarity_set(rater_id);
        let ids: Vec<String> = self
            .store
            .range_descending(&key, false)
            .await?
            .into_iter()
            .map(|member| member.id)
            .filter(|id| id != rater_id)
            .collect();

        self.records.fetch(&self.raters, &ids, page).await
    }

    /// Items of `class` recommended to `rater_id`, strongest first
    ///
    /// Only strictly positive scores count; zero and negative entries stay in the
    /// store but are never returned.
    #[instrument(skip(self, class), fields(class = %class))]
    pub async fn recommended_for(
        &self,
        rater_id: &str,
        class: &EntityKind,
        page: Page,
    ) -> RecResult<Vec<Record>> {
        let key = self.keys.recommended_set(class, rater_id);

        if !self.activity.has_rated_anything(rater_id).await? {
            tracing::debug!("Rater has not rated anything, no recommendations");
            return Ok(Vec::new());
        }
        if self.store.cardinality(&key, SetShape::Ranked).await? == 0 {
            tracing::debug!(key = %key, "Recommendation set is empty");
            return Ok(Vec::new());
        }

        let ids: Vec<String> = self
            .store
            .range_descending(&key, true)
            .await?
            .into_iter()
            .filter(|member| member.score.is_some_and(|score| score > 0.0))
            .map(|member| member.id)
            .collect();

        self.records.fetch(class, &ids, page).await
    }

    /// Same as [`recommended_for`](Self::recommended_for), resolving the class by name
    pub async fn recommended_for_class(
        &self,
        rater_id: &str,
        class_name: &str,
        page: Page,
    ) -> RecResult<Vec<Record>> {
        let class = self.classes.get(class_name)?.clone();
        self.recommended_for(rater_id, &class, page).await
    }
}
