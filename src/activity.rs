use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    entity::ClassRegistry,
    error::RecResult,
    keys::{KeySchema, SetShape},
    store::ScoreStore,
};

/// Whether a rater has recorded any rating yet
///
/// Recommendations are only served to raters who have rated something.
#[async_trait]
pub trait RatingActivity: Send + Sync {
    async fn has_rated_anything(&self, rater_id: &str) -> RecResult<bool>;
}

/// Reads the rater's liked and disliked sets across every ratable class
pub struct StoredRatingActivity {
    store: Arc<dyn ScoreStore>,
    keys: KeySchema,
    classes: ClassRegistry,
}

impl StoredRatingActivity {
    pub fn new(store: Arc<dyn ScoreStore>, keys: KeySchema, classes: ClassRegistry) -> Self {
        Self {
            store,
            keys,
            classes,
        }
    }
}

#[async_trait]
impl RatingActivity for StoredRatingActivity {
    #[instrument(skip(self))]
    async fn has_rated_anything(&self, rater_id: &str) -> RecResult<bool> {
        for class in self.classes.iter() {
            let liked = self.keys.liked_set(class, rater_id);
            if self.store.cardinality(&liked, SetShape::Plain).await? > 0 {
                return Ok(true);
            }
            let disliked = self.keys.disliked_set(class, rater_id);
            if self.store.cardinality(&disliked, SetShape::Plain).await? > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
