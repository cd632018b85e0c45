use std::sync::Arc;

use crate::{
    activity::StoredRatingActivity,
    config::Config,
    db::{create_pool, create_redis_manager},
    entity::{ClassRegistry, EntityKind},
    keys::KeySchema,
    maintainer::ConsistencyMaintainer,
    records::{PgRecordStore, RecordGateway, RecordStore},
    recommender::Recommender,
    store::{RedisScoreStore, ScoreStore},
};

/// Read and write sides wired to one shared score store
pub struct Recommendable {
    pub recommender: Recommender,
    pub maintainer: ConsistencyMaintainer,
}

impl Recommendable {
    /// Wires both sides around stores the host already owns
    ///
    /// Whether a rater has rated anything is read from its liked and disliked sets.
    pub fn new(
        store: Arc<dyn ScoreStore>,
        records: Arc<dyn RecordStore>,
        keys: KeySchema,
        raters: EntityKind,
        classes: ClassRegistry,
    ) -> Self {
        let activity = Arc::new(StoredRatingActivity::new(
            store.clone(),
            keys.clone(),
            classes.clone(),
        ));
        let recommender = Recommender::new(
            store.clone(),
            RecordGateway::new(records),
            activity,
            keys.clone(),
            raters,
            classes.clone(),
        );
        let maintainer = ConsistencyMaintainer::new(store, keys, classes);

        Self {
            recommender,
            maintainer,
        }
    }

    /// Connects to Redis and PostgreSQL as configured and wires both sides
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let keys = config.key_schema()?;
        let raters = config.rater_kind()?;
        let classes = config.ratable_classes()?;

        let manager = create_redis_manager(&config.redis_url).await?;
        let pool = create_pool(&config.database_url, config.database_max_connections).await?;

        tracing::info!(
            classes = classes.len(),
            namespace = %config.redis_namespace,
            "Connected recommendation stores"
        );

        Ok(Self::new(
            Arc::new(RedisScoreStore::new(manager)),
            Arc::new(PgRecordStore::new(pool)),
            keys,
            raters,
            classes,
        ))
    }
}
