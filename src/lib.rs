//! Collaborative-filtering recommendation layer
//!
//! Serves ranked "similar raters" and "recommended items" out of a sorted-score
//! store, materialized against a separate record store in score-rank order, and
//! keeps the score store consistent when a rater is deleted.

pub mod activity;
pub mod config;
pub mod db;
pub mod engine;
pub mod entity;
pub mod error;
pub mod keys;
pub mod maintainer;
pub mod recommender;
pub mod records;
pub mod store;
pub mod telemetry;

pub use activity::{RatingActivity, StoredRatingActivity};
pub use config::Config;
pub use engine::Recommendable;
pub use entity::{ClassRegistry, EntityKind, Page};
pub use error::{RecError, RecResult};
pub use keys::KeySchema;
pub use maintainer::{ConsistencyMaintainer, TeardownSummary};
pub use recommender::Recommender;
pub use records::{Record, RecordGateway, RecordStore};
pub use store::ScoreStore;
