/// Errors surfaced by the recommendation layer
#[derive(thiserror::Error, Debug)]
pub enum RecError {
    #[error("Score store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("Record store error: {0}")]
    Record(#[from] sqlx::Error),

    #[error("Unknown ratable class: {0}")]
    UnknownClass(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RecError {
    /// True when the failure came from the score store connection or protocol.
    ///
    /// Nothing here retries; a caller that wants to retry a teardown checks this.
    pub fn is_store_error(&self) -> bool {
        matches!(self, RecError::Store(_))
    }
}

pub type RecResult<T> = Result<T, RecError>;
