use anyhow::Context;
use redis::aio::ConnectionManager;
use redis::Client;

/// Opens a Redis connection manager for the score store
///
/// The manager reconnects on its own and is cheap to clone, so one instance can be
/// shared by every component.
pub async fn create_redis_manager(redis_url: &str) -> anyhow::Result<ConnectionManager> {
    let client = Client::open(redis_url).context("failed to parse REDIS_URL")?;
    let manager = ConnectionManager::new(client)
        .await
        .context("failed to initialize Redis connection manager")?;
    Ok(manager)
}
