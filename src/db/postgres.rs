use sqlx::{postgres::PgPoolOptions, PgPool};

/// Creates a PostgreSQL connection pool for the record store
///
/// The pool belongs to the host; the recommendation layer only borrows it through
/// [`PgRecordStore`](crate::records::PgRecordStore).
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}
