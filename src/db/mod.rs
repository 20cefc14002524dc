use anyhow::Result;
use futures::TryStreamExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::trip_pings::TripPing;

pub mod queries;

pub type DbPool = Pool<Postgres>;

pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(50)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Streams a trip's pings out of the store, ordered by capture time.
pub async fn load_trip_pings(pool: &DbPool, trip_id: Uuid) -> Result<Vec<TripPing>> {
    let mut rows = sqlx::query_as::<_, TripPing>(queries::SELECT_TRIP_PINGS)
        .bind(trip_id)
        .fetch(pool);

    let mut pings = Vec::new();
    while let Some(ping) = rows.try_next().await? {
        pings.push(ping);
    }
    Ok(pings)
}
