use mineconnect_trips::config::AppConfig;
use mineconnect_trips::{db, kafka};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting MineConnect Trips Service...");

    // Init DB
    let pool = db::init_pool(&config.database_url).await?;
    info!("Connected to database");

    // Start consuming driver telemetry
    kafka::start_telemetry_consumer(&config, pool).await?;

    Ok(())
}
