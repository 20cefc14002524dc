use crate::config::AppConfig;
use crate::db::DbPool;
use crate::processor::ping_processor;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Runs the telemetry consumer loop: SASL/SCRAM Kafka consumer, one spawned
/// task per message, and a consecutive-failure circuit breaker so a broker
/// outage backs off instead of spinning.
pub async fn start_telemetry_consumer(config: &AppConfig, pool: DbPool) -> anyhow::Result<()> {
    info!("Initializing Kafka consumer for topic: {}", config.kafka_topic);

    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.kafka_bootstrap_servers)
        .set("group.id", &config.kafka_group_id)
        .set("auto.offset.reset", &config.kafka_auto_offset_reset)
        // SASL Configuration
        .set("security.protocol", &config.kafka_security_protocol)
        .set("sasl.mechanism", &config.kafka_sasl_mechanism)
        .set("sasl.username", &config.kafka_username)
        .set("sasl.password", &config.kafka_password);

    let consumer: StreamConsumer = client_config.create()?;

    consumer.subscribe(&[&config.kafka_topic])?;
    info!("Subscribed to topic: {}", config.kafka_topic);

    let pool = Arc::new(pool);
    let summary_cfg = Arc::new(config.summary.clone());
    let mut consecutive_failures = 0;
    let max_retries = config.kafka_max_retries;
    let cooldown_duration = Duration::from_secs(config.kafka_circuit_breaker_cooldown);

    loop {
        if consecutive_failures >= max_retries {
            warn!(
                "Circuit breaker tripped ({} consecutive failures)! Sleeping for {} seconds...",
                consecutive_failures, config.kafka_circuit_breaker_cooldown
            );
            tokio::time::sleep(cooldown_duration).await;
            consecutive_failures = 0;
            info!("Circuit breaker reset. Resuming consumption.");
        }

        match consumer.recv().await {
            Ok(m) => {
                consecutive_failures = 0;

                let payload = match m.payload() {
                    None => {
                        warn!("Received empty payload from Kafka");
                        continue;
                    }
                    Some(p) => p,
                };

                let pool_clone = pool.clone();
                let cfg_clone = summary_cfg.clone();
                let payload_vec = payload.to_vec();

                // Process off the consumer loop so a slow transaction never
                // stalls ingestion.
                tokio::spawn(async move {
                    if let Err(e) =
                        ping_processor::process_message(&pool_clone, &cfg_clone, &payload_vec).await
                    {
                        error!("Error processing message: {}", e);
                    }
                });
            }
            Err(e) => {
                consecutive_failures += 1;
                error!(
                    "Kafka error: {}. Incrementing failure count ({} / {})",
                    e, consecutive_failures, max_retries
                );

                // Small delay to prevent a tight loop on transient network glitches
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }
}
