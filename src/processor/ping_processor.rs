use crate::db::queries;
use crate::geo_utils;
use crate::models::geofence::Geofence;
use crate::models::message::DriverMessage;
use crate::models::trip_pings::TripPing;
use crate::summary::{self, SummaryConfig};
use chrono::NaiveDateTime;
use sqlx::{Postgres, Row, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

/// Applies one driver telemetry message to the store.
///
/// Rules, all inside a single transaction with the trip row locked:
/// - TRIP_START creates the trip and seeds the live map state.
/// - PING appends to the ping store, refreshes live state and runs the
///   geofence entry check.
/// - TRIP_END closes the trip and derives its stats (max/avg speed, route
///   distance) and stop alerts from the stored pings.
/// - SOS raises a high-severity alert and flags the trip.
///
/// Pings never open or close trips; a ping for an unknown or closed trip is
/// logged and dropped.
pub async fn process_message(
    pool: &sqlx::Pool<Postgres>,
    summary_cfg: &SummaryConfig,
    payload: &[u8],
) -> anyhow::Result<()> {
    let message: DriverMessage = match serde_json::from_slice(payload) {
        Ok(m) => m,
        Err(e) => {
            warn!("Failed to parse message: {}", e);
            return Ok(());
        }
    };

    let driver_id = match message.get_driver_id() {
        Some(id) => id.clone(),
        None => {
            warn!("Message missing driver_id, skipping");
            return Ok(());
        }
    };

    let trip_id = match message.data.trip_id.as_deref().map(Uuid::parse_str) {
        Some(Ok(id)) => id,
        _ => {
            warn!("Message missing or invalid trip_id, skipping");
            return Ok(());
        }
    };

    let gps_datetime_str = message.data.gps_datetime.as_deref().unwrap_or("");
    let timestamp = match NaiveDateTime::parse_from_str(gps_datetime_str, "%Y-%m-%d %H:%M:%S") {
        Ok(t) => t,
        Err(_) => match NaiveDateTime::parse_from_str(gps_datetime_str, "%Y-%m-%dT%H:%M:%S") {
            Ok(t) => t,
            Err(_) => {
                warn!("Invalid GPS_DATETIME: '{}'", gps_datetime_str);
                return Ok(());
            }
        },
    };

    let lat = message.data.latitude.unwrap_or(0.0);
    let lng = message.data.longitude.unwrap_or(0.0);
    let speed = message.data.speed.unwrap_or(0.0);
    let battery = message.data.battery;
    let company_id = message
        .data
        .company_id
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok());
    let message_uuid = Uuid::parse_str(&message.uuid).unwrap_or_default();

    let event = message.data.event.as_deref().map(|s| s.to_uppercase());
    let is_trip_start = event.as_deref() == Some("TRIP_START");
    let is_trip_end = event.as_deref() == Some("TRIP_END");
    let is_sos = event.as_deref() == Some("SOS");

    let mut tx = pool.begin().await?;

    // Lock the trip row so concurrent messages for the same trip serialize.
    let status_row = sqlx::query(queries::SELECT_TRIP_STATUS)
        .bind(trip_id)
        .fetch_optional(&mut *tx)
        .await?;
    let status: Option<String> = status_row.and_then(|row| row.try_get("status").ok());
    let is_trip_open = matches!(status.as_deref(), Some("active") | Some("sos"));

    if is_trip_start {
        if status.is_some() {
            // Duplicate TRIP_START (retry from the mobile app); the lock above
            // already protects against the racing-messages case.
            info!("Ignored duplicate TRIP_START for trip {}", trip_id);
        } else {
            sqlx::query(queries::INSERT_TRIP)
                .bind(trip_id)
                .bind(&driver_id)
                .bind(company_id)
                .bind(message.data.plate.as_deref())
                .bind(timestamp)
                .bind(lat)
                .bind(lng)
                .execute(&mut *tx)
                .await?;

            sqlx::query(queries::UPSERT_LIVE_STATE_NEW_TRIP)
                .bind(&driver_id)
                .bind(trip_id)
                .bind(timestamp)
                .bind(lat)
                .bind(lng)
                .bind(speed)
                .bind(battery)
                .bind(message_uuid)
                .execute(&mut *tx)
                .await?;

            insert_ping(&mut tx, trip_id, &driver_id, timestamp, lat, lng, speed, battery, message_uuid)
                .await?;

            info!("Started trip {} for driver {}", trip_id, driver_id);
        }
    } else if is_trip_end {
        if is_trip_open {
            insert_ping(&mut tx, trip_id, &driver_id, timestamp, lat, lng, speed, battery, message_uuid)
                .await?;

            // Everything derived at close time comes from the ping store, so a
            // re-delivered TRIP_END would compute the same values.
            let pings = sqlx::query_as::<_, TripPing>(queries::SELECT_TRIP_PINGS)
                .bind(trip_id)
                .fetch_all(&mut *tx)
                .await?;

            let route_summary = summary::summarize(&pings, summary_cfg);
            let (max_speed, avg_speed) = speed_stats(&pings);
            let route: Vec<(f64, f64)> = summary::sort_by_time(&pings)
                .iter()
                .map(|p| (p.lat, p.lng))
                .collect();
            let distance_m = geo_utils::route_length_m(&route);

            sqlx::query(queries::UPDATE_TRIP_END)
                .bind(timestamp)
                .bind(lat)
                .bind(lng)
                .bind(max_speed)
                .bind(avg_speed)
                .bind(distance_m)
                .bind(trip_id)
                .execute(&mut *tx)
                .await?;

            for stop in &route_summary.stops {
                sqlx::query(queries::INSERT_TRIP_ALERT)
                    .bind(Uuid::new_v4())
                    .bind(trip_id)
                    .bind(stop.started_at)
                    .bind(stop.lat)
                    .bind(stop.lng)
                    .bind("stop_detected")
                    .bind(1i16)
                    .bind(&driver_id)
                    .bind(message_uuid)
                    .execute(&mut *tx)
                    .await?;
            }

            sqlx::query(queries::UPDATE_LIVE_STATE_END_TRIP)
                .bind(&driver_id)
                .bind(message_uuid)
                .bind(timestamp)
                .bind(lat)
                .bind(lng)
                .bind(speed)
                .execute(&mut *tx)
                .await?;

            info!(
                "Ended trip {} for driver {}: {} segments, {} stops, {:.0}m",
                trip_id,
                driver_id,
                route_summary.segments.len(),
                route_summary.stops.len(),
                distance_m
            );
        } else {
            info!("Ignored TRIP_END for unknown or closed trip {}", trip_id);
        }
    } else if is_sos {
        if is_trip_open {
            sqlx::query(queries::INSERT_TRIP_ALERT)
                .bind(Uuid::new_v4())
                .bind(trip_id)
                .bind(timestamp)
                .bind(lat)
                .bind(lng)
                .bind("sos")
                .bind(2i16)
                .bind(&driver_id)
                .bind(message_uuid)
                .execute(&mut *tx)
                .await?;

            insert_ping(&mut tx, trip_id, &driver_id, timestamp, lat, lng, speed, battery, message_uuid)
                .await?;

            sqlx::query(queries::UPDATE_TRIP_STATUS)
                .bind(trip_id)
                .bind("sos")
                .execute(&mut *tx)
                .await?;

            sqlx::query(queries::UPDATE_LIVE_STATE_PING)
                .bind(&driver_id)
                .bind(timestamp)
                .bind(lat)
                .bind(lng)
                .bind(speed)
                .bind(battery)
                .bind(message_uuid)
                .execute(&mut *tx)
                .await?;

            sqlx::query(queries::UPDATE_LIVE_STATE_STATUS)
                .bind(&driver_id)
                .bind("sos")
                .execute(&mut *tx)
                .await?;

            warn!("SOS raised on trip {} by driver {}", trip_id, driver_id);
        } else {
            info!("Ignored SOS for unknown or closed trip {}", trip_id);
        }
    } else {
        // Plain PING (or an event we do not know about).
        if is_trip_open {
            insert_ping(&mut tx, trip_id, &driver_id, timestamp, lat, lng, speed, battery, message_uuid)
                .await?;

            // Entry detection compares against the previous live position, so
            // the check has to run before the live state is refreshed.
            if let Some(company_id) = company_id {
                check_geofences(&mut tx, company_id, trip_id, &driver_id, timestamp, lat, lng, message_uuid)
                    .await?;
            }

            sqlx::query(queries::UPDATE_LIVE_STATE_PING)
                .bind(&driver_id)
                .bind(timestamp)
                .bind(lat)
                .bind(lng)
                .bind(speed)
                .bind(battery)
                .bind(message_uuid)
                .execute(&mut *tx)
                .await?;
        } else {
            info!("Ignored ping for unknown or closed trip {}", trip_id);
        }
    }

    tx.commit().await?;

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn insert_ping(
    tx: &mut Transaction<'_, Postgres>,
    trip_id: Uuid,
    driver_id: &str,
    timestamp: NaiveDateTime,
    lat: f64,
    lng: f64,
    speed: f64,
    battery: Option<f64>,
    correlation_id: Uuid,
) -> anyhow::Result<()> {
    sqlx::query(queries::INSERT_TRIP_PING)
        .bind(trip_id)
        .bind(driver_id)
        .bind(timestamp)
        .bind(lat)
        .bind(lng)
        .bind(speed)
        .bind(battery)
        .bind(correlation_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Raises a `geofence_entry` alert for each active company zone the driver
/// just moved into (outside on the previous ping, inside now).
#[allow(clippy::too_many_arguments)]
async fn check_geofences(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    trip_id: Uuid,
    driver_id: &str,
    timestamp: NaiveDateTime,
    lat: f64,
    lng: f64,
    correlation_id: Uuid,
) -> anyhow::Result<()> {
    let prev_pos: Option<(f64, f64)> = sqlx::query(queries::SELECT_LIVE_POSITION)
        .bind(driver_id)
        .fetch_optional(&mut **tx)
        .await?
        .and_then(|row| {
            let prev_lat: Option<f64> = row.try_get("last_lat").ok().flatten();
            let prev_lng: Option<f64> = row.try_get("last_lng").ok().flatten();
            prev_lat.zip(prev_lng)
        });

    let zones = sqlx::query_as::<_, Geofence>(queries::SELECT_ACTIVE_GEOFENCES)
        .bind(company_id)
        .fetch_all(&mut **tx)
        .await?;

    for zone in &zones {
        let was_inside = prev_pos.map(|(plat, plng)| zone.contains(plat, plng)).unwrap_or(false);
        if zone.contains(lat, lng) && !was_inside {
            sqlx::query(queries::INSERT_TRIP_ALERT)
                .bind(Uuid::new_v4())
                .bind(trip_id)
                .bind(timestamp)
                .bind(lat)
                .bind(lng)
                .bind("geofence_entry")
                .bind(zone.severity())
                .bind(driver_id)
                .bind(correlation_id)
                .execute(&mut **tx)
                .await?;

            info!("Driver {} entered geofence '{}' on trip {}", driver_id, zone.name, trip_id);
        }
    }

    Ok(())
}

/// Max and mean over the trip's effective ping speeds.
fn speed_stats(pings: &[TripPing]) -> (f64, f64) {
    if pings.is_empty() {
        return (0.0, 0.0);
    }
    let speeds: Vec<f64> = pings.iter().map(summary::effective_speed).collect();
    let max = speeds.iter().cloned().fold(0.0, f64::max);
    let avg = speeds.iter().sum::<f64>() / speeds.len() as f64;
    (max, avg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::test_support::ping;

    #[test]
    fn speed_stats_over_pings() {
        let pings = vec![
            ping(0, -34.60, -58.38, 20.0),
            ping(5, -34.61, -58.38, 60.0),
            ping(10, -34.62, -58.38, 40.0),
        ];
        let (max, avg) = speed_stats(&pings);
        assert_eq!(max, 60.0);
        assert_eq!(avg, 40.0);
    }

    #[test]
    fn speed_stats_empty_is_zero() {
        assert_eq!(speed_stats(&[]), (0.0, 0.0));
    }
}
