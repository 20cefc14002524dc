pub const SELECT_TRIP_STATUS: &str = r#"
SELECT status FROM trips WHERE trip_id = $1 FOR UPDATE;
"#;

pub const INSERT_TRIP: &str = r#"
INSERT INTO trips (trip_id, driver_id, company_id, plate, status, start_time, start_lat, start_lng)
VALUES ($1, $2, $3, $4, 'active', $5, $6, $7);
"#;

pub const UPDATE_TRIP_END: &str = r#"
UPDATE trips
SET end_time = $1,
    end_lat = $2,
    end_lng = $3,
    max_speed_kmh = $4,
    avg_speed_kmh = $5,
    distance_meters = $6,
    status = 'completed'
WHERE trip_id = $7;
"#;

pub const UPDATE_TRIP_STATUS: &str = r#"
UPDATE trips SET status = $2 WHERE trip_id = $1;
"#;

pub const INSERT_TRIP_PING: &str = r#"
INSERT INTO trip_pings (trip_id, driver_id, timestamp, lat, lng, speed, battery, correlation_id)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
"#;

pub const SELECT_TRIP_PINGS: &str = r#"
SELECT ping_id, trip_id, driver_id, timestamp, lat, lng, speed, battery, correlation_id
FROM trip_pings
WHERE trip_id = $1
ORDER BY timestamp ASC;
"#;

pub const INSERT_TRIP_ALERT: &str = r#"
INSERT INTO trip_alerts (
    alert_id, trip_id, timestamp, lat, lng, alert_type, severity, driver_id, correlation_id
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9);
"#;

pub const UPSERT_LIVE_STATE_NEW_TRIP: &str = r#"
INSERT INTO trip_live_state (driver_id, current_trip_id, status, last_updated_at, last_point_at, last_lat, last_lng, last_speed, battery_level, last_correlation_id)
VALUES ($1, $2, 'active', NOW(), $3, $4, $5, $6, $7, $8)
ON CONFLICT (driver_id) DO UPDATE
SET current_trip_id = $2,
    status = 'active',
    last_updated_at = NOW(),
    last_point_at = $3,
    last_lat = $4,
    last_lng = $5,
    last_speed = $6,
    battery_level = $7,
    last_correlation_id = $8;
"#;

pub const UPDATE_LIVE_STATE_PING: &str = r#"
UPDATE trip_live_state
SET last_point_at = $2,
    last_lat = $3,
    last_lng = $4,
    last_speed = $5,
    battery_level = $6,
    last_updated_at = NOW(),
    last_correlation_id = $7
WHERE driver_id = $1;
"#;

pub const UPDATE_LIVE_STATE_END_TRIP: &str = r#"
UPDATE trip_live_state
SET current_trip_id = NULL,
    status = 'idle',
    last_point_at = $3,
    last_lat = $4,
    last_lng = $5,
    last_speed = $6,
    last_updated_at = NOW(),
    last_correlation_id = $2
WHERE driver_id = $1;
"#;

pub const UPDATE_LIVE_STATE_STATUS: &str = r#"
UPDATE trip_live_state SET status = $2, last_updated_at = NOW() WHERE driver_id = $1;
"#;

pub const SELECT_LIVE_POSITION: &str = r#"
SELECT last_lat, last_lng FROM trip_live_state WHERE driver_id = $1;
"#;

pub const SELECT_ACTIVE_GEOFENCES: &str = r#"
SELECT geofence_id, company_id, name, lat, lng, radius_m, kind, active
FROM geofences
WHERE company_id = $1 AND active = true;
"#;
