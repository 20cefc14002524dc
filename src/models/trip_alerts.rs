use chrono::NaiveDateTime;
use sqlx::FromRow;
use uuid::Uuid;

use serde_json::Value;
use sqlx::types::Json;

#[derive(Debug, FromRow)]
pub struct TripAlert {
    pub alert_id: Uuid,
    pub trip_id: Uuid, // DDL says NOT NULL
    pub timestamp: NaiveDateTime,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub alert_type: String, // Enum in DB ('sos', 'stop_detected', 'geofence_entry'), map to String
    pub severity: Option<i16>, // DDL says int2
    pub driver_id: String,
    pub correlation_id: Option<Uuid>,
    pub metadata: Option<Json<Value>>,
}
