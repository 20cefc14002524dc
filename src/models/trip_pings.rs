use chrono::NaiveDateTime;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the append-only location ping store. Pings are immutable once
/// written; retention is handled outside this service.
#[derive(Debug, Clone, FromRow)]
pub struct TripPing {
    pub ping_id: i64, // bigserial
    pub trip_id: Uuid,
    pub driver_id: String,
    pub timestamp: NaiveDateTime,
    pub lat: f64,
    pub lng: f64,
    pub speed: Option<f64>, // km/h, DDL says float8 NULL
    pub battery: Option<f64>,
    pub correlation_id: Uuid,
}
