use chrono::NaiveDateTime;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct Trip {
    pub trip_id: Uuid,
    pub driver_id: String,
    pub company_id: Option<Uuid>, // DDL says uuid NULL
    pub plate: Option<String>,
    pub status: String, // 'active' | 'completed' | 'sos'
    pub start_time: NaiveDateTime,
    pub start_lat: Option<f64>, // DDL says float8 NULL
    pub start_lng: Option<f64>,
    pub end_time: Option<NaiveDateTime>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
    pub max_speed_kmh: Option<f64>,
    pub avg_speed_kmh: Option<f64>,
    pub distance_meters: Option<f64>,
}
