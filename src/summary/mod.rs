//! Trip route summarization: a pure, single-pass derivation of colored speed
//! segments and dwell (stop) events from a trip's stored location pings.
//!
//! Nothing in here touches the outside world except the `*_for_trip`
//! accessors, which load pings and delegate to the pure functions. Output is
//! a function of the input sequence only, so re-running on the same trip is
//! always safe.

pub mod segments;
pub mod stops;

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::db::{self, DbPool};
use crate::models::trip_pings::TripPing;

pub use segments::classify_segments;
pub use stops::detect_stops;

/// Thresholds for bucket classification and stop promotion. All values are
/// configuration, not constants; `AppConfig` populates them from the
/// environment.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Upper edge (exclusive) of the "stopped" bucket, km/h.
    pub stopped_below_kmh: f64,
    /// Upper edge (exclusive) of the "slow" bucket, km/h.
    pub slow_below_kmh: f64,
    /// Upper edge (exclusive) of the "normal" bucket; anything at or above is "fast".
    pub normal_below_kmh: f64,
    /// A ping below this speed counts toward a candidate stop, km/h.
    pub stop_speed_kmh: f64,
    /// A candidate stop is reported only if it dwells strictly longer than this.
    pub stop_min_duration_secs: i64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            stopped_below_kmh: 5.0,
            slow_below_kmh: 40.0,
            normal_below_kmh: 80.0,
            stop_speed_kmh: 2.0,
            stop_min_duration_secs: 180,
        }
    }
}

impl SummaryConfig {
    /// Bucket boundaries are inclusive on the lower edge, so classification
    /// is stable for speeds sitting exactly on a threshold.
    pub fn bucket_for(&self, speed_kmh: f64) -> SpeedBucket {
        if speed_kmh < self.stopped_below_kmh {
            SpeedBucket::Stopped
        } else if speed_kmh < self.slow_below_kmh {
            SpeedBucket::Slow
        } else if speed_kmh < self.normal_below_kmh {
            SpeedBucket::Normal
        } else {
            SpeedBucket::Fast
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBucket {
    Stopped,
    Slow,
    Normal,
    Fast,
}

impl SpeedBucket {
    /// Hex color the dashboard paints this bucket's polyline with.
    pub fn css_color(self) -> &'static str {
        match self {
            SpeedBucket::Stopped => "#ef4444",
            SpeedBucket::Slow => "#eab308",
            SpeedBucket::Normal => "#10b981",
            SpeedBucket::Fast => "#f97316",
        }
    }
}

/// A maximal run of consecutive pings sharing a speed bucket. Adjacent
/// segments overlap by exactly one point so the rendered route is continuous.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedSegment {
    /// Ordered (lat, lng) polyline.
    pub points: Vec<(f64, f64)>,
    pub bucket: SpeedBucket,
    pub avg_speed_kmh: f64,
}

/// A dwell interval promoted past the minimum duration threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopEvent {
    pub lat: f64,
    pub lng: f64,
    pub started_at: NaiveDateTime,
    pub duration_secs: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub segments: Vec<SpeedSegment>,
    pub stops: Vec<StopEvent>,
}

/// Runs classifier and detector over one shared time-sorted copy of the pings.
pub fn summarize(pings: &[TripPing], cfg: &SummaryConfig) -> RouteSummary {
    let sorted = sort_by_time(pings);
    RouteSummary {
        segments: segments::classify_sorted(&sorted, cfg),
        stops: stops::detect_sorted(&sorted, cfg),
    }
}

/// Loads a trip's pings and classifies its speed segments.
pub async fn segments_for_trip(
    pool: &DbPool,
    trip_id: Uuid,
    cfg: &SummaryConfig,
) -> anyhow::Result<Vec<SpeedSegment>> {
    let pings = db::load_trip_pings(pool, trip_id).await?;
    Ok(classify_segments(&pings, cfg))
}

/// Loads a trip's pings and detects its promoted stops.
pub async fn stops_for_trip(
    pool: &DbPool,
    trip_id: Uuid,
    cfg: &SummaryConfig,
) -> anyhow::Result<Vec<StopEvent>> {
    let pings = db::load_trip_pings(pool, trip_id).await?;
    Ok(detect_stops(&pings, cfg))
}

/// The store usually returns pings ordered by timestamp, but neither function
/// trusts that; both sort before scanning.
pub(crate) fn sort_by_time(pings: &[TripPing]) -> Vec<TripPing> {
    let mut sorted = pings.to_vec();
    sorted.sort_by_key(|p| p.timestamp);
    sorted
}

/// Missing or non-finite speeds degrade to 0 ("stopped") instead of failing;
/// upstream tracker firmware is not under our control.
pub(crate) fn effective_speed(ping: &TripPing) -> f64 {
    match ping.speed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::DateTime;

    /// Builds a ping `secs` seconds into the trip.
    pub fn ping(secs: i64, lat: f64, lng: f64, speed: f64) -> TripPing {
        TripPing {
            ping_id: secs,
            trip_id: Uuid::nil(),
            driver_id: "driver-0072".to_string(),
            timestamp: DateTime::from_timestamp(1_764_396_000 + secs, 0)
                .unwrap()
                .naive_utc(),
            lat,
            lng,
            speed: Some(speed),
            battery: Some(90.0),
            correlation_id: Uuid::nil(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ping;
    use super::*;

    #[test]
    fn summarize_produces_both_views_from_one_input() {
        let cfg = SummaryConfig::default();
        let pings = vec![
            ping(0, -34.60, -58.38, 60.0),
            ping(5, -34.61, -58.38, 0.0),
            ping(200, -34.61, -58.38, 0.0),
            ping(205, -34.62, -58.39, 60.0),
        ];

        let summary = summarize(&pings, &cfg);
        assert_eq!(summary.segments.len(), 3);
        assert_eq!(summary.stops.len(), 1);
        assert_eq!(summary.stops[0].duration_secs, 195);
    }

    #[test]
    fn summarize_matches_standalone_functions() {
        let cfg = SummaryConfig::default();
        let pings = vec![
            ping(0, -34.60, -58.38, 0.0),
            ping(300, -34.60, -58.38, 1.0),
            ping(305, -34.61, -58.39, 85.0),
        ];

        let summary = summarize(&pings, &cfg);
        assert_eq!(summary.segments, classify_segments(&pings, &cfg));
        assert_eq!(summary.stops, detect_stops(&pings, &cfg));
    }

    #[test]
    fn bucket_boundaries_are_lower_edge_inclusive() {
        let cfg = SummaryConfig::default();
        assert_eq!(cfg.bucket_for(4.99), SpeedBucket::Stopped);
        assert_eq!(cfg.bucket_for(5.0), SpeedBucket::Slow);
        assert_eq!(cfg.bucket_for(39.99), SpeedBucket::Slow);
        assert_eq!(cfg.bucket_for(40.0), SpeedBucket::Normal);
        assert_eq!(cfg.bucket_for(79.99), SpeedBucket::Normal);
        assert_eq!(cfg.bucket_for(80.0), SpeedBucket::Fast);
    }

    #[test]
    fn non_finite_speed_degrades_to_stopped() {
        let mut p = ping(0, -34.60, -58.38, 0.0);
        p.speed = Some(f64::NAN);
        assert_eq!(effective_speed(&p), 0.0);
        p.speed = None;
        assert_eq!(effective_speed(&p), 0.0);
        p.speed = Some(-3.0);
        assert_eq!(effective_speed(&p), 0.0);
    }
}
