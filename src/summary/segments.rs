use super::{effective_speed, sort_by_time, SpeedSegment, SummaryConfig};
use crate::models::trip_pings::TripPing;

/// Partitions a trip's pings into maximal runs sharing a speed bucket.
///
/// Input order is not trusted; pings are sorted by timestamp first. Empty
/// input yields an empty list and a single ping yields a single one-point
/// segment. Re-running on identical input gives identical output.
pub fn classify_segments(pings: &[TripPing], cfg: &SummaryConfig) -> Vec<SpeedSegment> {
    let sorted = sort_by_time(pings);
    classify_sorted(&sorted, cfg)
}

/// Single linear pass over pings already sorted by timestamp.
///
/// A bucket change at ping `i` closes the open segment with `i`'s position
/// appended (adjacent segments share that boundary point, keeping the
/// rendered polyline continuous) and opens the next segment at ping `i`.
/// Each ping's speed contributes to exactly one segment's average.
pub(crate) fn classify_sorted(pings: &[TripPing], cfg: &SummaryConfig) -> Vec<SpeedSegment> {
    let first = match pings.first() {
        Some(p) => p,
        None => return Vec::new(),
    };

    let mut segments = Vec::new();
    let mut points = vec![(first.lat, first.lng)];
    let mut bucket = cfg.bucket_for(effective_speed(first));
    let mut speed_sum = effective_speed(first);
    let mut speed_count = 1usize;

    for ping in &pings[1..] {
        let speed = effective_speed(ping);
        let next_bucket = cfg.bucket_for(speed);

        if next_bucket == bucket {
            points.push((ping.lat, ping.lng));
            speed_sum += speed;
            speed_count += 1;
        } else {
            points.push((ping.lat, ping.lng));
            segments.push(SpeedSegment {
                points: std::mem::replace(&mut points, vec![(ping.lat, ping.lng)]),
                bucket,
                avg_speed_kmh: speed_sum / speed_count as f64,
            });
            bucket = next_bucket;
            speed_sum = speed;
            speed_count = 1;
        }
    }

    segments.push(SpeedSegment {
        points,
        bucket,
        avg_speed_kmh: speed_sum / speed_count as f64,
    });
    segments
}
