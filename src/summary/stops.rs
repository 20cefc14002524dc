use super::{effective_speed, sort_by_time, StopEvent, SummaryConfig};
use crate::models::trip_pings::TripPing;

/// Scans a trip's pings for dwell intervals worth flagging to a dispatcher.
///
/// A candidate opens on the first ping below the near-zero speed threshold
/// and extends through consecutive below-threshold pings. Its duration is
/// the span between its first and last ping; only candidates dwelling
/// strictly longer than the configured minimum are reported.
pub fn detect_stops(pings: &[TripPing], cfg: &SummaryConfig) -> Vec<StopEvent> {
    let sorted = sort_by_time(pings);
    detect_sorted(&sorted, cfg)
}

pub(crate) fn detect_sorted(pings: &[TripPing], cfg: &SummaryConfig) -> Vec<StopEvent> {
    let mut stops = Vec::new();
    // (first, last) ping of the open candidate window.
    let mut open: Option<(&TripPing, &TripPing)> = None;

    for ping in pings {
        if effective_speed(ping) < cfg.stop_speed_kmh {
            open = match open {
                Some((first, _)) => Some((first, ping)),
                None => Some((ping, ping)),
            };
        } else if let Some((first, last)) = open.take() {
            promote(&mut stops, first, last, cfg);
        }
    }

    // A trip that ends while still stopped is evaluated, not dropped.
    if let Some((first, last)) = open {
        promote(&mut stops, first, last, cfg);
    }

    stops
}

fn promote(stops: &mut Vec<StopEvent>, first: &TripPing, last: &TripPing, cfg: &SummaryConfig) {
    let duration_secs = (last.timestamp - first.timestamp).num_seconds();
    if duration_secs > cfg.stop_min_duration_secs {
        stops.push(StopEvent {
            lat: first.lat,
            lng: first.lng,
            started_at: first.timestamp,
            duration_secs,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::ping;
    use super::*;

    fn cfg_with_min(min_secs: i64) -> SummaryConfig {
        SummaryConfig {
            stop_min_duration_secs: min_secs,
            ..SummaryConfig::default()
        }
    }

    #[test]
    fn empty_input_yields_no_stops() {
        assert!(detect_stops(&[], &cfg_with_min(120)).is_empty());
    }

    #[test]
    fn single_ping_never_promotes() {
        let pings = vec![ping(0, -34.60, -58.38, 0.0)];
        assert!(detect_stops(&pings, &cfg_with_min(120)).is_empty());
    }

    #[test]
    fn dwell_past_minimum_is_reported_once() {
        let pings = vec![
            ping(0, -34.60, -58.38, 0.0),
            ping(60, -34.60, -58.38, 0.0),
            ping(121, -34.60, -58.38, 0.0),
            ping(125, -34.61, -58.39, 40.0),
        ];
        let stops = detect_stops(&pings, &cfg_with_min(120));
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].duration_secs, 121);
        assert_eq!((stops[0].lat, stops[0].lng), (-34.60, -58.38));
        assert_eq!(stops[0].started_at, ping(0, 0.0, 0.0, 0.0).timestamp);
    }

    #[test]
    fn dwell_at_or_below_minimum_is_not_reported() {
        let pings = vec![
            ping(0, -34.60, -58.38, 0.0),
            ping(60, -34.60, -58.38, 0.0),
            ping(119, -34.60, -58.38, 0.0),
            ping(125, -34.61, -58.39, 40.0),
        ];
        assert!(detect_stops(&pings, &cfg_with_min(120)).is_empty());

        // Exactly the minimum does not promote either; the comparison is strict.
        let pings = vec![
            ping(0, -34.60, -58.38, 0.0),
            ping(120, -34.60, -58.38, 1.5),
            ping(125, -34.61, -58.39, 40.0),
        ];
        assert!(detect_stops(&pings, &cfg_with_min(120)).is_empty());
    }

    #[test]
    fn trailing_stop_at_end_of_trip_is_still_evaluated() {
        let pings = vec![
            ping(0, -34.60, -58.38, 70.0),
            ping(5, -34.61, -58.38, 0.5),
            ping(300, -34.61, -58.38, 0.0),
        ];
        let stops = detect_stops(&pings, &cfg_with_min(180));
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].duration_secs, 295);
    }

    #[test]
    fn separate_dwells_produce_separate_ordered_events() {
        let pings = vec![
            ping(0, -34.60, -58.38, 0.0),
            ping(200, -34.60, -58.38, 0.0),
            ping(205, -34.61, -58.39, 50.0),
            ping(210, -34.62, -58.40, 1.0),
            ping(500, -34.62, -58.40, 1.0),
            ping(505, -34.63, -58.41, 50.0),
        ];
        let stops = detect_stops(&pings, &cfg_with_min(180));
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].duration_secs, 200);
        assert_eq!(stops[1].duration_secs, 290);
        assert!(stops[0].started_at < stops[1].started_at);
    }

    #[test]
    fn speed_at_threshold_closes_the_candidate() {
        // 2.0 km/h is not "below" the default 2.0 threshold.
        let pings = vec![
            ping(0, -34.60, -58.38, 0.0),
            ping(100, -34.60, -58.38, 2.0),
            ping(400, -34.60, -58.38, 0.0),
        ];
        let stops = detect_stops(&pings, &SummaryConfig::default());
        assert!(stops.is_empty());
    }

    #[test]
    fn unsorted_input_matches_sorted_input() {
        let sorted = vec![
            ping(0, -34.60, -58.38, 50.0),
            ping(5, -34.61, -58.38, 0.0),
            ping(400, -34.61, -58.38, 0.0),
            ping(405, -34.62, -58.39, 50.0),
        ];
        let mut shuffled = sorted.clone();
        shuffled.reverse();

        assert_eq!(
            detect_stops(&sorted, &cfg_with_min(180)),
            detect_stops(&shuffled, &cfg_with_min(180))
        );
    }

    #[test]
    fn detection_is_deterministic() {
        let pings = vec![
            ping(0, -34.60, -58.38, 0.0),
            ping(300, -34.60, -58.38, 0.0),
            ping(305, -34.61, -58.39, 60.0),
        ];
        let cfg = cfg_with_min(180);
        assert_eq!(detect_stops(&pings, &cfg), detect_stops(&pings, &cfg));
    }
}
