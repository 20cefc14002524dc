pub mod geofence;
pub mod message;
pub mod trip;
pub mod trip_alerts;
pub mod trip_pings;
