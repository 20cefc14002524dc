//! MineConnect SAT trip-telemetry service.
//!
//! Consumes driver telemetry from Kafka into a Postgres trip store and
//! exposes the route summarization core ([`summary`]): speed-bucketed
//! segments for map rendering and promoted stop events for dispatcher
//! review.

pub mod config;
pub mod db;
pub mod geo_utils;
pub mod kafka;
pub mod models;
pub mod processor;
pub mod summary;
