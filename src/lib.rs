//! Yeti Arcade Server Library
//!
//! Serves the arcade hub page and runs the simulated matchmaking lobby for
//! Cowboy Shootout, preferring live lobby statistics from the game server
//! when it is reachable.
//!
//! # Features
//!
//! - `metrics` - Prometheus/JSON metrics routes on the file server (enabled by default)

pub mod config;
pub mod http;
pub mod lobby;
pub mod metrics;
pub mod net;
