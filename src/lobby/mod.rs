//! Lobby system for the simulated matchmaking flow
//!
//! Handles the matchmaking session, its timers, lobby statistics and
//! invite links.

pub mod constants;
pub mod controller;
pub mod invite;
pub mod service;
pub mod session;
pub mod snapshot;
