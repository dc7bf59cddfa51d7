//! Prometheus-compatible metrics
//!
//! Counters for the file server and the lobby, rendered by the file server
//! at `/metrics` (Prometheus text) and `/metrics/json`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::lobby::controller::LobbyEvent;
use crate::lobby::session::Phase;
use crate::lobby::snapshot::SnapshotSource;
use crate::net::transport::TransportStatus;

/// Metrics registry for the arcade server
#[derive(Debug)]
pub struct Metrics {
    // HTTP
    pub requests_total: AtomicU64,
    pub responses_not_found: AtomicU64,
    pub responses_server_error: AtomicU64,
    pub bytes_sent: AtomicU64,

    // Matchmaking
    pub searches_started: AtomicU64,
    pub searches_cancelled: AtomicU64,
    pub matches_found: AtomicU64,
    pub matches_launched: AtomicU64,
    pub friend_invites: AtomicU64,
    pub friends_joined: AtomicU64,

    // Lobby feed
    pub snapshots_live: AtomicU64,
    pub snapshots_simulated: AtomicU64,
    pub online_players: AtomicU64,
    pub waiting_players: AtomicU64,
    pub active_matches: AtomicU64,

    // Transport state (0=Unavailable, 1=Connected, 2=Disconnected)
    pub transport_state: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            responses_not_found: AtomicU64::new(0),
            responses_server_error: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            searches_started: AtomicU64::new(0),
            searches_cancelled: AtomicU64::new(0),
            matches_found: AtomicU64::new(0),
            matches_launched: AtomicU64::new(0),
            friend_invites: AtomicU64::new(0),
            friends_joined: AtomicU64::new(0),
            snapshots_live: AtomicU64::new(0),
            snapshots_simulated: AtomicU64::new(0),
            online_players: AtomicU64::new(0),
            waiting_players: AtomicU64::new(0),
            active_matches: AtomicU64::new(0),
            transport_state: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one served HTTP response
    pub fn record_response(&self, status: u16, body_len: usize) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(body_len as u64, Ordering::Relaxed);
        match status {
            404 => {
                self.responses_not_found.fetch_add(1, Ordering::Relaxed);
            }
            500..=599 => {
                self.responses_server_error.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    /// Update counters from a lobby event
    pub fn record_lobby_event(&self, event: &LobbyEvent) {
        match event {
            LobbyEvent::PhaseChanged(session) => {
                let counter = match session.phase {
                    Phase::Searching => &self.searches_started,
                    Phase::WaitingForFriend => &self.friend_invites,
                    Phase::Cancelled => &self.searches_cancelled,
                    Phase::MatchFound => &self.matches_found,
                    _ => return,
                };
                counter.fetch_add(1, Ordering::Relaxed);
            }
            LobbyEvent::FriendJoined(_) => {
                self.friends_joined.fetch_add(1, Ordering::Relaxed);
            }
            LobbyEvent::Launched { .. } => {
                self.matches_launched.fetch_add(1, Ordering::Relaxed);
            }
            LobbyEvent::Snapshot(snapshot) => {
                let counter = match snapshot.source {
                    SnapshotSource::Live => &self.snapshots_live,
                    SnapshotSource::Simulated => &self.snapshots_simulated,
                };
                counter.fetch_add(1, Ordering::Relaxed);
                self.online_players.store(snapshot.online_count as u64, Ordering::Relaxed);
                self.waiting_players.store(snapshot.waiting_count as u64, Ordering::Relaxed);
                self.active_matches.store(snapshot.active_matches as u64, Ordering::Relaxed);
            }
            LobbyEvent::Tick(_) | LobbyEvent::Transport(_) => {}
        }
    }

    pub fn set_transport(&self, status: TransportStatus) {
        let value = match status {
            TransportStatus::Unavailable => 0,
            TransportStatus::Connected => 1,
            TransportStatus::Disconnected => 2,
        };
        self.transport_state.store(value, Ordering::Relaxed);
    }

    fn transport_name(&self) -> &'static str {
        match self.transport_state.load(Ordering::Relaxed) {
            1 => "connected",
            2 => "disconnected",
            _ => "unavailable",
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("yeti_http_requests_total", "Total HTTP requests served", "counter",
            self.requests_total.load(Ordering::Relaxed));
        metric!("yeti_http_not_found_total", "Responses with status 404", "counter",
            self.responses_not_found.load(Ordering::Relaxed));
        metric!("yeti_http_server_errors_total", "Responses with status 5xx", "counter",
            self.responses_server_error.load(Ordering::Relaxed));
        metric!("yeti_http_bytes_sent_total", "Response body bytes sent", "counter",
            self.bytes_sent.load(Ordering::Relaxed));

        metric!("yeti_lobby_searches_started_total", "Matchmaking searches started", "counter",
            self.searches_started.load(Ordering::Relaxed));
        metric!("yeti_lobby_searches_cancelled_total", "Matchmaking sessions cancelled", "counter",
            self.searches_cancelled.load(Ordering::Relaxed));
        metric!("yeti_lobby_matches_found_total", "Opponents found", "counter",
            self.matches_found.load(Ordering::Relaxed));
        metric!("yeti_lobby_matches_launched_total", "Games launched", "counter",
            self.matches_launched.load(Ordering::Relaxed));
        metric!("yeti_lobby_friend_invites_total", "Invite games opened", "counter",
            self.friend_invites.load(Ordering::Relaxed));
        metric!("yeti_lobby_friends_joined_total", "Invited friends who joined", "counter",
            self.friends_joined.load(Ordering::Relaxed));

        metric!("yeti_lobby_snapshots_live_total", "Lobby snapshots from the game server", "counter",
            self.snapshots_live.load(Ordering::Relaxed));
        metric!("yeti_lobby_snapshots_simulated_total", "Simulated lobby snapshots", "counter",
            self.snapshots_simulated.load(Ordering::Relaxed));
        metric!("yeti_lobby_online_players", "Players online in the last snapshot", "gauge",
            self.online_players.load(Ordering::Relaxed));
        metric!("yeti_lobby_waiting_players", "Players waiting in the last snapshot", "gauge",
            self.waiting_players.load(Ordering::Relaxed));
        metric!("yeti_lobby_active_matches", "Active matches in the last snapshot", "gauge",
            self.active_matches.load(Ordering::Relaxed));

        output.push_str(&format!(
            "# HELP yeti_lobby_transport_state Live transport state\n# TYPE yeti_lobby_transport_state gauge\nyeti_lobby_transport_state{{state=\"{}\"}} 1\n",
            self.transport_name()
        ));

        metric!("yeti_uptime_seconds", "Server uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// Generate JSON format metrics
    pub fn to_json(&self) -> String {
        let value = serde_json::json!({
            "http": {
                "requests": self.requests_total.load(Ordering::Relaxed),
                "not_found": self.responses_not_found.load(Ordering::Relaxed),
                "server_errors": self.responses_server_error.load(Ordering::Relaxed),
                "bytes_sent": self.bytes_sent.load(Ordering::Relaxed),
            },
            "lobby": {
                "searches_started": self.searches_started.load(Ordering::Relaxed),
                "searches_cancelled": self.searches_cancelled.load(Ordering::Relaxed),
                "matches_found": self.matches_found.load(Ordering::Relaxed),
                "matches_launched": self.matches_launched.load(Ordering::Relaxed),
                "friend_invites": self.friend_invites.load(Ordering::Relaxed),
                "friends_joined": self.friends_joined.load(Ordering::Relaxed),
                "online": self.online_players.load(Ordering::Relaxed),
                "waiting": self.waiting_players.load(Ordering::Relaxed),
                "active_matches": self.active_matches.load(Ordering::Relaxed),
                "transport": self.transport_name(),
            },
            "uptime_seconds": self.uptime_seconds(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
