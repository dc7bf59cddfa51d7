//! Live lobby statistics from the external game server
//!
//! The adapter opens a TCP connection, waits for the service's greeting and
//! then polls for lobby counters. Anything short of a greeting within the
//! connect timeout resolves as "unavailable"; the lobby service decides what
//! to do about it.

use serde::Serialize;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::lobby::snapshot::LobbySnapshot;
use crate::net::framing::{read_json, write_json, FramingError};
use crate::net::protocol::{ClientMessage, ServerMessage};

/// Connectivity as reported to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportStatus {
    Connected,
    Unavailable,
    Disconnected,
}

/// Items delivered by a live feed
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Snapshot(LobbySnapshot),
    Disconnected,
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Could not connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        source: std::io::Error,
    },
    #[error("No greeting from {endpoint} within {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },
    #[error("Unexpected greeting: {0:?}")]
    UnexpectedGreeting(ServerMessage),
    #[error("Handshake failed: {0}")]
    Framing(#[from] FramingError),
}

/// Connector for the external lobby service
#[derive(Debug, Clone)]
pub struct TransportAdapter {
    connect_timeout: Duration,
    poll_interval: Duration,
}

impl TransportAdapter {
    pub fn new(connect_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            connect_timeout,
            poll_interval,
        }
    }

    /// Connect to `endpoint` (`host:port`) and start polling for counters
    pub async fn connect(&self, endpoint: &str) -> Result<LiveFeed, TransportError> {
        let handshake = async {
            let mut stream =
                TcpStream::connect(endpoint)
                    .await
                    .map_err(|source| TransportError::Connect {
                        endpoint: endpoint.to_string(),
                        source,
                    })?;

            match read_json::<ServerMessage, _>(&mut stream).await? {
                ServerMessage::Connected => Ok::<_, TransportError>(stream),
                other => Err(TransportError::UnexpectedGreeting(other)),
            }
        };

        let stream = tokio::time::timeout(self.connect_timeout, handshake)
            .await
            .map_err(|_| TransportError::Timeout {
                endpoint: endpoint.to_string(),
                timeout: self.connect_timeout,
            })??;

        info!("Connected to lobby service at {}", endpoint);
        Ok(LiveFeed::start(stream, self.poll_interval))
    }
}

/// An established live channel
///
/// Dropping the feed aborts its tasks too, but only [`LiveFeed::disconnect`]
/// waits for the connection to be released.
pub struct LiveFeed {
    events: mpsc::Receiver<TransportEvent>,
    reader: JoinHandle<()>,
    poller: JoinHandle<()>,
}

impl LiveFeed {
    fn start(stream: TcpStream, poll_interval: Duration) -> Self {
        let (read_half, write_half) = stream.into_split();
        let (tx, events) = mpsc::channel(16);

        let poller = tokio::spawn(poll_stats(write_half, poll_interval));
        let reader = tokio::spawn(read_updates(read_half, tx));

        Self {
            events,
            reader,
            poller,
        }
    }

    /// Next event; `None` once the feed has been torn down
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    /// Stop polling, close the connection and report the new status
    pub async fn disconnect(mut self) -> TransportStatus {
        info!("Disconnecting from lobby service");
        self.events.close();
        self.poller.abort();
        self.reader.abort();

        // The socket halves are dropped with the aborted tasks
        let _ = (&mut self.poller).await;
        let _ = (&mut self.reader).await;

        TransportStatus::Disconnected
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.poller.abort();
        self.reader.abort();
    }
}

/// Request counters immediately and then every `poll_interval`
async fn poll_stats(mut writer: OwnedWriteHalf, poll_interval: Duration) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Err(e) = write_json(&mut writer, &ClientMessage::GetLobbyStats).await {
            debug!("Lobby stats request failed: {}", e);
            return;
        }
    }
}

async fn read_updates(mut reader: OwnedReadHalf, tx: mpsc::Sender<TransportEvent>) {
    // Servers that omit activeMatches keep the last value we saw
    let mut active_matches = 0;

    loop {
        match read_json::<ServerMessage, _>(&mut reader).await {
            Ok(ServerMessage::LobbyUpdate(stats)) => {
                if let Some(matches) = stats.active_matches {
                    active_matches = matches;
                }
                let snapshot = LobbySnapshot::live(stats.online, stats.waiting, active_matches);
                if tx.send(TransportEvent::Snapshot(snapshot)).await.is_err() {
                    return;
                }
            }
            Ok(ServerMessage::Connected) => debug!("Duplicate greeting from lobby service"),
            Err(FramingError::Malformed(e)) => warn!("Ignoring malformed lobby message: {}", e),
            Err(e) => {
                info!("Lobby service connection lost: {}", e);
                break;
            }
        }
    }

    let _ = tx.send(TransportEvent::Disconnected).await;
}

/// Accept `host:port` or an `http://host:port/` style URL
pub fn normalize_endpoint(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .or_else(|| trimmed.strip_prefix("tcp://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_string()
}
