//! Lobby service task
//!
//! One task owns the [`LobbyController`], the 1-second tick interval and the
//! lobby statistics feed. Commands come in through a cloneable
//! [`LobbyHandle`]; display updates go out as [`LobbyEvent`]s.

use rand::rngs::StdRng;
use rand::Rng;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::lobby::constants::{feed, timing};
use crate::lobby::controller::{LobbyController, LobbyError, LobbyEvent, Operation, Ticker};
use crate::lobby::invite;
use crate::lobby::session::MatchmakingSession;
use crate::lobby::snapshot::{LobbySimulator, LobbySnapshot};
use crate::metrics::Metrics;
use crate::net::transport::{
    LiveFeed, TransportAdapter, TransportError, TransportEvent, TransportStatus,
};

/// Lobby service settings
#[derive(Debug, Clone)]
pub struct LobbyServiceConfig {
    /// External lobby service (`host:port`); `None` means simulate only
    pub endpoint: Option<String>,
    pub connect_timeout: Duration,
    pub live_poll_interval: Duration,
    pub simulated_poll_interval: Duration,
    pub tick_period: Duration,
}

impl Default for LobbyServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            connect_timeout: feed::CONNECT_TIMEOUT,
            live_poll_interval: feed::LIVE_POLL_INTERVAL,
            simulated_poll_interval: feed::SIMULATED_POLL_INTERVAL,
            tick_period: timing::TICK_PERIOD,
        }
    }
}

/// Service errors seen by handle users
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Lobby(#[from] LobbyError),
    #[error("Lobby service has stopped")]
    Closed,
}

enum Command {
    Operate(Operation, oneshot::Sender<Result<(), LobbyError>>),
    Session(oneshot::Sender<MatchmakingSession>),
    Snapshot(oneshot::Sender<Option<LobbySnapshot>>),
    CreateRoom(String, oneshot::Sender<String>),
    Invite(String, oneshot::Sender<Result<String, LobbyError>>),
    Shutdown,
}

/// Cloneable handle for driving the lobby
#[derive(Clone)]
pub struct LobbyHandle {
    commands: mpsc::Sender<Command>,
}

impl LobbyHandle {
    pub async fn start_search(&self) -> Result<(), ServiceError> {
        self.operate(Operation::StartSearch).await
    }

    pub async fn cancel(&self) -> Result<(), ServiceError> {
        self.operate(Operation::Cancel).await
    }

    pub async fn ready(&self) -> Result<(), ServiceError> {
        self.operate(Operation::Ready).await
    }

    pub async fn launch(&self) -> Result<(), ServiceError> {
        self.operate(Operation::Launch).await
    }

    /// Current session state
    pub async fn session(&self) -> Result<MatchmakingSession, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Session(tx)).await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Most recent lobby counters, if any arrived yet
    pub async fn snapshot(&self) -> Result<Option<LobbySnapshot>, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx)).await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Launch URL for a fresh private room called `name`
    pub async fn create_private_room(&self, name: &str) -> Result<String, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::CreateRoom(name.to_string(), tx)).await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Open an invite game and wait for a friend; returns the link to share
    pub async fn invite_friend(&self, origin: &str) -> Result<String, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Invite(origin.to_string(), tx)).await?;
        Ok(rx.await.map_err(|_| ServiceError::Closed)??)
    }

    /// Stop the service task
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    async fn operate(&self, operation: Operation) -> Result<(), ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Operate(operation, tx)).await?;
        rx.await.map_err(|_| ServiceError::Closed)??;
        Ok(())
    }

    async fn send(&self, command: Command) -> Result<(), ServiceError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ServiceError::Closed)
    }
}

type ConnectFuture = Pin<Box<dyn Future<Output = Result<LiveFeed, TransportError>> + Send>>;

/// Where lobby counters currently come from
enum Feed {
    Connecting(ConnectFuture),
    Live(LiveFeed),
    Simulated(Interval),
}

enum FeedItem {
    Connected(Result<LiveFeed, TransportError>),
    Live(Option<TransportEvent>),
    Simulate,
}

impl Feed {
    fn simulated(period: Duration) -> Self {
        // First tick fires immediately so the display never starts empty
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Feed::Simulated(ticker)
    }

    async fn next(&mut self) -> FeedItem {
        match self {
            Feed::Connecting(connect) => FeedItem::Connected(connect.as_mut().await),
            Feed::Live(live) => FeedItem::Live(live.recv().await),
            Feed::Simulated(ticker) => {
                ticker.tick().await;
                FeedItem::Simulate
            }
        }
    }
}

/// The task that owns the lobby
pub struct LobbyService<R: Rng = StdRng> {
    config: LobbyServiceConfig,
    controller: LobbyController<R>,
    commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<LobbyEvent>,
    metrics: Arc<Metrics>,
    latest: Option<LobbySnapshot>,
}

impl<R: Rng + Send + 'static> LobbyService<R> {
    /// Spawn the service; returns its handle and the presentation event stream
    pub fn spawn(
        config: LobbyServiceConfig,
        simulator: LobbySimulator<R>,
        metrics: Arc<Metrics>,
    ) -> (LobbyHandle, mpsc::UnboundedReceiver<LobbyEvent>) {
        let (command_tx, commands) = mpsc::channel(32);
        let (events, event_rx) = mpsc::unbounded_channel();

        let service = Self {
            config,
            controller: LobbyController::new(simulator),
            commands,
            events,
            metrics,
            latest: None,
        };
        tokio::spawn(service.run());

        (LobbyHandle { commands: command_tx }, event_rx)
    }

    async fn run(mut self) {
        let mut feed = self.open_feed();
        let mut tick_timer: Option<(u64, Interval)> = None;

        info!("Lobby service started");

        loop {
            self.sync_tick_timer(&mut tick_timer);

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                _ = next_tick(&mut tick_timer) => {
                    let events = self.controller.tick();
                    self.emit_all(events);
                }
                item = feed.next() => {
                    if let Some(next) = self.handle_feed(item) {
                        feed = next;
                    }
                }
            }
        }

        if let Feed::Live(live) = feed {
            let status = live.disconnect().await;
            self.set_transport(status);
        }
        info!("Lobby service stopped");
    }

    fn open_feed(&mut self) -> Feed {
        match self.config.endpoint.clone() {
            Some(endpoint) => {
                info!("Connecting to lobby service at {}", endpoint);
                let adapter =
                    TransportAdapter::new(self.config.connect_timeout, self.config.live_poll_interval);
                Feed::Connecting(Box::pin(async move { adapter.connect(&endpoint).await }))
            }
            None => {
                info!("No lobby service configured, using simulation");
                self.set_transport(TransportStatus::Unavailable);
                Feed::simulated(self.config.simulated_poll_interval)
            }
        }
    }

    /// Returns the replacement feed when the source changes
    fn handle_feed(&mut self, item: FeedItem) -> Option<Feed> {
        match item {
            FeedItem::Connected(Ok(live)) => {
                self.set_transport(TransportStatus::Connected);
                Some(Feed::Live(live))
            }
            FeedItem::Connected(Err(e)) => {
                info!("Lobby service not available ({}), using simulation", e);
                self.set_transport(TransportStatus::Unavailable);
                Some(Feed::simulated(self.config.simulated_poll_interval))
            }
            FeedItem::Live(Some(TransportEvent::Snapshot(snapshot))) => {
                self.publish_snapshot(snapshot);
                None
            }
            FeedItem::Live(Some(TransportEvent::Disconnected)) | FeedItem::Live(None) => {
                warn!("Lost lobby service, falling back to simulation");
                self.set_transport(TransportStatus::Disconnected);
                Some(Feed::simulated(self.config.simulated_poll_interval))
            }
            FeedItem::Simulate => {
                let snapshot = self.controller.simulator_mut().snapshot();
                self.publish_snapshot(snapshot);
                None
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Operate(operation, reply) => {
                let _ = reply.send(self.apply(operation));
            }
            Command::Session(reply) => {
                let _ = reply.send(self.controller.session().clone());
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.latest);
            }
            Command::CreateRoom(name, reply) => {
                let code = invite::room_code(self.controller.simulator_mut());
                let url = invite::private_room_url(&code, &name);
                info!("Private room {} created", code);
                let _ = reply.send(url);
            }
            Command::Invite(origin, reply) => {
                let result = self
                    .apply(Operation::InviteFriend)
                    .map(|()| invite::invite_url(&origin, self.controller.invite_game_id()));
                let _ = reply.send(result);
            }
            Command::Shutdown => {}
        }
    }

    fn apply(&mut self, operation: Operation) -> Result<(), LobbyError> {
        let result = match operation {
            Operation::StartSearch => self.controller.start_search(),
            Operation::InviteFriend => self.controller.invite_friend(),
            Operation::Cancel => self.controller.cancel(),
            Operation::Ready => self.controller.ready(),
            Operation::Launch => self.controller.launch(),
        };

        match result {
            Ok(events) => {
                self.emit_all(events);
                Ok(())
            }
            Err(e) => {
                warn!("Rejected lobby operation: {}", e);
                Err(e)
            }
        }
    }

    /// Keep the tick interval in step with the controller's ticker
    fn sync_tick_timer(&self, timer: &mut Option<(u64, Interval)>) {
        match self.controller.ticker() {
            Ticker::Stopped => *timer = None,
            Ticker::Running { generation } => {
                if timer.as_ref().map(|(g, _)| *g) != Some(generation) {
                    let period = self.config.tick_period;
                    let mut ticker = interval_at(Instant::now() + period, period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    *timer = Some((generation, ticker));
                }
            }
        }
    }

    fn publish_snapshot(&mut self, snapshot: LobbySnapshot) {
        debug!(
            "Lobby: {} online, {} waiting, {} matches ({:?})",
            snapshot.online_count, snapshot.waiting_count, snapshot.active_matches, snapshot.source
        );
        self.latest = Some(snapshot);
        self.emit(LobbyEvent::Snapshot(snapshot));
    }

    fn set_transport(&mut self, status: TransportStatus) {
        self.metrics.set_transport(status);
        self.emit(LobbyEvent::Transport(status));
    }

    fn emit_all(&mut self, events: Vec<LobbyEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    fn emit(&mut self, event: LobbyEvent) {
        self.metrics.record_lobby_event(&event);
        // Nobody listening is fine; the lobby keeps running headless
        let _ = self.events.send(event);
    }
}

async fn next_tick(timer: &mut Option<(u64, Interval)>) {
    match timer {
        Some((_, ticker)) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lobby::session::Phase;
    use crate::lobby::snapshot::SnapshotSource;
    use crate::net::framing::{read_json, write_json};
    use crate::net::protocol::{ClientMessage, LobbyStats, ServerMessage};
    use tokio::net::TcpListener;

    fn spawn_simulated() -> (LobbyHandle, mpsc::UnboundedReceiver<LobbyEvent>) {
        LobbyService::spawn(
            LobbyServiceConfig::default(),
            LobbySimulator::seeded(11),
            Arc::new(Metrics::new()),
        )
    }

    /// Block until the session reaches `phase`, returning it
    async fn wait_for_phase(
        events: &mut mpsc::UnboundedReceiver<LobbyEvent>,
        phase: Phase,
    ) -> Option<MatchmakingSession> {
        while let Some(event) = events.recv().await {
            if let LobbyEvent::PhaseChanged(session) = event {
                if session.phase == phase {
                    return Some(session);
                }
            }
        }
        None
    }

    fn drain(events: &mut mpsc::UnboundedReceiver<LobbyEvent>) -> Vec<LobbyEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_finds_match_after_fifteen_seconds() {
        let (handle, mut events) = spawn_simulated();
        let started = Instant::now();

        handle.start_search().await.unwrap();
        let session = wait_for_phase(&mut events, Phase::MatchFound).await.unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(15), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(16), "{:?}", elapsed);
        assert_eq!(session.remaining_seconds, 10);
        assert!(session.opponent.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_private_rooms() {
        let (handle, _events) = spawn_simulated();

        let url = handle.create_private_room("Dusty Saloon").await.unwrap();
        assert!(url.starts_with("/cowboy-game/?room="));
        assert!(url.ends_with("&name=Dusty%20Saloon"));
        let code = &url["/cowboy-game/?room=".len()..url.find('&').unwrap()];
        assert_eq!(code.len(), 6);

        let default_name = handle.create_private_room("  ").await.unwrap();
        assert!(default_name.ends_with("&name=Private%20Room"));

        // Matchmaking is untouched
        assert_eq!(handle.session().await.unwrap().phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invite_link_names_waiting_game() {
        let (handle, mut events) = spawn_simulated();

        let link = handle.invite_friend("http://localhost:8000/").await.unwrap();
        let session = wait_for_phase(&mut events, Phase::WaitingForFriend).await.unwrap();
        let game_id = session.invite.unwrap().game_id;

        assert_eq!(link, format!("http://localhost:8000/cowboy-game/?invite={}", game_id));
        assert_eq!(game_id.len(), 8);

        // One invite at a time
        assert!(matches!(
            handle.invite_friend("http://localhost:8000").await,
            Err(ServiceError::Lobby(LobbyError::InvalidTransition { .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_for_friend_checks_once_after_five_seconds() {
        let mut joined = 0;
        let mut stood_up = 0;

        for seed in 0..40 {
            let (handle, mut events) = LobbyService::spawn(
                LobbyServiceConfig::default(),
                LobbySimulator::seeded(seed),
                Arc::new(Metrics::new()),
            );
            handle.invite_friend("http://localhost:8000").await.unwrap();

            tokio::time::sleep(Duration::from_millis(4500)).await;
            let session = handle.session().await.unwrap();
            assert_eq!(session.phase, Phase::WaitingForFriend);
            assert_eq!(session.players(), 1);

            tokio::time::sleep(Duration::from_secs(1)).await;
            let session = handle.session().await.unwrap();
            assert_eq!(session.phase, Phase::WaitingForFriend);

            if session.players() == 2 {
                joined += 1;
                assert!(drain(&mut events)
                    .iter()
                    .any(|e| matches!(e, LobbyEvent::FriendJoined(_))));

                // Match shows one second after the friend arrives
                tokio::time::sleep(Duration::from_secs(1)).await;
                let session = handle.session().await.unwrap();
                assert_eq!(session.phase, Phase::MatchFound);
                assert!(session.opponent.is_some());
            } else {
                stood_up += 1;
                tokio::time::sleep(Duration::from_secs(20)).await;
                let session = handle.session().await.unwrap();
                assert_eq!(session.phase, Phase::WaitingForFriend);
                assert_eq!(session.players(), 1);

                // Play with AI
                handle.launch().await.unwrap();
                wait_for_phase(&mut events, Phase::Launched).await.unwrap();
            }

            handle.shutdown().await;
        }

        assert!(joined > 0 && stood_up > 0, "joined {} stood up {}", joined, stood_up);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_counts_down_to_launch() {
        let (handle, mut events) = spawn_simulated();

        handle.start_search().await.unwrap();
        wait_for_phase(&mut events, Phase::MatchFound).await.unwrap();

        // Nothing ticks while waiting for the player
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(handle.session().await.unwrap().phase, Phase::MatchFound);

        let ready_at = Instant::now();
        handle.ready().await.unwrap();
        wait_for_phase(&mut events, Phase::Launched).await.unwrap();
        assert!(ready_at.elapsed() >= Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(5)).await;
        let after: Vec<_> = drain(&mut events)
            .into_iter()
            .filter(|e| !matches!(e, LobbyEvent::Snapshot(_)))
            .collect();
        assert!(
            after.iter().all(|e| matches!(e, LobbyEvent::Launched { .. })),
            "{:?}",
            after
        );
        assert_eq!(handle.session().await.unwrap().phase, Phase::Launched);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_session_updates() {
        let (handle, mut events) = spawn_simulated();

        handle.start_search().await.unwrap();
        tokio::time::sleep(Duration::from_millis(5500)).await;
        assert_eq!(handle.session().await.unwrap().remaining_seconds, 10);

        handle.cancel().await.unwrap();
        drain(&mut events);

        tokio::time::sleep(Duration::from_secs(30)).await;
        let after = drain(&mut events);
        assert!(!after.is_empty());
        assert!(after.iter().all(|e| matches!(e, LobbyEvent::Snapshot(_))));

        let session = handle.session().await.unwrap();
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.remaining_seconds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_snapshots_every_three_seconds() {
        let (handle, mut events) = spawn_simulated();

        tokio::time::sleep(Duration::from_millis(9500)).await;
        let snapshots: Vec<_> = drain(&mut events)
            .into_iter()
            .filter_map(|e| match e {
                LobbyEvent::Snapshot(s) => Some(s),
                _ => None,
            })
            .collect();

        // t = 0, 3, 6, 9
        assert_eq!(snapshots.len(), 4);
        assert!(snapshots.iter().all(|s| s.source == SnapshotSource::Simulated));
        assert_eq!(handle.snapshot().await.unwrap(), snapshots.last().copied());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_operation_is_reported() {
        let (handle, _events) = spawn_simulated();

        let err = handle.ready().await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Lobby(LobbyError::InvalidTransition {
                phase: Phase::Idle,
                operation: Operation::Ready,
            })
        );
        assert_eq!(handle.session().await.unwrap().phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_after_shutdown() {
        let (handle, _events) = spawn_simulated();

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(handle.start_search().await, Err(ServiceError::Closed));
    }

    #[tokio::test]
    async fn test_shutdown_disconnects_live_feed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            write_json(&mut socket, &ServerMessage::Connected).await.unwrap();
            while let Ok(ClientMessage::GetLobbyStats) =
                read_json::<ClientMessage, _>(&mut socket).await
            {
                let stats = LobbyStats { online: 8, waiting: 1, active_matches: Some(2) };
                if write_json(&mut socket, &ServerMessage::LobbyUpdate(stats)).await.is_err() {
                    break;
                }
            }
        });

        let config = LobbyServiceConfig {
            endpoint: Some(addr),
            connect_timeout: Duration::from_secs(2),
            live_poll_interval: Duration::from_millis(50),
            ..Default::default()
        };
        let metrics = Arc::new(Metrics::new());
        let (handle, mut events) =
            LobbyService::spawn(config, LobbySimulator::seeded(4), metrics.clone());

        assert_eq!(
            events.recv().await,
            Some(LobbyEvent::Transport(TransportStatus::Connected))
        );
        assert_eq!(
            events.recv().await,
            Some(LobbyEvent::Snapshot(LobbySnapshot::live(8, 1, 2)))
        );

        handle.shutdown().await;

        // Drain until the service task ends and drops its sender
        let mut after = Vec::new();
        while let Some(event) = events.recv().await {
            after.push(event);
        }
        assert_eq!(
            after.last(),
            Some(&LobbyEvent::Transport(TransportStatus::Disconnected))
        );
        assert!(!after
            .iter()
            .any(|e| matches!(e, LobbyEvent::Snapshot(s) if s.source == SnapshotSource::Simulated)));
        assert!(metrics.to_json().contains("\"disconnected\""));

        // The game server sees the connection close
        tokio::time::timeout(Duration::from_secs(2), server)
            .await
            .expect("game server still connected")
            .unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back_to_simulation() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let config = LobbyServiceConfig {
            endpoint: Some(addr),
            connect_timeout: Duration::from_millis(200),
            simulated_poll_interval: Duration::from_millis(50),
            ..Default::default()
        };
        let (_handle, mut events) =
            LobbyService::spawn(config, LobbySimulator::seeded(2), Arc::new(Metrics::new()));

        assert_eq!(
            events.recv().await,
            Some(LobbyEvent::Transport(TransportStatus::Unavailable))
        );
        match events.recv().await {
            Some(LobbyEvent::Snapshot(s)) => assert_eq!(s.source, SnapshotSource::Simulated),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_live_feed_then_fallback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            write_json(&mut socket, &ServerMessage::Connected).await.unwrap();
            let _: ClientMessage = read_json(&mut socket).await.unwrap();
            let stats = LobbyStats { online: 42, waiting: 7, active_matches: Some(9) };
            write_json(&mut socket, &ServerMessage::LobbyUpdate(stats)).await.unwrap();
        });

        let config = LobbyServiceConfig {
            endpoint: Some(addr),
            connect_timeout: Duration::from_secs(2),
            live_poll_interval: Duration::from_secs(1),
            simulated_poll_interval: Duration::from_millis(50),
            ..Default::default()
        };
        let (handle, mut events) =
            LobbyService::spawn(config, LobbySimulator::seeded(2), Arc::new(Metrics::new()));

        assert_eq!(
            events.recv().await,
            Some(LobbyEvent::Transport(TransportStatus::Connected))
        );
        assert_eq!(
            events.recv().await,
            Some(LobbyEvent::Snapshot(LobbySnapshot::live(42, 7, 9)))
        );
        assert_eq!(
            handle.snapshot().await.unwrap(),
            Some(LobbySnapshot::live(42, 7, 9))
        );

        assert_eq!(
            events.recv().await,
            Some(LobbyEvent::Transport(TransportStatus::Disconnected))
        );
        match events.recv().await {
            Some(LobbyEvent::Snapshot(s)) => assert_eq!(s.source, SnapshotSource::Simulated),
            other => panic!("unexpected {:?}", other),
        }
    }
}
