use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use yeti_arcade_server::config::ServerConfig;
use yeti_arcade_server::http::server::FileServer;
use yeti_arcade_server::http::static_files::StaticFiles;
use yeti_arcade_server::lobby::controller::LobbyEvent;
use yeti_arcade_server::lobby::service::{LobbyHandle, LobbyService};
use yeti_arcade_server::lobby::snapshot::LobbySimulator;
use yeti_arcade_server::metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Yeti Arcade Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ServerConfig::load_or_default();
    if let Err(e) = config.validate() {
        anyhow::bail!("Invalid configuration: {}", e);
    }
    info!(
        "Configuration loaded: {}, root={}, game_server={}",
        config.socket_addr(),
        config.root_dir.display(),
        config.game_server.as_deref().unwrap_or("none")
    );

    let metrics = Arc::new(Metrics::new());

    let simulator = match config.lobby_seed {
        Some(seed) => LobbySimulator::seeded(seed),
        None => LobbySimulator::from_entropy(),
    };
    let (lobby, events) = LobbyService::spawn(config.lobby_config(), simulator, metrics.clone());

    tokio::spawn(present(events));
    let origin = format!("http://localhost:{}", config.port);
    tokio::spawn(console(lobby.clone(), origin));

    let server = FileServer::new(StaticFiles::new(&config.root_dir), metrics);

    // Shutdown signal handler
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    tokio::select! {
        result = server.serve(config.socket_addr()) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown => {
            info!("Shutting down...");
        }
    }

    lobby.shutdown().await;
    info!("Server stopped");

    Ok(())
}

/// Log lobby updates for the operator
async fn present(mut events: UnboundedReceiver<LobbyEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            LobbyEvent::Snapshot(s) => info!(
                "Lobby: {} online, {} searching, {} matches ({:?})",
                s.online_count, s.waiting_count, s.active_matches, s.source
            ),
            LobbyEvent::PhaseChanged(session) => match session.opponent_name() {
                Some(name) => info!("Matchmaking {} vs {}", session.phase, name),
                None => info!("Matchmaking {}", session.phase),
            },
            LobbyEvent::Tick(session) => debug!("{} {}s", session.phase, session.remaining_seconds),
            LobbyEvent::FriendJoined(session) => {
                info!("Friend joined ({}/2 players)", session.players())
            }
            LobbyEvent::Launched { url, .. } => info!("Launching game at {}", url),
            LobbyEvent::Transport(status) => info!("Lobby transport {:?}", status),
        }
    }
}

/// Drive the lobby from stdin: `search`, `cancel`, `ready`, `launch`,
/// `room <name>` and `invite`
async fn console(lobby: LobbyHandle, origin: String) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let (command, arg) = line.trim().split_once(' ').unwrap_or((line.trim(), ""));
        let result = match command {
            "" => continue,
            "search" => lobby.start_search().await,
            "cancel" => lobby.cancel().await,
            "ready" => lobby.ready().await,
            "launch" => lobby.launch().await,
            "room" => lobby
                .create_private_room(arg)
                .await
                .map(|url| info!("Private room: {}", url)),
            "invite" => lobby
                .invite_friend(&origin)
                .await
                .map(|url| info!("Waiting for a friend, share: {}", url)),
            other => {
                warn!(
                    "Unknown command '{}' (search, cancel, ready, launch, room <name>, invite)",
                    other
                );
                continue;
            }
        };

        if let Err(e) = result {
            warn!("{}", e);
        }
    }
}
