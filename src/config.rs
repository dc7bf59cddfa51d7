use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::lobby::constants::feed;
use crate::lobby::service::LobbyServiceConfig;
use crate::net::transport::normalize_endpoint;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the file server to
    pub bind_address: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory the site is served from
    pub root_dir: PathBuf,
    /// External game server providing live lobby statistics (`host:port`)
    pub game_server: Option<String>,
    /// How long to wait for the game server's greeting
    pub connect_timeout: Duration,
    /// Fixed seed for the lobby simulation (random when unset)
    pub lobby_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8000,
            root_dir: PathBuf::from("."),
            game_server: Some("127.0.0.1:3000".to_string()),
            connect_timeout: feed::CONNECT_TIMEOUT,
            lobby_seed: None,
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config through `lookup` (environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIND_ADDRESS") {
            if let Ok(parsed) = addr.parse() {
                config.bind_address = parsed;
            } else {
                tracing::warn!("Invalid BIND_ADDRESS '{}', using default", addr);
            }
        }

        if let Some(port) = lookup("PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                if parsed > 0 {
                    config.port = parsed;
                } else {
                    tracing::warn!("PORT must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid PORT '{}', using default", port);
            }
        }

        if let Some(root) = lookup("ROOT_DIR") {
            if root.trim().is_empty() {
                tracing::warn!("ROOT_DIR is empty, using default");
            } else {
                config.root_dir = PathBuf::from(root);
            }
        }

        if let Some(url) = lookup("GAME_SERVER_URL") {
            let endpoint = normalize_endpoint(&url);
            // An empty value turns the live feed off
            config.game_server = if endpoint.is_empty() { None } else { Some(endpoint) };
        }

        if let Some(timeout) = lookup("CONNECT_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) if ms > 0 => config.connect_timeout = Duration::from_millis(ms),
                _ => tracing::warn!("Invalid CONNECT_TIMEOUT_MS '{}', using default", timeout),
            }
        }

        if let Some(seed) = lookup("LOBBY_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.lobby_seed = Some(parsed);
            } else {
                tracing::warn!("Invalid LOBBY_SEED '{}', ignoring", seed);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0".to_string());
        }
        if self.root_dir.as_os_str().is_empty() {
            return Err("root_dir cannot be empty".to_string());
        }
        if self.connect_timeout.is_zero() {
            return Err("connect_timeout must be positive".to_string());
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Settings for the lobby service task
    pub fn lobby_config(&self) -> LobbyServiceConfig {
        LobbyServiceConfig {
            endpoint: self.game_server.clone(),
            connect_timeout: self.connect_timeout,
            ..LobbyServiceConfig::default()
        }
    }
}
