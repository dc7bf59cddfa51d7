//! HTTP/1.1 front end for the arcade hub
//!
//! One request per connection, answered and closed.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

use crate::http::response::Response;
use crate::http::static_files::StaticFiles;
use crate::metrics::Metrics;

/// Largest request head we read
const MAX_HEAD_SIZE: usize = 8 * 1024;
/// Clients that stall longer than this get dropped
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Static file server
#[derive(Clone)]
pub struct FileServer {
    files: Arc<StaticFiles>,
    metrics: Arc<Metrics>,
}

impl FileServer {
    pub fn new(files: StaticFiles, metrics: Arc<Metrics>) -> Self {
        Self {
            files: Arc::new(files),
            metrics,
        }
    }

    /// Bind and serve until the task is dropped
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server running at http://{}/", listener.local_addr()?);
        info!("Serving files from: {}", self.files.root().display());
        self.run(listener).await
    }

    /// Accept connections on an already bound listener
    pub async fn run(self, listener: TcpListener) -> anyhow::Result<()> {
        loop {
            let (socket, peer) = listener.accept().await?;
            let server = self.clone();

            tokio::spawn(async move {
                if let Err(e) = server.handle_connection(socket).await {
                    debug!("Connection from {} failed: {}", peer, e);
                }
            });
        }
    }

    async fn handle_connection(&self, mut socket: TcpStream) -> std::io::Result<()> {
        let head = match tokio::time::timeout(READ_TIMEOUT, read_head(&mut socket)).await {
            Ok(head) => head?,
            Err(_) => return Ok(()),
        };

        let (response, head_only) = match parse_request_line(&head) {
            Some((method, target)) => {
                let response = self.respond(method, target).await;
                info!("{} {} {}", method, target, response.status);
                (response, method == "HEAD")
            }
            None => (Response::bad_request(), false),
        };

        self.metrics.record_response(response.status, response.body.len());
        socket.write_all(&response.to_bytes(head_only)).await?;
        socket.shutdown().await
    }

    /// Route one request
    pub async fn respond(&self, method: &str, target: &str) -> Response {
        if method != "GET" && method != "HEAD" {
            return Response::method_not_allowed();
        }

        #[cfg(feature = "metrics")]
        {
            let path = target.split('?').next().unwrap_or(target);
            if path == "/metrics" {
                return Response::text(200, "text/plain; version=0.0.4", self.metrics.to_prometheus());
            }
            if path == "/metrics/json" {
                return Response::text(200, "application/json", self.metrics.to_json());
            }
        }

        self.files.serve(target).await
    }
}

/// Read until the blank line ending the request head
async fn read_head(socket: &mut TcpStream) -> std::io::Result<String> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() >= MAX_HEAD_SIZE {
            break;
        }
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// `GET /path HTTP/1.1` → `("GET", "/path")`
fn parse_request_line(head: &str) -> Option<(&str, &str)> {
    let line = head.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    let version = parts.next()?;

    if !version.starts_with("HTTP/") || !target.starts_with('/') {
        return None;
    }
    Some((method, target))
}
