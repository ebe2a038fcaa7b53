//! Local demo HTTP server host utilities.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Fixed route table: request path, file under the content root, content type.
const ROUTES: &[(&str, &str, &str)] = &[
    ("/", "index.html", "text/html"),
    ("/data.json", "data.json", "application/json"),
];

const RELOAD_CHANNEL_CAPACITY: usize = 16;

/// Signal broadcast to every connected socket when a reload is requested.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReloadSignal {
    pub action: &'static str,
}

impl ReloadSignal {
    pub fn reload() -> Self {
        Self { action: "reload" }
    }
}

#[derive(Debug)]
struct ServerState {
    content_root: PathBuf,
    reload_tx: broadcast::Sender<String>,
}

/// Host configuration for a local demo server instance.
#[derive(Debug, Clone)]
pub struct DemoServer {
    bind_address: SocketAddr,
    content_root: PathBuf,
}

impl DemoServer {
    /// Create a server bound to the provided address, serving files from
    /// `content_root`.
    pub fn new(bind_address: SocketAddr, content_root: PathBuf) -> Self {
        Self {
            bind_address,
            content_root,
        }
    }

    /// Start the server and return a handle for runtime inspection and
    /// shutdown.
    pub async fn start(self) -> Result<RunningDemoServer> {
        let (reload_tx, _) = broadcast::channel(RELOAD_CHANNEL_CAPACITY);
        let state = Arc::new(ServerState {
            content_root: self.content_root,
            reload_tx,
        });

        let router = Router::new()
            .route("/ws", any(upgrade_socket))
            .fallback(serve_static)
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(self.bind_address).await?;
        let bound_address = listener.local_addr()?;
        let cancellation_token = CancellationToken::new();

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                let _ = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await;
            }
        });

        info!(address = %bound_address, "Demo server listening");
        Ok(RunningDemoServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
        })
    }
}

/// Runtime handle for a running demo server.
#[derive(Debug)]
pub struct RunningDemoServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningDemoServer {
    /// Return the bound socket address for the running server.
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop the server and wait for the serve task to finish.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("demo server task failed: {error}"))?;
        Ok(())
    }
}

/// Resolve a safe local bind address for the demo server.
pub fn resolve_bind_address(bind_address: Option<&str>) -> Result<SocketAddr> {
    let address = bind_address.unwrap_or("127.0.0.1:0");
    let parsed: SocketAddr = address
        .parse()
        .map_err(|error| anyhow!("invalid demo bind address '{address}': {error}"))?;
    if !is_loopback(parsed.ip()) {
        return Err(anyhow!("demo server must bind to a loopback address"));
    }
    Ok(parsed)
}

fn is_loopback(address: IpAddr) -> bool {
    match address {
        IpAddr::V4(ip) => ip.is_loopback(),
        IpAddr::V6(ip) => ip.is_loopback(),
    }
}

fn route_for(path: &str) -> Option<(&'static str, &'static str)> {
    ROUTES
        .iter()
        .find(|(route, _, _)| *route == path)
        .map(|(_, file, content_type)| (*file, *content_type))
}

async fn serve_static(State(state): State<Arc<ServerState>>, uri: Uri) -> Response {
    let Some((file, content_type)) = route_for(uri.path()) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    match tokio::fs::read(state.content_root.join(file)).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(error) => {
            warn!(file, error = %error, "Failed to read demo file");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

async fn upgrade_socket(State(state): State<Arc<ServerState>>, upgrade: WebSocketUpgrade) -> Response {
    upgrade.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Forward reload broadcasts to this socket; any incoming text message
/// triggers a broadcast to every connected socket, sender included.
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("WebSocket connection established");
    let mut reload_rx = state.reload_tx.subscribe();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        info!(message = %text, "WebSocket message received");
                        if let Ok(payload) = serde_json::to_string(&ReloadSignal::reload()) {
                            let _ = state.reload_tx.send(payload);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
            outgoing = reload_rx.recv() => {
                match outgoing {
                    Ok(payload) => {
                        if sink.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_table_maps_known_paths() {
        assert_eq!(route_for("/"), Some(("index.html", "text/html")));
        assert_eq!(route_for("/data.json"), Some(("data.json", "application/json")));
        assert_eq!(route_for("/missing"), None);
    }

    #[test]
    fn reload_signal_serializes_to_the_wire_shape() {
        let payload = serde_json::to_string(&ReloadSignal::reload()).unwrap();
        assert_eq!(payload, r#"{"action":"reload"}"#);
    }

    #[test]
    fn bind_address_defaults_to_loopback() {
        let address = resolve_bind_address(None).unwrap();
        assert!(address.ip().is_loopback());
    }

    #[test]
    fn bind_address_rejects_non_loopback() {
        assert!(resolve_bind_address(Some("0.0.0.0:8000")).is_err());
        assert!(resolve_bind_address(Some("not an address")).is_err());
    }
}
