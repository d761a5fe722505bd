//! TCP listener and top-level gateway wiring.
//!
//! Binds the configured address (bumping the port a few times if it is in
//! use), accepts connections up to the configured cap, and spawns one
//! handler task per client.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use clob_core::MatchingEngine;
use clob_protocol::ServerEvent;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{info, warn};

use crate::config::Config;
use crate::types::{ClientId, ClientRegistry};

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_client_id() -> ClientId {
    ClientId(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Max number of times to bump the port when it is already in use.
const MAX_PORT_RETRIES: u16 = 3;

/// Run the accept loop. Returns only on listener failure.
pub async fn run(
    mut config: Config,
    engine: Arc<MatchingEngine>,
    events: broadcast::Sender<ServerEvent>,
) -> io::Result<()> {
    let (listener, port) = bind_with_retry(&mut config).await?;
    config.port = port;
    info!(addr = %config.socket_addr_string(), max_clients = config.max_clients, "gateway listening");

    let clients: ClientRegistry = Arc::new(RwLock::new(HashMap::new()));

    loop {
        let (stream, peer_addr) = listener.accept().await?;

        if clients.read().await.len() >= config.max_clients {
            warn!(%peer_addr, max_clients = config.max_clients, "rejecting connection: client cap reached");
            continue;
        }

        let client_id = next_client_id();
        info!(client = client_id.0, %peer_addr, "client connected");

        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        clients.write().await.insert(client_id, reply_tx.clone());

        let engine = engine.clone();
        let subscription = events.subscribe();
        let clients = clients.clone();
        tokio::spawn(async move {
            if let Err(err) = crate::client::run_client(
                client_id,
                stream,
                engine,
                subscription,
                reply_tx,
                reply_rx,
                clients,
            )
            .await
            {
                warn!(client = client_id.0, %err, "client handler failed");
            }
        });
    }
}

/// Try to bind, bumping the port by one on `AddrInUse`, up to
/// `MAX_PORT_RETRIES` attempts.
async fn bind_with_retry(config: &mut Config) -> io::Result<(TcpListener, u16)> {
    let mut port = config.port;
    let mut attempt = 0u16;
    loop {
        attempt += 1;
        let addr = format!("{}:{}", config.bind_addr, port);
        match TcpListener::bind(&addr).await {
            Ok(listener) => return Ok((listener, port)),
            Err(err) if err.kind() == io::ErrorKind::AddrInUse && attempt < MAX_PORT_RETRIES => {
                warn!(%addr, attempt, "port in use, trying next");
                port += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
