//! Per-client connection handler.
//!
//! One task reads request lines and drives the engine; a writer task
//! multiplexes unicast replies and broadcast trade/BBO events back onto the
//! socket. Malformed lines are logged and skipped; line framing survives
//! garbage input.

use std::sync::Arc;

use clob_core::{now_millis, MatchingEngine};
use clob_protocol::{
    codec, Accepted, BboUpdate, ClientRequest, DepthLevels, ServerEvent,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::types::{ClientId, ClientRegistry, OutboundRx, OutboundTx};

/// Run the I/O loops for one connection until it disconnects.
pub async fn run_client(
    client_id: ClientId,
    stream: TcpStream,
    engine: Arc<MatchingEngine>,
    events: broadcast::Receiver<ServerEvent>,
    replies: OutboundTx,
    reply_rx: OutboundRx,
    clients: ClientRegistry,
) -> std::io::Result<()> {
    let peer_addr = stream.peer_addr().ok();
    let (read_half, write_half) = stream.into_split();

    let writer = tokio::spawn(write_loop(client_id, write_half, events, reply_rx));

    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match codec::decode_request(&line) {
                    Ok(request) => handle_request(request, &engine, &replies),
                    Err(err) => {
                        warn!(client = client_id.0, %err, "dropping malformed request line");
                    }
                }
            }
            Ok(None) => {
                debug!(client = client_id.0, ?peer_addr, "client disconnected");
                break;
            }
            Err(err) => {
                debug!(client = client_id.0, ?peer_addr, %err, "client read error");
                break;
            }
        }
    }

    // Deregister; dropping our reply sender lets the writer task finish.
    clients.write().await.remove(&client_id);
    drop(replies);
    let _ = writer.await;
    Ok(())
}

/// Apply one decoded request. Mutations are enqueued (the engine worker
/// applies them later, in queue order); reads are answered immediately.
fn handle_request(request: ClientRequest, engine: &MatchingEngine, replies: &OutboundTx) {
    match request {
        ClientRequest::Submit { order } => {
            let symbol = order.symbol.clone();
            let id = order.id;
            engine.submit(&symbol, order.into_order(now_millis()));
            let _ = replies.send(ServerEvent::Accepted(Accepted { symbol, id }));
        }
        ClientRequest::Cancel { symbol, id } => {
            engine.cancel(&symbol, id);
            let _ = replies.send(ServerEvent::Accepted(Accepted { symbol, id }));
        }
        ClientRequest::Modify { symbol, id, quantity } => {
            engine.modify(&symbol, id, quantity);
            let _ = replies.send(ServerEvent::Accepted(Accepted { symbol, id }));
        }
        ClientRequest::Bbo { symbol } => {
            let bbo = engine.bbo(&symbol);
            let _ = replies.send(ServerEvent::BboUpdate(BboUpdate::new(symbol, bbo)));
        }
        ClientRequest::Depth { symbol, levels } => {
            let levels = engine.depth(&symbol, levels);
            let _ = replies.send(ServerEvent::Depth(DepthLevels {
                symbol,
                levels,
            }));
        }
    }
}

/// Forward unicast replies and broadcast events to the socket until both
/// sources close or a write fails.
async fn write_loop(
    client_id: ClientId,
    mut writer: OwnedWriteHalf,
    mut events: broadcast::Receiver<ServerEvent>,
    mut reply_rx: OutboundRx,
) {
    loop {
        let event = tokio::select! {
            reply = reply_rx.recv() => match reply {
                Some(event) => event,
                None => break,
            },
            event = events.recv() => match event {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(client = client_id.0, skipped, "slow consumer skipped events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };

        let line = match codec::encode_event(&event) {
            Ok(line) => line,
            Err(err) => {
                warn!(client = client_id.0, %err, "failed to encode event");
                continue;
            }
        };
        if writer.write_all(line.as_bytes()).await.is_err()
            || writer.write_all(b"\n").await.is_err()
        {
            break;
        }
    }
    let _ = writer.shutdown().await;
}
