//! Shared gateway types: client handles, channel aliases, registry.

use std::collections::HashMap;
use std::sync::Arc;

use clob_protocol::ServerEvent;
use tokio::sync::{mpsc, RwLock};

/// Identifier for a connected client, unique for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

/// Unicast channel carrying replies (acks, query answers) to one client.
pub type OutboundTx = mpsc::UnboundedSender<ServerEvent>;
pub type OutboundRx = mpsc::UnboundedReceiver<ServerEvent>;

/// Registry of connected clients and their unicast channels.
pub type ClientRegistry = Arc<RwLock<HashMap<ClientId, OutboundTx>>>;
