//! Typed wire messages.
//!
//! Requests are tagged by `action`, events by `event`. Prices and
//! quantities travel as strings; timestamps are milliseconds since the
//! Unix epoch and are stamped by the gateway, never trusted from clients.

use serde::{Deserialize, Serialize};

use clob_core::{BestBidOffer, Order, OrderType, Price, Quantity, Side, Trade};

/// A new-order request as received from a client.
///
/// There is no timestamp field: the receiver stamps orders on arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub id: u64,
    pub symbol: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
}

impl OrderRequest {
    /// Build the engine-side order, stamping the acquisition time.
    pub fn into_order(self, timestamp_ms: i64) -> Order {
        Order::new(
            self.id,
            self.symbol,
            self.side,
            self.order_type,
            self.quantity,
            self.price,
            timestamp_ms,
        )
    }
}

/// One request per line, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientRequest {
    Submit { order: OrderRequest },
    Cancel { symbol: String, id: u64 },
    Modify { symbol: String, id: u64, quantity: Quantity },
    Bbo { symbol: String },
    Depth { symbol: String, levels: usize },
}

/// One event per line, tagged by `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// An execution; broadcast to every connected client.
    Trade(Trade),
    /// Top-of-book after an applied mutation; broadcast.
    BboUpdate(BboUpdate),
    /// Depth answer to a `depth` request; unicast.
    Depth(DepthLevels),
    /// Enqueue acknowledgement for a mutation request; unicast.
    Accepted(Accepted),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BboUpdate {
    pub symbol: String,
    #[serde(flatten)]
    pub bbo: BestBidOffer,
}

impl BboUpdate {
    pub fn new(symbol: impl Into<String>, bbo: BestBidOffer) -> Self {
        BboUpdate {
            symbol: symbol.into(),
            bbo,
        }
    }
}

/// Flat depth: bid levels in descending price order followed by ask levels
/// in ascending price order, as `[price, quantity]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthLevels {
    pub symbol: String,
    pub levels: Vec<(Price, Quantity)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accepted {
    pub symbol: String,
    pub id: u64,
}
