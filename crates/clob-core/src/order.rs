//! Order representation used inside the book and across the engine queue.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::numeric::{Price, Quantity};
use crate::order_type::OrderType;
use crate::side::Side;

/// A single order.
///
/// `quantity` is the remaining unfilled quantity; the matching sweep
/// decrements it in place. `price` is required for limit orders, ignored for
/// market orders, and optional for IOC/FOK (absent means market-style
/// crossing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub symbol: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Acquisition time in milliseconds since the Unix epoch. Diagnostic
    /// only; queue position within a level is positional, not time-derived.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    #[serde(skip, default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Order {
    pub fn new(
        id: u64,
        symbol: impl Into<String>,
        side: Side,
        order_type: OrderType,
        quantity: Quantity,
        price: Option<Price>,
        timestamp_ms: i64,
    ) -> Self {
        Order {
            id,
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            price,
            timestamp_ms,
            is_active: true,
        }
    }

    pub fn limit(
        id: u64,
        symbol: impl Into<String>,
        side: Side,
        quantity: Quantity,
        price: Price,
        timestamp_ms: i64,
    ) -> Self {
        Self::new(id, symbol, side, OrderType::Limit, quantity, Some(price), timestamp_ms)
    }

    pub fn market(
        id: u64,
        symbol: impl Into<String>,
        side: Side,
        quantity: Quantity,
        timestamp_ms: i64,
    ) -> Self {
        Self::new(id, symbol, side, OrderType::Market, quantity, None, timestamp_ms)
    }

    /// The price bound used by the crossing predicate.
    ///
    /// `None` means unbounded: cross at any opposite price. Market orders
    /// are always unbounded, even if a stray price was supplied.
    pub fn limit_price(&self) -> Option<Price> {
        match self.order_type {
            OrderType::Market => None,
            OrderType::Limit | OrderType::Ioc | OrderType::Fok => self.price,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.quantity.is_zero()
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as i64
}
