//! Trade events produced by the matching sweep.

use serde::{Deserialize, Serialize};

use crate::numeric::{Price, Quantity};
use crate::side::Side;

/// An execution between a resting maker order and an incoming taker.
///
/// The price is always the maker's resting price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub maker_order_id: u64,
    pub taker_order_id: u64,
    pub symbol: String,
    pub price: Price,
    pub quantity: Quantity,
    pub aggressor_side: Side,
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
}

impl Trade {
    pub fn new(
        maker_order_id: u64,
        taker_order_id: u64,
        symbol: impl Into<String>,
        price: Price,
        quantity: Quantity,
        aggressor_side: Side,
        timestamp_ms: i64,
    ) -> Self {
        Trade {
            maker_order_id,
            taker_order_id,
            symbol: symbol.into(),
            price,
            quantity,
            aggressor_side,
            timestamp_ms,
        }
    }
}
