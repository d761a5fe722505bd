//! Snapshot types for top-of-book and depth queries.

use serde::{Deserialize, Serialize};

use crate::numeric::{Price, Quantity};

/// Best bid and offer with their aggregate level quantities.
///
/// A side with no resting orders leaves both of its fields absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BestBidOffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_bid: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_offer: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_bid_quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_offer_quantity: Option<Quantity>,
}

impl BestBidOffer {
    /// `true` when neither side has resting orders.
    pub fn is_empty(&self) -> bool {
        self.best_bid.is_none() && self.best_offer.is_none()
    }
}

/// Aggregate depth: up to N levels per side, best-first.
///
/// Bids are in descending price order, asks ascending. [`concat`] produces
/// the flat bids-then-asks sequence used by the wire-level depth response.
///
/// [`concat`]: DepthSnapshot::concat
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub bids: Vec<(Price, Quantity)>,
    pub asks: Vec<(Price, Quantity)>,
}

impl DepthSnapshot {
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Flatten into one sequence: bid levels (descending price) followed by
    /// ask levels (ascending price).
    pub fn concat(self) -> Vec<(Price, Quantity)> {
        let mut levels = self.bids;
        levels.extend(self.asks);
        levels
    }
}
