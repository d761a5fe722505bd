//! Callback contracts for trade and top-of-book consumers.
//!
//! Sinks are invoked synchronously while the owning book's guard is held.
//! Implementations must be non-blocking and must not call back into the
//! engine; the usual implementation pushes onto an outbound fan-out queue.

use crate::top_of_book::BestBidOffer;
use crate::trade::Trade;

/// Receives every trade emitted by a matching sweep, in fill order.
pub trait TradeSink: Send + Sync {
    fn on_trade(&self, trade: &Trade);
}

impl<F> TradeSink for F
where
    F: Fn(&Trade) + Send + Sync,
{
    fn on_trade(&self, trade: &Trade) {
        self(trade)
    }
}

/// Receives the current best bid/offer after every applied mutation.
pub trait BboSink: Send + Sync {
    fn on_bbo_update(&self, symbol: &str, bbo: &BestBidOffer);
}

impl<F> BboSink for F
where
    F: Fn(&str, &BestBidOffer) + Send + Sync,
{
    fn on_bbo_update(&self, symbol: &str, bbo: &BestBidOffer) {
        self(symbol, bbo)
    }
}
