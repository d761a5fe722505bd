//! Engine sink wiring.
//!
//! The book invokes its sinks while holding its guard, so the sinks here do
//! nothing but push onto a broadcast channel; every connected client holds
//! a subscription and forwards the events onto its socket.

use std::sync::Arc;

use clob_core::{BestBidOffer, MatchingEngine, Trade};
use clob_protocol::{BboUpdate, ServerEvent};
use tokio::sync::broadcast;

/// Capacity of the fan-out channel; slow clients that fall further behind
/// than this skip ahead and lose the oldest events.
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Build the engine with its trade/BBO sinks wired to a broadcast channel.
pub fn wire_engine() -> (MatchingEngine, broadcast::Sender<ServerEvent>) {
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    let trade_events = events.clone();
    let trade_sink = Arc::new(move |trade: &Trade| {
        // Send fails only when no client is subscribed; events are
        // fire-and-forget either way.
        let _ = trade_events.send(ServerEvent::Trade(trade.clone()));
    });

    let bbo_events = events.clone();
    let bbo_sink = Arc::new(move |symbol: &str, bbo: &BestBidOffer| {
        let _ = bbo_events.send(ServerEvent::BboUpdate(BboUpdate::new(symbol, *bbo)));
    });

    let engine = MatchingEngine::with_sinks(trade_sink, bbo_sink);
    (engine, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clob_core::{Order, Price, Quantity, Side};

    #[tokio::test]
    async fn crossing_orders_reach_subscribers() {
        let (engine, events) = wire_engine();
        let mut subscription = events.subscribe();

        engine.submit(
            "BTC-USD",
            Order::limit(1, "BTC-USD", Side::Sell, Quantity::from_u64(2), Price::from_u64(100), 0),
        );
        engine.submit(
            "BTC-USD",
            Order::limit(2, "BTC-USD", Side::Buy, Quantity::from_u64(2), Price::from_u64(100), 0),
        );
        engine.shutdown();

        // First submission: one BBO update. Second: one trade, then one
        // BBO update.
        let mut trades = 0;
        let mut bbo_updates = 0;
        while let Ok(event) = subscription.try_recv() {
            match event {
                ServerEvent::Trade(trade) => {
                    trades += 1;
                    assert_eq!(trade.maker_order_id, 1);
                    assert_eq!(trade.taker_order_id, 2);
                }
                ServerEvent::BboUpdate(_) => bbo_updates += 1,
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!(trades, 1);
        assert_eq!(bbo_updates, 2);
    }
}
