//! Engine-level behavior: FIFO application across producers, lazy book
//! creation, read paths, drain-on-shutdown, and whole-run determinism.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use clob_core::{
    BestBidOffer, MatchingEngine, Order, OrderType, Price, Quantity, Side, Trade,
};

fn px(value: u64) -> Price {
    Price::from_u64(value)
}

fn qty(value: u64) -> Quantity {
    Quantity::from_u64(value)
}

fn recorded_engine() -> (MatchingEngine, Arc<Mutex<Vec<Trade>>>) {
    let trades = Arc::new(Mutex::new(Vec::new()));
    let log = trades.clone();
    let engine = MatchingEngine::with_sinks(
        Arc::new(move |trade: &Trade| log.lock().push(trade.clone())),
        Arc::new(|_symbol: &str, _bbo: &BestBidOffer| {}),
    );
    (engine, trades)
}

/// Comparable trade identity without the wall-clock timestamp.
fn trade_key(trade: &Trade) -> (u64, u64, String, String, Side) {
    (
        trade.maker_order_id,
        trade.taker_order_id,
        trade.price.to_string(),
        trade.quantity.to_string(),
        trade.aggressor_side,
    )
}

#[test]
fn submitted_events_apply_in_queue_order() {
    let (engine, trades) = recorded_engine();

    engine.submit("BTC-USD", Order::limit(1, "BTC-USD", Side::Buy, qty(4), px(50), 0));
    engine.submit("BTC-USD", Order::limit(2, "BTC-USD", Side::Buy, qty(4), px(50), 0));
    engine.submit("BTC-USD", Order::limit(3, "BTC-USD", Side::Sell, qty(5), px(50), 0));
    engine.shutdown();

    let trades = trades.lock();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].maker_order_id, 1);
    assert_eq!(trades[1].maker_order_id, 2);

    let bbo = engine.bbo("BTC-USD");
    assert_eq!(bbo.best_bid, Some(px(50)));
    assert_eq!(bbo.best_bid_quantity, Some(qty(3)));
}

#[test]
fn shutdown_drains_pending_events() {
    let (engine, _) = recorded_engine();
    for id in 0..500u64 {
        engine.submit(
            "ETH-USD",
            Order::limit(id, "ETH-USD", Side::Buy, qty(1), px(100 + (id % 50)), 0),
        );
    }
    engine.shutdown();

    let resting = engine
        .with_book("ETH-USD", |book| {
            book.check_invariants().unwrap();
            book.order_count()
        })
        .unwrap();
    assert_eq!(resting, 500);
}

#[test]
fn concurrent_producers_all_land() {
    let (engine, _) = recorded_engine();
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..4u64)
        .map(|producer| {
            let engine = engine.clone();
            thread::spawn(move || {
                for n in 0..50u64 {
                    let id = producer * 1000 + n;
                    // All bids, distinct ids; nothing ever crosses.
                    engine.submit(
                        "BTC-USD",
                        Order::limit(id, "BTC-USD", Side::Buy, qty(1), px(90 + producer), 0),
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    engine.shutdown();

    let resting = engine
        .with_book("BTC-USD", |book| {
            book.check_invariants().unwrap();
            book.order_count()
        })
        .unwrap();
    assert_eq!(resting, 200);
}

#[test]
fn reads_never_create_books() {
    let (engine, _) = recorded_engine();
    assert!(engine.bbo("NO-SUCH").is_empty());
    assert!(engine.depth("NO-SUCH", 10).is_empty());
    assert_eq!(engine.symbol_count(), 0);

    // Cancel and modify for unknown symbols are consumed without creating
    // a book either.
    engine.cancel("NO-SUCH", 1);
    engine.modify("NO-SUCH", 1, qty(2));
    engine.shutdown();
    assert_eq!(engine.symbol_count(), 0);
}

#[test]
fn books_are_created_lazily_per_symbol() {
    let (engine, _) = recorded_engine();
    engine.submit("BTC-USD", Order::limit(1, "BTC-USD", Side::Buy, qty(1), px(10), 0));
    engine.submit("ETH-USD", Order::limit(2, "ETH-USD", Side::Sell, qty(1), px(20), 0));
    engine.shutdown();

    assert_eq!(engine.symbol_count(), 2);
    assert_eq!(engine.bbo("BTC-USD").best_bid, Some(px(10)));
    assert_eq!(engine.bbo("ETH-USD").best_offer, Some(px(20)));
}

#[test]
fn depth_is_bids_descending_then_asks_ascending() {
    let (engine, _) = recorded_engine();
    for (id, price) in [(1u64, 98u64), (2, 99), (3, 97)] {
        engine.submit("BTC-USD", Order::limit(id, "BTC-USD", Side::Buy, qty(1), px(price), 0));
    }
    for (id, price) in [(4u64, 102u64), (5, 101), (6, 103)] {
        engine.submit("BTC-USD", Order::limit(id, "BTC-USD", Side::Sell, qty(1), px(price), 0));
    }
    engine.shutdown();

    let levels = engine.depth("BTC-USD", 2);
    let prices: Vec<Price> = levels.iter().map(|(price, _)| *price).collect();
    assert_eq!(prices, vec![px(99), px(98), px(101), px(102)]);

    let labeled = engine.depth_snapshot("BTC-USD", 2);
    assert_eq!(labeled.bids.len(), 2);
    assert_eq!(labeled.asks.len(), 2);
    assert_eq!(labeled.bids[0].0, px(99));
    assert_eq!(labeled.asks[0].0, px(101));
}

#[test]
fn replaying_a_sequence_is_deterministic() {
    // A fixed mixed workload, applied twice to fresh engines.
    fn run() -> (Vec<(u64, u64, String, String, Side)>, Vec<(Price, Quantity)>) {
        let (engine, trades) = recorded_engine();
        let ops: Vec<(u64, Side, OrderType, u64, Option<u64>)> = vec![
            (1, Side::Sell, OrderType::Limit, 5, Some(101)),
            (2, Side::Sell, OrderType::Limit, 4, Some(102)),
            (3, Side::Buy, OrderType::Limit, 3, Some(100)),
            (4, Side::Buy, OrderType::Limit, 6, Some(101)),
            (5, Side::Buy, OrderType::Ioc, 9, Some(102)),
            (6, Side::Sell, OrderType::Market, 2, None),
            (7, Side::Buy, OrderType::Fok, 4, Some(102)),
            (8, Side::Sell, OrderType::Limit, 7, Some(103)),
        ];
        for (id, side, order_type, quantity, price) in ops {
            engine.submit(
                "BTC-USD",
                Order::new(
                    id,
                    "BTC-USD",
                    side,
                    order_type,
                    qty(quantity),
                    price.map(px),
                    0,
                ),
            );
        }
        engine.modify("BTC-USD", 8, qty(2));
        engine.cancel("BTC-USD", 3);
        engine.shutdown();

        let keys = trades.lock().iter().map(trade_key).collect();
        (keys, engine.depth("BTC-USD", 16))
    }

    let (trades_a, depth_a) = run();
    let (trades_b, depth_b) = run();
    assert_eq!(trades_a, trades_b);
    assert_eq!(depth_a, depth_b);
    assert!(!trades_a.is_empty());
}

#[test]
fn shutdown_is_idempotent() {
    let (engine, _) = recorded_engine();
    engine.submit("BTC-USD", Order::limit(1, "BTC-USD", Side::Buy, qty(1), px(10), 0));
    engine.shutdown();
    engine.shutdown();
    assert_eq!(engine.bbo("BTC-USD").best_bid, Some(px(10)));
}
