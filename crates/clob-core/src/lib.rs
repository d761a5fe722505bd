//! clob-core
//!
//! Price-time priority matching core for a crypto central limit order book:
//! - fixed-point value types (orders, trades, top-of-book snapshots)
//! - per-symbol order books with FIFO price levels and an id index
//! - a serialized event queue with a single worker establishing the total
//!   order of all mutations
//! - trade / BBO sink contracts for external publishers

pub mod events;
pub mod matching_engine;
pub mod numeric;
pub mod order;
pub mod order_book;
pub mod order_type;
pub mod price_level;
pub mod queue;
pub mod side;
pub mod sink;
pub mod top_of_book;
pub mod trade;

pub use events::OrderEvent;
pub use matching_engine::MatchingEngine;
pub use numeric::{Price, Quantity};
pub use order::{now_millis, Order};
pub use order_book::OrderBook;
pub use order_type::OrderType;
pub use price_level::PriceLevel;
pub use queue::EventQueue;
pub use side::Side;
pub use sink::{BboSink, TradeSink};
pub use top_of_book::{BestBidOffer, DepthSnapshot};
pub use trade::Trade;
