//! Multi-symbol matching engine.
//!
//! Owns one [`OrderBook`] per symbol, created lazily on first submission.
//! All mutations flow through a single [`EventQueue`] consumed by one worker
//! thread, so the queue's FIFO order is the engine's observable history.
//! Reads (`bbo`, `depth`) go straight to the target book under its guard and
//! never create a book.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Mutex, RwLock};

use crate::events::OrderEvent;
use crate::numeric::{Price, Quantity};
use crate::order::Order;
use crate::order_book::OrderBook;
use crate::queue::EventQueue;
use crate::sink::{BboSink, TradeSink};
use crate::top_of_book::{BestBidOffer, DepthSnapshot};

struct EngineShared {
    books: RwLock<HashMap<String, Arc<Mutex<OrderBook>>>>,
    queue: EventQueue,
    trade_sink: Option<Arc<dyn TradeSink>>,
    bbo_sink: Option<Arc<dyn BboSink>>,
}

pub struct MatchingEngine {
    shared: Arc<EngineShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MatchingEngine {
    /// Engine without sinks; trades and BBO updates are discarded.
    pub fn new() -> Self {
        Self::start(None, None)
    }

    /// Engine whose books report trades and BBO updates to the given sinks.
    pub fn with_sinks(trade_sink: Arc<dyn TradeSink>, bbo_sink: Arc<dyn BboSink>) -> Self {
        Self::start(Some(trade_sink), Some(bbo_sink))
    }

    fn start(trade_sink: Option<Arc<dyn TradeSink>>, bbo_sink: Option<Arc<dyn BboSink>>) -> Self {
        let shared = Arc::new(EngineShared {
            books: RwLock::new(HashMap::new()),
            queue: EventQueue::new(),
            trade_sink,
            bbo_sink,
        });
        let worker = {
            let shared = shared.clone();
            thread::spawn(move || worker_loop(&shared))
        };
        MatchingEngine {
            shared,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueue a submission. Always `true`; the outcome is observable
    /// through the trade and BBO sinks.
    pub fn submit(&self, symbol: &str, order: Order) -> bool {
        self.shared.queue.push(OrderEvent::Submit {
            symbol: symbol.to_string(),
            order,
        });
        true
    }

    /// Enqueue a cancellation. Always `true` (see [`submit`](Self::submit)).
    pub fn cancel(&self, symbol: &str, order_id: u64) -> bool {
        self.shared.queue.push(OrderEvent::Cancel {
            symbol: symbol.to_string(),
            order_id,
        });
        true
    }

    /// Enqueue a quantity modification. Always `true` (see
    /// [`submit`](Self::submit)).
    pub fn modify(&self, symbol: &str, order_id: u64, new_quantity: Quantity) -> bool {
        self.shared.queue.push(OrderEvent::Modify {
            symbol: symbol.to_string(),
            order_id,
            new_quantity,
        });
        true
    }

    /// Best bid/offer for a symbol; empty if the symbol has no book.
    pub fn bbo(&self, symbol: &str) -> BestBidOffer {
        match self.shared.books.read().get(symbol) {
            Some(book) => book.lock().bbo(),
            None => BestBidOffer::default(),
        }
    }

    /// Flat depth (bid levels descending, then ask levels ascending), up to
    /// `levels` per side; empty if the symbol has no book.
    pub fn depth(&self, symbol: &str, levels: usize) -> Vec<(Price, Quantity)> {
        self.depth_snapshot(symbol, levels).concat()
    }

    /// Side-labeled depth, up to `levels` per side.
    pub fn depth_snapshot(&self, symbol: &str, levels: usize) -> DepthSnapshot {
        match self.shared.books.read().get(symbol) {
            Some(book) => book.lock().depth(levels),
            None => DepthSnapshot::default(),
        }
    }

    /// Number of symbols with a live book.
    pub fn symbol_count(&self) -> usize {
        self.shared.books.read().len()
    }

    /// Run a closure against a symbol's book under its guard. `None` if the
    /// symbol has no book.
    pub fn with_book<T>(&self, symbol: &str, f: impl FnOnce(&OrderBook) -> T) -> Option<T> {
        let book = self.shared.books.read().get(symbol).cloned()?;
        let guard = book.lock();
        Some(f(&guard))
    }

    /// Request shutdown: the worker drains whatever is already queued,
    /// stops, and is joined. Idempotent; also invoked on drop.
    pub fn shutdown(&self) {
        self.shared.queue.shutdown();
        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                tracing::error!("engine worker terminated by panic");
            }
        }
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MatchingEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Single consumer: pops events in FIFO order and applies them to the
/// owning book. A handler failure is logged and skipped; it does not stall
/// or reorder the queue.
fn worker_loop(shared: &EngineShared) {
    while let Some(event) = shared.queue.pop_blocking() {
        let symbol = event.symbol().to_string();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| dispatch(shared, event)));
        if outcome.is_err() {
            tracing::error!(%symbol, "order event handler panicked; event discarded");
        }
    }
    tracing::debug!("engine worker stopped after draining queue");
}

fn dispatch(shared: &EngineShared, event: OrderEvent) {
    match event {
        OrderEvent::Submit { symbol, order } => {
            let order_id = order.id;
            let book = get_or_create_book(shared, &symbol);
            let accepted = book.lock().add_order(order);
            if !accepted {
                tracing::warn!(%symbol, order_id, "rejected limit order without price");
            }
        }
        OrderEvent::Cancel { symbol, order_id } => {
            if let Some(book) = lookup_book(shared, &symbol) {
                if !book.lock().cancel_order(order_id) {
                    tracing::debug!(%symbol, order_id, "cancel for unknown order");
                }
            }
        }
        OrderEvent::Modify {
            symbol,
            order_id,
            new_quantity,
        } => {
            if let Some(book) = lookup_book(shared, &symbol) {
                if !book.lock().modify_order(order_id, new_quantity) {
                    tracing::debug!(%symbol, order_id, "modify for unknown order");
                }
            }
        }
    }
}

fn lookup_book(shared: &EngineShared, symbol: &str) -> Option<Arc<Mutex<OrderBook>>> {
    shared.books.read().get(symbol).cloned()
}

fn get_or_create_book(shared: &EngineShared, symbol: &str) -> Arc<Mutex<OrderBook>> {
    if let Some(book) = shared.books.read().get(symbol) {
        return book.clone();
    }
    let mut books = shared.books.write();
    books
        .entry(symbol.to_string())
        .or_insert_with(|| {
            tracing::debug!(%symbol, "creating order book");
            let mut book = OrderBook::new(symbol);
            if let Some(sink) = &shared.trade_sink {
                book.set_trade_sink(sink.clone());
            }
            if let Some(sink) = &shared.bbo_sink {
                book.set_bbo_sink(sink.clone());
            }
            Arc::new(Mutex::new(book))
        })
        .clone()
}
