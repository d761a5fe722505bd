//! Per-symbol order book with price-time priority matching.
//!
//! One instance per symbol:
//! - Bids and asks are `BTreeMap` ladders keyed by price; best bid is the
//!   highest key, best ask the lowest.
//! - FIFO within each price level.
//! - An id index (`order_lookup`) gives direct locate-and-remove for
//!   cancel/modify without scanning the ladders.
//!
//! The book itself is not synchronized; the owning engine wraps each book in
//! a mutex and holds it for the whole call, including sink invocations.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::numeric::{Price, Quantity};
use crate::order::{now_millis, Order};
use crate::order_type::OrderType;
use crate::price_level::PriceLevel;
use crate::side::Side;
use crate::sink::{BboSink, TradeSink};
use crate::top_of_book::{BestBidOffer, DepthSnapshot};
use crate::trade::Trade;

/// Does an aggressor with this side and price bound cross a resting level?
///
/// `None` is unbounded (market-style crossing).
fn crosses(side: Side, limit: Option<Price>, level_price: Price) -> bool {
    match (side, limit) {
        (_, None) => true,
        (Side::Buy, Some(limit)) => level_price <= limit,
        (Side::Sell, Some(limit)) => level_price >= limit,
    }
}

pub struct OrderBook {
    symbol: String,
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    /// Id -> (resting price, side) for every order currently in a ladder.
    order_lookup: HashMap<u64, (Price, Side)>,
    trade_sink: Option<Arc<dyn TradeSink>>,
    bbo_sink: Option<Arc<dyn BboSink>>,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        OrderBook {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_lookup: HashMap::new(),
            trade_sink: None,
            bbo_sink: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn set_trade_sink(&mut self, sink: Arc<dyn TradeSink>) {
        self.trade_sink = Some(sink);
    }

    pub fn set_bbo_sink(&mut self, sink: Arc<dyn BboSink>) {
        self.bbo_sink = Some(sink);
    }

    /// Apply a submission: match against the opposite side, then apply the
    /// order type's residual policy.
    ///
    /// Returns `false` only for a limit order without a price; nothing is
    /// mutated and nothing is emitted in that case. Every other outcome
    /// (full fill, partial fill and rest, IOC/FOK residual cancel, FOK
    /// reject) returns `true` and ends with exactly one BBO emission. Fills
    /// are reported through the trade sink, not the return value.
    pub fn add_order(&mut self, mut order: Order) -> bool {
        if order.order_type == OrderType::Limit && order.price.is_none() {
            return false;
        }

        // Fill-or-kill executes atomically or not at all, so feasibility is
        // decided before the first fill.
        if order.order_type == OrderType::Fok && !self.fok_feasible(&order) {
            tracing::debug!(
                symbol = %self.symbol,
                order_id = order.id,
                "fill-or-kill rejected: insufficient crossable quantity"
            );
            self.notify_bbo();
            return true;
        }

        self.match_order(&mut order);

        // Residual policy: only limit orders rest; market/IOC residuals are
        // discarded (FOK never has a residual here).
        if !order.quantity.is_zero() && order.order_type == OrderType::Limit {
            self.add_to_book(order);
        }

        self.notify_bbo();
        true
    }

    /// Remove a resting order. Returns `false` (and emits nothing) if the
    /// id is not resting; a second cancel of the same id is a no-op.
    pub fn cancel_order(&mut self, order_id: u64) -> bool {
        let Some((price, side)) = self.order_lookup.remove(&order_id) else {
            return false;
        };
        self.remove_resting(order_id, price, side);
        self.notify_bbo();
        true
    }

    /// Change a resting order's quantity in place.
    ///
    /// Queue position is preserved in both directions; an increase does not
    /// re-queue. A new quantity of zero removes the order entirely, the
    /// same as a cancel. Returns `false` if the id is not resting.
    pub fn modify_order(&mut self, order_id: u64, new_quantity: Quantity) -> bool {
        let Some(&(price, side)) = self.order_lookup.get(&order_id) else {
            return false;
        };

        if new_quantity.is_zero() {
            self.order_lookup.remove(&order_id);
            self.remove_resting(order_id, price, side);
            self.notify_bbo();
            return true;
        }

        let ladder = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let changed = ladder
            .get_mut(&price)
            .is_some_and(|level| level.set_quantity(order_id, new_quantity));
        if changed {
            // Emitted even when the top of book did not change.
            self.notify_bbo();
        }
        changed
    }

    /// Snapshot of the best bid and offer with aggregate level quantities.
    pub fn bbo(&self) -> BestBidOffer {
        let mut bbo = BestBidOffer::default();
        if let Some((price, level)) = self.bids.iter().next_back() {
            bbo.best_bid = Some(*price);
            bbo.best_bid_quantity = Some(level.total_quantity());
        }
        if let Some((price, level)) = self.asks.iter().next() {
            bbo.best_offer = Some(*price);
            bbo.best_offer_quantity = Some(level.total_quantity());
        }
        bbo
    }

    /// Aggregate depth: up to `levels` levels per side, best-first.
    pub fn depth(&self, levels: usize) -> DepthSnapshot {
        DepthSnapshot {
            bids: self
                .bids
                .iter()
                .rev()
                .take(levels)
                .map(|(price, level)| (*price, level.total_quantity()))
                .collect(),
            asks: self
                .asks
                .iter()
                .take(levels)
                .map(|(price, level)| (*price, level.total_quantity()))
                .collect(),
        }
    }

    /// Remaining quantity of a resting order, if present.
    pub fn resting_quantity(&self, order_id: u64) -> Option<Quantity> {
        let &(price, side) = self.order_lookup.get(&order_id)?;
        let ladder = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        ladder.get(&price)?.quantity_of(order_id)
    }

    pub fn contains_order(&self, order_id: u64) -> bool {
        self.order_lookup.contains_key(&order_id)
    }

    /// Number of resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.order_lookup.len()
    }

    /// Verify book consistency: the id index matches the ladders exactly,
    /// level totals equal the sum of their orders, no level is empty or
    /// zero-total, and the book is not crossed at rest.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut indexed = 0usize;
        for (side, ladder) in [(Side::Buy, &self.bids), (Side::Sell, &self.asks)] {
            for (price, level) in ladder {
                if level.is_empty() {
                    return Err(format!("{side:?} level {price} is empty"));
                }
                let mut sum = Decimal::ZERO;
                for order in level.orders() {
                    if order.price != Some(*price) {
                        return Err(format!(
                            "order {} at {side:?} level {price} has price {:?}",
                            order.id, order.price
                        ));
                    }
                    if order.side != side {
                        return Err(format!("order {} on the wrong side", order.id));
                    }
                    match self.order_lookup.get(&order.id) {
                        Some(&(p, s)) if p == *price && s == side => {}
                        entry => {
                            return Err(format!("order {} index entry is {entry:?}", order.id))
                        }
                    }
                    sum += order.quantity.as_decimal();
                    indexed += 1;
                }
                if sum != level.total_quantity().as_decimal() {
                    return Err(format!(
                        "{side:?} level {price} total {} != order sum {sum}",
                        level.total_quantity()
                    ));
                }
                if sum == Decimal::ZERO {
                    return Err(format!("{side:?} level {price} has zero total"));
                }
            }
        }
        if indexed != self.order_lookup.len() {
            return Err(format!(
                "index has {} entries, ladders hold {indexed} orders",
                self.order_lookup.len()
            ));
        }
        if let (Some(bid), Some(ask)) = (
            self.bids.keys().next_back().copied(),
            self.asks.keys().next().copied(),
        ) {
            if bid >= ask {
                return Err(format!("book crossed at rest: bid {bid} >= ask {ask}"));
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Matching internals
    // -------------------------------------------------------------------

    /// Sweep the opposite side inside-out, filling FIFO within each level,
    /// until the aggressor is exhausted or no remaining level crosses.
    fn match_order(&mut self, taker: &mut Order) {
        let limit = taker.limit_price();

        match taker.side {
            Side::Buy => loop {
                if taker.quantity.is_zero() {
                    break;
                }
                let Some(best) = self.asks.keys().next().copied() else {
                    break;
                };
                if !crosses(Side::Buy, limit, best) {
                    break;
                }

                if let Some(level) = self.asks.get_mut(&best) {
                    while !taker.quantity.is_zero() {
                        let Some((maker_id, maker_qty)) = level.front() else {
                            break;
                        };
                        let fill = taker.quantity.min(maker_qty);
                        level.fill_front(fill);
                        taker.quantity = taker.quantity - fill;
                        if fill == maker_qty {
                            self.order_lookup.remove(&maker_id);
                        }
                        let trade = Trade::new(
                            maker_id,
                            taker.id,
                            self.symbol.clone(),
                            best,
                            fill,
                            taker.side,
                            now_millis(),
                        );
                        if let Some(sink) = &self.trade_sink {
                            sink.on_trade(&trade);
                        }
                    }
                }

                if self.asks.get(&best).is_some_and(|level| level.is_empty()) {
                    self.asks.remove(&best);
                }
            },
            Side::Sell => loop {
                if taker.quantity.is_zero() {
                    break;
                }
                let Some(best) = self.bids.keys().next_back().copied() else {
                    break;
                };
                if !crosses(Side::Sell, limit, best) {
                    break;
                }

                if let Some(level) = self.bids.get_mut(&best) {
                    while !taker.quantity.is_zero() {
                        let Some((maker_id, maker_qty)) = level.front() else {
                            break;
                        };
                        let fill = taker.quantity.min(maker_qty);
                        level.fill_front(fill);
                        taker.quantity = taker.quantity - fill;
                        if fill == maker_qty {
                            self.order_lookup.remove(&maker_id);
                        }
                        let trade = Trade::new(
                            maker_id,
                            taker.id,
                            self.symbol.clone(),
                            best,
                            fill,
                            taker.side,
                            now_millis(),
                        );
                        if let Some(sink) = &self.trade_sink {
                            sink.on_trade(&trade);
                        }
                    }
                }

                if self.bids.get(&best).is_some_and(|level| level.is_empty()) {
                    self.bids.remove(&best);
                }
            },
        }
    }

    /// Can the full quantity be crossed right now at eligible prices?
    fn fok_feasible(&self, order: &Order) -> bool {
        let limit = order.limit_price();
        let needed = order.quantity.as_decimal();
        let mut available = Decimal::ZERO;

        match order.side {
            Side::Buy => {
                for (price, level) in &self.asks {
                    if !crosses(Side::Buy, limit, *price) {
                        break;
                    }
                    available += level.total_quantity().as_decimal();
                    if available >= needed {
                        return true;
                    }
                }
            }
            Side::Sell => {
                for (price, level) in self.bids.iter().rev() {
                    if !crosses(Side::Sell, limit, *price) {
                        break;
                    }
                    available += level.total_quantity().as_decimal();
                    if available >= needed {
                        return true;
                    }
                }
            }
        }

        available >= needed
    }

    /// Rest a residual limit order at the tail of its price level.
    fn add_to_book(&mut self, order: Order) {
        // Callers guarantee a price is present for limit orders.
        let Some(price) = order.price else { return };
        let ladder = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        self.order_lookup.insert(order.id, (price, order.side));
        ladder.entry(price).or_default().push_back(order);
    }

    fn remove_resting(&mut self, order_id: u64, price: Price, side: Side) {
        let ladder = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = ladder.get_mut(&price) {
            if let Some(mut order) = level.remove(order_id) {
                order.is_active = false;
            }
            if level.is_empty() {
                ladder.remove(&price);
            }
        }
    }

    fn notify_bbo(&self) {
        if let Some(sink) = &self.bbo_sink {
            sink.on_bbo_update(&self.symbol, &self.bbo());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(value: u64) -> Price {
        Price::from_u64(value)
    }

    fn qty(value: u64) -> Quantity {
        Quantity::from_u64(value)
    }

    #[test]
    fn crossing_predicate() {
        assert!(crosses(Side::Buy, Some(px(101)), px(100)));
        assert!(crosses(Side::Buy, Some(px(100)), px(100)));
        assert!(!crosses(Side::Buy, Some(px(99)), px(100)));

        assert!(crosses(Side::Sell, Some(px(99)), px(100)));
        assert!(crosses(Side::Sell, Some(px(100)), px(100)));
        assert!(!crosses(Side::Sell, Some(px(101)), px(100)));

        assert!(crosses(Side::Buy, None, px(100)));
        assert!(crosses(Side::Sell, None, px(100)));
    }

    #[test]
    fn limit_without_price_is_rejected() {
        let mut book = OrderBook::new("BTC-USD");
        let order = Order::new(1, "BTC-USD", Side::Buy, OrderType::Limit, qty(5), None, 0);
        assert!(!book.add_order(order));
        assert_eq!(book.order_count(), 0);
        assert!(book.bbo().is_empty());
    }

    #[test]
    fn resting_orders_index_and_bbo() {
        let mut book = OrderBook::new("BTC-USD");
        assert!(book.add_order(Order::limit(1, "BTC-USD", Side::Buy, qty(5), px(99), 0)));
        assert!(book.add_order(Order::limit(2, "BTC-USD", Side::Sell, qty(3), px(101), 0)));

        let bbo = book.bbo();
        assert_eq!(bbo.best_bid, Some(px(99)));
        assert_eq!(bbo.best_bid_quantity, Some(qty(5)));
        assert_eq!(bbo.best_offer, Some(px(101)));
        assert_eq!(bbo.best_offer_quantity, Some(qty(3)));
        assert!(book.contains_order(1));
        book.check_invariants().unwrap();
    }

    #[test]
    fn zero_quantity_submit_neither_trades_nor_rests() {
        let mut book = OrderBook::new("BTC-USD");
        assert!(book.add_order(Order::limit(1, "BTC-USD", Side::Sell, qty(5), px(100), 0)));
        assert!(book.add_order(Order::limit(2, "BTC-USD", Side::Buy, Quantity::ZERO, px(100), 0)));
        assert!(!book.contains_order(2));
        assert_eq!(book.resting_quantity(1), Some(qty(5)));
        book.check_invariants().unwrap();
    }

    #[test]
    fn modify_to_zero_cancels() {
        let mut book = OrderBook::new("BTC-USD");
        book.add_order(Order::limit(1, "BTC-USD", Side::Buy, qty(7), px(99), 0));
        assert!(book.modify_order(1, Quantity::ZERO));
        assert!(!book.contains_order(1));
        assert!(book.bbo().is_empty());
        book.check_invariants().unwrap();
    }

    #[test]
    fn modify_keeps_queue_position_on_increase() {
        let mut book = OrderBook::new("BTC-USD");
        book.add_order(Order::limit(1, "BTC-USD", Side::Buy, qty(4), px(50), 0));
        book.add_order(Order::limit(2, "BTC-USD", Side::Buy, qty(4), px(50), 0));
        assert!(book.modify_order(1, qty(9)));

        let trades = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let log = trades.clone();
        book.set_trade_sink(Arc::new(move |trade: &Trade| log.lock().push(trade.clone())));

        book.add_order(Order::limit(3, "BTC-USD", Side::Sell, qty(2), px(50), 0));
        let trades = trades.lock();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].maker_order_id, 1);
        assert_eq!(trades[0].quantity, qty(2));
    }
}
