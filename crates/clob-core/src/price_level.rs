//! A single price level: FIFO queue of resting orders plus a cached total.
//!
//! Time priority within a level is positional. All quantity maintenance is
//! subtraction of exact operands so the cached total stays equal to the sum
//! of the queued orders.

use std::collections::VecDeque;

use crate::numeric::Quantity;
use crate::order::Order;

#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    orders: VecDeque<Order>,
    total_quantity: Quantity,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order at the back of the queue (lowest time priority).
    pub fn push_back(&mut self, order: Order) {
        self.total_quantity = self.total_quantity + order.quantity;
        self.orders.push_back(order);
    }

    /// Id and remaining quantity of the order at the front of the queue.
    pub fn front(&self) -> Option<(u64, Quantity)> {
        self.orders.front().map(|o| (o.id, o.quantity))
    }

    /// Debit `fill` from the front order and the level total, removing the
    /// front order when it reaches zero.
    ///
    /// # Panics
    /// Panics if `fill` exceeds the front order's remaining quantity.
    pub fn fill_front(&mut self, fill: Quantity) {
        if let Some(front) = self.orders.front_mut() {
            front.quantity = front.quantity - fill;
            self.total_quantity = self.total_quantity - fill;
            if front.quantity.is_zero() {
                self.orders.pop_front();
            }
        }
    }

    /// Remove an order from anywhere in the queue by id.
    pub fn remove(&mut self, order_id: u64) -> Option<Order> {
        let position = self.orders.iter().position(|o| o.id == order_id)?;
        let order = self.orders.remove(position)?;
        self.total_quantity = self.total_quantity - order.quantity;
        Some(order)
    }

    /// Replace an order's remaining quantity in place, preserving its queue
    /// position. Returns `false` if the id is not at this level.
    pub fn set_quantity(&mut self, order_id: u64, new_quantity: Quantity) -> bool {
        match self.orders.iter_mut().find(|o| o.id == order_id) {
            Some(order) => {
                self.total_quantity = self.total_quantity - order.quantity + new_quantity;
                order.quantity = new_quantity;
                true
            }
            None => false,
        }
    }

    pub fn quantity_of(&self, order_id: u64) -> Option<Quantity> {
        self.orders.iter().find(|o| o.id == order_id).map(|o| o.quantity)
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}
