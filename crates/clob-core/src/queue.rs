//! Serialized intake queue for order events.
//!
//! Producers push from any thread; a single consumer pops in FIFO order.
//! The pop order is the total order of all book mutations. On shutdown the
//! consumer drains whatever is still queued before stopping.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::events::OrderEvent;

#[derive(Default)]
struct QueueState {
    events: VecDeque<OrderEvent>,
    shutting_down: bool,
}

pub struct EventQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue {
            state: Mutex::new(QueueState::default()),
            available: Condvar::new(),
        }
    }

    /// Enqueue an event and wake the consumer.
    pub fn push(&self, event: OrderEvent) {
        let mut state = self.state.lock();
        state.events.push_back(event);
        self.available.notify_one();
    }

    /// Block until an event is available, returning `None` only after
    /// shutdown has been requested and the queue is fully drained.
    pub fn pop_blocking(&self) -> Option<OrderEvent> {
        let mut state = self.state.lock();
        loop {
            if let Some(event) = state.events.pop_front() {
                return Some(event);
            }
            if state.shutting_down {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Request shutdown and wake any waiter. Already-queued events will
    /// still be consumed.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.shutting_down = true;
        drop(state);
        self.available.notify_all();
    }

    pub fn len(&self) -> usize {
        self.state.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn cancel_event(order_id: u64) -> OrderEvent {
        OrderEvent::Cancel {
            symbol: "BTC-USD".to_string(),
            order_id,
        }
    }

    #[test]
    fn fifo_order() {
        let queue = EventQueue::new();
        queue.push(cancel_event(1));
        queue.push(cancel_event(2));
        queue.push(cancel_event(3));
        for expected in 1..=3 {
            match queue.pop_blocking() {
                Some(OrderEvent::Cancel { order_id, .. }) => assert_eq!(order_id, expected),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn drains_before_stopping() {
        let queue = EventQueue::new();
        queue.push(cancel_event(1));
        queue.push(cancel_event(2));
        queue.shutdown();
        assert!(queue.pop_blocking().is_some());
        assert!(queue.pop_blocking().is_some());
        assert!(queue.pop_blocking().is_none());
    }

    #[test]
    fn shutdown_wakes_blocked_consumer() {
        let queue = Arc::new(EventQueue::new());
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.pop_blocking())
        };
        // Give the consumer a moment to park on the condvar.
        thread::sleep(std::time::Duration::from_millis(20));
        queue.shutdown();
        assert!(consumer.join().unwrap().is_none());
    }
}
