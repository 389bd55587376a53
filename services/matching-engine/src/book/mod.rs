//! Book state for one symbol
//!
//! Two price ladders plus the tracking maps that make cancellation cheap:
//! `active_orders` holds the full record of every resting order and
//! `order_locations` remembers which level each id rests at, so a cancel is
//! a map lookup plus one queue scan.

pub mod ask_book;
pub mod bid_book;
pub mod price_level;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
pub use price_level::{PriceLevel, RestingOrder};

use std::collections::HashMap;
use tracing::warn;
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

/// The matching state proper, always mutated under the book's write lock
#[derive(Debug)]
pub struct BookCore {
    pub(crate) symbol: Symbol,
    pub(crate) bids: BidBook,
    pub(crate) asks: AskBook,
    /// Resting limit orders by id, quantities kept in sync with the ladders
    pub(crate) active_orders: HashMap<OrderId, Order>,
    /// Where each resting order sits, for O(log N + queue) cancellation
    pub(crate) order_locations: HashMap<OrderId, (Price, Side)>,
}

impl BookCore {
    pub(crate) fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BidBook::new(),
            asks: AskBook::new(),
            active_orders: HashMap::new(),
            order_locations: HashMap::new(),
        }
    }

    /// Rest a limit order on its side and record it in both tracking maps
    pub(crate) fn insert_limit(&mut self, order: &Order, price: Price) {
        let resting = RestingOrder {
            order_id: order.id,
            participant_id: order.participant_id.clone(),
            quantity: order.quantity,
        };

        match order.side {
            Side::BUY => self.bids.insert(price, resting),
            Side::SELL => self.asks.insert(price, resting),
        }

        self.active_orders.insert(order.id, order.clone());
        self.order_locations.insert(order.id, (price, order.side));
    }

    /// Remove a resting order by id
    ///
    /// Returns true iff exactly one entry was removed. A tracking-map
    /// mismatch is repaired by erasing whatever stale entries remain, and
    /// reported as a failed cancel.
    pub(crate) fn cancel(&mut self, order_id: &OrderId) -> bool {
        if !self.active_orders.contains_key(order_id) {
            if self.order_locations.remove(order_id).is_some() {
                warn!(order_id = %order_id, "repaired orphaned order location");
            }
            return false;
        }

        let Some(&(price, side)) = self.order_locations.get(order_id) else {
            self.active_orders.remove(order_id);
            warn!(order_id = %order_id, "repaired active order without location");
            return false;
        };

        let removed = match side {
            Side::BUY => self.bids.remove(order_id, price),
            Side::SELL => self.asks.remove(order_id, price),
        };

        self.active_orders.remove(order_id);
        self.order_locations.remove(order_id);

        if !removed {
            warn!(order_id = %order_id, "repaired tracked order missing from its level");
        }
        removed
    }

    /// Sync the tracking maps after a resting order was filled down to
    /// `residual` shares; a zero residual retires the order entirely
    pub(crate) fn record_resting_fill(&mut self, order_id: OrderId, residual: Quantity) {
        if residual.is_zero() {
            self.active_orders.remove(&order_id);
            self.order_locations.remove(&order_id);
        } else if let Some(order) = self.active_orders.get_mut(&order_id) {
            order.quantity = residual;
        }
    }

    /// Number of resting orders
    pub(crate) fn order_count(&self) -> usize {
        self.active_orders.len()
    }
}
