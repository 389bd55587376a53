//! Bid (buy-side) ladder
//!
//! Buy orders keyed by price in a BTreeMap; the best bid is the highest
//! key. Empty levels are erased eagerly so the map ends never lie.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};

use super::price_level::{PriceLevel, RestingOrder};

/// Buy side of the book, best bid = highest price
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rest an order at its price level
    pub fn insert(&mut self, price: Price, order: RestingOrder) {
        self.levels.entry(price).or_default().push_back(order);
    }

    /// Remove a resting order by id from the level at `price`
    ///
    /// Returns true if the order was found and removed.
    pub fn remove(&mut self, order_id: &OrderId, price: Price) -> bool {
        if let Some(level) = self.levels.get_mut(&price) {
            if level.remove(order_id).is_some() {
                if level.is_empty() {
                    self.levels.remove(&price);
                }
                return true;
            }
        }
        false
    }

    /// Best (highest) bid price
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next_back().copied()
    }

    /// The order first in line at the best bid
    pub fn best_front(&self) -> Option<(Price, RestingOrder)> {
        self.levels
            .iter()
            .next_back()
            .and_then(|(price, level)| level.front().map(|order| (*price, order.clone())))
    }

    /// Fill the front order at the best bid, erasing the level if emptied
    pub fn fill_best(&mut self, quantity: Quantity) {
        let Some(price) = self.best_price() else { return };
        if let Some(level) = self.levels.get_mut(&price) {
            level.fill_front(quantity);
            if level.is_empty() {
                self.levels.remove(&price);
            }
        }
    }

    /// Aggregated (price, total shares) for the top `depth` levels, high to low
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, u64)> {
        self.levels
            .iter()
            .rev()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::ParticipantId;

    fn resting(qty: u32) -> RestingOrder {
        RestingOrder {
            order_id: OrderId::new(),
            participant_id: ParticipantId::new("maker"),
            quantity: Quantity::new(qty),
        }
    }

    #[test]
    fn test_best_is_highest() {
        let mut book = BidBook::new();
        book.insert(Price::from_u64(99), resting(1));
        book.insert(Price::from_u64(101), resting(2));
        book.insert(Price::from_u64(100), resting(3));

        assert_eq!(book.best_price(), Some(Price::from_u64(101)));
    }

    #[test]
    fn test_depth_orders_high_to_low() {
        let mut book = BidBook::new();
        book.insert(Price::from_u64(99), resting(1));
        book.insert(Price::from_u64(101), resting(2));
        book.insert(Price::from_u64(100), resting(3));
        book.insert(Price::from_u64(100), resting(4));

        let depth = book.depth_snapshot(2);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0], (Price::from_u64(101), 2));
        assert_eq!(depth[1], (Price::from_u64(100), 7));
    }

    #[test]
    fn test_remove_erases_empty_level() {
        let mut book = BidBook::new();
        let order = resting(5);
        let id = order.order_id;
        book.insert(Price::from_u64(100), order);

        assert!(book.remove(&id, Price::from_u64(100)));
        assert!(book.is_empty());
        assert!(!book.remove(&id, Price::from_u64(100)));
    }

    #[test]
    fn test_fill_best_erases_empty_level() {
        let mut book = BidBook::new();
        book.insert(Price::from_u64(100), resting(5));
        book.insert(Price::from_u64(99), resting(5));

        book.fill_best(Quantity::new(5));
        assert_eq!(book.best_price(), Some(Price::from_u64(99)));
        assert_eq!(book.level_count(), 1);
    }

    #[test]
    fn test_best_front_fifo() {
        let mut book = BidBook::new();
        let first = resting(5);
        let first_id = first.order_id;
        book.insert(Price::from_u64(100), first);
        book.insert(Price::from_u64(100), resting(7));

        let (price, front) = book.best_front().unwrap();
        assert_eq!(price, Price::from_u64(100));
        assert_eq!(front.order_id, first_id);
    }
}
