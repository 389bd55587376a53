//! Crossing detection

use types::numeric::Price;

/// A bid and an ask can match when the bid is at or above the ask
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}
