//! Market-data tick records

use crate::ids::Symbol;
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Multiplicative half-spread for synthesized quotes: bid = price × 0.999
const BID_FACTOR: Decimal = Decimal::from_parts(999, 0, 0, false, 3);
/// ask = price × 1.001
const ASK_FACTOR: Decimal = Decimal::from_parts(1001, 0, 0, false, 3);

/// One price update for one symbol
///
/// Bid and ask are synthesized around the reference price at ±0.1%; volume
/// is a nominal placeholder size, not observed flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub symbol: Symbol,
    pub price: Price,
    pub volume: Quantity,
    /// Wall-clock milliseconds, captured once per generation batch
    pub timestamp: i64,
    pub bid: Price,
    pub ask: Price,
}

impl MarketData {
    pub fn new(symbol: Symbol, price: Price, volume: Quantity, timestamp: i64) -> Self {
        let bid = Price::new(price.as_decimal() * BID_FACTOR);
        let ask = Price::new(price.as_decimal() * ASK_FACTOR);
        Self {
            symbol,
            price,
            volume,
            timestamp,
            bid,
            ask,
        }
    }
}
