//! Order record and its enums

use crate::ids::{OrderId, ParticipantId, Symbol};
use crate::numeric::{Price, Quantity};
use crate::time;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Execute immediately at the best available price(s); never rests
    MARKET,
    /// Execute at the limit price or better; rests if not matchable
    LIMIT,
}

/// A participant's instruction to trade
///
/// The id is drawn at construction (UUID v7) and the timestamp comes from
/// the wall clock; within a price level the FIFO queue is the tiebreaker
/// for orders whose timestamps tie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub participant_id: ParticipantId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Quantity,
    /// Limit price; always `Some` for LIMIT orders, `None` for MARKET
    pub price: Option<Price>,
    /// Wall-clock milliseconds at construction
    pub timestamp: i64,
}

impl Order {
    /// Create a market order
    pub fn market(
        participant_id: ParticipantId,
        symbol: Symbol,
        side: Side,
        quantity: Quantity,
    ) -> Self {
        Self {
            id: OrderId::new(),
            participant_id,
            symbol,
            side,
            order_type: OrderType::MARKET,
            quantity,
            price: None,
            timestamp: time::now_millis(),
        }
    }

    /// Create a limit order at the given price
    pub fn limit(
        participant_id: ParticipantId,
        symbol: Symbol,
        side: Side,
        quantity: Quantity,
        price: Price,
    ) -> Self {
        Self {
            id: OrderId::new(),
            participant_id,
            symbol,
            side,
            order_type: OrderType::LIMIT,
            quantity,
            price: Some(price),
            timestamp: time::now_millis(),
        }
    }

    /// The limit price, if this is a limit order
    pub fn limit_price(&self) -> Option<Price> {
        self.price
    }

    /// True for MARKET orders
    pub fn is_market(&self) -> bool {
        self.order_type == OrderType::MARKET
    }
}
