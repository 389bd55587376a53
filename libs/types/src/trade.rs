//! Executed trade records

use crate::ids::{OrderId, ParticipantId, Symbol};
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A fill between one buy order and one sell order
///
/// Carries both order ids and both participant ids so the ledger can settle
/// each leg without consulting the book again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub symbol: Symbol,
    pub quantity: Quantity,
    pub price: Price,
    /// Wall-clock milliseconds at execution
    pub timestamp: i64,
    pub buyer_id: ParticipantId,
    pub seller_id: ParticipantId,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        symbol: Symbol,
        quantity: Quantity,
        price: Price,
        timestamp: i64,
        buyer_id: ParticipantId,
        seller_id: ParticipantId,
    ) -> Self {
        Self {
            buy_order_id,
            sell_order_id,
            symbol,
            quantity,
            price,
            timestamp,
            buyer_id,
            seller_id,
        }
    }

    /// Trade value: `quantity × price`
    pub fn notional(&self) -> Decimal {
        self.quantity * self.price
    }
}
