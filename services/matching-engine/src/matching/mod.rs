//! Matching algorithms
//!
//! Market orders walk the opposing ladder best-price-first; crossing limit
//! orders match head-to-head while `best_bid ≥ best_ask`. In both cases the
//! trade price is the resting best ask at the moment of match, so a buyer
//! lifting a cheaper ask gets price improvement and a resting seller is
//! never filled below their price.
//!
//! Trades settle into the ledger as they execute, still under the book's
//! write lock (the ledger mutex is a leaf lock); callbacks are only staged
//! here and fired by the caller after the lock is released.

pub mod crossing;

use portfolio::Portfolio;
use tracing::debug;
use types::errors::PortfolioError;
use types::order::{Order, Side};
use types::time;
use types::trade::Trade;

use crate::book::BookCore;

/// Outcome of routing one order through the matcher
#[derive(Debug, PartialEq)]
pub(crate) enum Submission {
    Accepted,
    Rejected(String),
}

impl BookCore {
    /// Execute a market order against the opposing ladder
    ///
    /// An empty opposing side rejects the order outright; otherwise the
    /// order fills level by level, FIFO within each level, and any residual
    /// is discarded (market orders never rest).
    pub(crate) fn execute_market(
        &mut self,
        order: &Order,
        portfolio: Option<&Portfolio>,
        fills: &mut Vec<Trade>,
    ) -> Result<Submission, PortfolioError> {
        match order.side {
            Side::BUY => self.execute_market_buy(order, portfolio, fills),
            Side::SELL => self.execute_market_sell(order, portfolio, fills),
        }
    }

    fn execute_market_buy(
        &mut self,
        order: &Order,
        portfolio: Option<&Portfolio>,
        fills: &mut Vec<Trade>,
    ) -> Result<Submission, PortfolioError> {
        if self.asks.is_empty() {
            return Ok(Submission::Rejected("no liquidity available".to_string()));
        }

        let mut remaining = order.quantity;
        while !remaining.is_zero() {
            let Some((price, maker)) = self.asks.best_front() else {
                break;
            };

            let fill = remaining.min(maker.quantity);
            let trade = Trade::new(
                order.id,
                maker.order_id,
                self.symbol.clone(),
                fill,
                price,
                time::now_millis(),
                order.participant_id.clone(),
                maker.participant_id.clone(),
            );
            if let Some(ledger) = portfolio {
                ledger.settle(&trade)?;
            }
            debug!(symbol = %trade.symbol, price = %trade.price, quantity = %trade.quantity, "market buy fill");
            fills.push(trade);

            remaining = remaining - fill;
            self.asks.fill_best(fill);
            self.record_resting_fill(maker.order_id, maker.quantity - fill);
        }

        Ok(Submission::Accepted)
    }

    fn execute_market_sell(
        &mut self,
        order: &Order,
        portfolio: Option<&Portfolio>,
        fills: &mut Vec<Trade>,
    ) -> Result<Submission, PortfolioError> {
        if self.bids.is_empty() {
            return Ok(Submission::Rejected("no liquidity available".to_string()));
        }

        let mut remaining = order.quantity;
        while !remaining.is_zero() {
            let Some((price, maker)) = self.bids.best_front() else {
                break;
            };

            let fill = remaining.min(maker.quantity);
            let trade = Trade::new(
                maker.order_id,
                order.id,
                self.symbol.clone(),
                fill,
                price,
                time::now_millis(),
                maker.participant_id.clone(),
                order.participant_id.clone(),
            );
            if let Some(ledger) = portfolio {
                ledger.settle(&trade)?;
            }
            debug!(symbol = %trade.symbol, price = %trade.price, quantity = %trade.quantity, "market sell fill");
            fills.push(trade);

            remaining = remaining - fill;
            self.bids.fill_best(fill);
            self.record_resting_fill(maker.order_id, maker.quantity - fill);
        }

        Ok(Submission::Accepted)
    }

    /// Match head orders while the book is crossed
    ///
    /// Runs after every limit insertion. The trade price is the resting
    /// best ask; both head orders are decremented, retired when empty, and
    /// the loop exits once `best_bid < best_ask` or a side empties.
    pub(crate) fn match_crossing(
        &mut self,
        portfolio: Option<&Portfolio>,
        fills: &mut Vec<Trade>,
    ) -> Result<(), PortfolioError> {
        loop {
            let (bid_price, buy) = match self.bids.best_front() {
                Some(front) => front,
                None => break,
            };
            let (ask_price, sell) = match self.asks.best_front() {
                Some(front) => front,
                None => break,
            };

            if !crossing::can_match(bid_price, ask_price) {
                break;
            }

            let fill = buy.quantity.min(sell.quantity);
            let trade = Trade::new(
                buy.order_id,
                sell.order_id,
                self.symbol.clone(),
                fill,
                ask_price,
                time::now_millis(),
                buy.participant_id.clone(),
                sell.participant_id.clone(),
            );
            if let Some(ledger) = portfolio {
                ledger.settle(&trade)?;
            }
            debug!(symbol = %trade.symbol, price = %trade.price, quantity = %trade.quantity, "limit cross fill");
            fills.push(trade);

            self.bids.fill_best(fill);
            self.asks.fill_best(fill);
            self.record_resting_fill(buy.order_id, buy.quantity - fill);
            self.record_resting_fill(sell.order_id, sell.quantity - fill);
        }

        Ok(())
    }
}
