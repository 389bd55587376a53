//! Public order book surface
//!
//! One `OrderBook` per symbol. The matching state sits behind a read-write
//! lock; the reference price, the portfolio handle, and the callback slots
//! each have their own lock so readers and the matcher never contend on
//! them. Callbacks are staged while the write lock is held and fired only
//! after it is released, so a trade or rejection observer may re-enter the
//! book (query it, submit follow-up orders, cancel) without deadlocking.

use portfolio::Portfolio;
use serde::Serialize;
use std::sync::{Arc, Mutex, RwLock};
use types::errors::PortfolioError;
use types::ids::{OrderId, Symbol};
use types::numeric::Price;
use types::order::{Order, OrderType, Side};
use types::trade::Trade;

use crate::book::BookCore;
use crate::matching::Submission;

type TradeCallback = Arc<dyn Fn(&Trade) + Send + Sync>;
type RejectionCallback = Arc<dyn Fn(&Order, &str) + Send + Sync>;

#[derive(Default)]
struct CallbackSlots {
    trade: Option<TradeCallback>,
    rejection: Option<RejectionCallback>,
}

/// Aggregated top-of-book view: (price, total shares) per level
///
/// Bids run high to low, asks low to high.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookDepth {
    pub bids: Vec<(Price, u64)>,
    pub asks: Vec<(Price, u64)>,
}

/// Central limit order book for a single symbol
pub struct OrderBook {
    symbol: Symbol,
    core: RwLock<BookCore>,
    /// Last externally supplied market price; only consulted to price a
    /// market BUY for validation when no ask is resting
    reference_price: Mutex<Option<Price>>,
    portfolio: Mutex<Option<Arc<Portfolio>>>,
    callbacks: Mutex<CallbackSlots>,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            core: RwLock::new(BookCore::new(symbol.clone())),
            symbol,
            reference_price: Mutex::new(None),
            portfolio: Mutex::new(None),
            callbacks: Mutex::new(CallbackSlots::default()),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Install (or replace) the trade observer
    pub fn set_trade_callback<F>(&self, callback: F)
    where
        F: Fn(&Trade) + Send + Sync + 'static,
    {
        self.callbacks.lock().unwrap().trade = Some(Arc::new(callback));
    }

    /// Install (or replace) the rejection observer
    pub fn set_rejection_callback<F>(&self, callback: F)
    where
        F: Fn(&Order, &str) + Send + Sync + 'static,
    {
        self.callbacks.lock().unwrap().rejection = Some(Arc::new(callback));
    }

    /// Install the ledger used for validation and settlement
    ///
    /// With no portfolio installed, every order passes validation and no
    /// settlement is attempted.
    pub fn set_portfolio(&self, portfolio: Arc<Portfolio>) {
        *self.portfolio.lock().unwrap() = Some(portfolio);
    }

    /// Update the reference price used by market-BUY validation
    pub fn update_market_price(&self, price: Price) {
        *self.reference_price.lock().unwrap() = Some(price);
    }

    /// Submit an order
    ///
    /// `Ok(false)` means the order was rejected; the rejection callback has
    /// already run with a readable reason and neither book nor ledger
    /// changed. `Ok(true)` means the order was accepted, with every trade
    /// callback fired before this returns. `Err` surfaces a settlement
    /// failure mid-match; fills settled before the failure have been
    /// reported.
    pub fn add_order(&self, order: Order) -> Result<bool, PortfolioError> {
        if let Some(reason) = self.validate(&order) {
            self.fire_rejection(&order, &reason);
            return Ok(false);
        }

        let portfolio = self.portfolio.lock().unwrap().clone();
        let mut fills = Vec::new();
        let outcome = {
            let mut core = self.core.write().unwrap();
            match order.order_type {
                OrderType::MARKET => core.execute_market(&order, portfolio.as_deref(), &mut fills),
                OrderType::LIMIT => {
                    let price = order.price.expect("LIMIT order must carry a price");
                    core.insert_limit(&order, price);
                    core.match_crossing(portfolio.as_deref(), &mut fills)
                        .map(|_| Submission::Accepted)
                }
            }
        };

        // write lock released; observers may re-enter from here on
        self.fire_trades(&fills);

        match outcome? {
            Submission::Accepted => Ok(true),
            Submission::Rejected(reason) => {
                self.fire_rejection(&order, &reason);
                Ok(false)
            }
        }
    }

    /// Cancel a resting limit order by id
    ///
    /// Returns false if the id is not currently resting: already filled,
    /// already cancelled, or never seen. No callback fires either way.
    pub fn cancel_order(&self, order_id: &OrderId) -> bool {
        self.core.write().unwrap().cancel(order_id)
    }

    /// Best bid, if any buy orders rest
    pub fn best_bid(&self) -> Option<Price> {
        self.core.read().unwrap().bids.best_price()
    }

    /// Best ask, if any sell orders rest
    pub fn best_ask(&self) -> Option<Price> {
        self.core.read().unwrap().asks.best_price()
    }

    /// Midpoint of best bid and best ask; None unless both sides rest
    pub fn mid_price(&self) -> Option<Price> {
        let core = self.core.read().unwrap();
        match (core.bids.best_price(), core.asks.best_price()) {
            (Some(bid), Some(ask)) => Some(Price::midpoint(bid, ask)),
            _ => None,
        }
    }

    /// Aggregated depth for the top `levels` price levels per side
    pub fn book_depth(&self, levels: usize) -> BookDepth {
        let core = self.core.read().unwrap();
        BookDepth {
            bids: core.bids.depth_snapshot(levels),
            asks: core.asks.depth_snapshot(levels),
        }
    }

    /// Number of resting orders
    pub fn order_count(&self) -> usize {
        self.core.read().unwrap().order_count()
    }

    /// Pre-trade check; Some(reason) rejects the order
    fn validate(&self, order: &Order) -> Option<String> {
        let Some(portfolio) = self.portfolio.lock().unwrap().clone() else {
            return None;
        };

        match order.side {
            Side::SELL => {
                if portfolio.can_sell(&order.participant_id, &order.symbol, order.quantity) {
                    None
                } else {
                    Some(format!(
                        "insufficient position for participant {}: sell {} {}",
                        order.participant_id, order.quantity, order.symbol
                    ))
                }
            }
            Side::BUY => {
                let check_price = match order.order_type {
                    OrderType::LIMIT => order.price.expect("LIMIT order must carry a price"),
                    OrderType::MARKET => match self.estimate_buy_price() {
                        Some(price) => price,
                        None => {
                            return Some(
                                "no liquidity or reference price to price a market buy".to_string(),
                            )
                        }
                    },
                };
                if portfolio.can_buy(&order.participant_id, &order.symbol, order.quantity, check_price)
                {
                    None
                } else {
                    Some(format!(
                        "insufficient funds for participant {}: buy {} {} at {}",
                        order.participant_id, order.quantity, order.symbol, check_price
                    ))
                }
            }
        }
    }

    /// Best ask if one rests, else the reference price
    fn estimate_buy_price(&self) -> Option<Price> {
        if let Some(ask) = self.core.read().unwrap().asks.best_price() {
            return Some(ask);
        }
        *self.reference_price.lock().unwrap()
    }

    fn fire_trades(&self, trades: &[Trade]) {
        if trades.is_empty() {
            return;
        }
        let callback = self.callbacks.lock().unwrap().trade.clone();
        if let Some(callback) = callback {
            for trade in trades {
                callback(trade);
            }
        }
    }

    fn fire_rejection(&self, order: &Order, reason: &str) {
        let callback = self.callbacks.lock().unwrap().rejection.clone();
        if let Some(callback) = callback {
            callback(order, reason);
        }
    }
}
