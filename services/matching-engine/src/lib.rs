//! Matching engine
//!
//! A per-symbol central limit order book with price-time priority.
//! Orders are validated against a shared [`portfolio::Portfolio`] before
//! they touch the book, trades settle into it as they execute, and
//! observers receive trades and rejections through callbacks that never run
//! under an internal lock.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced (price levels in order, FIFO
//!   within a level)
//! - Crossing limit orders trade at the resting best ask
//! - After any submission completes, `best_bid < best_ask` or a side is empty
//! - A rejected order leaves book and ledger untouched

pub mod book;
pub mod matching;
pub mod orderbook;

pub use orderbook::{BookDepth, OrderBook};

/// Library version constant
pub const VERSION: &str = "0.1.0";
