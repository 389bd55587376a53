//! Market data engine
//!
//! Evolves a reference price per registered symbol with a geometric
//! Brownian motion step and publishes one batch of ticks per cycle to a
//! single subscriber. A background thread owns generation; readers query
//! prices concurrently.
//!
//! # Modules
//! - `gbm`: the pure price step
//! - `engine`: the engine, its configuration, and the worker loop

pub mod engine;
pub mod gbm;

pub use engine::{MarketDataConfig, MarketDataEngine};

/// Library version constant
pub const VERSION: &str = "0.1.0";
