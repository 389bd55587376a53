//! The market data engine and its background worker
//!
//! Each cycle runs in three stages: generate every new price while holding
//! the price map read lock and the RNG lock, commit the batch under the
//! write lock, then publish ticks with no lock held. The subscriber may
//! therefore call back into the engine.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::info;
use types::ids::Symbol;
use types::market::MarketData;
use types::numeric::{Price, Quantity};
use types::time;

use crate::gbm;

type TickCallback = Arc<dyn Fn(&MarketData) + Send + Sync>;

/// Tuning knobs for price generation
#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    /// Annualized volatility assigned to newly registered symbols
    pub default_volatility: f64,
    /// GBM drift term μ
    pub drift: f64,
    /// Time step in trading years; default is one second of a 6.5-hour
    /// trading day over a 252-day year
    pub dt: f64,
    /// Sleep between generation cycles
    pub tick_interval: Duration,
    /// Minimum price a step may produce
    pub price_floor: f64,
    /// Nominal volume stamped on every tick
    pub tick_volume: u32,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            default_volatility: 0.20,
            drift: 0.0,
            dt: 1.0 / (252.0 * 6.5 * 3600.0),
            tick_interval: Duration::from_millis(100),
            price_floor: 0.01,
            tick_volume: 1_000,
        }
    }
}

#[derive(Debug, Clone)]
struct SymbolState {
    price: Price,
    volatility: f64,
}

struct EngineShared {
    config: MarketDataConfig,
    prices: RwLock<HashMap<Symbol, SymbolState>>,
    callback: Mutex<Option<TickCallback>>,
    running: AtomicBool,
    /// Draws are serialized; the RNG is not sharable
    rng: Mutex<ChaCha8Rng>,
}

/// Background reference-price generator
///
/// `start` spawns the worker, `stop` joins it and is idempotent; dropping
/// the engine stops it too.
pub struct MarketDataEngine {
    shared: Arc<EngineShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MarketDataEngine {
    /// Engine with default configuration and an entropy-seeded RNG
    pub fn new() -> Self {
        Self::with_config(MarketDataConfig::default())
    }

    pub fn with_config(config: MarketDataConfig) -> Self {
        Self::build(config, ChaCha8Rng::from_entropy())
    }

    /// Deterministic engine for tests and replayable simulations
    pub fn with_seed(config: MarketDataConfig, seed: u64) -> Self {
        Self::build(config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn build(config: MarketDataConfig, rng: ChaCha8Rng) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                config,
                prices: RwLock::new(HashMap::new()),
                callback: Mutex::new(None),
                running: AtomicBool::new(false),
                rng: Mutex::new(rng),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Register a symbol at an initial price with the default volatility
    ///
    /// Re-registering replaces the existing state.
    pub fn add_symbol(&self, symbol: Symbol, initial_price: Price) {
        let mut prices = self.shared.prices.write().unwrap();
        prices.insert(
            symbol,
            SymbolState {
                price: initial_price,
                volatility: self.shared.config.default_volatility,
            },
        );
    }

    /// Override the annualized volatility of a registered symbol
    ///
    /// Returns false if the symbol is unknown.
    pub fn set_volatility(&self, symbol: &Symbol, volatility: f64) -> bool {
        let mut prices = self.shared.prices.write().unwrap();
        match prices.get_mut(symbol) {
            Some(state) => {
                state.volatility = volatility;
                true
            }
            None => false,
        }
    }

    /// Install (or replace) the tick observer
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(&MarketData) + Send + Sync + 'static,
    {
        *self.shared.callback.lock().unwrap() = Some(Arc::new(callback));
    }

    /// Spawn the background worker; a second call while running is a no-op
    pub fn start(&self) {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return;
        }

        info!("market data engine starting");
        let shared = Arc::clone(&self.shared);
        let handle = thread::spawn(move || worker_loop(shared));
        *self.worker.lock().unwrap() = Some(handle);
    }

    /// Clear the running flag and join the worker; idempotent
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
        let handle = self.worker.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.join();
            info!("market data engine stopped");
        }
    }

    /// Latest price for a symbol
    pub fn get_current_price(&self, symbol: &Symbol) -> Option<Price> {
        let prices = self.shared.prices.read().unwrap();
        prices.get(symbol).map(|state| state.price)
    }

    /// Snapshot of every registered symbol's current price
    pub fn get_all_prices(&self) -> HashMap<Symbol, Price> {
        let prices = self.shared.prices.read().unwrap();
        prices
            .iter()
            .map(|(symbol, state)| (symbol.clone(), state.price))
            .collect()
    }
}

impl Default for MarketDataEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MarketDataEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(shared: Arc<EngineShared>) {
    while shared.running.load(Ordering::SeqCst) {
        let updates = generate_batch(&shared);
        commit_batch(&shared, &updates);
        publish_batch(&shared, updates);
        thread::sleep(shared.config.tick_interval);
    }
}

/// Compute new prices for every symbol without mutating the map
fn generate_batch(shared: &EngineShared) -> Vec<(Symbol, Price)> {
    let floor = Decimal::from_f64(shared.config.price_floor)
        .and_then(Price::try_new)
        .unwrap_or_else(|| Price::new(Decimal::new(1, 2)));

    let prices = shared.prices.read().unwrap();
    let mut rng = shared.rng.lock().unwrap();

    prices
        .iter()
        .map(|(symbol, state)| {
            let shock: f64 = StandardNormal.sample(&mut *rng);
            let current = state.price.as_decimal().to_f64().unwrap_or(shared.config.price_floor);
            let next = gbm::step(
                current,
                shared.config.drift,
                state.volatility,
                shared.config.dt,
                shock,
                shared.config.price_floor,
            );
            let next = Decimal::from_f64(next).and_then(Price::try_new).unwrap_or(floor);
            (symbol.clone(), next)
        })
        .collect()
}

fn commit_batch(shared: &EngineShared, updates: &[(Symbol, Price)]) {
    let mut prices = shared.prices.write().unwrap();
    for (symbol, price) in updates {
        if let Some(state) = prices.get_mut(symbol) {
            state.price = *price;
        }
    }
}

/// Deliver one tick per symbol, after the commit and outside every lock
fn publish_batch(shared: &EngineShared, updates: Vec<(Symbol, Price)>) {
    let callback = shared.callback.lock().unwrap().clone();
    let Some(callback) = callback else { return };

    let timestamp = time::now_millis();
    let volume = Quantity::new(shared.config.tick_volume);
    for (symbol, price) in updates {
        let tick = MarketData::new(symbol, price, volume, timestamp);
        callback(&tick);
    }
}
