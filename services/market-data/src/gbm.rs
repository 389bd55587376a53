//! Geometric Brownian motion step

/// Advance a price by one GBM increment, clamped at `floor`
///
/// `new = max(floor, p + p·(μ·Δt + σ·√Δt·z))` with `z ~ Normal(0,1)`
/// supplied by the caller so the RNG stays out of the math.
pub fn step(price: f64, drift: f64, volatility: f64, dt: f64, shock: f64, floor: f64) -> f64 {
    let change = price * (drift * dt + volatility * dt.sqrt() * shock);
    (price + change).max(floor)
}
