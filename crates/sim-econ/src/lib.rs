#![deny(warnings)]

//! Economic response curves for the strategy simulator.
//!
//! This module provides the building blocks of a simulated path:
//! - Stochastic market growth and the per-path price elasticity draw
//! - Constant-elasticity demand response to a price deviation
//! - Logistic share response to marketing intensity
//! - Power-law learning curve with a lognormal cost shock
//! - Straight-line depreciation of one-time investments
//!
//! Randomness always comes from a caller-owned [`Rng`], never from a global
//! generator, so draws are reproducible for a seeded stream.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Lower bound applied to the drawn price elasticity.
pub const ELASTICITY_FLOOR: f64 = 0.2;

/// Upper bound on achievable market share.
pub const MAX_SHARE: f64 = 0.95;

/// Useful life, in years, of a one-time capital investment.
pub const DEPRECIATION_YEARS: usize = 4;

/// Normal draw with the given mean and standard deviation (`sigma >= 0`).
///
/// Computed as `mu + sigma * z` with `z ~ N(0, 1)`; a zero sigma still
/// consumes one draw and returns `mu` exactly.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mu: f64, sigma: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    mu + sigma * z
}

/// Multiplicative lognormal shock with unit median: `exp(sigma * z)`.
pub fn lognormal_shock<R: Rng + ?Sized>(rng: &mut R, sigma: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    (sigma * z).exp()
}

/// Draw the path's price elasticity, floored at [`ELASTICITY_FLOOR`].
pub fn draw_elasticity<R: Rng + ?Sized>(rng: &mut R, mu: f64, sigma: f64) -> f64 {
    normal(rng, mu, sigma).max(ELASTICITY_FLOOR)
}

/// Advance the addressable market by one year of normally distributed growth.
///
/// A growth draw below -100% empties the market rather than making it
/// negative; the draw is consumed either way.
pub fn grow_tam<R: Rng + ?Sized>(rng: &mut R, prev: f64, mu: f64, sigma: f64) -> f64 {
    (prev * (1.0 + normal(rng, mu, sigma))).max(0.0)
}

/// Demand multiplier of a constant-elasticity curve: `(price / ref)^(-epsilon)`.
///
/// Example:
/// assert_eq!(price_effect(100.0, 100.0, 1.4), 1.0);
pub fn price_effect(price: f64, ref_price: f64, epsilon: f64) -> f64 {
    (price / ref_price).powf(-epsilon)
}

/// Logistic share potential as a function of marketing spend fraction.
///
/// `smax / (1 + exp(-k * (spend - m0)))`; equals `smax / 2` at the midpoint.
pub fn share_potential(smax: f64, k: f64, spend_frac: f64, m0: f64) -> f64 {
    smax / (1.0 + (-k * (spend_frac - m0)).exp())
}

/// Realized share: potential scaled by quality and availability, clamped to
/// `[0, MAX_SHARE]`.
pub fn market_share(potential: f64, quality: f64, availability: f64) -> f64 {
    (potential * quality * availability).clamp(0.0, MAX_SHARE)
}

/// Unit cost on a power-law learning curve.
///
/// `cogs0 * cumulative^(-b) * shock`. Cumulative units below one are treated
/// as one so the curve never exceeds `cogs0 * shock`.
pub fn learning_curve_cost(cogs0: f64, cumulative_units: f64, b: f64, shock: f64) -> f64 {
    cogs0 * cumulative_units.max(1.0).powf(-b) * shock
}

/// Spread `amount` evenly over [`DEPRECIATION_YEARS`] entries of `schedule`
/// starting at `start`. Years beyond the end of the schedule are dropped,
/// not wrapped.
pub fn depreciate_straight_line(schedule: &mut [f64], start: usize, amount: f64) {
    let per_year = amount / DEPRECIATION_YEARS as f64;
    let end = schedule.len().min(start.saturating_add(DEPRECIATION_YEARS));
    if start >= end {
        return;
    }
    for d in &mut schedule[start..end] {
        *d += per_year;
    }
}

/// Income tax on positive earnings only.
pub fn tax_on(ebit: f64, rate: f64) -> f64 {
    ebit.max(0.0) * rate
}
