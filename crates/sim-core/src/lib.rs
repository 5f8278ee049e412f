#![deny(warnings)]

//! Core domain models and invariants for the strategy simulator.
//!
//! This crate defines the scenario parameter set, the run configuration and
//! the catalogue of per-year metrics, together with validation helpers that
//! reject structurally nonsensical scenarios before any path is simulated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of runs used for the quick preview band.
pub const PREVIEW_RUNS: usize = 100;

/// Scenario parameters describing the business and strategy.
///
/// Every field has a default, so callers (and scenario files) only override
/// what a scenario changes:
///
/// ```
/// let p = sim_core::Params { price_delta_pct: -0.1, ..Default::default() };
/// assert!(sim_core::validate_params(&p).is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Simulation horizon in years (>= 1).
    pub years: u32,

    /// Initial addressable market in units.
    pub tam0: f64,
    /// Mean annual TAM growth.
    pub tam_growth_mu: f64,
    /// Standard deviation of annual TAM growth.
    pub tam_growth_sigma: f64,

    /// Reference price.
    pub price_baseline: f64,
    /// Strategy price deviation from the reference (e.g. -0.1 = 10% cheaper).
    pub price_delta_pct: f64,
    /// Mean price elasticity, drawn once per path.
    pub epsilon_mu: f64,
    /// Spread of price elasticity.
    pub epsilon_sigma: f64,

    /// Maximum achievable share of the logistic response.
    pub smax: f64,
    /// Steepness of the logistic response.
    pub k_spend: f64,
    /// Spend fraction at the logistic midpoint.
    pub m0: f64,
    /// Sales & marketing spend as a fraction of revenue.
    pub sm_pct_rev: f64,
    /// Baseline quality multiplier.
    pub quality_factor: f64,
    /// Baseline availability multiplier.
    pub availability_factor: f64,

    /// Initial unit cost.
    pub cogs0: f64,
    /// Learning-curve exponent.
    pub learning_b: f64,
    /// Volatility of the multiplicative lognormal unit-cost shock.
    pub cogs_shock_sigma: f64,
    pub rd_pct_rev: f64,
    pub ga_pct_rev: f64,

    /// Effective tax rate on positive EBIT.
    pub tax_rate: f64,
    /// Fraction of year-over-year revenue change tied up in working capital.
    pub wc_ratio: f64,
    /// Opening cash.
    pub start_cash: f64,

    /// One-time automation investment (0 disables it).
    pub capex_automation: f64,
    /// 1-indexed year in which the automation capex is spent.
    pub invest_auto_year: u32,
    /// One-time vertical integration investment (0 disables it).
    pub capex_integration: f64,
    /// 1-indexed year in which the integration capex is spent.
    pub invest_integ_year: u32,
    /// First 1-indexed year with the quality boost active.
    pub product_dev_year: u32,
    /// First 1-indexed year with the market access boost active.
    pub market_dev_year: u32,

    pub quality_boost: f64,
    pub availability_boost: f64,
    pub tam_access_boost: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            years: 8,
            tam0: 2_500_000.0,
            tam_growth_mu: 0.06,
            tam_growth_sigma: 0.02,
            price_baseline: 1500.0,
            price_delta_pct: 0.0,
            epsilon_mu: 1.4,
            epsilon_sigma: 0.2,
            smax: 0.35,
            k_spend: 16.0,
            m0: 0.10,
            sm_pct_rev: 0.10,
            quality_factor: 1.0,
            availability_factor: 1.0,
            cogs0: 900.0,
            learning_b: 0.08,
            cogs_shock_sigma: 0.06,
            rd_pct_rev: 0.04,
            ga_pct_rev: 0.06,
            tax_rate: 0.20,
            wc_ratio: 0.10,
            start_cash: 1_500_000.0,
            capex_automation: 0.0,
            invest_auto_year: 1,
            capex_integration: 0.0,
            invest_integ_year: 3,
            product_dev_year: 3,
            market_dev_year: 3,
            quality_boost: 0.12,
            availability_boost: 0.08,
            tam_access_boost: 0.20,
        }
    }
}

impl Params {
    /// Effective price after the strategy deviation.
    pub fn price(&self) -> f64 {
        self.price_baseline * (1.0 + self.price_delta_pct)
    }

    /// Human-readable parameter listing in display order.
    pub fn describe(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("TAM0", self.tam0),
            ("TAM mu", self.tam_growth_mu),
            ("TAM sigma", self.tam_growth_sigma),
            ("Price baseline", self.price_baseline),
            ("Price d%", self.price_delta_pct),
            ("eps mu", self.epsilon_mu),
            ("eps sigma", self.epsilon_sigma),
            ("S&M %", self.sm_pct_rev),
            ("R&D %", self.rd_pct_rev),
            ("G&A %", self.ga_pct_rev),
            ("Capex Auto", self.capex_automation),
            ("Auto Year", f64::from(self.invest_auto_year)),
            ("Capex Integr", self.capex_integration),
            ("Integr Year", f64::from(self.invest_integ_year)),
            ("Prod Dev Year", f64::from(self.product_dev_year)),
            ("Market Dev Year", f64::from(self.market_dev_year)),
        ]
    }
}

/// Ensemble configuration: seed for the top-level stream and number of runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seed for the deterministic top-level RNG.
    pub seed: u64,
    /// Number of independent paths (>= 1).
    pub runs: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            runs: 1000,
        }
    }
}

/// Per-year metrics produced by the path simulator, in table column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    Year,
    #[serde(rename = "TAM")]
    Tam,
    Price,
    Units,
    Revenue,
    #[serde(rename = "COGS_unit")]
    CogsUnit,
    #[serde(rename = "COGS")]
    Cogs,
    GrossProfit,
    #[serde(rename = "SM")]
    Sm,
    #[serde(rename = "RD")]
    Rd,
    #[serde(rename = "GA")]
    Ga,
    Depreciation,
    #[serde(rename = "EBIT")]
    Ebit,
    Tax,
    NetIncome,
    Cash,
    Share,
}

impl Metric {
    /// All metrics in raw-table column order.
    pub const ALL: [Metric; 17] = [
        Metric::Year,
        Metric::Tam,
        Metric::Price,
        Metric::Units,
        Metric::Revenue,
        Metric::CogsUnit,
        Metric::Cogs,
        Metric::GrossProfit,
        Metric::Sm,
        Metric::Rd,
        Metric::Ga,
        Metric::Depreciation,
        Metric::Ebit,
        Metric::Tax,
        Metric::NetIncome,
        Metric::Cash,
        Metric::Share,
    ];

    /// Column name used in exported tables.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Year => "Year",
            Metric::Tam => "TAM",
            Metric::Price => "Price",
            Metric::Units => "Units",
            Metric::Revenue => "Revenue",
            Metric::CogsUnit => "COGS_unit",
            Metric::Cogs => "COGS",
            Metric::GrossProfit => "GrossProfit",
            Metric::Sm => "SM",
            Metric::Rd => "RD",
            Metric::Ga => "GA",
            Metric::Depreciation => "Depreciation",
            Metric::Ebit => "EBIT",
            Metric::Tax => "Tax",
            Metric::NetIncome => "NetIncome",
            Metric::Cash => "Cash",
            Metric::Share => "Share",
        }
    }

    /// Looks a metric up by its column name.
    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// Metrics summarized into P10/P50/P90 bands by default.
pub const SUMMARY_METRICS: [Metric; 7] = [
    Metric::Revenue,
    Metric::Cash,
    Metric::Ebit,
    Metric::Units,
    Metric::Share,
    Metric::CogsUnit,
    Metric::GrossProfit,
];

/// Validation errors for scenario parameters (invalid parameter).
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Horizon must cover at least one year.
    #[error("years must be >= 1, got {0}")]
    InvalidHorizon(u32),
    /// Ensemble must contain at least one run.
    #[error("run count must be >= 1, got {0}")]
    InvalidRunCount(usize),
    /// Conceptually non-negative quantity was negative.
    #[error("{0} must be non-negative")]
    Negative(&'static str),
    /// Quantity used as a divisor must be strictly positive.
    #[error("{0} must be > 0")]
    NonPositive(&'static str),
    /// Numeric field must be finite.
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
    /// Investment or launch year outside the simulated horizon.
    #[error("{field} = {year} is outside [1, {years}]")]
    YearOutOfRange {
        field: &'static str,
        year: u32,
        years: u32,
    },
    /// Price deviation would drive the price to zero or below.
    #[error("price_delta_pct {0} leaves no positive price")]
    PriceCollapse(f64),
}

fn finite_fields(p: &Params) -> [(&'static str, f64); 26] {
    [
        ("tam0", p.tam0),
        ("tam_growth_mu", p.tam_growth_mu),
        ("tam_growth_sigma", p.tam_growth_sigma),
        ("price_baseline", p.price_baseline),
        ("price_delta_pct", p.price_delta_pct),
        ("epsilon_mu", p.epsilon_mu),
        ("epsilon_sigma", p.epsilon_sigma),
        ("smax", p.smax),
        ("k_spend", p.k_spend),
        ("m0", p.m0),
        ("sm_pct_rev", p.sm_pct_rev),
        ("quality_factor", p.quality_factor),
        ("availability_factor", p.availability_factor),
        ("cogs0", p.cogs0),
        ("learning_b", p.learning_b),
        ("cogs_shock_sigma", p.cogs_shock_sigma),
        ("rd_pct_rev", p.rd_pct_rev),
        ("ga_pct_rev", p.ga_pct_rev),
        ("tax_rate", p.tax_rate),
        ("wc_ratio", p.wc_ratio),
        ("start_cash", p.start_cash),
        ("capex_automation", p.capex_automation),
        ("capex_integration", p.capex_integration),
        ("quality_boost", p.quality_boost),
        ("availability_boost", p.availability_boost),
        ("tam_access_boost", p.tam_access_boost),
    ]
}

/// Validate scenario parameters.
pub fn validate_params(p: &Params) -> Result<(), ValidationError> {
    if p.years < 1 {
        return Err(ValidationError::InvalidHorizon(p.years));
    }
    for (field, v) in finite_fields(p) {
        if !v.is_finite() {
            return Err(ValidationError::NonFinite(field));
        }
    }
    let non_negative = [
        ("tam0", p.tam0),
        ("cogs0", p.cogs0),
        ("sm_pct_rev", p.sm_pct_rev),
        ("rd_pct_rev", p.rd_pct_rev),
        ("ga_pct_rev", p.ga_pct_rev),
        ("capex_automation", p.capex_automation),
        ("capex_integration", p.capex_integration),
        ("tam_growth_sigma", p.tam_growth_sigma),
        ("epsilon_sigma", p.epsilon_sigma),
        ("cogs_shock_sigma", p.cogs_shock_sigma),
    ];
    for (field, v) in non_negative {
        if v < 0.0 {
            return Err(ValidationError::Negative(field));
        }
    }
    if p.price_baseline <= 0.0 {
        return Err(ValidationError::NonPositive("price_baseline"));
    }
    if p.price_delta_pct <= -1.0 {
        return Err(ValidationError::PriceCollapse(p.price_delta_pct));
    }
    let years = [
        ("invest_auto_year", p.invest_auto_year),
        ("invest_integ_year", p.invest_integ_year),
        ("product_dev_year", p.product_dev_year),
        ("market_dev_year", p.market_dev_year),
    ];
    for (field, year) in years {
        if !(1..=p.years).contains(&year) {
            return Err(ValidationError::YearOutOfRange {
                field,
                year,
                years: p.years,
            });
        }
    }
    Ok(())
}

/// Validate an ensemble configuration.
pub fn validate_run_config(cfg: &RunConfig) -> Result<(), ValidationError> {
    if cfg.runs < 1 {
        return Err(ValidationError::InvalidRunCount(cfg.runs));
    }
    Ok(())
}
