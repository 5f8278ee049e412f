//! Single-path trajectory generator.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{Metric, Params};
use sim_econ as econ;

/// Metrics of one simulated year.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct YearMetrics {
    /// 1-indexed year number.
    #[serde(rename = "Year")]
    pub year: u32,
    #[serde(rename = "TAM")]
    pub tam: f64,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Units")]
    pub units: f64,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "COGS_unit")]
    pub cogs_unit: f64,
    #[serde(rename = "COGS")]
    pub cogs: f64,
    #[serde(rename = "GrossProfit")]
    pub gross_profit: f64,
    #[serde(rename = "SM")]
    pub sm: f64,
    #[serde(rename = "RD")]
    pub rd: f64,
    #[serde(rename = "GA")]
    pub ga: f64,
    #[serde(rename = "Depreciation")]
    pub depreciation: f64,
    #[serde(rename = "EBIT")]
    pub ebit: f64,
    #[serde(rename = "Tax")]
    pub tax: f64,
    #[serde(rename = "NetIncome")]
    pub net_income: f64,
    #[serde(rename = "Cash")]
    pub cash: f64,
    #[serde(rename = "Share")]
    pub share: f64,
}

impl YearMetrics {
    /// Value of a metric column.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Year => f64::from(self.year),
            Metric::Tam => self.tam,
            Metric::Price => self.price,
            Metric::Units => self.units,
            Metric::Revenue => self.revenue,
            Metric::CogsUnit => self.cogs_unit,
            Metric::Cogs => self.cogs,
            Metric::GrossProfit => self.gross_profit,
            Metric::Sm => self.sm,
            Metric::Rd => self.rd,
            Metric::Ga => self.ga,
            Metric::Depreciation => self.depreciation,
            Metric::Ebit => self.ebit,
            Metric::Tax => self.tax,
            Metric::NetIncome => self.net_income,
            Metric::Cash => self.cash,
            Metric::Share => self.share,
        }
    }
}

/// One simulated trajectory, one entry per year of the horizon.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub years: Vec<YearMetrics>,
    /// Cumulative adopted units after each year (learning-curve driver).
    pub cumulative_units: Vec<f64>,
}

/// One-shot capital investment that triggers in a single year.
struct Investment {
    amount: f64,
    year: u32,
    done: bool,
}

impl Investment {
    fn new(amount: f64, year: u32) -> Self {
        Self {
            amount,
            year,
            done: false,
        }
    }

    /// Returns the capex spent this year and books its depreciation.
    fn trigger(&mut self, year: u32, t: usize, depreciation: &mut [f64]) -> f64 {
        if self.done || year != self.year || self.amount <= 0.0 {
            return 0.0;
        }
        self.done = true;
        econ::depreciate_straight_line(depreciation, t, self.amount);
        self.amount
    }
}

/// Simulate one trajectory from an exclusively owned random stream.
///
/// Draw order per path: the elasticity once, then per year one TAM growth
/// draw followed by one unit-cost shock. `params` is expected to have passed
/// [`sim_core::validate_params`]; with valid parameters this never fails.
pub fn simulate<R: Rng + ?Sized>(params: &Params, rng: &mut R) -> Path {
    let p = params;
    let horizon = p.years as usize;
    let mut years = Vec::with_capacity(horizon);
    let mut cumulative = Vec::with_capacity(horizon);
    let mut depreciation = vec![0.0; horizon];

    let epsilon = econ::draw_elasticity(rng, p.epsilon_mu, p.epsilon_sigma);
    let price = p.price();
    let price_effect = econ::price_effect(price, p.price_baseline, epsilon);
    let potential = econ::share_potential(p.smax, p.k_spend, p.sm_pct_rev.max(0.0), p.m0);

    let mut automation = Investment::new(p.capex_automation, p.invest_auto_year);
    let mut integration = Investment::new(p.capex_integration, p.invest_integ_year);

    let mut cum_units = 1.0_f64;
    let mut tam = p.tam0;
    let mut cash_prev = p.start_cash;
    let mut revenue_prev = 0.0;

    for t in 0..horizon {
        let year = t as u32 + 1;
        tam = econ::grow_tam(rng, tam, p.tam_growth_mu, p.tam_growth_sigma);

        let tam_access = if year >= p.market_dev_year {
            1.0 + p.tam_access_boost
        } else {
            1.0
        };
        let mut quality = p.quality_factor;
        if year >= p.product_dev_year {
            quality *= 1.0 + p.quality_boost;
        }
        let mut availability = p.availability_factor;
        if year >= p.invest_integ_year && p.capex_integration > 0.0 {
            availability *= 1.0 + p.availability_boost;
        }
        let share = econ::market_share(potential, quality, availability);
        let units = tam * tam_access * share * price_effect;

        cum_units = (cum_units + units).max(1.0);
        let shock = econ::lognormal_shock(rng, p.cogs_shock_sigma);
        let cogs_unit = econ::learning_curve_cost(p.cogs0, cum_units, p.learning_b, shock);
        let cogs = cogs_unit * units;

        let revenue = price * units;
        let gross_profit = (revenue - cogs).max(0.0);
        let sm = (p.sm_pct_rev * revenue).max(0.0);
        let rd = (p.rd_pct_rev * revenue).max(0.0);
        let ga = (p.ga_pct_rev * revenue).max(0.0);

        let capex = automation.trigger(year, t, &mut depreciation)
            + integration.trigger(year, t, &mut depreciation);

        let ebit = gross_profit - (sm + rd + ga) - depreciation[t];
        let tax = econ::tax_on(ebit, p.tax_rate);
        let net_income = ebit - tax;

        let wc_draw = p.wc_ratio * (revenue - revenue_prev);
        let cash = cash_prev + net_income - capex - wc_draw;

        years.push(YearMetrics {
            year,
            tam,
            price,
            units,
            revenue,
            cogs_unit,
            cogs,
            gross_profit,
            sm,
            rd,
            ga,
            depreciation: depreciation[t],
            ebit,
            tax,
            net_income,
            cash,
            share,
        });
        cumulative.push(cum_units);

        cash_prev = cash;
        revenue_prev = revenue;
    }

    Path {
        years,
        cumulative_units: cumulative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn flat_one_year() -> Params {
        Params {
            years: 1,
            tam0: 1000.0,
            tam_growth_mu: 0.0,
            tam_growth_sigma: 0.0,
            price_baseline: 100.0,
            price_delta_pct: 0.0,
            epsilon_mu: 1.0,
            epsilon_sigma: 0.0,
            sm_pct_rev: 0.10,
            smax: 0.35,
            k_spend: 16.0,
            m0: 0.10,
            quality_factor: 1.0,
            availability_factor: 1.0,
            invest_auto_year: 1,
            invest_integ_year: 1,
            product_dev_year: 1,
            market_dev_year: 1,
            quality_boost: 0.0,
            tam_access_boost: 0.0,
            ..Params::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn concrete_one_year_scenario() {
        let p = flat_one_year();
        sim_core::validate_params(&p).unwrap();
        let path = simulate(&p, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(path.years.len(), 1);
        let y = path.years[0];
        assert_eq!(y.year, 1);
        assert_eq!(y.tam, 1000.0);
        assert_eq!(y.price, 100.0);
        assert!(close(y.share, 0.175));
        assert!(close(y.units, 175.0));
        assert!(close(y.revenue, 17_500.0));
        assert!(close(y.sm, 1750.0));
    }

    #[test]
    fn capex_depreciates_over_four_years() {
        let p = Params {
            years: 5,
            capex_automation: 400.0,
            invest_auto_year: 1,
            ..Params::default()
        };
        let path = simulate(&p, &mut ChaCha8Rng::seed_from_u64(9));
        let dep: Vec<f64> = path.years.iter().map(|y| y.depreciation).collect();
        assert_eq!(dep, vec![100.0, 100.0, 100.0, 100.0, 0.0]);
        assert_eq!(dep.iter().sum::<f64>(), 400.0);
    }

    #[test]
    fn coinciding_investments_stack() {
        let p = Params {
            years: 4,
            capex_automation: 400.0,
            invest_auto_year: 3,
            capex_integration: 800.0,
            invest_integ_year: 3,
            ..Params::default()
        };
        let path = simulate(&p, &mut ChaCha8Rng::seed_from_u64(2));
        let dep: Vec<f64> = path.years.iter().map(|y| y.depreciation).collect();
        assert_eq!(dep, vec![0.0, 0.0, 300.0, 300.0]);
    }

    #[test]
    fn capex_reduces_cash_once() {
        let base = Params {
            years: 6,
            tam_growth_sigma: 0.0,
            epsilon_sigma: 0.0,
            cogs_shock_sigma: 0.0,
            tax_rate: 0.0,
            ..Params::default()
        };
        let with_capex = Params {
            capex_automation: 1_000.0,
            invest_auto_year: 2,
            ..base.clone()
        };
        let a = simulate(&base, &mut ChaCha8Rng::seed_from_u64(5));
        let b = simulate(&with_capex, &mut ChaCha8Rng::seed_from_u64(5));
        // capex 1000 plus 250 of depreciation in each of years 2..=5
        let expected_gap = [0.0, 1250.0, 1500.0, 1750.0, 2000.0, 2000.0];
        for (t, gap) in expected_gap.iter().enumerate() {
            let diff = a.years[t].cash - b.years[t].cash;
            assert!((diff - gap).abs() < 1e-3, "year {}: {diff}", t + 1);
        }
    }

    #[test]
    fn availability_boost_requires_integration_capex() {
        let base = Params {
            years: 4,
            invest_integ_year: 2,
            product_dev_year: 4,
            market_dev_year: 4,
            quality_boost: 0.0,
            ..Params::default()
        };
        let without = simulate(&base, &mut ChaCha8Rng::seed_from_u64(1));
        assert!(close(without.years[1].share, without.years[0].share));
        let with = Params {
            capex_integration: 10.0,
            ..base
        };
        let with = simulate(&with, &mut ChaCha8Rng::seed_from_u64(1));
        assert!(close(with.years[1].share, with.years[0].share * 1.08));
    }

    #[test]
    fn first_year_working_capital_uses_zero_prior_revenue() {
        let p = Params {
            tax_rate: 0.0,
            ..flat_one_year()
        };
        let path = simulate(&p, &mut ChaCha8Rng::seed_from_u64(4));
        let y = path.years[0];
        let expected = p.start_cash + y.net_income - p.wc_ratio * y.revenue;
        assert!(close(y.cash, expected));
    }

    proptest! {
        #[test]
        fn path_invariants(
            seed in any::<u64>(),
            years in 1u32..12,
            delta in -0.5f64..0.5,
            sm in 0.0f64..0.4,
            growth_mu in -0.5f64..0.2,
            growth_sigma in 0.0f64..1.5,
        ) {
            let p = Params {
                years,
                tam_growth_mu: growth_mu,
                tam_growth_sigma: growth_sigma,
                invest_auto_year: 1,
                invest_integ_year: years,
                product_dev_year: years,
                market_dev_year: 1,
                price_delta_pct: delta,
                sm_pct_rev: sm,
                capex_automation: 600_000.0,
                capex_integration: 800_000.0,
                ..Params::default()
            };
            let path = simulate(&p, &mut ChaCha8Rng::seed_from_u64(seed));
            prop_assert_eq!(path.years.len(), years as usize);
            for y in &path.years {
                prop_assert!(y.units >= 0.0);
                prop_assert!((0.0..=econ::MAX_SHARE).contains(&y.share));
                prop_assert!(y.gross_profit >= 0.0 && y.sm >= 0.0 && y.rd >= 0.0 && y.ga >= 0.0);
            }
            prop_assert!(path.cumulative_units[0] >= 1.0);
            for w in path.cumulative_units.windows(2) {
                prop_assert!(w[1] >= w[0]);
            }
        }
    }
}
