#![deny(warnings)]

//! Monte Carlo runtime for the strategy simulator.
//!
//! A [`path::simulate`] call turns a parameter set and an exclusively owned
//! random stream into one trajectory. [`ensemble::run`] derives independent
//! child streams from a single seed and collects many trajectories into a
//! flat table, which [`summary::summarize`] reduces to per-year percentile
//! bands and a median snapshot.

pub mod ensemble;
pub mod path;
pub mod summary;

pub use ensemble::{derive_child_seeds, run, run_with, simulate_seeded, RawSamples, SampleRow};
pub use path::{simulate, Path, YearMetrics};
pub use summary::{
    quantile_sorted, summarize, Band, KpiSnapshot, MedianSummary, QuantileSummary,
};

use sim_core::{Params, RunConfig, ValidationError, SUMMARY_METRICS};

/// Everything a front end needs from one simulation request.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub samples: RawSamples,
    pub quantiles: QuantileSummary,
    pub median: MedianSummary,
}

/// Run an ensemble and summarize it over the default metric set.
pub fn run_and_summarize(params: &Params, cfg: &RunConfig) -> Result<Outcome, ValidationError> {
    let samples = run_with(params, cfg)?;
    let (quantiles, median) = summarize(&samples, &SUMMARY_METRICS);
    Ok(Outcome {
        samples,
        quantiles,
        median,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_tables_cover_horizon() {
        let cfg = RunConfig { seed: 42, runs: 25 };
        let out = run_and_summarize(&Params::default(), &cfg).unwrap();
        assert_eq!(out.samples.len(), 25 * 8);
        assert_eq!(out.quantiles.rows.len(), 8);
        assert_eq!(out.median.rows.len(), 8);
        assert!(KpiSnapshot::from_median(&out.median).is_some());
    }
}
