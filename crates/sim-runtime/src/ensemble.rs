//! Ensemble runner: many independent paths from one seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use sim_core::{validate_params, validate_run_config, Metric, Params, RunConfig, ValidationError};
use tracing::{debug, info};

use crate::path::{simulate, Path, YearMetrics};

/// Child seeds are drawn uniformly from `[0, CHILD_SEED_BOUND)`.
pub const CHILD_SEED_BOUND: u64 = (1 << 31) - 1;

/// One row of the raw samples table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SampleRow {
    /// 0-based run index.
    pub run: usize,
    #[serde(flatten)]
    pub metrics: YearMetrics,
}

/// Flat row-per-(run, year) table, stored run-major in one buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct RawSamples {
    years: usize,
    runs: usize,
    rows: Vec<SampleRow>,
}

impl RawSamples {
    fn with_capacity(years: usize, runs: usize) -> Self {
        Self {
            years,
            runs,
            rows: Vec::with_capacity(years * runs),
        }
    }

    fn push_path(&mut self, run: usize, path: Path) {
        debug_assert_eq!(path.years.len(), self.years);
        self.rows
            .extend(path.years.into_iter().map(|metrics| SampleRow { run, metrics }));
    }

    /// Horizon length of every path.
    pub fn years(&self) -> usize {
        self.years
    }

    /// Number of runs in the ensemble.
    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of a single run, in year order.
    pub fn path(&self, run: usize) -> Option<&[SampleRow]> {
        if run >= self.runs {
            return None;
        }
        let start = run * self.years;
        self.rows.get(start..start + self.years)
    }

    /// Values of `metric` across all runs for a 0-based year index.
    pub fn year_values(&self, year_index: usize, metric: Metric) -> Vec<f64> {
        if year_index >= self.years {
            return Vec::new();
        }
        self.rows
            .iter()
            .skip(year_index)
            .step_by(self.years)
            .map(|r| r.metrics.get(metric))
            .collect()
    }
}

/// Derive one child seed per run by sequential draws from a generator seeded
/// with `seed`.
///
/// The draw order is the reproducibility contract: run `i` always receives the
/// `i`-th draw, so a larger `n` extends the seed list without changing its
/// prefix.
pub fn derive_child_seeds(seed: u64, n: usize) -> Vec<u64> {
    let mut top = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| top.gen_range(0..CHILD_SEED_BOUND)).collect()
}

/// Simulate a single run from its child seed.
pub fn simulate_seeded(params: &Params, child_seed: u64) -> Path {
    let mut rng = ChaCha8Rng::seed_from_u64(child_seed);
    simulate(params, &mut rng)
}

/// Run an ensemble of `n` paths and collect them into a raw samples table.
///
/// Parameters are validated before any path is simulated. Child seeds are
/// derived sequentially; paths then run in parallel and are collected in run
/// order, so the table is identical to a sequential execution.
pub fn run(params: &Params, seed: u64, n: usize) -> Result<RawSamples, ValidationError> {
    validate_params(params)?;
    validate_run_config(&RunConfig { seed, runs: n })?;
    debug!(seed, runs = n, years = params.years, "starting ensemble");

    let seeds = derive_child_seeds(seed, n);
    let paths: Vec<Path> = seeds
        .par_iter()
        .map(|&s| simulate_seeded(params, s))
        .collect();

    let mut samples = RawSamples::with_capacity(params.years as usize, n);
    for (run, path) in paths.into_iter().enumerate() {
        samples.push_path(run, path);
    }
    info!(runs = n, rows = samples.len(), "ensemble complete");
    Ok(samples)
}

/// Convenience wrapper taking a [`RunConfig`].
pub fn run_with(params: &Params, cfg: &RunConfig) -> Result<RawSamples, ValidationError> {
    run(params, cfg.seed, cfg.runs)
}
