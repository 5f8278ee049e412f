#![deny(warnings)]

//! Headless CLI: load a scenario, run the Monte Carlo ensemble, print the
//! percentile bands and KPIs, and optionally export the tables.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sim_core::{Metric, Params, RunConfig, PREVIEW_RUNS};
use sim_runtime::{KpiSnapshot, QuantileSummary};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    scenario: Option<PathBuf>,
    seed: Option<u64>,
    runs: Option<usize>,
    years: Option<u32>,
    out: Option<PathBuf>,
    preview: bool,
    samples: bool,
    version: bool,
}

fn value<T>(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = it.next().with_context(|| format!("{flag} needs a value"))?;
    raw.parse().with_context(|| format!("invalid value for {flag}: {raw:?}"))
}

fn parse_args_from<I: IntoIterator<Item = String>>(argv: I) -> Result<Args> {
    let mut args = Args::default();
    let mut it = argv.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = Some(value(&mut it, "--scenario")?),
            "--seed" => args.seed = Some(value(&mut it, "--seed")?),
            "--runs" => args.runs = Some(value(&mut it, "--runs")?),
            "--years" => args.years = Some(value(&mut it, "--years")?),
            "--out" => args.out = Some(value(&mut it, "--out")?),
            "--preview" => args.preview = true,
            "--samples" => args.samples = true,
            "--version" => args.version = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn parse_args() -> Result<Args> {
    parse_args_from(std::env::args().skip(1))
}

/// Scenario file: a `params` mapping plus optional run settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Scenario {
    params: Params,
    seed: Option<u64>,
    runs: Option<usize>,
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let scenario = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)?,
        _ => serde_yaml::from_str(&text)?,
    };
    Ok(scenario)
}

fn print_params(p: &Params) {
    println!("Parameters");
    for (label, value) in p.describe() {
        println!("  {label:<16} {value}");
    }
}

fn print_bands(q: &QuantileSummary, metrics: &[Metric]) {
    for &m in metrics {
        println!("{} (P10 / P50 / P90)", m.name());
        for row in &q.rows {
            if let Some(b) = q.band(row.year, m) {
                println!(
                    "  Y{:<2} {:>16.0} {:>16.0} {:>16.0}",
                    row.year, b.p10, b.p50, b.p90
                );
            }
        }
    }
}

fn print_kpis(kpi: &KpiSnapshot) {
    println!(
        "KPI (median) | Revenue (Y{y}): €{:.0} | Cash (Y{y}): €{:.0} | \
         EBIT (Y{y}): €{:.0} | Share (Y{y}): {:.1}%",
        kpi.revenue,
        kpi.cash,
        kpi.ebit,
        kpi.share * 100.0,
        y = kpi.year,
    );
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args()?;
    if args.version {
        println!(
            "strategy-sim {} ({} built {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(scenario = ?args.scenario, seed = ?args.seed, runs = ?args.runs, "starting CLI");

    let scenario = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => Scenario::default(),
    };
    let mut params = scenario.params;
    if let Some(years) = args.years {
        params.years = years;
    }
    let defaults = RunConfig::default();
    let cfg = RunConfig {
        seed: args.seed.or(scenario.seed).unwrap_or(defaults.seed),
        runs: args.runs.or(scenario.runs).unwrap_or(defaults.runs),
    };
    print_params(&params);

    if args.preview {
        let preview = sim_runtime::run_and_summarize(
            &params,
            &RunConfig {
                seed: cfg.seed,
                runs: PREVIEW_RUNS,
            },
        )?;
        println!("Preview ({PREVIEW_RUNS} quick runs)");
        print_bands(&preview.quantiles, &[Metric::Revenue]);
        return Ok(());
    }

    let outcome = sim_runtime::run_and_summarize(&params, &cfg)?;
    print_bands(
        &outcome.quantiles,
        &[Metric::Revenue, Metric::Cash, Metric::Ebit, Metric::Units],
    );
    if let Some(kpi) = KpiSnapshot::from_median(&outcome.median) {
        print_kpis(&kpi);
    }

    if let Some(dir) = &args.out {
        let files = data_pipeline::export_all(dir, &outcome, args.samples)?;
        for f in files {
            println!("wrote {}", f.display());
        }
    }
    Ok(())
}
