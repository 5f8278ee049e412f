#![deny(warnings)]

//! Tabular exports of simulation outcomes: delimited text and JSON.

use anyhow::{Context, Result};
use serde_json::json;
use sim_core::Metric;
use sim_runtime::{KpiSnapshot, MedianSummary, Outcome, QuantileSummary, RawSamples};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

fn write_row<W: Write>(w: &mut W, cells: impl IntoIterator<Item = String>) -> Result<()> {
    let line = cells.into_iter().collect::<Vec<_>>().join(",");
    writeln!(w, "{line}")?;
    Ok(())
}

/// Write the raw samples table: `run` followed by every metric column.
pub fn write_samples_csv<W: Write>(w: &mut W, samples: &RawSamples) -> Result<()> {
    write_row(
        w,
        std::iter::once("run".to_string()).chain(Metric::ALL.iter().map(|m| m.name().to_string())),
    )?;
    for row in samples.rows() {
        write_row(
            w,
            std::iter::once(row.run.to_string())
                .chain(Metric::ALL.iter().map(|&m| row.metrics.get(m).to_string())),
        )?;
    }
    Ok(())
}

/// Write the percentile table, one row per year.
pub fn write_quantiles_csv<W: Write>(w: &mut W, q: &QuantileSummary) -> Result<()> {
    write_row(w, q.columns())?;
    for row in &q.rows {
        let cells = std::iter::once(row.year.to_string()).chain(
            row.bands
                .iter()
                .flat_map(|b| [b.p10, b.p50, b.p90])
                .map(|v| v.to_string()),
        );
        write_row(w, cells)?;
    }
    Ok(())
}

/// Write the median table, one row per year.
pub fn write_median_csv<W: Write>(w: &mut W, med: &MedianSummary) -> Result<()> {
    write_row(w, med.columns().into_iter().map(str::to_string))?;
    for row in &med.rows {
        write_row(
            w,
            std::iter::once(row.year.to_string()).chain(row.values.iter().map(|v| v.to_string())),
        )?;
    }
    Ok(())
}

/// JSON document with both summaries and the final-year KPI snapshot.
pub fn summary_json(outcome: &Outcome) -> serde_json::Value {
    json!({
        "runs": outcome.samples.runs(),
        "years": outcome.samples.years(),
        "quantiles": outcome.quantiles,
        "median": outcome.median,
        "kpi": KpiSnapshot::from_median(&outcome.median),
    })
}

fn create(dir: &Path, name: &str) -> Result<(PathBuf, BufWriter<File>)> {
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    Ok((path, BufWriter::new(file)))
}

/// Write `quantiles.csv`, `median.csv`, `summary.json` and optionally
/// `samples.csv` into `dir`, creating it if needed. Returns written paths.
pub fn export_all(dir: &Path, outcome: &Outcome, with_samples: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = Vec::new();

    let (path, mut w) = create(dir, "quantiles.csv")?;
    write_quantiles_csv(&mut w, &outcome.quantiles)?;
    w.flush()?;
    written.push(path);

    let (path, mut w) = create(dir, "median.csv")?;
    write_median_csv(&mut w, &outcome.median)?;
    w.flush()?;
    written.push(path);

    if with_samples {
        let (path, mut w) = create(dir, "samples.csv")?;
        write_samples_csv(&mut w, &outcome.samples)?;
        w.flush()?;
        written.push(path);
    }

    let (path, mut w) = create(dir, "summary.json")?;
    serde_json::to_writer_pretty(&mut w, &summary_json(outcome))?;
    w.flush()?;
    written.push(path);

    info!(dir = %dir.display(), files = written.len(), "exported tables");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{Params, RunConfig};

    fn outcome() -> Outcome {
        let p = Params {
            years: 3,
            invest_integ_year: 2,
            product_dev_year: 2,
            market_dev_year: 3,
            ..Params::default()
        };
        sim_runtime::run_and_summarize(&p, &RunConfig { seed: 42, runs: 10 }).unwrap()
    }

    fn lines(buf: Vec<u8>) -> Vec<String> {
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn quantiles_csv_layout() {
        let out = outcome();
        let mut buf = Vec::new();
        write_quantiles_csv(&mut buf, &out.quantiles).unwrap();
        let lines = lines(buf);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Year,Revenue_p10,Revenue_p50,Revenue_p90,Cash_p10"));
        assert!(lines[1].starts_with("1,"));
        assert_eq!(lines[1].split(',').count(), 22);
    }

    #[test]
    fn samples_csv_has_row_per_run_year() {
        let out = outcome();
        let mut buf = Vec::new();
        write_samples_csv(&mut buf, &out.samples).unwrap();
        let lines = lines(buf);
        assert_eq!(lines.len(), 1 + 10 * 3);
        assert!(lines[0].starts_with("run,Year,TAM,Price"));
        assert!(lines[0].ends_with("Cash,Share"));
        assert!(lines[4].starts_with("1,1,"));
    }

    #[test]
    fn median_csv_has_all_metrics() {
        let out = outcome();
        let mut buf = Vec::new();
        write_median_csv(&mut buf, &out.median).unwrap();
        let lines = lines(buf);
        assert_eq!(lines[0].split(',').count(), Metric::ALL.len());
        assert!(lines[3].starts_with("3,"));
    }

    #[test]
    fn json_summary_carries_kpi() {
        let v = summary_json(&outcome());
        assert_eq!(v["runs"], 10);
        assert_eq!(v["kpi"]["year"], 3);
        assert_eq!(v["quantiles"]["rows"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn export_writes_files() {
        let dir = std::env::temp_dir().join(format!("sim-export-{}", std::process::id()));
        let files = export_all(&dir, &outcome(), true).unwrap();
        assert_eq!(files.len(), 4);
        for f in &files {
            assert!(f.exists());
        }
        fs::remove_dir_all(&dir).unwrap();
    }
}
