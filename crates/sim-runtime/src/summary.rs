//! Per-year percentile bands and median snapshot of an ensemble.

use serde::Serialize;
use sim_core::Metric;

use crate::ensemble::RawSamples;

/// Column suffixes of the reported quantile levels.
pub const BAND_SUFFIXES: [&str; 3] = ["p10", "p50", "p90"];

/// Columns covered by the median table: every numeric metric except the
/// grouping key.
pub fn median_metrics() -> impl Iterator<Item = Metric> {
    Metric::ALL.into_iter().filter(|m| *m != Metric::Year)
}

/// Quantile of an ascending-sorted slice with linear interpolation between
/// order statistics (position `q * (n - 1)`). Returns NaN for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    let (a, b) = (sorted[lo], sorted[hi]);
    // keep the result inside [a, b] despite rounding
    (a + (b - a) * frac).max(a).min(b)
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

/// P10/P50/P90 of one metric in one year.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Band {
    pub metric: Metric,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

impl Band {
    fn from_sorted(metric: Metric, sorted: &[f64]) -> Self {
        Self {
            metric,
            p10: quantile_sorted(sorted, 0.10),
            p50: quantile_sorted(sorted, 0.50),
            p90: quantile_sorted(sorted, 0.90),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuantileRow {
    pub year: u32,
    pub bands: Vec<Band>,
}

/// One row per year with a band for each requested metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuantileSummary {
    pub metrics: Vec<Metric>,
    pub rows: Vec<QuantileRow>,
}

impl QuantileSummary {
    /// Column headers: `Year` followed by `{metric}_p10`, `{metric}_p50`,
    /// `{metric}_p90` per metric.
    pub fn columns(&self) -> Vec<String> {
        let mut cols = vec![Metric::Year.name().to_string()];
        for m in &self.metrics {
            for suffix in BAND_SUFFIXES {
                cols.push(format!("{}_{}", m.name(), suffix));
            }
        }
        cols
    }

    /// Band for a 1-indexed year and metric, if present.
    pub fn band(&self, year: u32, metric: Metric) -> Option<&Band> {
        self.rows
            .iter()
            .find(|r| r.year == year)?
            .bands
            .iter()
            .find(|b| b.metric == metric)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MedianRow {
    pub year: u32,
    /// Values aligned with [`median_metrics`].
    pub values: Vec<f64>,
}

/// Per-year median of every numeric metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MedianSummary {
    pub rows: Vec<MedianRow>,
}

impl MedianSummary {
    pub fn columns(&self) -> Vec<&'static str> {
        std::iter::once(Metric::Year)
            .chain(median_metrics())
            .map(Metric::name)
            .collect()
    }

    pub fn value(&self, year: u32, metric: Metric) -> Option<f64> {
        let row = self.rows.iter().find(|r| r.year == year)?;
        if metric == Metric::Year {
            return Some(f64::from(row.year));
        }
        let idx = median_metrics().position(|m| m == metric)?;
        row.values.get(idx).copied()
    }
}

/// Summarize a raw samples table into percentile bands for `metrics` and a
/// median-of-every-metric table, both grouped by year.
pub fn summarize(raw: &RawSamples, metrics: &[Metric]) -> (QuantileSummary, MedianSummary) {
    let mut q_rows = Vec::with_capacity(raw.years());
    let mut m_rows = Vec::with_capacity(raw.years());
    for t in 0..raw.years() {
        let year = t as u32 + 1;
        let bands = metrics
            .iter()
            .map(|&m| Band::from_sorted(m, &sorted(raw.year_values(t, m))))
            .collect();
        q_rows.push(QuantileRow { year, bands });

        let values = median_metrics()
            .map(|m| quantile_sorted(&sorted(raw.year_values(t, m)), 0.50))
            .collect();
        m_rows.push(MedianRow { year, values });
    }
    (
        QuantileSummary {
            metrics: metrics.to_vec(),
            rows: q_rows,
        },
        MedianSummary { rows: m_rows },
    )
}

/// Final-year median KPIs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct KpiSnapshot {
    pub year: u32,
    pub revenue: f64,
    pub cash: f64,
    pub ebit: f64,
    pub share: f64,
}

impl KpiSnapshot {
    /// Snapshot of the last year in the median table; `None` when empty.
    pub fn from_median(median: &MedianSummary) -> Option<Self> {
        let year = median.rows.last()?.year;
        Some(Self {
            year,
            revenue: median.value(year, Metric::Revenue)?,
            cash: median.value(year, Metric::Cash)?,
            ebit: median.value(year, Metric::Ebit)?,
            share: median.value(year, Metric::Share)?,
        })
    }
}
