//! Summary statistics and histogram binning over ratio grids.
//!
//! Only finite cells participate. The `_masked` variants further restrict to
//! cells marked valid, which is how [`super::ops::RatioRaster`] excludes
//! cells that were sanitized to zero.
use ndarray::{Array2, Zip};
use serde::Serialize;

use crate::error::{Error, Result};

/// Basic statistics of a ratio grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatioStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Number of cells that contributed
    pub count: usize,
}

/// Equal-width histogram; `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Single pass min/max plus Welford running mean.
fn accumulate<I: Iterator<Item = f64>>(values: I) -> Result<RatioStats> {
    let mut count: usize = 0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut mean = 0.0_f64;

    for v in values.filter(|v| v.is_finite()) {
        count += 1;
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
        mean += (v - mean) / (count as f64);
    }

    if count == 0 {
        return Err(Error::EmptyInput);
    }
    Ok(RatioStats {
        min,
        max,
        mean,
        count,
    })
}

fn masked_values<'a>(
    grid: &'a Array2<f64>,
    valid: &'a Array2<bool>,
) -> Result<impl Iterator<Item = f64> + 'a> {
    if grid.dim() != valid.dim() {
        return Err(Error::shape_mismatch(grid.dim(), valid.dim()));
    }
    Ok(grid
        .iter()
        .zip(valid.iter())
        .filter_map(|(&v, &ok)| if ok { Some(v) } else { None }))
}

/// Min/max/mean over the finite cells of `grid`.
pub fn summary_statistics(grid: &Array2<f64>) -> Result<RatioStats> {
    accumulate(grid.iter().copied())
}

/// Min/max/mean over the finite cells of `grid` that are marked in `valid`.
pub fn summary_statistics_masked(grid: &Array2<f64>, valid: &Array2<bool>) -> Result<RatioStats> {
    accumulate(masked_values(grid, valid)?)
}

fn bin_values(values: &[f64], bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(Error::InvalidArgument {
            arg: "bins",
            value: bins.to_string(),
        });
    }
    let stats = accumulate(values.iter().copied())?;

    // A constant grid gets a unit-wide range centered on its value
    let (lo, hi) = if stats.max > stats.min {
        (stats.min, stats.max)
    } else {
        (stats.min - 0.5, stats.max + 0.5)
    };
    let span = hi - lo;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| lo + span * (i as f64) / (bins as f64))
        .collect();

    let mut counts = vec![0u64; bins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        let t = ((v - lo) / span).clamp(0.0, 1.0);
        let idx = ((t * bins as f64) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram { edges, counts })
}

/// Histogram of the finite cells of `grid` over `[min, max]`, last bin closed.
pub fn histogram(grid: &Array2<f64>, bins: usize) -> Result<Histogram> {
    let values: Vec<f64> = grid.iter().copied().collect();
    bin_values(&values, bins)
}

/// Histogram of the finite, valid cells of `grid`.
pub fn histogram_masked(grid: &Array2<f64>, valid: &Array2<bool>, bins: usize) -> Result<Histogram> {
    if grid.dim() != valid.dim() {
        return Err(Error::shape_mismatch(grid.dim(), valid.dim()));
    }
    let mut values = Vec::with_capacity(grid.len());
    Zip::from(grid).and(valid).for_each(|&v, &ok| {
        if ok {
            values.push(v);
        }
    });
    bin_values(&values, bins)
}
