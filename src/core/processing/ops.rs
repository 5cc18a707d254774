use ndarray::{Array2, ArrayView2, Zip};
use tracing::debug;

use crate::core::processing::stats::{RatioStats, summary_statistics_masked};
use crate::error::{Error, Result};
use crate::types::ZeroPolicy;

/// Sanitized band ratio.
///
/// `values` holds no NaN or infinity. `valid` marks the cells whose quotient
/// was defined and finite before sanitization.
#[derive(Debug, Clone)]
pub struct RatioRaster {
    pub values: Array2<f64>,
    pub valid: Array2<bool>,
}

impl RatioRaster {
    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    /// Min/max/mean over valid cells; `EmptyInput` when none survived.
    pub fn statistics(&self) -> Result<RatioStats> {
        summary_statistics_masked(&self.values, &self.valid)
    }
}

/// Replace NaN and ±infinity with 0.
#[inline]
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Element-wise ratio `a / b` with the given zero-denominator policy.
///
/// Fails with `ShapeMismatch` when the planes differ in shape and with
/// `InvalidArgument` for a non-positive or non-finite epsilon. The output is
/// fully finite.
pub fn compute_ratio(
    band_a: ArrayView2<'_, f64>,
    band_b: ArrayView2<'_, f64>,
    policy: ZeroPolicy,
) -> Result<RatioRaster> {
    policy.validate()?;
    if band_a.dim() != band_b.dim() {
        return Err(Error::shape_mismatch(band_a.dim(), band_b.dim()));
    }

    let mut values = Array2::<f64>::zeros(band_a.dim());
    let mut valid = Array2::from_elem(band_a.dim(), false);

    match policy {
        ZeroPolicy::Epsilon { epsilon } => {
            Zip::from(&band_a)
                .and(&band_b)
                .and(&mut values)
                .and(&mut valid)
                .for_each(|&a, &b, out, ok| {
                    let denom = if b == 0.0 { epsilon } else { b };
                    let q = a / denom;
                    *ok = q.is_finite();
                    *out = sanitize(q);
                });
        }
        ZeroPolicy::GuardedZero => {
            Zip::from(&band_a)
                .and(&band_b)
                .and(&mut values)
                .and(&mut valid)
                .for_each(|&a, &b, out, ok| {
                    if b != 0.0 {
                        let q = a / b;
                        *ok = q.is_finite();
                        *out = sanitize(q);
                    }
                });
        }
    }

    debug!(
        "compute_ratio: policy={}, shape={:?}, sanitized={}",
        policy,
        values.dim(),
        valid.iter().filter(|&&v| !v).count()
    );

    Ok(RatioRaster { values, valid })
}
