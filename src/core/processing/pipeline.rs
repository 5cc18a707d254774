use ndarray::Array2;
use tracing::info;

use crate::core::bands::{BandSelection, select_bands};
use crate::core::cube::HyperspectralCube;
use crate::core::params::AnalysisParams;
use crate::core::processing::classify::{classify, flagged_count, to_display_mask};
use crate::core::processing::ops::{RatioRaster, compute_ratio};
use crate::core::processing::stats::{Histogram, RatioStats, histogram_masked};
use crate::error::{Error, Result};

/// Everything one band-ratio analysis produces
#[derive(Debug, Clone)]
pub struct BandRatioAnalysis {
    pub selection: BandSelection,
    pub ratio: RatioRaster,
    pub stats: RatioStats,
    pub histogram: Histogram,
    pub threshold: f64,
    pub mask: Array2<bool>,
    pub display_mask: Array2<u8>,
    pub flagged: usize,
}

impl BandRatioAnalysis {
    /// Re-run only the classification step for a different threshold.
    pub fn reclassify(&mut self, threshold: f64) {
        self.threshold = threshold;
        self.mask = classify(&self.ratio.values, threshold);
        self.display_mask = to_display_mask(&self.mask);
        self.flagged = flagged_count(&self.mask);
    }
}

/// Select bands, compute and summarize the ratio, then classify it.
///
/// Parameters are validated first. `EmptyInput` from the statistics step is
/// returned before any classification happens.
pub fn analyze_cube(cube: &HyperspectralCube, params: &AnalysisParams) -> Result<BandRatioAnalysis> {
    params.validate()?;
    let selection = select_bands(cube.band_count(), params.requested_bands())?;
    let pair = selection.used;

    let (band_a, band_b) = match (cube.band(pair.numerator), cube.band(pair.denominator)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(Error::InsufficientBands {
                bands: cube.band_count(),
            });
        }
    };

    info!(
        "Computing band ratio {} with {} over {:?}",
        pair,
        params.zero_policy,
        cube.dims()
    );
    let ratio = compute_ratio(band_a, band_b, params.zero_policy)?;
    let stats = ratio.statistics()?;
    info!(
        "Ratio statistics: min={}, max={}, mean={} ({} cells)",
        stats.min, stats.max, stats.mean, stats.count
    );

    let histogram = histogram_masked(&ratio.values, &ratio.valid, params.histogram_bins)?;

    let mask = classify(&ratio.values, params.threshold);
    let display_mask = to_display_mask(&mask);
    let flagged = flagged_count(&mask);
    info!(
        "Flagged {} of {} cells above threshold {}",
        flagged,
        mask.len(),
        params.threshold
    );

    Ok(BandRatioAnalysis {
        selection,
        ratio,
        stats,
        histogram,
        threshold: params.threshold,
        mask,
        display_mask,
        flagged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BandPair, ZeroPolicy};
    use ndarray::Array3;

    fn cube_with(bands: usize, fill: impl Fn(usize, usize, usize) -> f64) -> HyperspectralCube {
        HyperspectralCube::new(Array3::from_shape_fn((bands, 2, 2), |(b, r, c)| fill(b, r, c)))
    }

    #[test]
    fn iron_preset_uses_bands_seven_and_six() {
        // band 7 = 3, band 6 = 2 everywhere except one zero denominator
        let cube = cube_with(8, |b, r, c| match (b, r, c) {
            (6, 1, 1) => 0.0,
            (7, _, _) => 3.0,
            (6, _, _) => 2.0,
            _ => 1.0,
        });
        let analysis = analyze_cube(&cube, &AnalysisParams::default()).unwrap();
        assert_eq!(analysis.selection.used, BandPair::new(7, 6));
        assert_eq!(analysis.ratio.values[[0, 0]], 1.5);
        assert_eq!(analysis.ratio.values[[1, 1]], 0.0);
        assert_eq!(analysis.stats.count, 3);
        assert_eq!(analysis.stats.max, 1.5);
        assert_eq!(analysis.flagged, 3);
        assert_eq!(analysis.display_mask[[1, 1]], 0);
        assert_eq!(analysis.histogram.total(), 3);
    }

    #[test]
    fn small_cube_falls_back_to_first_two_bands() {
        let cube = cube_with(3, |b, _, _| (b + 1) as f64);
        let analysis = analyze_cube(&cube, &AnalysisParams::default()).unwrap();
        assert!(analysis.selection.is_fallback());
        assert_eq!(analysis.selection.used, BandPair::FALLBACK);
        assert!(analysis.ratio.values.iter().all(|&v| v == 0.5));
        assert_eq!(analysis.flagged, 0);
    }

    #[test]
    fn degenerate_ratio_stops_before_classification() {
        let cube = cube_with(2, |b, _, _| if b == 0 { 1.0 } else { 0.0 });
        let params = AnalysisParams {
            zero_policy: ZeroPolicy::GuardedZero,
            ..AnalysisParams::default()
        };
        assert!(matches!(analyze_cube(&cube, &params), Err(Error::EmptyInput)));
    }

    #[test]
    fn reclassify_updates_mask_only() {
        let cube = cube_with(2, |b, r, _| if b == 0 { (r + 1) as f64 } else { 1.0 });
        let mut analysis = analyze_cube(&cube, &AnalysisParams::default()).unwrap();
        assert_eq!(analysis.flagged, 2);
        analysis.reclassify(0.5);
        assert_eq!(analysis.flagged, 4);
        assert_eq!(analysis.threshold, 0.5);
        assert!(analysis.display_mask.iter().all(|&b| b == 255));
    }

    #[test]
    fn negative_epsilon_fails_before_any_ratio() {
        let cube = cube_with(2, |b, _, _| if b == 0 { 2.0 } else { 0.0 });
        let params = AnalysisParams {
            zero_policy: ZeroPolicy::Epsilon { epsilon: -1e-10 },
            ..AnalysisParams::default()
        };
        assert!(matches!(
            analyze_cube(&cube, &params),
            Err(Error::InvalidArgument { arg: "epsilon", .. })
        ));
    }
}
