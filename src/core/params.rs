use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::bands::mineral_band_pair;
use crate::error::{Error, Result};
use crate::types::{BandPair, MineralTarget, OutputFormat, ZeroPolicy};

/// Threshold preset used when none is configured
pub const DEFAULT_THRESHOLD: f64 = 1.2;
/// Histogram bin count used when none is configured
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

/// Analysis parameters suitable for config files and presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub mineral: MineralTarget,
    /// Explicit band pair; overrides the mineral preset when set
    pub bands: Option<BandPair>,
    pub zero_policy: ZeroPolicy,
    /// Cells with a ratio strictly above this value are flagged
    pub threshold: f64,
    pub histogram_bins: usize,
    /// Encoding of the display mask
    pub format: OutputFormat,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            mineral: MineralTarget::Iron,
            bands: None,
            zero_policy: ZeroPolicy::default(),
            threshold: DEFAULT_THRESHOLD,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            format: OutputFormat::TIFF,
        }
    }
}

impl AnalysisParams {
    /// Band pair requested by these parameters, before fitting it to an image.
    pub fn requested_bands(&self) -> BandPair {
        self.bands.unwrap_or_else(|| mineral_band_pair(self.mineral))
    }

    /// Reject values no analysis can use: a non-positive or non-finite
    /// epsilon, a non-finite threshold, or zero histogram bins.
    pub fn validate(&self) -> Result<()> {
        self.zero_policy.validate()?;
        if !self.threshold.is_finite() {
            return Err(Error::InvalidArgument {
                arg: "threshold",
                value: self.threshold.to_string(),
            });
        }
        if self.histogram_bins == 0 {
            return Err(Error::InvalidArgument {
                arg: "histogram_bins",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Load parameters from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_bands_override_mineral_preset() {
        let mut params = AnalysisParams::default();
        assert_eq!(params.requested_bands(), BandPair::new(7, 6));
        params.mineral = MineralTarget::Copper;
        assert_eq!(params.requested_bands(), BandPair::new(5, 4));
        params.bands = Some(BandPair::new(2, 9));
        assert_eq!(params.requested_bands(), BandPair::new(2, 9));
    }

    #[test]
    fn partial_json_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(
            &path,
            r#"{ "mineral": "kimberlite", "zero_policy": { "policy": "epsilon", "epsilon": 1e-6 } }"#,
        )
        .unwrap();

        let params = AnalysisParams::from_json_file(&path).unwrap();
        assert_eq!(params.mineral, MineralTarget::Kimberlite);
        assert_eq!(params.zero_policy, ZeroPolicy::Epsilon { epsilon: 1e-6 });
        assert_eq!(params.threshold, DEFAULT_THRESHOLD);
        assert_eq!(params.histogram_bins, DEFAULT_HISTOGRAM_BINS);
        assert_eq!(params.format, OutputFormat::TIFF);
    }

    #[test]
    fn config_with_bad_epsilon_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        for eps in ["-1e-10", "0.0"] {
            std::fs::write(
                &path,
                format!(r#"{{ "zero_policy": {{ "policy": "epsilon", "epsilon": {eps} }} }}"#),
            )
            .unwrap();
            let err = AnalysisParams::from_json_file(&path).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument { arg: "epsilon", .. }));
        }
    }

    #[test]
    fn validate_checks_threshold_and_bins() {
        assert!(AnalysisParams::default().validate().is_ok());
        let params = AnalysisParams {
            threshold: f64::NAN,
            ..AnalysisParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidArgument { arg: "threshold", .. })
        ));
        let params = AnalysisParams {
            histogram_bins: 0,
            ..AnalysisParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidArgument { arg: "histogram_bins", .. })
        ));
    }
}
