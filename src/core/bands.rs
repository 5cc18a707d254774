//! Band selection: mineral presets and the out-of-range fallback.
//!
//! Presets are a plain lookup table. When the requested pair does not fit the
//! loaded image, analysis continues with [`BandPair::FALLBACK`] and the
//! returned [`BandSelection`] carries a user-facing warning.
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::{BandPair, MineralTarget};

const MINERAL_BANDS: &[(MineralTarget, BandPair)] = &[
    (MineralTarget::Iron, BandPair::new(7, 6)),
    (MineralTarget::IronSwir, BandPair::new(30, 45)),
    (MineralTarget::Gold, BandPair::new(7, 6)),
    (MineralTarget::Copper, BandPair::new(5, 4)),
    (MineralTarget::Kimberlite, BandPair::new(3, 2)),
];

/// Band pair configured for a mineral target
pub fn mineral_band_pair(target: MineralTarget) -> BandPair {
    MINERAL_BANDS
        .iter()
        .find(|(t, _)| *t == target)
        .map(|(_, pair)| *pair)
        .unwrap_or(BandPair::FALLBACK)
}

/// Outcome of resolving a band pair against an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandSelection {
    pub requested: BandPair,
    pub used: BandPair,
    /// Set when `used` differs from `requested` because of the fallback
    pub warning: Option<String>,
}

impl BandSelection {
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

/// Resolve `requested` for an image with `band_count` bands.
///
/// Never fails for an out-of-range pair; fails only when the image has fewer
/// than two bands, where no ratio can be formed.
pub fn select_bands(band_count: usize, requested: BandPair) -> Result<BandSelection> {
    if requested.fits(band_count) {
        info!("Using bands {} of {}", requested, band_count);
        return Ok(BandSelection {
            requested,
            used: requested,
            warning: None,
        });
    }

    if !BandPair::FALLBACK.fits(band_count) {
        return Err(Error::InsufficientBands { bands: band_count });
    }

    let message = format!(
        "The image doesn't have enough bands for {} ({} available). Using the first available bands {}.",
        requested,
        band_count,
        BandPair::FALLBACK
    );
    warn!("{}", message);
    Ok(BandSelection {
        requested,
        used: BandPair::FALLBACK,
        warning: Some(message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_target_has_a_table_entry() {
        for target in [
            MineralTarget::Iron,
            MineralTarget::IronSwir,
            MineralTarget::Gold,
            MineralTarget::Copper,
            MineralTarget::Kimberlite,
        ] {
            assert!(MINERAL_BANDS.iter().any(|(t, _)| *t == target), "{target}");
        }
        assert_eq!(mineral_band_pair(MineralTarget::Iron), BandPair::new(7, 6));
        assert_eq!(mineral_band_pair(MineralTarget::Copper), BandPair::new(5, 4));
        assert_eq!(mineral_band_pair(MineralTarget::Kimberlite), BandPair::new(3, 2));
    }

    #[test]
    fn requested_pair_is_kept_when_it_fits() {
        let sel = select_bands(8, BandPair::new(7, 6)).unwrap();
        assert_eq!(sel.used, BandPair::new(7, 6));
        assert!(!sel.is_fallback());
    }

    #[test]
    fn out_of_range_pair_falls_back_with_warning() {
        let sel = select_bands(7, BandPair::new(7, 6)).unwrap();
        assert_eq!(sel.requested, BandPair::new(7, 6));
        assert_eq!(sel.used, BandPair::FALLBACK);
        assert!(sel.warning.as_deref().unwrap().contains("first available bands"));
    }

    #[test]
    fn single_band_image_is_rejected() {
        let err = select_bands(1, BandPair::new(7, 6)).unwrap_err();
        assert!(matches!(err, Error::InsufficientBands { bands: 1 }));
    }
}
