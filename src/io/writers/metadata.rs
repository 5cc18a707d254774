//! JSON sidecar describing an analysis: parameters, band selection, ratio
//! statistics and histogram, and the georeferencing a map overlay needs.
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::core::bands::BandSelection;
use crate::core::geo::{GeoBounds, GeoTransform};
use crate::core::processing::pipeline::BandRatioAnalysis;
use crate::core::processing::stats::{Histogram, RatioStats};
use crate::error::Result;
use crate::types::{MineralTarget, ZeroPolicy};

/// Map placement derived from the image bounds
#[derive(Debug, Clone, Serialize)]
pub struct OverlayPlacement {
    pub bounds: GeoBounds,
    /// `[lat, lon]`
    pub center: [f64; 2],
    /// `[[south, west], [north, east]]`
    pub corners: [[f64; 2]; 2],
}

impl From<GeoBounds> for OverlayPlacement {
    fn from(bounds: GeoBounds) -> Self {
        let (lat, lon) = bounds.center();
        Self {
            bounds,
            center: [lat, lon],
            corners: bounds.overlay_corners(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSidecar<'a> {
    pub generated_at: String,
    pub source: Option<String>,
    pub mineral: MineralTarget,
    pub bands: &'a BandSelection,
    pub zero_policy: ZeroPolicy,
    pub threshold: f64,
    pub width: usize,
    pub height: usize,
    pub statistics: RatioStats,
    pub histogram: &'a Histogram,
    pub flagged_pixels: usize,
    pub flagged_fraction: f64,
    pub geotransform: Option<[f64; 6]>,
    pub crs: Option<&'a str>,
    pub overlay: Option<OverlayPlacement>,
    pub outputs: Vec<String>,
}

impl<'a> AnalysisSidecar<'a> {
    pub fn new(
        analysis: &'a BandRatioAnalysis,
        mineral: MineralTarget,
        zero_policy: ZeroPolicy,
        geotransform: Option<GeoTransform>,
        crs: Option<&'a str>,
    ) -> Self {
        let (height, width) = analysis.ratio.dim();
        let cells = (height * width).max(1);
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source: None,
            mineral,
            bands: &analysis.selection,
            zero_policy,
            threshold: analysis.threshold,
            width,
            height,
            statistics: analysis.stats,
            histogram: &analysis.histogram,
            flagged_pixels: analysis.flagged,
            flagged_fraction: analysis.flagged as f64 / cells as f64,
            geotransform: geotransform.map(|gt| gt.to_gdal()),
            crs,
            overlay: geotransform.map(|gt| gt.bounds(height, width).into()),
            outputs: Vec::new(),
        }
    }
}

/// Sidecar path for an output product: `<output>.json`
pub fn sidecar_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Serialize the sidecar next to `output`. Returns the sidecar path.
pub fn write_metadata_sidecar(output: &Path, sidecar: &AnalysisSidecar<'_>) -> Result<PathBuf> {
    let path = sidecar_path(output);
    let json = serde_json::to_string_pretty(sidecar)?;
    std::fs::write(&path, json)?;
    info!("Metadata sidecar written to {:?}", path);
    Ok(path)
}
