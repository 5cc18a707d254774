#![doc = r#"
IRONRATIO: spectral band-ratio analysis for georeferenced multi-band rasters.

Given a multi-band (multispectral or hyperspectral) GeoTIFF, this crate selects two
bands for a mineral target, computes their pixelwise ratio with explicit handling of
zero denominators, summarizes the ratio (min/max/mean and a histogram), flags pixels
above a threshold, and writes a display mask plus the georeferencing a map overlay
needs. It powers the `ironratio` CLI and can be embedded in your own applications.

Requirements
------------
- Rust 2024 edition toolchain.
- Optional: GDAL development headers and runtime for the `gdal` feature, which
  decodes inputs through GDAL instead of the built-in pure-Rust TIFF reader.

Quick start: analyze a file to disk
-----------------------------------
```rust,no_run
use std::path::Path;
use ironratio::{analyze_file_to_path, AnalysisParams, MineralTarget, OutputFormat, ZeroPolicy};

fn main() -> ironratio::Result<()> {
    let params = AnalysisParams {
        mineral: MineralTarget::Iron,
        bands: None,
        zero_policy: ZeroPolicy::GuardedZero,
        threshold: 1.2,
        histogram_bins: 50,
        format: OutputFormat::TIFF,
    };

    let report = analyze_file_to_path(
        Path::new("/data/scene.tif"),
        Path::new("/out/scene_mask.tif"),
        &params,
    )?;
    println!("flagged {} pixels, max ratio {}", report.flagged, report.stats.max);
    Ok(())
}
```

Working with arrays directly
----------------------------
```rust
use ndarray::array;
use ironratio::{classify, compute_ratio, to_display_mask, ZeroPolicy};

fn main() -> ironratio::Result<()> {
    let b1 = array![[4.0, 0.0], [2.0, 8.0]];
    let b2 = array![[2.0, 0.0], [0.0, 4.0]];

    let ratio = compute_ratio(b1.view(), b2.view(), ZeroPolicy::GuardedZero)?;
    assert_eq!(ratio.values, array![[2.0, 0.0], [0.0, 2.0]]);

    let stats = ratio.statistics()?;
    assert_eq!((stats.min, stats.max), (2.0, 2.0));

    let mask = classify(&ratio.values, 1.5);
    assert_eq!(to_display_mask(&mask), array![[255u8, 0], [0, 255]]);
    Ok(())
}
```

Error handling
--------------
All fallible functions return `ironratio::Result<T>`. `Error::EmptyInput` means no
cell carried a usable ratio and downstream steps were skipped; `Error::ShapeMismatch`
means the decoder produced bands of different shapes. An out-of-range band pair is
not an error: the first two bands are used and `BandSelection::warning` says so.

Useful modules
--------------
- [`api`]: high-level entry points.
- [`core`]: cube, band selection, parameters, and the ratio engine.
- [`io`]: decoders and product writers.
- [`types`]: shared enums (`ZeroPolicy`, `MineralTarget`, `OutputFormat`, `BandPair`).
- [`error`]: crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::bands::{BandSelection, mineral_band_pair, select_bands};
pub use crate::core::cube::HyperspectralCube;
pub use crate::core::geo::{GeoBounds, GeoTransform};
pub use crate::core::params::{AnalysisParams, DEFAULT_HISTOGRAM_BINS, DEFAULT_THRESHOLD};
pub use crate::error::{Error, Result};
pub use crate::types::{BandPair, DEFAULT_EPSILON, MineralTarget, OutputFormat, ZeroPolicy};

// Ratio engine
pub use crate::core::processing::classify::{classify, flagged_count, flagged_pixels, to_display_mask};
pub use crate::core::processing::ops::{RatioRaster, compute_ratio};
pub use crate::core::processing::pipeline::{BandRatioAnalysis, analyze_cube};
pub use crate::core::processing::stats::{Histogram, RatioStats, histogram, summary_statistics};

// Readers
pub use crate::io::{CubeSource, DecodedImage, NativeTiffReader, open_image};

// High-level API re-exports
pub use crate::api::{
    AnalysisReport, AnalyzedImage, BatchReport, analyze, analyze_directory_to_path, analyze_file,
    analyze_file_to_path, analyze_image, write_analysis,
};
