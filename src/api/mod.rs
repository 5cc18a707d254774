//! High-level library API: analyze a raster file (or an already decoded cube),
//! write the analysis products to disk, and batch over a directory. Prefer
//! these entrypoints over the low-level `core` modules when integrating.
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::core::cube::HyperspectralCube;
use crate::core::geo::{GeoBounds, GeoTransform};
use crate::core::params::AnalysisParams;
use crate::core::processing::pipeline::{BandRatioAnalysis, analyze_cube};
use crate::core::processing::stats::RatioStats;
use crate::error::{Error, Result};
use crate::io::writers::jpeg::write_gray_jpeg;
use crate::io::writers::metadata::{AnalysisSidecar, write_metadata_sidecar};
use crate::io::writers::tiff::{Georeference, write_mask_tiff, write_ratio_tiff};
use crate::io::writers::worldfile::{write_prj_file, write_world_file};
use crate::io::{DecodedImage, open_image};
use crate::types::OutputFormat;

/// Analysis of one raster together with its georeferencing.
///
/// The decoded cube is not kept; only the derived grids outlive the request.
#[derive(Debug, Clone)]
pub struct AnalyzedImage {
    pub analysis: BandRatioAnalysis,
    pub geotransform: Option<GeoTransform>,
    pub projection: Option<String>,
}

impl AnalyzedImage {
    pub fn bounds(&self) -> Option<GeoBounds> {
        let (rows, cols) = self.analysis.ratio.dim();
        self.geotransform.map(|gt| gt.bounds(rows, cols))
    }
}

/// Files written by [`analyze_file_to_path`] and the headline numbers
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub mask: PathBuf,
    pub ratio: PathBuf,
    pub sidecar: PathBuf,
    pub auxiliary: Vec<PathBuf>,
    pub stats: RatioStats,
    pub flagged: usize,
    pub band_warning: Option<String>,
}

/// Counters from [`analyze_directory_to_path`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Analyze a decoded image, consuming it so the sample buffer is released
/// as soon as the analysis returns, on success and on error alike.
pub fn analyze_image(image: DecodedImage, params: &AnalysisParams) -> Result<AnalyzedImage> {
    let DecodedImage {
        cube,
        geotransform,
        projection,
    } = image;
    let analysis = analyze_cube(&cube, params)?;
    Ok(AnalyzedImage {
        analysis,
        geotransform,
        projection,
    })
}

/// Analyze an in-memory cube without georeferencing
pub fn analyze(cube: &HyperspectralCube, params: &AnalysisParams) -> Result<BandRatioAnalysis> {
    analyze_cube(cube, params)
}

/// Decode `input` and analyze it
pub fn analyze_file(input: &Path, params: &AnalysisParams) -> Result<AnalyzedImage> {
    let image = open_image(input)?;
    analyze_image(image, params)
}

/// `<dir>/<stem>_ratio.tif` next to the mask output
pub fn ratio_output_path(mask_output: &Path) -> PathBuf {
    let stem = mask_output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    mask_output.with_file_name(format!("{}_ratio.tif", stem))
}

/// Write the products of an analysis: display mask (`output`, in
/// `params.format`), ratio GeoTIFF, world/.prj files for JPEG, JSON sidecar.
pub fn write_analysis(
    analyzed: &AnalyzedImage,
    source: Option<&Path>,
    output: &Path,
    params: &AnalysisParams,
) -> Result<AnalysisReport> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let analysis = &analyzed.analysis;
    let georef = Georeference {
        geotransform: analyzed.geotransform,
        projection: analyzed.projection.as_deref(),
    };

    let mut auxiliary = Vec::new();
    match params.format {
        OutputFormat::TIFF => {
            write_mask_tiff(output, &analysis.display_mask, &georef)?;
        }
        OutputFormat::JPEG => {
            write_gray_jpeg(output, &analysis.display_mask)?;
            if let Some(gt) = &analyzed.geotransform {
                auxiliary.push(write_world_file(output, gt)?);
            }
            if let Some(p) = analyzed.projection.as_deref() {
                auxiliary.push(write_prj_file(output, p)?);
            }
        }
    }
    info!("Display mask written to {:?}", output);

    let ratio_path = ratio_output_path(output);
    write_ratio_tiff(&ratio_path, &analysis.ratio.values, &georef)?;
    info!("Ratio raster written to {:?}", ratio_path);

    let mut sidecar = AnalysisSidecar::new(
        analysis,
        params.mineral,
        params.zero_policy,
        analyzed.geotransform,
        analyzed.projection.as_deref(),
    );
    sidecar.source = source.map(|s| s.display().to_string());
    sidecar.outputs = std::iter::once(output)
        .chain(std::iter::once(ratio_path.as_path()))
        .chain(auxiliary.iter().map(PathBuf::as_path))
        .map(|p| p.display().to_string())
        .collect();
    let sidecar_path = write_metadata_sidecar(output, &sidecar)?;

    Ok(AnalysisReport {
        mask: output.to_path_buf(),
        ratio: ratio_path,
        sidecar: sidecar_path,
        auxiliary,
        stats: analysis.stats,
        flagged: analysis.flagged,
        band_warning: analysis.selection.warning.clone(),
    })
}

/// Decode, analyze and write all products for one input
pub fn analyze_file_to_path(
    input: &Path,
    output: &Path,
    params: &AnalysisParams,
) -> Result<AnalysisReport> {
    let analyzed = analyze_file(input, params)?;
    write_analysis(&analyzed, Some(input), output, params)
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
        .unwrap_or(false)
}

/// Regular files directly inside `dir`, split into TIFFs and the rest, each
/// sorted by name. Subdirectories are ignored.
fn partition_inputs(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut tiffs = Vec::new();
    let mut others = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if is_tiff(&path) {
            tiffs.push(path);
        } else {
            others.push(path);
        }
    }
    tiffs.sort();
    others.sort();
    Ok((tiffs, others))
}

/// `.tif`/`.tiff` files directly inside `input_dir`, sorted by name
pub fn iterate_tiff_inputs(input_dir: &Path) -> Result<std::vec::IntoIter<PathBuf>> {
    Ok(partition_inputs(input_dir)?.0.into_iter())
}

/// Analyze every TIFF in `input_dir`, writing products into `output_dir`.
///
/// Non-TIFF files are counted as skipped; subdirectories (such as an output
/// directory nested in the input) are not counted at all. With
/// `continue_on_error` a failed input is counted and the batch moves on;
/// otherwise the first error aborts.
pub fn analyze_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    params: &AnalysisParams,
    continue_on_error: bool,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir).map_err(Error::from)?;

    let mut report = BatchReport::default();
    let (inputs, others) = partition_inputs(input_dir)?;
    for path in &others {
        info!("Skipping non-TIFF file: {:?}", path);
    }
    report.skipped = others.len();

    for path in inputs {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_path =
            output_dir.join(format!("{}_mask.{}", stem, params.format.extension()));

        info!("Processing: {:?} -> {:?}", path, output_path);
        match analyze_file_to_path(&path, &output_path, params) {
            Ok(_) => report.processed += 1,
            Err(e) => {
                warn!("Error processing {:?}: {}", path, e);
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
            }
        }
    }

    info!(
        "Batch complete: processed={}, skipped={}, errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}
