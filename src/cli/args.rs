use clap::Parser;
use std::path::PathBuf;

use ironratio::types::{BandPair, MineralTarget, OutputFormat, ZeroPolicyArg};

#[derive(Parser, Debug)]
#[command(name = "ironratio", version, about = "Band-ratio mineral detection for multi-band GeoTIFFs")]
pub struct CliArgs {
    /// Input multi-band GeoTIFF (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory containing GeoTIFFs (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output mask filename (single file mode); the ratio raster and JSON
    /// sidecar are written next to it
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing (batch mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// JSON file with analysis parameters; flags given here override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Mineral preset selecting the band pair
    #[arg(short, long, value_enum)]
    pub mineral: Option<MineralTarget>,

    /// Explicit 0-based band pair "NUMERATOR,DENOMINATOR"; overrides --mineral
    #[arg(short, long)]
    pub bands: Option<BandPair>,

    /// Zero-denominator handling (guarded or epsilon)
    #[arg(long, value_enum)]
    pub zero_policy: Option<ZeroPolicyArg>,

    /// Substitute for zero denominators with --zero-policy epsilon
    #[arg(long, allow_negative_numbers = true)]
    pub epsilon: Option<f64>,

    /// Flag pixels whose ratio is strictly above this value
    #[arg(short, long, allow_negative_numbers = true)]
    pub threshold: Option<f64>,

    /// Histogram bin count reported in the sidecar
    #[arg(long)]
    pub bins: Option<usize>,

    /// Display mask format (tiff or jpeg)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Enable logging (RUST_LOG overrides the level)
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Batch mode: continue with other files when one fails
    #[arg(long, default_value_t = false)]
    pub batch: bool,
}
