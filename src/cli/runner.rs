use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ironratio::types::{ZeroPolicy, ZeroPolicyArg};
use ironratio::{
    AnalysisParams, AnalysisReport, Error, analyze_directory_to_path, analyze_file_to_path,
};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(enabled: bool) {
    if !enabled {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    // A global subscriber may already be installed when embedded; ignore that case.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Start from the config file (or defaults) and apply every flag that was given.
fn build_params(args: &CliArgs) -> Result<AnalysisParams, AppError> {
    let mut params = match &args.config {
        Some(path) => {
            info!("Loading analysis parameters from {:?}", path);
            AnalysisParams::from_json_file(path)?
        }
        None => AnalysisParams::default(),
    };

    if let Some(mineral) = args.mineral {
        params.mineral = mineral;
    }
    if args.bands.is_some() {
        params.bands = args.bands;
    }

    if let Some(epsilon) = args.epsilon {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(AppError::InvalidEpsilon { epsilon });
        }
    }
    match (args.zero_policy, args.epsilon) {
        (Some(policy), eps) => {
            // keep an epsilon set in the config file unless --epsilon replaces it
            let configured = match params.zero_policy {
                ZeroPolicy::Epsilon { epsilon } => Some(epsilon),
                ZeroPolicy::GuardedZero => None,
            };
            params.zero_policy = policy.into_policy(eps.or(configured));
        }
        // --epsilon alone implies the epsilon policy
        (None, Some(eps)) => params.zero_policy = ZeroPolicyArg::Epsilon.into_policy(Some(eps)),
        (None, None) => {}
    }

    if let Some(threshold) = args.threshold {
        if !threshold.is_finite() {
            return Err(AppError::InvalidThreshold { threshold });
        }
        params.threshold = threshold;
    }
    if let Some(bins) = args.bins {
        params.histogram_bins = bins;
    }
    if params.histogram_bins == 0 {
        return Err(AppError::ZeroBins { bins: 0 });
    }
    if let Some(format) = args.format {
        params.format = format;
    }
    params.validate()?;
    Ok(params)
}

fn describe_policy(policy: &ZeroPolicy) -> String {
    match policy {
        ZeroPolicy::GuardedZero => "guarded (zero denominators give 0)".to_string(),
        ZeroPolicy::Epsilon { epsilon } => format!("epsilon ({:e})", epsilon),
    }
}

fn empty_input_message(input: &Path) -> String {
    format!(
        "No pixel of {} has a usable ratio (every denominator is zero); nothing was written.",
        input.display()
    )
}

fn band_warning_message(warning: &str) -> String {
    format!("Warning: {}", warning)
}

/// Lines printed after a successful analysis, warning first.
fn report_lines(report: &AnalysisReport, threshold: f64) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(warning) = &report.band_warning {
        lines.push(band_warning_message(warning));
    }
    lines.push(format!(
        "Ratio statistics: min={:.4} max={:.4} mean={:.4} ({} valid pixels)",
        report.stats.min, report.stats.max, report.stats.mean, report.stats.count
    ));
    lines.push(format!("Flagged pixels above {}: {}", threshold, report.flagged));
    lines.push(format!("Mask:     {}", report.mask.display()));
    lines.push(format!("Ratio:    {}", report.ratio.display()));
    lines.push(format!("Metadata: {}", report.sidecar.display()));
    for aux in &report.auxiliary {
        lines.push(format!("Aux:      {}", aux.display()));
    }
    lines
}

fn process_single_file(input: &Path, output: &Path, params: &AnalysisParams) -> Result<(), AppError> {
    info!("Processing: {:?} -> {:?}", input, output);
    let report = match analyze_file_to_path(input, output, params) {
        Ok(report) => report,
        Err(Error::EmptyInput) => {
            eprintln!("{}", empty_input_message(input));
            return Err(Error::EmptyInput.into());
        }
        Err(e) => return Err(e.into()),
    };

    let lines = report_lines(&report, params.threshold);
    let (warnings, summary) = lines.split_at(usize::from(report.band_warning.is_some()));
    for line in warnings {
        eprintln!("{}", line);
    }
    for line in summary {
        println!("{}", line);
    }
    info!("Successfully processed: {:?} -> {:?}", input, output);
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    let params = build_params(&args)?;
    info!(
        "Mineral: {}, bands: {}, zero policy: {}, threshold: {}",
        params.mineral,
        params.requested_bands(),
        describe_policy(&params.zero_policy),
        params.threshold
    );

    let batch_mode = args.batch || args.input_dir.is_some();

    if batch_mode {
        let input_dir = args.input_dir.ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        let output_dir = args.output_dir.ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;

        info!("Starting batch processing from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);

        let report = analyze_directory_to_path(&input_dir, &output_dir, &params, args.batch)?;
        println!(
            "Batch processing complete: processed={}, skipped={}, errors={}",
            report.processed, report.skipped, report.errors
        );
        if report.errors > 0 {
            warn!("{} input(s) failed; see log for details", report.errors);
        }
    } else {
        let input = args.input.ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        let output = args.output.ok_or(AppError::MissingArgument {
            arg: "--output".to_string(),
        })?;

        process_single_file(&input, &output, &params)?;
    }

    Ok(())
}
