//! Command Line Interface (CLI) layer for IRONRATIO.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-file and batch
//! analysis. It maps user-provided options onto `AnalysisParams` and calls
//! the library functionality exposed via `ironratio::api`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
