use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Histogram bins must be greater than 0, got: {bins}")]
    ZeroBins { bins: usize },

    #[error("--epsilon must be a positive finite number, got: {epsilon}")]
    InvalidEpsilon { epsilon: f64 },

    #[error("--threshold must be a finite number, got: {threshold}")]
    InvalidThreshold { threshold: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Analysis(#[from] ironratio::Error),
}
