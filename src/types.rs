//! Shared types and enums used across IRONRATIO.
//! Includes `ZeroPolicy` (and its CLI-facing `ZeroPolicyArg`), `MineralTarget`,
//! `BandPair` and `OutputFormat`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default substitute for zero denominators under [`ZeroPolicy::Epsilon`].
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// How the ratio treats cells whose denominator is zero.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum ZeroPolicy {
    /// Replace zero denominators by `epsilon` before dividing.
    Epsilon { epsilon: f64 },
    /// Divide only where the denominator is non-zero; other cells are 0.
    GuardedZero,
}

impl Default for ZeroPolicy {
    fn default() -> Self {
        ZeroPolicy::GuardedZero
    }
}

impl ZeroPolicy {
    /// `Epsilon` requires a positive, finite substitute.
    pub fn validate(&self) -> crate::error::Result<()> {
        match *self {
            ZeroPolicy::Epsilon { epsilon } if !(epsilon.is_finite() && epsilon > 0.0) => {
                Err(crate::error::Error::InvalidArgument {
                    arg: "epsilon",
                    value: epsilon.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for ZeroPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZeroPolicy::Epsilon { epsilon } => write!(f, "Epsilon({:e})", epsilon),
            ZeroPolicy::GuardedZero => write!(f, "GuardedZero"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum ZeroPolicyArg {
    Guarded,
    Epsilon,
}

impl ZeroPolicyArg {
    pub fn into_policy(self, epsilon: Option<f64>) -> ZeroPolicy {
        match self {
            ZeroPolicyArg::Guarded => ZeroPolicy::GuardedZero,
            ZeroPolicyArg::Epsilon => ZeroPolicy::Epsilon {
                epsilon: epsilon.unwrap_or(DEFAULT_EPSILON),
            },
        }
    }
}

/// A pair of 0-based band indices: `numerator / denominator`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct BandPair {
    pub numerator: usize,
    pub denominator: usize,
}

impl BandPair {
    /// Pair used whenever the requested one does not fit the image.
    pub const FALLBACK: BandPair = BandPair::new(0, 1);

    pub const fn new(numerator: usize, denominator: usize) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn fits(&self, band_count: usize) -> bool {
        self.numerator < band_count && self.denominator < band_count
    }
}

impl std::fmt::Display for BandPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "B{}/B{}", self.numerator, self.denominator)
    }
}

impl std::str::FromStr for BandPair {
    type Err = String;

    /// Parses `"A,B"` or `"A/B"` into a 0-based pair.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(',')
            .or_else(|| s.split_once('/'))
            .ok_or_else(|| format!("expected two band indices like 7,6, got '{}'", s))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid band index '{}'", v.trim()))
        };
        Ok(BandPair::new(parse(a)?, parse(b)?))
    }
}

/// Mineral presets; each maps to a fixed band pair in [`crate::core::bands`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MineralTarget {
    Iron,
    IronSwir,
    Gold,
    Copper,
    Kimberlite,
}

impl std::fmt::Display for MineralTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MineralTarget::Iron => "Iron",
            MineralTarget::IronSwir => "IronSwir",
            MineralTarget::Gold => "Gold",
            MineralTarget::Copper => "Copper",
            MineralTarget::Kimberlite => "Kimberlite",
        };
        write!(f, "{}", s)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum OutputFormat {
    TIFF,
    JPEG, // Lossy, preview only
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::TIFF => "tif",
            OutputFormat::JPEG => "jpg",
        }
    }
}
