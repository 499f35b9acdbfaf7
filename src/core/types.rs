//! Core enumerations shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Penalty family of a regularized fit.
///
/// Both families are fitted through the same elastic-net entry point; the
/// family only selects the L1 mixing weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyType {
    /// Pure L2 penalty (mixing weight 0)
    Ridge,
    /// Pure L1 penalty (mixing weight 1)
    Lasso,
}

impl PenaltyType {
    /// Elastic-net L1 mixing weight for this family.
    pub fn l1_weight(self) -> f64 {
        match self {
            PenaltyType::Ridge => 0.0,
            PenaltyType::Lasso => 1.0,
        }
    }
}

impl Default for PenaltyType {
    fn default() -> Self {
        PenaltyType::Ridge
    }
}

impl fmt::Display for PenaltyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PenaltyType::Ridge => write!(f, "ridge"),
            PenaltyType::Lasso => write!(f, "lasso"),
        }
    }
}

impl FromStr for PenaltyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ridge" | "l2" => Ok(PenaltyType::Ridge),
            "lasso" | "l1" => Ok(PenaltyType::Lasso),
            other => Err(format!("unknown penalty type '{}'", other)),
        }
    }
}

/// Display scale for income values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// Natural-log scale with income tick labels
    Log,
    /// Original currency scale
    Original,
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Log
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scale::Log => write!(f, "log"),
            Scale::Original => write!(f, "original"),
        }
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "log" => Ok(Scale::Log),
            "original" | "linear" => Ok(Scale::Original),
            other => Err(format!("unknown scale '{}'", other)),
        }
    }
}

/// How the final model is chosen from the penalty grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Highest held-out R²; ties go to the smallest strength, then ridge.
    BestHeldOutR2,
    /// A fixed penalty family and strength, regardless of the grid scores.
    Fixed { penalty: PenaltyType, alpha: f64 },
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::BestHeldOutR2
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::BestHeldOutR2 => write!(f, "best held-out R²"),
            SelectionPolicy::Fixed { penalty, alpha } => {
                write!(f, "fixed {} at alpha = {}", penalty, alpha)
            }
        }
    }
}

/// Logging verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbosityLevel {
    /// Errors only
    Silent,
    /// Warnings and errors
    Warning,
    /// Pipeline milestones
    Info,
    /// Per-fit details
    Debug,
}

impl Default for VerbosityLevel {
    fn default() -> Self {
        VerbosityLevel::Info
    }
}

impl VerbosityLevel {
    /// Matching `log` level filter.
    pub fn level_filter(self) -> log::LevelFilter {
        match self {
            VerbosityLevel::Silent => log::LevelFilter::Error,
            VerbosityLevel::Warning => log::LevelFilter::Warn,
            VerbosityLevel::Info => log::LevelFilter::Info,
            VerbosityLevel::Debug => log::LevelFilter::Debug,
        }
    }
}
