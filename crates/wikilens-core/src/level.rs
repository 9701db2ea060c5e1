//! Understanding levels and the transitions between them.
//!
//! A keyword's level lives on a three-state ring:
//!
//! ```text
//! unknown ──cycle──▶ partial ──cycle──▶ known ──cycle──▶ unknown
//! ```
//!
//! Besides the manual cycle, a level can be forced to `known`, or derived from
//! a continuous knowledge score through a pair of [`LevelThresholds`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// How well the reader understands a keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnderstandingLevel {
    #[default]
    Unknown,
    Partial,
    Known,
}

/// Display colour for an understanding level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Amber,
    Green,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Amber => "amber",
            Self::Green => "green",
        }
    }
}

impl UnderstandingLevel {
    /// Advance one step around the ring, wrapping `known` back to `unknown`.
    pub fn cycle(self) -> Self {
        match self {
            Self::Unknown => Self::Partial,
            Self::Partial => Self::Known,
            Self::Known => Self::Unknown,
        }
    }

    /// Manual override: the reader says they know this keyword.
    pub fn mark_known(self) -> Self {
        Self::Known
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Unknown => Color::Red,
            Self::Partial => Color::Amber,
            Self::Known => Color::Green,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Partial => "partial",
            Self::Known => "known",
        }
    }
}

impl fmt::Display for UnderstandingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts level names and their colour names (`red`, `amber`, `green`).
impl FromStr for UnderstandingLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unknown" | "red" => Ok(Self::Unknown),
            "partial" | "amber" => Ok(Self::Partial),
            "known" | "green" => Ok(Self::Known),
            other => Err(CoreError::UnknownLevel(other.to_string())),
        }
    }
}

/// Score cut-offs mapping a knowledge score in `[0, 1]` to a level.
///
/// `score >= high` is `known`, `score >= low` is `partial`, anything lower
/// (including NaN) is `unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelThresholds {
    pub high: f64,
    pub low: f64,
}

impl LevelThresholds {
    /// Cut-offs for the score attached to a freshly detected keyword.
    pub const DETECTION: Self = Self {
        high: 0.7,
        low: 0.3,
    };

    /// Cut-offs for the score returned after a study session.
    pub const STUDY: Self = Self {
        high: 0.75,
        low: 0.5,
    };

    pub fn new(low: f64, high: f64) -> Result<Self, CoreError> {
        let thresholds = Self { high, low };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Both cut-offs must be finite, inside `[0, 1]`, and `low <= high`.
    pub fn validate(&self) -> Result<(), CoreError> {
        let in_range = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if in_range(self.low) && in_range(self.high) && self.low <= self.high {
            Ok(())
        } else {
            Err(CoreError::InvalidThresholds {
                low: self.low,
                high: self.high,
            })
        }
    }

    pub fn level_for(&self, score: f64) -> UnderstandingLevel {
        if score >= self.high {
            UnderstandingLevel::Known
        } else if score >= self.low {
            UnderstandingLevel::Partial
        } else {
            UnderstandingLevel::Unknown
        }
    }
}
