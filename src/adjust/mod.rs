//! Adjustment modules.
//!
//! Each adjuster turns one slice of the game context into a signed point
//! adjustment plus a human-readable reason. The set is closed: new modules
//! are added as `Adjuster` variants, not discovered at runtime.
//!
//! Key-number proximity lives here too but is qualitative: it never moves
//! the numbers and is consumed by the edge detector instead of being summed.

pub mod injury;
pub mod key_number;
pub mod weather;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Game, InjuryRecord};
use injury::InjuryImpact;
use weather::{WeatherImpact, WeatherInput};

/// Which module produced an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentSource {
    Injury,
    Weather,
}

impl fmt::Display for AdjustmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentSource::Injury => write!(f, "injury"),
            AdjustmentSource::Weather => write!(f, "weather"),
        }
    }
}

/// Distinguishes "no effect" from "no data".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    /// Inputs were present and evaluated (the value may still be zero).
    Applied,
    /// The module does not apply to this game (e.g. weather indoors).
    NotApplicable,
    /// The module applies but its input is missing or unusable.
    Unavailable,
}

/// A single module's contribution to a predicted line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub source: AdjustmentSource,
    /// Points added to the home margin.
    pub margin: f64,
    /// Points added to the total.
    pub total: f64,
    pub status: AdjustmentStatus,
    pub reason: String,
}

impl Adjustment {
    /// A zero adjustment carrying only a status and reason.
    pub fn zero(source: AdjustmentSource, status: AdjustmentStatus, reason: impl Into<String>) -> Self {
        Self {
            source,
            margin: 0.0,
            total: 0.0,
            status,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}): margin {:+.2}, total {:+.2} ({})",
            self.source, self.status, self.margin, self.total, self.reason,
        )
    }
}

/// Everything an adjuster may look at for one game.
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentContext<'a> {
    pub game: &'a Game,
    pub home_injuries: &'a [InjuryRecord],
    pub away_injuries: &'a [InjuryRecord],
    pub weather: &'a WeatherInput,
}

/// Capability shared by all numeric adjustment modules.
pub trait Adjust {
    fn adjust(&self, ctx: &AdjustmentContext<'_>) -> Adjustment;
}

/// The closed set of numeric adjusters.
#[derive(Debug, Clone)]
pub enum Adjuster {
    Injury(InjuryImpact),
    Weather(WeatherImpact),
}

impl Adjuster {
    pub fn source(&self) -> AdjustmentSource {
        match self {
            Adjuster::Injury(_) => AdjustmentSource::Injury,
            Adjuster::Weather(_) => AdjustmentSource::Weather,
        }
    }
}

impl Adjust for Adjuster {
    fn adjust(&self, ctx: &AdjustmentContext<'_>) -> Adjustment {
        match self {
            Adjuster::Injury(m) => m.adjust(ctx),
            Adjuster::Weather(m) => m.adjust(ctx),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
