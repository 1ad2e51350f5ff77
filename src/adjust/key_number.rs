//! Key-number proximity.
//!
//! Final margins cluster on a handful of values (3 and 7 above all). When
//! the predicted margin sits next to one of them and the market line sits
//! across it or near it, the precision of the prediction is worth less.
//! This module only raises an alert; the numbers are left untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeyNumberConfig {
    /// Key margins, as absolute values.
    pub numbers: Vec<f64>,
    /// How close (in points) a margin must be to count as adjacent.
    pub proximity: f64,
}

impl Default for KeyNumberConfig {
    fn default() -> Self {
        Self {
            numbers: vec![3.0, 6.0, 7.0, 10.0, 14.0],
            proximity: 1.0,
        }
    }
}

/// How the market line relates to the key number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCrossing {
    /// The key number lies between predicted and market margins.
    Straddles,
    /// The market margin is itself adjacent to the key number.
    Approaches,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyNumberAlert {
    /// Signed key number on the predicted side (e.g. -3.0 for an away win by 3).
    pub key_number: f64,
    pub predicted_margin: f64,
    pub market_margin: f64,
    pub crossing: KeyCrossing,
}

impl fmt::Display for KeyNumberAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let how = match self.crossing {
            KeyCrossing::Straddles => "straddles",
            KeyCrossing::Approaches => "approaches",
        };
        write!(
            f,
            "key {:+} ({how}): model {:+.1} vs market {:+.1}",
            self.key_number, self.predicted_margin, self.market_margin,
        )
    }
}

#[derive(Debug, Clone)]
pub struct KeyNumberProximity {
    config: KeyNumberConfig,
}

impl KeyNumberProximity {
    pub fn new(config: KeyNumberConfig) -> Self {
        Self { config }
    }

    /// Access the key-number configuration.
    pub fn config(&self) -> &KeyNumberConfig {
        &self.config
    }

    /// Check a predicted home margin against the market's home spread.
    ///
    /// Returns the alert for the key number closest to the predicted margin
    /// among those that qualify, or `None`.
    pub fn assess(&self, predicted_margin: f64, market_spread: Option<f64>) -> Option<KeyNumberAlert> {
        let market_margin = -market_spread? + 0.0;
        let proximity = self.config.proximity.max(0.0);
        let side = if predicted_margin < 0.0 { -1.0 } else { 1.0 };

        let mut best: Option<(f64, KeyNumberAlert)> = None;
        for &key in &self.config.numbers {
            let distance = (predicted_margin.abs() - key).abs();
            if distance > proximity {
                continue;
            }

            let signed_key = key * side;
            let lo = predicted_margin.min(market_margin);
            let hi = predicted_margin.max(market_margin);
            let crossing = if lo <= signed_key && signed_key <= hi {
                KeyCrossing::Straddles
            } else if (market_margin.abs() - key).abs() <= proximity {
                KeyCrossing::Approaches
            } else {
                continue;
            };

            let alert = KeyNumberAlert {
                key_number: signed_key,
                predicted_margin,
                market_margin,
                crossing,
            };
            let closer = best.as_ref().map_or(true, |(d, _)| distance < *d);
            if closer {
                best = Some((distance, alert));
            }
        }

        let alert = best.map(|(_, alert)| alert);
        if let Some(a) = &alert {
            debug!(alert = %a, "Key number alert");
        }
        alert
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
