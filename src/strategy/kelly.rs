//! Kelly-derived stake sizing.
//!
//! Maps an edge's confidence tier to a bankroll fraction from a
//! fractional-Kelly schedule, then applies the per-bet risk cap. Sizing
//! takes an `Edge`, so a stake cannot exist without one.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::edge::Edge;
use crate::types::ConfidenceTier;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Bankroll fraction per tier, before the risk cap.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StakeConfig {
    pub very_strong: f64,
    pub strong: f64,
    pub medium: f64,
    pub weak: f64,
    /// Scales the whole schedule (0.5 = half of every tier's fraction).
    pub kelly_multiplier: f64,
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self {
            very_strong: 0.25,
            strong: 0.20,
            medium: 0.15,
            weak: 0.10,
            kelly_multiplier: 1.0,
        }
    }
}

impl StakeConfig {
    pub fn fraction_for(&self, tier: ConfidenceTier) -> f64 {
        match tier {
            ConfidenceTier::VeryStrong => self.very_strong,
            ConfidenceTier::Strong => self.strong,
            ConfidenceTier::Medium => self.medium,
            ConfidenceTier::Weak => self.weak,
        }
    }
}

// ---------------------------------------------------------------------------
// Sizer
// ---------------------------------------------------------------------------

/// Recommended stake for one edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stake {
    /// Fraction of bankroll, in [0, risk_cap].
    pub fraction: f64,
    /// `fraction × bankroll`, truncated to cents.
    pub amount: Decimal,
    /// The risk cap bound the fraction.
    pub capped: bool,
}

impl Stake {
    pub fn zero() -> Self {
        Self {
            fraction: 0.0,
            amount: Decimal::ZERO,
            capped: false,
        }
    }
}

impl fmt::Display for Stake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}% (${})", self.fraction * 100.0, self.amount)?;
        if self.capped {
            write!(f, " [capped]")?;
        }
        Ok(())
    }
}

pub struct StakeSizer {
    config: StakeConfig,
}

impl StakeSizer {
    pub fn new(config: StakeConfig) -> Self {
        Self { config }
    }

    /// Access the stake configuration.
    pub fn config(&self) -> &StakeConfig {
        &self.config
    }

    /// Size a stake for `edge`.
    ///
    /// The fraction is the tier's schedule entry times the Kelly multiplier,
    /// clipped to `risk_cap` and floored at zero. A non-positive bankroll
    /// yields a zero stake.
    pub fn size(&self, edge: &Edge, bankroll: Decimal, risk_cap: f64) -> Stake {
        if bankroll <= Decimal::ZERO {
            debug!(
                game_id = %edge.game_id,
                bankroll = %bankroll,
                "Non-positive bankroll, zero stake"
            );
            return Stake::zero();
        }

        let base = self.config.fraction_for(edge.tier) * self.config.kelly_multiplier;
        let base = if base.is_finite() { base.max(0.0) } else { 0.0 };
        let cap = if risk_cap.is_finite() { risk_cap.max(0.0) } else { 0.0 };

        let capped = base > cap;
        let fraction = base.min(cap);

        let amount = Decimal::from_f64(fraction)
            .map(|f| (f * bankroll).round_dp_with_strategy(2, RoundingStrategy::ToZero))
            .unwrap_or(Decimal::ZERO);

        debug!(
            game_id = %edge.game_id,
            market = %edge.market_type,
            tier = %edge.tier,
            base = format!("{:.2}%", base * 100.0),
            fraction = format!("{:.2}%", fraction * 100.0),
            amount = %amount,
            capped,
            "Stake sized"
        );

        Stake {
            fraction,
            amount,
            capped,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
