//! Edge detection.
//!
//! Compares the valued line to the normalized market line, one market type
//! at a time, and classifies the gap into a confidence tier. Gaps beyond the
//! implausibility ceiling are reported as suppressed diagnostics rather than
//! edges.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::kelly::Stake;
use crate::adjust::key_number::KeyNumberAlert;
use crate::market::NormalizedLine;
use crate::types::{ConfidenceTier, Game, MarketType, PredictedLine, Side};

// ---------------------------------------------------------------------------
// Configuration (defaults, overridden by config.toml at runtime)
// ---------------------------------------------------------------------------

/// Tier floors and sanity ceilings, in points.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub very_strong: f64,
    pub strong: f64,
    pub medium: f64,
    /// Smallest gap reported at all.
    pub weak: f64,
    /// Distance above a tier floor that still counts as borderline.
    pub borderline_band: f64,
    /// Spread gaps above this are treated as data defects.
    pub spread_ceiling: f64,
    /// Total gaps above this are treated as data defects.
    pub total_ceiling: f64,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            very_strong: 9.0,
            strong: 7.0,
            medium: 5.0,
            weak: 3.0,
            borderline_band: 0.5,
            spread_ceiling: 15.0,
            total_ceiling: 20.0,
        }
    }
}

impl EdgeConfig {
    /// Lowest magnitude that earns `tier`.
    pub fn floor(&self, tier: ConfidenceTier) -> f64 {
        match tier {
            ConfidenceTier::VeryStrong => self.very_strong,
            ConfidenceTier::Strong => self.strong,
            ConfidenceTier::Medium => self.medium,
            ConfidenceTier::Weak => self.weak,
        }
    }

    pub fn ceiling(&self, market_type: MarketType) -> f64 {
        match market_type {
            MarketType::Spread => self.spread_ceiling,
            MarketType::Total => self.total_ceiling,
        }
    }

    /// Highest tier whose floor `magnitude` reaches, or `None` below `weak`.
    pub fn classify(&self, magnitude: f64) -> Option<ConfidenceTier> {
        ConfidenceTier::ALL
            .iter()
            .copied()
            .find(|&tier| magnitude >= self.floor(tier))
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A classified gap between the model and the market.
///
/// For spreads, `predicted` and `market` are home-relative spreads and `gap`
/// is in home-margin terms (positive favors the home side). For totals all
/// three are plain points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub game_id: String,
    pub matchup: String,
    pub market_type: MarketType,
    pub provider: String,
    pub predicted: f64,
    pub market: f64,
    pub gap: f64,
    pub magnitude: f64,
    pub tier: ConfidenceTier,
    pub side: Side,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_number: Option<KeyNumberAlert>,
    /// Tier was lowered one step by the key-number rule.
    pub demoted: bool,
    pub stake: Option<Stake>,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {}: model {:+.1} vs market {:+.1} ({:.1} pts, {})",
            self.game_id,
            self.matchup,
            self.market_type,
            self.side,
            self.predicted,
            self.market,
            self.magnitude,
            self.tier,
        )?;
        if self.demoted {
            write!(f, " [demoted]")?;
        }
        Ok(())
    }
}

/// A gap too large to be believed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuppressedEdge {
    pub game_id: String,
    pub matchup: String,
    pub market_type: MarketType,
    pub provider: String,
    pub predicted: f64,
    pub market: f64,
    pub magnitude: f64,
    pub ceiling: f64,
    pub reason: String,
}

impl fmt::Display for SuppressedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} suppressed: {}",
            self.game_id, self.matchup, self.market_type, self.reason,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Edge(Edge),
    Suppressed(SuppressedEdge),
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

pub struct EdgeDetector {
    config: EdgeConfig,
}

impl EdgeDetector {
    pub fn new(config: EdgeConfig) -> Self {
        Self { config }
    }

    /// Access the edge configuration.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Check both markets of a game. Markets the line does not post, and
    /// gaps below the weakest tier, produce nothing.
    pub fn detect(
        &self,
        game: &Game,
        predicted: &PredictedLine,
        line: &NormalizedLine,
        alert: Option<&KeyNumberAlert>,
    ) -> Vec<Detection> {
        [MarketType::Spread, MarketType::Total]
            .into_iter()
            .filter_map(|market_type| self.detect_market(game, predicted, line, market_type, alert))
            .collect()
    }

    /// Check a single market type.
    pub fn detect_market(
        &self,
        game: &Game,
        predicted: &PredictedLine,
        line: &NormalizedLine,
        market_type: MarketType,
        alert: Option<&KeyNumberAlert>,
    ) -> Option<Detection> {
        let (model_value, market_value, gap) = match market_type {
            MarketType::Spread => {
                let spread = line.home_spread?;
                let model_spread = predicted.home_spread() + 0.0;
                (model_spread, spread, spread - model_spread)
            }
            MarketType::Total => {
                let total = line.total?;
                (predicted.total, total, predicted.total - total)
            }
        };
        let magnitude = gap.abs();
        let ceiling = self.config.ceiling(market_type);

        if !magnitude.is_finite() || magnitude > ceiling {
            let reason = if magnitude.is_finite() {
                format!("{magnitude:.1}-point gap exceeds the {ceiling:.1}-point ceiling")
            } else {
                "non-finite gap".to_string()
            };
            warn!(
                game_id = %game.id,
                market = %market_type,
                provider = %line.provider,
                model = model_value,
                market_value,
                reason = %reason,
                "Implausible edge suppressed"
            );
            return Some(Detection::Suppressed(SuppressedEdge {
                game_id: game.id.clone(),
                matchup: game.matchup(),
                market_type,
                provider: line.provider.clone(),
                predicted: model_value,
                market: market_value,
                magnitude,
                ceiling,
                reason,
            }));
        }

        let Some(mut tier) = self.config.classify(magnitude) else {
            debug!(
                game_id = %game.id,
                market = %market_type,
                gap = format!("{gap:+.2}"),
                "Gap below weakest tier"
            );
            return None;
        };

        // Key numbers only exist in the spread domain.
        let alert = match market_type {
            MarketType::Spread => alert,
            MarketType::Total => None,
        };

        let mut demoted = false;
        if let Some(a) = alert {
            let borderline = magnitude - self.config.floor(tier) <= self.config.borderline_band;
            if borderline {
                match tier.demote() {
                    Some(lower) => {
                        debug!(
                            game_id = %game.id,
                            from = %tier,
                            to = %lower,
                            alert = %a,
                            "Borderline edge demoted at key number"
                        );
                        tier = lower;
                        demoted = true;
                    }
                    None => {
                        debug!(
                            game_id = %game.id,
                            magnitude,
                            alert = %a,
                            "Borderline WEAK edge dropped at key number"
                        );
                        return None;
                    }
                }
            }
        }

        let side = match (market_type, gap > 0.0) {
            (MarketType::Spread, true) => Side::Home,
            (MarketType::Spread, false) => Side::Away,
            (MarketType::Total, true) => Side::Over,
            (MarketType::Total, false) => Side::Under,
        };

        debug!(
            game_id = %game.id,
            market = %market_type,
            side = %side,
            tier = %tier,
            gap = format!("{gap:+.2}"),
            "Edge detected"
        );

        Some(Detection::Edge(Edge {
            game_id: game.id.clone(),
            matchup: game.matchup(),
            market_type,
            provider: line.provider.clone(),
            predicted: model_value,
            market: market_value,
            gap,
            magnitude,
            tier,
            side,
            key_number: alert.cloned(),
            demoted,
            stake: None,
        }))
    }
}

/// Best opportunities first; ties by game id, then market type.
pub fn rank_edges(edges: &mut [Edge]) {
    edges.sort_by(|a, b| {
        b.magnitude
            .total_cmp(&a.magnitude)
            .then_with(|| a.game_id.cmp(&b.game_id))
            .then_with(|| a.market_type.cmp(&b.market_type))
    });
}

/// Same ordering for suppressed diagnostics.
pub fn rank_suppressed(suppressed: &mut [SuppressedEdge]) {
    suppressed.sort_by(|a, b| {
        b.magnitude
            .total_cmp(&a.magnitude)
            .then_with(|| a.game_id.cmp(&b.game_id))
            .then_with(|| a.market_type.cmp(&b.market_type))
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
