//! Strategy: edge detection and stake sizing.

pub mod edge;
pub mod kelly;

use rust_decimal::Decimal;
use tracing::debug;

use crate::adjust::key_number::KeyNumberAlert;
use crate::market::NormalizedLine;
use crate::types::{Game, PredictedLine};
use edge::{Detection, Edge, EdgeDetector, SuppressedEdge};
use kelly::StakeSizer;

pub use edge::{rank_edges, rank_suppressed};

/// Everything the strategy layer concluded about one game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSignals {
    /// Sized edges, unranked.
    pub edges: Vec<Edge>,
    pub suppressed: Vec<SuppressedEdge>,
}

/// Pipelines edge detection → stake sizing for one game at a time.
pub struct StrategyOrchestrator {
    detector: EdgeDetector,
    sizer: StakeSizer,
    bankroll: Decimal,
    risk_cap: f64,
}

impl StrategyOrchestrator {
    pub fn new(detector: EdgeDetector, sizer: StakeSizer, bankroll: Decimal, risk_cap: f64) -> Self {
        Self {
            detector,
            sizer,
            bankroll,
            risk_cap,
        }
    }

    /// Detect edges on both markets and attach a stake to each.
    /// Suppressed diagnostics never receive a stake.
    pub fn evaluate(
        &self,
        game: &Game,
        predicted: &PredictedLine,
        line: &NormalizedLine,
        alert: Option<&KeyNumberAlert>,
    ) -> GameSignals {
        let mut signals = GameSignals::default();

        for detection in self.detector.detect(game, predicted, line, alert) {
            match detection {
                Detection::Edge(mut edge) => {
                    let stake = self.sizer.size(&edge, self.bankroll, self.risk_cap);
                    edge.stake = Some(stake);
                    signals.edges.push(edge);
                }
                Detection::Suppressed(s) => signals.suppressed.push(s),
            }
        }

        debug!(
            game_id = %game.id,
            edges = signals.edges.len(),
            suppressed = signals.suppressed.len(),
            "Strategy pass complete"
        );

        signals
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
