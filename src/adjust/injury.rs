//! Injury impact.
//!
//! Each report charges the position's baseline point value times the
//! capacity the player is expected to be missing (1 − availability). A
//! team's sum is capped so a cluster of injuries in one unit cannot swamp
//! the signal.

use serde::Deserialize;
use tracing::debug;

use super::{Adjust, Adjustment, AdjustmentContext, AdjustmentSource, AdjustmentStatus};
use crate::types::{InjuryRecord, InjuryStatus, Position};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Baseline point value of a fully available starter by position.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PositionWeights {
    pub qb: f64,
    pub rb: f64,
    pub wr: f64,
    pub te: f64,
    pub ol: f64,
    pub dl: f64,
    pub lb: f64,
    pub cb: f64,
    pub s: f64,
    pub k: f64,
    pub p: f64,
    pub other: f64,
}

impl Default for PositionWeights {
    fn default() -> Self {
        Self {
            qb: 6.0,
            rb: 0.8,
            wr: 1.2,
            te: 0.8,
            ol: 1.0,
            dl: 1.0,
            lb: 0.6,
            cb: 0.9,
            s: 0.6,
            k: 0.5,
            p: 0.2,
            other: 0.3,
        }
    }
}

impl PositionWeights {
    pub fn weight(&self, position: Position) -> f64 {
        match position {
            Position::Qb => self.qb,
            Position::Rb => self.rb,
            Position::Wr => self.wr,
            Position::Te => self.te,
            Position::Ol => self.ol,
            Position::Dl => self.dl,
            Position::Lb => self.lb,
            Position::Cb => self.cb,
            Position::S => self.s,
            Position::K => self.k,
            Position::P => self.p,
            Position::Other => self.other,
        }
    }
}

/// Expected fraction of a player's capacity available, by status.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusAvailability {
    pub out: f64,
    pub doubtful: f64,
    pub questionable: f64,
    pub probable: f64,
    pub active: f64,
}

impl Default for StatusAvailability {
    fn default() -> Self {
        Self {
            out: 0.0,
            doubtful: 0.25,
            questionable: 0.5,
            probable: 0.9,
            active: 1.0,
        }
    }
}

impl StatusAvailability {
    /// Availability in [0, 1].
    pub fn availability(&self, status: InjuryStatus) -> f64 {
        let raw = match status {
            InjuryStatus::Out => self.out,
            InjuryStatus::Doubtful => self.doubtful,
            InjuryStatus::Questionable => self.questionable,
            InjuryStatus::Probable => self.probable,
            InjuryStatus::Active => self.active,
        };
        raw.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InjuryConfig {
    pub position_weights: PositionWeights,
    pub availability: StatusAvailability,
    /// Ceiling on one team's aggregate impact, in points.
    pub max_team_impact: f64,
    /// Share of offensive impact that also comes off the total.
    pub offensive_total_factor: f64,
}

impl Default for InjuryConfig {
    fn default() -> Self {
        Self {
            position_weights: PositionWeights::default(),
            availability: StatusAvailability::default(),
            max_team_impact: 10.0,
            offensive_total_factor: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate impact of one team's injury report.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamImpact {
    /// Sum before the cap.
    pub raw: f64,
    /// Sum after the cap. Never exceeds `max_team_impact`.
    pub capped: f64,
    /// Offensive portion of `capped`, scaled down with it.
    pub offensive: f64,
    pub players: usize,
}

impl TeamImpact {
    pub fn was_capped(&self) -> bool {
        self.raw > self.capped
    }
}

#[derive(Debug, Clone)]
pub struct InjuryImpact {
    config: InjuryConfig,
}

impl InjuryImpact {
    pub fn new(config: InjuryConfig) -> Self {
        Self { config }
    }

    /// Access the injury configuration.
    pub fn config(&self) -> &InjuryConfig {
        &self.config
    }

    /// Points a single report charges against its team.
    pub fn record_impact(&self, record: &InjuryRecord) -> f64 {
        let weight = self.config.position_weights.weight(record.position).max(0.0);
        let missing = 1.0 - self.config.availability.availability(record.status);
        weight * missing
    }

    /// Aggregate a team's reports, applying the per-team ceiling.
    pub fn team_impact(&self, records: &[InjuryRecord]) -> TeamImpact {
        let (raw, offensive_raw) = records.iter().fold((0.0, 0.0), |(all, off), r| {
            let impact = self.record_impact(r);
            let off = if r.position.is_offensive() { off + impact } else { off };
            (all + impact, off)
        });

        let ceiling = self.config.max_team_impact.max(0.0);
        let capped = raw.min(ceiling);
        let offensive = if raw > 0.0 { offensive_raw * (capped / raw) } else { 0.0 };

        TeamImpact {
            raw,
            capped,
            offensive,
            players: records.len(),
        }
    }

    fn describe(team: &str, impact: &TeamImpact) -> String {
        let mut s = format!("{team} -{:.2} ({} reports", impact.capped, impact.players);
        if impact.was_capped() {
            s.push_str(&format!(", capped from {:.2}", impact.raw));
        }
        s.push(')');
        s
    }
}

impl Adjust for InjuryImpact {
    fn adjust(&self, ctx: &AdjustmentContext<'_>) -> Adjustment {
        if ctx.home_injuries.is_empty() && ctx.away_injuries.is_empty() {
            return Adjustment::zero(
                AdjustmentSource::Injury,
                AdjustmentStatus::Applied,
                "no reported injuries",
            );
        }

        let home = self.team_impact(ctx.home_injuries);
        let away = self.team_impact(ctx.away_injuries);

        let margin = away.capped - home.capped;
        let offensive = home.offensive + away.offensive;
        let total = if offensive > 0.0 {
            -(offensive * self.config.offensive_total_factor)
        } else {
            0.0
        };

        debug!(
            game_id = %ctx.game.id,
            home_impact = format!("{:.2}", home.capped),
            away_impact = format!("{:.2}", away.capped),
            margin = format!("{margin:+.2}"),
            total = format!("{total:+.2}"),
            "Injury impact"
        );

        Adjustment {
            source: AdjustmentSource::Injury,
            margin,
            total,
            status: AdjustmentStatus::Applied,
            reason: format!(
                "{}; {}",
                Self::describe(&ctx.game.home.abbreviation, &home),
                Self::describe(&ctx.game.away.abbreviation, &away),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
