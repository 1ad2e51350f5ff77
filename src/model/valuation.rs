//! Valuation engine.
//!
//! Composes the rating model's base line with every adjuster's
//! contribution. Adjusters run in a fixed order (injury, then weather, then
//! any later module) and all of them resolve before anything is summed.
//!
//! The result is reproducible because every adjustment is a plain additive
//! `(margin, total)` delta: addition is commutative, so order does not
//! change the sum. An adjuster that scaled or otherwise depended on the
//! running line would break that property and must not be added as an
//! `Adjuster` variant without revisiting this module.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::adjust::injury::InjuryImpact;
use crate::adjust::weather::{WeatherImpact, WeatherInput};
use crate::adjust::{Adjust, Adjuster, Adjustment, AdjustmentContext};
use crate::model::rating::RatingModel;
use crate::types::{EngineError, Game, InjuryRecord, PowerRating, PredictedLine};

/// Ratings for both sides of a game.
#[derive(Debug, Clone, Copy)]
pub struct RatingInputs<'a> {
    pub home: &'a PowerRating,
    pub away: &'a PowerRating,
}

/// Everything the adjusters consume for one game.
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentInputs<'a> {
    pub home_injuries: &'a [InjuryRecord],
    pub away_injuries: &'a [InjuryRecord],
    pub weather: &'a WeatherInput,
}

/// Predicted line plus the audit trail that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub game_id: String,
    /// Rating model output before adjustments.
    pub base: PredictedLine,
    /// Final line used downstream.
    pub line: PredictedLine,
    /// Every contribution, in application order.
    pub adjustments: Vec<Adjustment>,
}

impl fmt::Display for Valuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] base {} -> final {} ({} adjustments)",
            self.game_id,
            self.base,
            self.line,
            self.adjustments.len(),
        )
    }
}

pub struct ValuationEngine {
    rating: RatingModel,
    adjusters: Vec<Adjuster>,
}

impl ValuationEngine {
    /// Build with an explicit adjuster list; order is application order.
    pub fn new(rating: RatingModel, adjusters: Vec<Adjuster>) -> Self {
        Self { rating, adjusters }
    }

    /// The standard pipeline: injury, then weather.
    pub fn standard(rating: RatingModel, injury: InjuryImpact, weather: WeatherImpact) -> Self {
        Self::new(rating, vec![Adjuster::Injury(injury), Adjuster::Weather(weather)])
    }

    /// Value one game.
    pub fn value(
        &self,
        game: &Game,
        ratings: RatingInputs<'_>,
        inputs: AdjustmentInputs<'_>,
    ) -> Result<Valuation, EngineError> {
        let base = self
            .rating
            .predict_game(game, Some(ratings.home), Some(ratings.away))?;

        let ctx = AdjustmentContext {
            game,
            home_injuries: inputs.home_injuries,
            away_injuries: inputs.away_injuries,
            weather: inputs.weather,
        };

        let adjustments: Vec<Adjustment> = self.adjusters.iter().map(|a| a.adjust(&ctx)).collect();

        let line = adjustments.iter().fold(base, |acc, adj| PredictedLine {
            margin: acc.margin + adj.margin,
            total: acc.total + adj.total,
        });

        debug!(
            game_id = %game.id,
            base = %base,
            line = %line,
            adjustments = adjustments.len(),
            "Game valued"
        );

        Ok(Valuation {
            game_id: game.id.clone(),
            base,
            line,
            adjustments,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjust::injury::InjuryConfig;
    use crate::adjust::weather::WeatherConfig;
    use crate::adjust::{AdjustmentSource, AdjustmentStatus};
    use crate::model::rating::RatingConfig;
    use crate::types::{InjuryStatus, League, Position, Team, Venue, WeatherSnapshot};
    use chrono::{TimeZone, Utc};

    fn game() -> Game {
        let team = |abbr: &str| Team {
            name: abbr.into(),
            abbreviation: abbr.into(),
            league: League::Nfl,
        };
        Game {
            id: "g1".into(),
            home: team("BUF"),
            away: team("MIA"),
            kickoff: "2025-12-14T18:00:00Z".into(),
            venue: Venue { name: "Highmark Stadium".into(), indoor: false },
            week: 15,
            season: 2025,
            neutral_site: false,
        }
    }

    fn rating(team: &str, offense: f64, defense: f64) -> PowerRating {
        PowerRating { team: team.into(), week: 15, season: 2025, offense, defense }
    }

    fn engine() -> ValuationEngine {
        ValuationEngine::standard(
            RatingModel::new(RatingConfig::default()),
            InjuryImpact::new(InjuryConfig::default()),
            WeatherImpact::new(WeatherConfig::default()),
        )
    }

    fn windy() -> WeatherInput {
        WeatherInput::Forecast(WeatherSnapshot {
            venue: "Highmark Stadium".into(),
            forecast_for: Utc.with_ymd_and_hms(2025, 12, 14, 18, 0, 0).unwrap(),
            temperature_f: 30.0,
            wind_mph: 23.0,
            precipitation_probability: 0.0,
            indoor: false,
        })
    }

    #[test]
    fn test_no_adjustments_equals_base() {
        let g = game();
        let home = rating("BUF", 5.0, -2.0);
        let away = rating("MIA", 1.0, 3.0);
        let weather = WeatherInput::Unavailable { reason: "no forecast".into() };
        let v = engine()
            .value(
                &g,
                RatingInputs { home: &home, away: &away },
                AdjustmentInputs { home_injuries: &[], away_injuries: &[], weather: &weather },
            )
            .unwrap();
        assert_eq!(v.base, v.line);
        assert!((v.line.margin - 1.0).abs() < 1e-12);
        assert_eq!(v.adjustments.len(), 2);
        assert_eq!(v.adjustments[1].status, AdjustmentStatus::Unavailable);
    }

    #[test]
    fn test_adjustments_applied_in_documented_order() {
        let g = game();
        let home = rating("BUF", 5.0, -2.0);
        let away = rating("MIA", 1.0, 3.0);
        let injuries = vec![InjuryRecord {
            team: "BUF".into(),
            player: "QB1".into(),
            position: Position::Qb,
            status: InjuryStatus::Out,
            description: "ankle".into(),
            week: 15,
        }];
        let weather = windy();
        let v = engine()
            .value(
                &g,
                RatingInputs { home: &home, away: &away },
                AdjustmentInputs { home_injuries: &injuries, away_injuries: &[], weather: &weather },
            )
            .unwrap();

        let sources: Vec<_> = v.adjustments.iter().map(|a| a.source).collect();
        assert_eq!(sources, vec![AdjustmentSource::Injury, AdjustmentSource::Weather]);

        // Injury: margin -6.0, total -3.0. Weather: (23-15)*0.25 = -2.0 total.
        assert!((v.line.margin - (1.0 - 6.0)).abs() < 1e-12);
        assert!((v.line.total - (v.base.total - 3.0 - 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_reordering_adjusters_gives_same_line() {
        let g = game();
        let home = rating("BUF", 3.0, 1.0);
        let away = rating("MIA", 2.0, 0.5);
        let injuries = vec![InjuryRecord {
            team: "MIA".into(),
            player: "WR1".into(),
            position: Position::Wr,
            status: InjuryStatus::Questionable,
            description: String::new(),
            week: 15,
        }];
        let weather = windy();
        let inputs = AdjustmentInputs { home_injuries: &[], away_injuries: &injuries, weather: &weather };

        let forward = engine()
            .value(&g, RatingInputs { home: &home, away: &away }, inputs)
            .unwrap();
        let reversed = ValuationEngine::new(
            RatingModel::new(RatingConfig::default()),
            vec![
                Adjuster::Weather(WeatherImpact::new(WeatherConfig::default())),
                Adjuster::Injury(InjuryImpact::new(InjuryConfig::default())),
            ],
        )
        .value(&g, RatingInputs { home: &home, away: &away }, inputs)
        .unwrap();

        assert!((forward.line.margin - reversed.line.margin).abs() < 1e-12);
        assert!((forward.line.total - reversed.line.total).abs() < 1e-12);
    }

    #[test]
    fn test_stale_rating_fails() {
        let g = game();
        let home = rating("BUF", 5.0, -2.0);
        let mut away = rating("MIA", 1.0, 3.0);
        away.season = 2024;
        let weather = WeatherInput::NotApplicable;
        let err = engine()
            .value(
                &g,
                RatingInputs { home: &home, away: &away },
                AdjustmentInputs { home_injuries: &[], away_injuries: &[], weather: &weather },
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingRating { .. }));
    }
}
