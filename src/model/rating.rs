//! Power-rating model.
//!
//! Each side's expected points are the league average plus its offensive
//! rating minus the opponent's defensive rating. The home side receives a
//! fixed home-field bonus on the margin unless the game is at a neutral
//! site.

use serde::Deserialize;
use tracing::debug;

use crate::types::{EngineError, Game, PowerRating, PredictedLine};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Rating model constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Points added to the home margin. Calibrated, never zero.
    pub home_field_advantage: f64,
    /// Mean points scored by one team in one game.
    pub league_average_points: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            home_field_advantage: 2.0,
            league_average_points: 22.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

pub struct RatingModel {
    config: RatingConfig,
}

impl RatingModel {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    /// Access the rating configuration.
    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Predict margin and total from two ratings.
    pub fn predict(&self, home: &PowerRating, away: &PowerRating, neutral_site: bool) -> PredictedLine {
        let avg = self.config.league_average_points;
        let home_points = avg + home.offense - away.defense;
        let away_points = avg + away.offense - home.defense;
        let home_field = if neutral_site { 0.0 } else { self.config.home_field_advantage };

        let line = PredictedLine {
            margin: home_points - away_points + home_field,
            total: home_points + away_points,
        };

        debug!(
            home = %home.team,
            away = %away.team,
            home_points = format!("{home_points:.2}"),
            away_points = format!("{away_points:.2}"),
            home_field,
            margin = format!("{:+.2}", line.margin),
            total = format!("{:.2}", line.total),
            "Base line predicted"
        );

        line
    }

    /// Predict for a game, requiring both ratings to be present for the
    /// game's week and season.
    pub fn predict_game(
        &self,
        game: &Game,
        home: Option<&PowerRating>,
        away: Option<&PowerRating>,
    ) -> Result<PredictedLine, EngineError> {
        let home = Self::require(home, &game.home.abbreviation, game)?;
        let away = Self::require(away, &game.away.abbreviation, game)?;
        Ok(self.predict(home, away, game.neutral_site))
    }

    fn require<'a>(
        rating: Option<&'a PowerRating>,
        team: &str,
        game: &Game,
    ) -> Result<&'a PowerRating, EngineError> {
        let missing = || EngineError::MissingRating {
            team: team.to_string(),
            week: game.week,
            season: game.season,
        };
        match rating {
            Some(r)
                if r.team.eq_ignore_ascii_case(team)
                    && r.week == game.week
                    && r.season == game.season =>
            {
                Ok(r)
            }
            _ => Err(missing()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{League, Team, Venue};

    fn rating(team: &str, offense: f64, defense: f64) -> PowerRating {
        PowerRating {
            team: team.into(),
            week: 3,
            season: 2025,
            offense,
            defense,
        }
    }

    fn game(neutral_site: bool) -> Game {
        let team = |name: &str, abbr: &str| Team {
            name: name.into(),
            abbreviation: abbr.into(),
            league: League::Nfl,
        };
        Game {
            id: "g1".into(),
            home: team("Kansas City Chiefs", "KC"),
            away: team("Buffalo Bills", "BUF"),
            kickoff: "2025-09-21T20:20:00Z".into(),
            venue: Venue { name: "Arrowhead".into(), indoor: false },
            week: 3,
            season: 2025,
            neutral_site,
        }
    }

    #[test]
    fn test_reference_scenario() {
        // (5 - 3) - (1 - (-2)) + 2.0 = 1.0
        let model = RatingModel::new(RatingConfig::default());
        let line = model.predict(&rating("KC", 5.0, -2.0), &rating("BUF", 1.0, 3.0), false);
        assert!((line.margin - 1.0).abs() < 1e-12);
        // (22 + 5 - 3) + (22 + 1 + 2) = 24 + 25
        assert!((line.total - 49.0).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_site_drops_home_field() {
        let model = RatingModel::new(RatingConfig::default());
        let home = rating("KC", 5.0, -2.0);
        let away = rating("BUF", 1.0, 3.0);
        let at_home = model.predict(&home, &away, false);
        let neutral = model.predict(&home, &away, true);
        assert!((at_home.margin - neutral.margin - 2.0).abs() < 1e-12);
        assert_eq!(at_home.total, neutral.total);
    }

    #[test]
    fn test_identical_ratings_margin_is_home_field() {
        let model = RatingModel::new(RatingConfig {
            home_field_advantage: 1.5,
            league_average_points: 21.0,
        });
        let line = model.predict(&rating("KC", 2.0, 1.0), &rating("BUF", 2.0, 1.0), false);
        assert!((line.margin - 1.5).abs() < 1e-12);
        assert!((line.total - 44.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_rating_is_an_error_not_zero() {
        let model = RatingModel::new(RatingConfig::default());
        let g = game(false);
        let err = model
            .predict_game(&g, Some(&rating("KC", 5.0, -2.0)), None)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingRating { team: "BUF".into(), week: 3, season: 2025 }
        );
    }

    #[test]
    fn test_rating_for_wrong_week_is_missing() {
        let model = RatingModel::new(RatingConfig::default());
        let g = game(false);
        let mut stale = rating("BUF", 1.0, 3.0);
        stale.week = 2;
        let err = model
            .predict_game(&g, Some(&rating("KC", 5.0, -2.0)), Some(&stale))
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingRating { .. }));
    }

    #[test]
    fn test_predict_game_uses_neutral_flag() {
        let model = RatingModel::new(RatingConfig::default());
        let line = model
            .predict_game(&game(true), Some(&rating("KC", 5.0, -2.0)), Some(&rating("BUF", 1.0, 3.0)))
            .unwrap();
        assert!((line.margin - (-1.0)).abs() < 1e-12);
    }
}
