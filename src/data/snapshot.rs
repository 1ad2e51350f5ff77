//! In-memory input snapshot.
//!
//! A complete, internally consistent set of engine inputs loaded from one
//! JSON document. Structural invariants are checked on load so a bad
//! snapshot fails fast instead of producing plausible-looking output.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use super::{InjurySource, MarketSource, RatingSource, WeatherSource};
use crate::types::{EngineError, Game, InjuryRecord, MarketQuote, PowerRating, Venue, WeatherSnapshot};

/// Forecasts further than this from kickoff are ignored.
const FORECAST_WINDOW_HOURS: i64 = 6;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub ratings: Vec<PowerRating>,
    #[serde(default)]
    pub quotes: Vec<MarketQuote>,
    #[serde(default)]
    pub injuries: Vec<InjuryRecord>,
    #[serde(default)]
    pub weather: Vec<WeatherSnapshot>,
}

impl Snapshot {
    /// Load and validate a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot from {}", path.display()))?;
        let snapshot = Self::from_json(&json)
            .with_context(|| format!("Invalid snapshot {}", path.display()))?;

        info!(
            path = %path.display(),
            games = snapshot.games.len(),
            ratings = snapshot.ratings.len(),
            quotes = snapshot.quotes.len(),
            injuries = snapshot.injuries.len(),
            forecasts = snapshot.weather.len(),
            "Snapshot loaded"
        );

        Ok(snapshot)
    }

    /// Parse and validate a snapshot document.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json).context("Failed to parse snapshot JSON")?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check game id uniqueness and rating uniqueness.
    ///
    /// Game roles are checked per game at scan time, so one malformed game
    /// does not reject the whole batch.
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut ids = HashSet::new();
        for game in &self.games {
            if !ids.insert(game.id.as_str()) {
                return Err(EngineError::InvalidGame {
                    game_id: game.id.clone(),
                    message: "duplicate game id".into(),
                });
            }
        }

        let mut seen = HashSet::new();
        for r in &self.ratings {
            if !seen.insert((r.team.to_uppercase(), r.week, r.season)) {
                return Err(EngineError::DuplicateRating {
                    team: r.team.clone(),
                    week: r.week,
                    season: r.season,
                });
            }
        }

        Ok(())
    }
}

impl RatingSource for Snapshot {
    fn get_rating(&self, team: &str, week: u32, season: u32) -> Result<PowerRating, EngineError> {
        self.ratings
            .iter()
            .find(|r| r.week == week && r.season == season && r.team.eq_ignore_ascii_case(team))
            .cloned()
            .ok_or_else(|| EngineError::MissingRating {
                team: team.to_string(),
                week,
                season,
            })
    }
}

impl MarketSource for Snapshot {
    fn get_quotes(&self, game: &Game) -> Vec<MarketQuote> {
        self.quotes
            .iter()
            .filter(|q| q.game_id == game.id)
            .cloned()
            .collect()
    }
}

impl InjurySource for Snapshot {
    fn get_injuries(&self, team: &str, week: u32) -> Vec<InjuryRecord> {
        self.injuries
            .iter()
            .filter(|r| r.week == week && r.team.eq_ignore_ascii_case(team))
            .cloned()
            .collect()
    }
}

impl WeatherSource for Snapshot {
    fn get_weather(&self, venue: &Venue, kickoff: DateTime<Utc>) -> Option<WeatherSnapshot> {
        let window = Duration::hours(FORECAST_WINDOW_HOURS);
        let found = self
            .weather
            .iter()
            .filter(|w| w.venue.eq_ignore_ascii_case(&venue.name))
            .map(|w| ((w.forecast_for - kickoff).abs(), w))
            .filter(|(distance, _)| *distance <= window)
            .min_by_key(|(distance, w)| (*distance, w.forecast_for))
            .map(|(_, w)| w.clone());

        if found.is_none() {
            debug!(venue = %venue.name, kickoff = %kickoff, "No forecast within window");
        }
        found
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
