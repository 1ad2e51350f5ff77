//! Collaborator interfaces.
//!
//! The engine reads all of its inputs through these traits. Fetching,
//! caching and refresh policy live behind them; the engine never performs
//! I/O itself. [`snapshot::Snapshot`] is the in-memory implementation used
//! by the binary and the tests.

pub mod snapshot;

use chrono::{DateTime, Utc};

use crate::types::{EngineError, Game, InjuryRecord, MarketQuote, PowerRating, Venue, WeatherSnapshot};
use snapshot::Snapshot;

/// Weekly power ratings.
#[cfg_attr(test, mockall::automock)]
pub trait RatingSource: Send + Sync {
    /// The one active rating for `team` (abbreviation) in that week.
    /// Fails with `EngineError::MissingRating`, never a default.
    fn get_rating(&self, team: &str, week: u32, season: u32) -> Result<PowerRating, EngineError>;
}

/// Raw odds feed.
#[cfg_attr(test, mockall::automock)]
pub trait MarketSource: Send + Sync {
    /// Every quote posted for `game`, any tier, any order.
    fn get_quotes(&self, game: &Game) -> Vec<MarketQuote>;
}

/// Injury reports.
#[cfg_attr(test, mockall::automock)]
pub trait InjurySource: Send + Sync {
    fn get_injuries(&self, team: &str, week: u32) -> Vec<InjuryRecord>;
}

/// Venue forecasts.
#[cfg_attr(test, mockall::automock)]
pub trait WeatherSource: Send + Sync {
    /// Forecast for `venue` around `kickoff`, if one exists.
    fn get_weather(&self, venue: &Venue, kickoff: DateTime<Utc>) -> Option<WeatherSnapshot>;
}

/// The four collaborators bundled for one scan.
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub ratings: &'a dyn RatingSource,
    pub markets: &'a dyn MarketSource,
    pub injuries: &'a dyn InjurySource,
    pub weather: &'a dyn WeatherSource,
}

impl<'a> Sources<'a> {
    /// Serve every input from one snapshot.
    pub fn from_snapshot(snapshot: &'a Snapshot) -> Self {
        Self {
            ratings: snapshot,
            markets: snapshot,
            injuries: snapshot,
            weather: snapshot,
        }
    }
}
