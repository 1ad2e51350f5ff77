//! Deterministic snapshot fixtures.
//!
//! Builds known games, ratings, quotes, injuries and forecasts in memory so
//! every scenario's expected output can be computed by hand.

use chrono::{DateTime, Utc};

use sharpline::data::snapshot::Snapshot;
use sharpline::types::*;

pub const WEEK: u32 = 14;
pub const SEASON: u32 = 2025;
pub const KICKOFF: &str = "2025-12-07T18:00:00Z";

pub fn team(name: &str, abbreviation: &str) -> Team {
    Team {
        name: name.to_string(),
        abbreviation: abbreviation.to_string(),
        league: League::Nfl,
    }
}

/// Builder over an empty snapshot. Every record lands in `WEEK`/`SEASON`.
#[derive(Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game(mut self, id: &str, home: Team, away: Team, venue: &str, indoor: bool) -> Self {
        self.snapshot.games.push(Game {
            id: id.to_string(),
            home,
            away,
            kickoff: KICKOFF.to_string(),
            venue: Venue {
                name: venue.to_string(),
                indoor,
            },
            week: WEEK,
            season: SEASON,
            neutral_site: false,
        });
        self
    }

    pub fn rating(mut self, team: &str, offense: f64, defense: f64) -> Self {
        self.snapshot.ratings.push(PowerRating {
            team: team.to_string(),
            week: WEEK,
            season: SEASON,
            offense,
            defense,
        });
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn quote(
        mut self,
        game_id: &str,
        provider: &str,
        tier: u32,
        teams: [&str; 2],
        spread: f64,
        total: f64,
        observed_at: &str,
    ) -> Self {
        self.snapshot.quotes.push(MarketQuote {
            game_id: game_id.to_string(),
            provider: provider.to_string(),
            tier,
            teams: [teams[0].to_string(), teams[1].to_string()],
            spread: Some(spread),
            total: Some(total),
            moneylines: None,
            observed_at: observed_at.to_string(),
        });
        self
    }

    pub fn injury(mut self, team: &str, player: &str, position: Position, status: InjuryStatus) -> Self {
        self.snapshot.injuries.push(InjuryRecord {
            team: team.to_string(),
            player: player.to_string(),
            position,
            status,
            description: String::new(),
            week: WEEK,
        });
        self
    }

    pub fn forecast(mut self, venue: &str, wind_mph: f64, precipitation_probability: f64, temperature_f: f64) -> Self {
        let forecast_for: DateTime<Utc> = KICKOFF.parse().expect("fixture kickoff");
        self.snapshot.weather.push(WeatherSnapshot {
            venue: venue.to_string(),
            forecast_for,
            temperature_f,
            wind_mph,
            precipitation_probability,
            indoor: false,
        });
        self
    }

    /// Finish, enforcing the same invariants as `Snapshot::load`.
    pub fn build(self) -> Snapshot {
        self.snapshot.validate().expect("fixture snapshot is valid");
        self.snapshot
    }
}

/// Home (off 5, def -2) vs away (off 1, def 3): margin 1.0, total 49.0.
pub fn rating_scenario() -> SnapshotBuilder {
    SnapshotBuilder::new()
        .game(
            "scenario",
            team("Philadelphia Eagles", "PHI"),
            team("Dallas Cowboys", "DAL"),
            "Lincoln Financial Field",
            true,
        )
        .rating("PHI", 5.0, -2.0)
        .rating("DAL", 1.0, 3.0)
}
