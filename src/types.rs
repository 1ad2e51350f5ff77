//! Shared types for the SHARPLINE engine.
//!
//! These types form the data model used across all modules. Inputs
//! (`Game`, `PowerRating`, `MarketQuote`, `InjuryRecord`,
//! `WeatherSnapshot`) arrive from the collaborator layer already
//! materialised; the engine only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Teams & games
// ---------------------------------------------------------------------------

/// League a team plays in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum League {
    Nfl,
    Ncaaf,
    Other,
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            League::Nfl => write!(f, "NFL"),
            League::Ncaaf => write!(f, "NCAAF"),
            League::Other => write!(f, "Other"),
        }
    }
}

/// A team. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Canonical name, e.g. "Philadelphia Eagles".
    pub name: String,
    /// Short code, e.g. "PHI". Ratings and injuries are keyed by it.
    pub abbreviation: String,
    pub league: League,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation)
    }
}

impl Team {
    /// Whether a provider label refers to this team (name or abbreviation,
    /// case-insensitive, surrounding whitespace ignored).
    pub fn matches(&self, label: &str) -> bool {
        let label = label.trim();
        !label.is_empty()
            && (label.eq_ignore_ascii_case(&self.abbreviation)
                || label.eq_ignore_ascii_case(&self.name))
    }

    /// Identity comparison between two team records.
    pub fn is_same_team(&self, other: &Team) -> bool {
        self.league == other.league
            && (self.abbreviation.eq_ignore_ascii_case(&other.abbreviation)
                || self.name.eq_ignore_ascii_case(&other.name))
    }
}

/// Where a game is played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    /// Domed or roof-closed stadium; weather never applies.
    pub indoor: bool,
}

/// A scheduled game. Home and away are fixed roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub home: Team,
    pub away: Team,
    /// Kickoff as delivered by the schedule feed. Parsed by
    /// [`crate::market::timestamp::parse_instant`] when needed.
    pub kickoff: String,
    pub venue: Venue,
    pub week: u32,
    pub season: u32,
    /// No home-field bonus is applied at a neutral site.
    #[serde(default)]
    pub neutral_site: bool,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (wk {} {} @ {})",
            self.id,
            self.matchup(),
            self.week,
            self.season,
            self.venue.name,
        )
    }
}

impl Game {
    /// "AWAY @ HOME" label.
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away.abbreviation, self.home.abbreviation)
    }

    /// Reject records where both roles name the same team.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.home.is_same_team(&self.away) {
            return Err(EngineError::InvalidGame {
                game_id: self.id.clone(),
                message: format!("home and away are both {}", self.home.abbreviation),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

/// Weekly offensive/defensive power rating for one team.
///
/// Both values are points relative to the league mean. A higher defensive
/// rating means the team concedes fewer points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerRating {
    /// Team abbreviation.
    pub team: String,
    pub week: u32,
    pub season: u32,
    pub offense: f64,
    pub defense: f64,
}

impl fmt::Display for PowerRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} wk{} {}: off={:+.1} def={:+.1}",
            self.team, self.week, self.season, self.offense, self.defense,
        )
    }
}

// ---------------------------------------------------------------------------
// Market quotes
// ---------------------------------------------------------------------------

/// One provider entry for one game, as delivered by the odds feed.
///
/// Team order is the provider's, not the game's: `spread` is relative to
/// `teams[0]` and `moneylines` are aligned with `teams`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub game_id: String,
    pub provider: String,
    /// Provider tier rank. 0 is the primary/consensus market.
    pub tier: u32,
    /// Team labels (name or abbreviation) in listed order.
    pub teams: [String; 2],
    /// Points relative to `teams[0]`; negative means `teams[0]` is favored.
    pub spread: Option<f64>,
    pub total: Option<f64>,
    /// American odds aligned with `teams`.
    #[serde(default)]
    pub moneylines: Option<[i32; 2]>,
    /// Observation time as delivered (ISO 8601 or a locale format).
    pub observed_at: String,
}

impl fmt::Display for MarketQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spread = self
            .spread
            .map(|s| format!("{} {s:+.1}", self.teams[0]))
            .unwrap_or_else(|| "no spread".to_string());
        let total = self
            .total
            .map(|t| format!("o/u {t:.1}"))
            .unwrap_or_else(|| "no total".to_string());
        write!(
            f,
            "[{} tier {}] {} vs {} | {spread} | {total} @ {}",
            self.provider, self.tier, self.teams[0], self.teams[1], self.observed_at,
        )
    }
}

// ---------------------------------------------------------------------------
// Injuries
// ---------------------------------------------------------------------------

/// Reported availability status of an injured player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InjuryStatus {
    Out,
    Doubtful,
    Questionable,
    Probable,
    Active,
}

impl fmt::Display for InjuryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjuryStatus::Out => write!(f, "Out"),
            InjuryStatus::Doubtful => write!(f, "Doubtful"),
            InjuryStatus::Questionable => write!(f, "Questionable"),
            InjuryStatus::Probable => write!(f, "Probable"),
            InjuryStatus::Active => write!(f, "Active"),
        }
    }
}

/// Roster position. Unrecognised codes collapse into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    Qb,
    Rb,
    Wr,
    Te,
    Ol,
    Dl,
    Lb,
    Cb,
    S,
    K,
    P,
    Other,
}

impl Position {
    /// Positions whose absence reduces scoring rather than prevention.
    pub fn is_offensive(&self) -> bool {
        matches!(
            self,
            Position::Qb | Position::Rb | Position::Wr | Position::Te | Position::Ol
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            Position::Qb => "QB",
            Position::Rb => "RB",
            Position::Wr => "WR",
            Position::Te => "TE",
            Position::Ol => "OL",
            Position::Dl => "DL",
            Position::Lb => "LB",
            Position::Cb => "CB",
            Position::S => "S",
            Position::K => "K",
            Position::P => "P",
            Position::Other => "OTHER",
        }
    }
}

impl From<&str> for Position {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "QB" => Position::Qb,
            "RB" | "FB" | "HB" => Position::Rb,
            "WR" => Position::Wr,
            "TE" => Position::Te,
            "OL" | "OT" | "T" | "OG" | "G" | "C" => Position::Ol,
            "DL" | "DE" | "DT" | "NT" => Position::Dl,
            "LB" | "ILB" | "OLB" | "MLB" => Position::Lb,
            "CB" | "DB" => Position::Cb,
            "S" | "SS" | "FS" => Position::S,
            "K" | "PK" => Position::K,
            "P" => Position::P,
            _ => Position::Other,
        }
    }
}

impl From<String> for Position {
    fn from(s: String) -> Self {
        Position::from(s.as_str())
    }
}

impl From<Position> for String {
    fn from(p: Position) -> Self {
        p.code().to_string()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single injury report line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryRecord {
    /// Team abbreviation.
    pub team: String,
    pub player: String,
    pub position: Position,
    pub status: InjuryStatus,
    #[serde(default)]
    pub description: String,
    pub week: u32,
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Forecast conditions at a venue around kickoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub venue: String,
    pub forecast_for: DateTime<Utc>,
    pub temperature_f: f64,
    pub wind_mph: f64,
    /// 0.0–1.0
    pub precipitation_probability: f64,
    #[serde(default)]
    pub indoor: bool,
}

impl fmt::Display for WeatherSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.0}°F, wind {:.0}mph, {:.0}% precip",
            self.venue,
            self.temperature_f,
            self.wind_mph,
            self.precipitation_probability * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Predictions & classification
// ---------------------------------------------------------------------------

/// Model output for a matchup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedLine {
    /// Home points minus away points.
    pub margin: f64,
    /// Combined points.
    pub total: f64,
}

impl PredictedLine {
    /// The margin expressed as a home-relative spread (negative = home favored).
    pub fn home_spread(&self) -> f64 {
        -self.margin
    }
}

impl fmt::Display for PredictedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "margin={:+.2} total={:.2}", self.margin, self.total)
    }
}

/// Which line an edge was measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spread,
    Total,
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::Spread => write!(f, "spread"),
            MarketType::Total => write!(f, "total"),
        }
    }
}

/// Recommended side of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
    Over,
    Under,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Home => write!(f, "HOME"),
            Side::Away => write!(f, "AWAY"),
            Side::Over => write!(f, "OVER"),
            Side::Under => write!(f, "UNDER"),
        }
    }
}

/// Confidence tier of a detected edge, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceTier {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl ConfidenceTier {
    /// All tiers, strongest first.
    pub const ALL: &'static [ConfidenceTier] = &[
        ConfidenceTier::VeryStrong,
        ConfidenceTier::Strong,
        ConfidenceTier::Medium,
        ConfidenceTier::Weak,
    ];

    /// One step down. `Weak` demotes to nothing.
    pub fn demote(&self) -> Option<Self> {
        match self {
            ConfidenceTier::VeryStrong => Some(ConfidenceTier::Strong),
            ConfidenceTier::Strong => Some(ConfidenceTier::Medium),
            ConfidenceTier::Medium => Some(ConfidenceTier::Weak),
            ConfidenceTier::Weak => None,
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceTier::VeryStrong => write!(f, "VERY_STRONG"),
            ConfidenceTier::Strong => write!(f, "STRONG"),
            ConfidenceTier::Medium => write!(f, "MEDIUM"),
            ConfidenceTier::Weak => write!(f, "WEAK"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Per-game failures. None of these abort a batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
pub enum EngineError {
    #[error("Missing rating for {team} (week {week}, season {season})")]
    MissingRating { team: String, week: u32, season: u32 },

    #[error("No market quote available for game {game_id}")]
    NoQuoteAvailable { game_id: String },

    #[error("Unparseable timestamp: {raw:?}")]
    UnparseableTimestamp { raw: String },

    #[error("Quote teams {listed:?} do not match game {game_id}")]
    TeamMismatch { game_id: String, listed: [String; 2] },

    #[error("Invalid game {game_id}: {message}")]
    InvalidGame { game_id: String, message: String },

    #[error("Invalid quote from {provider} for game {game_id}: {message}")]
    InvalidQuote {
        game_id: String,
        provider: String,
        message: String,
    },

    #[error("Duplicate rating for {team} (week {week}, season {season})")]
    DuplicateRating { team: String, week: u32, season: u32 },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
