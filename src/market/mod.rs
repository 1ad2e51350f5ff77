//! Market normalization.
//!
//! Reduces a provider's multi-tier odds feed for one game to a single
//! authoritative line, oriented to the game's home/away roles. Tier
//! selection and orientation are separate steps: selection never looks at
//! teams, orientation never looks at tiers.

pub mod timestamp;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::types::{EngineError, Game, MarketQuote};
use timestamp::parse_instant;

// ---------------------------------------------------------------------------
// Normalized line
// ---------------------------------------------------------------------------

/// The one market line valuation compares against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLine {
    pub game_id: String,
    pub provider: String,
    pub tier: u32,
    /// Home-relative spread; negative = home favored.
    pub home_spread: Option<f64>,
    pub total: Option<f64>,
    pub home_moneyline: Option<i32>,
    pub away_moneyline: Option<i32>,
    pub observed_at: DateTime<Utc>,
}

impl fmt::Display for NormalizedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spread = self
            .home_spread
            .map(|s| format!("home {s:+.1}"))
            .unwrap_or_else(|| "no spread".to_string());
        let total = self
            .total
            .map(|t| format!("o/u {t:.1}"))
            .unwrap_or_else(|| "no total".to_string());
        write!(
            f,
            "[{} tier {}] {spread} | {total} @ {}",
            self.provider,
            self.tier,
            self.observed_at.to_rfc3339(),
        )
    }
}

impl NormalizedLine {
    /// Home margin the market implies (the spread's negation).
    pub fn market_margin(&self) -> Option<f64> {
        self.home_spread.map(flip)
    }

    /// Home win probability with the bookmaker margin removed.
    pub fn home_win_probability(&self) -> Option<f64> {
        let home = implied_probability(self.home_moneyline?)?;
        let away = implied_probability(self.away_moneyline?)?;
        let overround = home + away;
        if overround <= 0.0 {
            return None;
        }
        Some(home / overround)
    }
}

/// Implied probability of American odds, vig included.
///
/// Odds strictly between -100 and +100 do not exist and yield `None`.
pub fn implied_probability(american: i32) -> Option<f64> {
    let odds = american as f64;
    if american >= 100 {
        Some(100.0 / (odds + 100.0))
    } else if american <= -100 {
        Some(-odds / (-odds + 100.0))
    } else {
        None
    }
}

/// Negate a line without producing `-0.0`.
fn flip(value: f64) -> f64 {
    -value + 0.0
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// The quote chosen for a game, with its parsed observation time.
#[derive(Debug, Clone)]
pub struct SelectedQuote<'a> {
    pub quote: &'a MarketQuote,
    pub observed_at: DateTime<Utc>,
}

/// How the provider listed the two teams relative to the game record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    HomeListedFirst,
    AwayListedFirst,
}

/// Selects and orients one quote per game.
#[derive(Debug, Clone, Default)]
pub struct MarketNormalizer;

impl MarketNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Select the primary quote for `game` and orient it home/away.
    pub fn normalize(
        &self,
        game: &Game,
        quotes: &[MarketQuote],
    ) -> Result<NormalizedLine, EngineError> {
        let selected = self.select(game, quotes)?;
        let line = self.orient(game, &selected)?;

        debug!(
            game_id = %game.id,
            candidates = quotes.len(),
            provider = %line.provider,
            tier = line.tier,
            home_spread = ?line.home_spread,
            total = ?line.total,
            "Market normalized"
        );

        Ok(line)
    }

    /// Pick the quote with the lowest tier rank; ties go to the latest
    /// observation, then to the alphabetically first provider.
    ///
    /// Every candidate in the winning tier must carry a parseable timestamp.
    /// A broken primary quote fails the game rather than falling back to a
    /// lower tier.
    pub fn select<'a>(
        &self,
        game: &Game,
        quotes: &'a [MarketQuote],
    ) -> Result<SelectedQuote<'a>, EngineError> {
        let relevant: Vec<&MarketQuote> = quotes
            .iter()
            .filter(|q| {
                let ours = q.game_id == game.id;
                if !ours {
                    warn!(
                        game_id = %game.id,
                        quote_game_id = %q.game_id,
                        provider = %q.provider,
                        "Ignoring quote addressed to another game"
                    );
                }
                ours
            })
            .collect();

        let min_tier = relevant
            .iter()
            .map(|q| q.tier)
            .min()
            .ok_or_else(|| EngineError::NoQuoteAvailable { game_id: game.id.clone() })?;

        let mut best: Option<SelectedQuote<'a>> = None;
        for quote in relevant.into_iter().filter(|q| q.tier == min_tier) {
            let observed_at = parse_instant(&quote.observed_at)?;
            let candidate = SelectedQuote { quote, observed_at };
            best = match best {
                None => Some(candidate),
                Some(current) if Self::outranks(&candidate, &current) => Some(candidate),
                keep => keep,
            };
        }

        best.ok_or_else(|| EngineError::NoQuoteAvailable { game_id: game.id.clone() })
    }

    fn outranks(candidate: &SelectedQuote<'_>, current: &SelectedQuote<'_>) -> bool {
        candidate.observed_at > current.observed_at
            || (candidate.observed_at == current.observed_at
                && candidate.quote.provider < current.quote.provider)
    }

    /// Re-express the selected quote in the game's home/away order.
    fn orient(
        &self,
        game: &Game,
        selected: &SelectedQuote<'_>,
    ) -> Result<NormalizedLine, EngineError> {
        let quote = selected.quote;
        Self::check_values(quote)?;

        // A moneyline alone gives valuation nothing to compare against.
        if quote.spread.is_none() && quote.total.is_none() {
            warn!(
                game_id = %game.id,
                provider = %quote.provider,
                "Primary quote carries neither spread nor total"
            );
            return Err(EngineError::NoQuoteAvailable { game_id: game.id.clone() });
        }

        let orientation = Self::resolve_orientation(game, quote)?;

        let (home_spread, home_moneyline, away_moneyline) = match orientation {
            Orientation::HomeListedFirst => (
                quote.spread,
                quote.moneylines.map(|m| m[0]),
                quote.moneylines.map(|m| m[1]),
            ),
            Orientation::AwayListedFirst => (
                quote.spread.map(flip),
                quote.moneylines.map(|m| m[1]),
                quote.moneylines.map(|m| m[0]),
            ),
        };

        Ok(NormalizedLine {
            game_id: game.id.clone(),
            provider: quote.provider.clone(),
            tier: quote.tier,
            home_spread,
            total: quote.total,
            home_moneyline,
            away_moneyline,
            observed_at: selected.observed_at,
        })
    }

    /// Match both listed labels against team identity. Exactly one label must
    /// name the home team and the other the away team.
    fn resolve_orientation(game: &Game, quote: &MarketQuote) -> Result<Orientation, EngineError> {
        let [first, second] = &quote.teams;
        let first_home = game.home.matches(first);
        let first_away = game.away.matches(first);
        let second_home = game.home.matches(second);
        let second_away = game.away.matches(second);

        if first_home && second_away && !first_away && !second_home {
            Ok(Orientation::HomeListedFirst)
        } else if first_away && second_home && !first_home && !second_away {
            Ok(Orientation::AwayListedFirst)
        } else {
            Err(EngineError::TeamMismatch {
                game_id: game.id.clone(),
                listed: quote.teams.clone(),
            })
        }
    }

    fn check_values(quote: &MarketQuote) -> Result<(), EngineError> {
        let invalid = |message: String| EngineError::InvalidQuote {
            game_id: quote.game_id.clone(),
            provider: quote.provider.clone(),
            message,
        };

        if let Some(spread) = quote.spread {
            if !spread.is_finite() {
                return Err(invalid(format!("non-finite spread {spread}")));
            }
        }
        if let Some(total) = quote.total {
            if !total.is_finite() || total <= 0.0 {
                return Err(invalid(format!("total {total} is not a positive number")));
            }
        }
        if let Some(lines) = quote.moneylines {
            if lines.iter().any(|&m| implied_probability(m).is_none()) {
                return Err(invalid(format!("moneylines {lines:?} are not valid American odds")));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
