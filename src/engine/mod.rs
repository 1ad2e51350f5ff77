//! Core engine: snapshot in, ranked edges out.
//!
//! `EdgeEngine` wires the market normalizer, valuation engine, key-number
//! module and strategy layer together. Each game is scored independently;
//! a game that cannot be scored is recorded as a failure and the batch
//! moves on.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::adjust::injury::InjuryImpact;
use crate::adjust::key_number::{KeyNumberAlert, KeyNumberProximity};
use crate::adjust::weather::{WeatherImpact, WeatherInput};
use crate::config::AppConfig;
use crate::data::Sources;
use crate::market::timestamp::parse_instant;
use crate::market::{MarketNormalizer, NormalizedLine};
use crate::model::rating::RatingModel;
use crate::model::valuation::{AdjustmentInputs, RatingInputs, Valuation, ValuationEngine};
use crate::strategy::edge::{Edge, EdgeDetector, SuppressedEdge};
use crate::strategy::kelly::StakeSizer;
use crate::strategy::{rank_edges, rank_suppressed, StrategyOrchestrator};
use crate::types::{EngineError, Game};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Everything produced for one successfully scored game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameScore {
    pub game_id: String,
    pub line: NormalizedLine,
    pub valuation: Valuation,
    pub key_number: Option<KeyNumberAlert>,
    pub edges: Vec<Edge>,
    pub suppressed: Vec<SuppressedEdge>,
}

/// The market line a game was scored against, with its no-vig price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedLine {
    #[serde(flatten)]
    pub line: NormalizedLine,
    /// `None` unless both moneylines were quoted.
    pub home_win_probability: Option<f64>,
}

impl From<NormalizedLine> for PricedLine {
    fn from(line: NormalizedLine) -> Self {
        let home_win_probability = line.home_win_probability();
        Self {
            line,
            home_win_probability,
        }
    }
}

/// A game that could not be scored this run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameFailure {
    pub game_id: String,
    pub matchup: String,
    pub message: String,
    pub error: EngineError,
}

/// Output of one scan over a batch of games.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub games_scored: usize,
    pub games_failed: usize,
    /// Descending by magnitude; ties by game id, then market type.
    pub edges: Vec<Edge>,
    pub suppressed: Vec<SuppressedEdge>,
    pub failures: Vec<GameFailure>,
    /// Per-game audit trail, in input order.
    pub valuations: Vec<Valuation>,
    /// Market line each scored game was compared against, in input order.
    pub lines: Vec<PricedLine>,
}

impl ScanReport {
    /// Stake amount summed over every reported edge.
    pub fn total_staked(&self) -> Decimal {
        self.edges
            .iter()
            .filter_map(|e| e.stake.as_ref())
            .map(|s| s.amount)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct EdgeEngine {
    normalizer: MarketNormalizer,
    valuation: ValuationEngine,
    key_numbers: KeyNumberProximity,
    strategy: StrategyOrchestrator,
}

impl EdgeEngine {
    pub fn new(
        normalizer: MarketNormalizer,
        valuation: ValuationEngine,
        key_numbers: KeyNumberProximity,
        strategy: StrategyOrchestrator,
    ) -> Self {
        Self {
            normalizer,
            valuation,
            key_numbers,
            strategy,
        }
    }

    /// Build the standard pipeline from configuration.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let valuation = ValuationEngine::standard(
            RatingModel::new(cfg.rating.clone()),
            InjuryImpact::new(cfg.injury.clone()),
            WeatherImpact::new(cfg.weather.clone()),
        );
        let strategy = StrategyOrchestrator::new(
            EdgeDetector::new(cfg.edge.clone()),
            StakeSizer::new(cfg.stake.clone()),
            cfg.engine.bankroll,
            cfg.engine.risk_cap,
        );
        Self::new(
            MarketNormalizer::new(),
            valuation,
            KeyNumberProximity::new(cfg.key_numbers.clone()),
            strategy,
        )
    }

    /// Score one game end to end.
    pub fn score_game(&self, game: &Game, sources: &Sources<'_>) -> Result<GameScore, EngineError> {
        game.validate()?;

        let quotes = sources.markets.get_quotes(game);
        let line = self.normalizer.normalize(game, &quotes)?;

        let home_rating = sources
            .ratings
            .get_rating(&game.home.abbreviation, game.week, game.season)?;
        let away_rating = sources
            .ratings
            .get_rating(&game.away.abbreviation, game.week, game.season)?;

        let home_injuries = sources.injuries.get_injuries(&game.home.abbreviation, game.week);
        let away_injuries = sources.injuries.get_injuries(&game.away.abbreviation, game.week);
        let weather = self.weather_input(game, sources);

        let valuation = self.valuation.value(
            game,
            RatingInputs {
                home: &home_rating,
                away: &away_rating,
            },
            AdjustmentInputs {
                home_injuries: &home_injuries,
                away_injuries: &away_injuries,
                weather: &weather,
            },
        )?;

        let key_number = self.key_numbers.assess(valuation.line.margin, line.home_spread);
        let signals = self
            .strategy
            .evaluate(game, &valuation.line, &line, key_number.as_ref());

        Ok(GameScore {
            game_id: game.id.clone(),
            line,
            valuation,
            key_number,
            edges: signals.edges,
            suppressed: signals.suppressed,
        })
    }

    /// Resolve the weather input for a game. Only a parsed kickoff can be
    /// looked up; an unparseable one degrades weather, not the game.
    fn weather_input(&self, game: &Game, sources: &Sources<'_>) -> WeatherInput {
        if game.venue.indoor {
            return WeatherInput::NotApplicable;
        }

        let kickoff = match parse_instant(&game.kickoff) {
            Ok(k) => k,
            Err(e) => {
                warn!(game_id = %game.id, error = %e, "Kickoff unparseable, skipping weather");
                return WeatherInput::Unavailable { reason: e.to_string() };
            }
        };

        match sources.weather.get_weather(&game.venue, kickoff) {
            Some(snapshot) => WeatherInput::Forecast(snapshot),
            None => {
                debug!(game_id = %game.id, venue = %game.venue.name, "No forecast");
                WeatherInput::Unavailable {
                    reason: format!("no forecast for {} at kickoff", game.venue.name),
                }
            }
        }
    }

    /// Score every game. Per-game failures are collected, never fatal.
    pub fn run(&self, games: &[Game], sources: &Sources<'_>) -> ScanReport {
        info!(games = games.len(), "Scan started");

        let mut report = ScanReport::default();
        for game in games {
            match self.score_game(game, sources) {
                Ok(score) => {
                    report.games_scored += 1;
                    report.edges.extend(score.edges);
                    report.suppressed.extend(score.suppressed);
                    report.valuations.push(score.valuation);
                    report.lines.push(PricedLine::from(score.line));
                }
                Err(error) => {
                    warn!(
                        game_id = %game.id,
                        matchup = %game.matchup(),
                        error = %error,
                        "Game skipped"
                    );
                    report.games_failed += 1;
                    report.failures.push(GameFailure {
                        game_id: game.id.clone(),
                        matchup: game.matchup(),
                        message: error.to_string(),
                        error,
                    });
                }
            }
        }

        rank_edges(&mut report.edges);
        rank_suppressed(&mut report.suppressed);

        info!(
            scored = report.games_scored,
            failed = report.games_failed,
            edges = report.edges.len(),
            suppressed = report.suppressed.len(),
            staked = %report.total_staked(),
            "Scan complete"
        );

        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
