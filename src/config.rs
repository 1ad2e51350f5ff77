//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section and field has a default, so an empty file is a valid
//! configuration. Thresholds and Kelly fractions are operator policy and
//! belong here rather than in code.

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;

use crate::adjust::injury::InjuryConfig;
use crate::adjust::key_number::KeyNumberConfig;
use crate::adjust::weather::WeatherConfig;
use crate::model::rating::RatingConfig;
use crate::strategy::edge::EdgeConfig;
use crate::strategy::kelly::StakeConfig;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub rating: RatingConfig,
    pub injury: InjuryConfig,
    pub weather: WeatherConfig,
    pub key_numbers: KeyNumberConfig,
    pub edge: EdgeConfig,
    pub stake: StakeConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub bankroll: Decimal,
    /// Hard per-bet ceiling as a bankroll fraction, in (0, 1].
    pub risk_cap: f64,
    pub currency: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bankroll: dec!(1000),
            risk_cap: 0.05,
            currency: "USD".to_string(),
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file: {path}"))?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the engine's output meaningless.
    pub fn validate(&self) -> Result<()> {
        let e = &self.edge;
        let floors = [e.very_strong, e.strong, e.medium, e.weak];
        if floors.iter().any(|f| !f.is_finite() || *f <= 0.0) {
            bail!("edge thresholds must be positive, got {floors:?}");
        }
        if !floors.windows(2).all(|w| w[0] > w[1]) {
            bail!("edge thresholds must be strictly descending, got {floors:?}");
        }
        if !e.borderline_band.is_finite() || e.borderline_band < 0.0 {
            bail!("edge.borderline_band must be non-negative");
        }
        if !e.spread_ceiling.is_finite() || !e.total_ceiling.is_finite() {
            bail!(
                "implausibility ceilings must be finite, got ({}, {})",
                e.spread_ceiling,
                e.total_ceiling
            );
        }
        if e.spread_ceiling <= e.weak || e.total_ceiling <= e.weak {
            bail!(
                "implausibility ceilings ({}, {}) must exceed the weakest threshold {}",
                e.spread_ceiling,
                e.total_ceiling,
                e.weak
            );
        }

        let hfa = self.rating.home_field_advantage;
        if !hfa.is_finite() || hfa == 0.0 {
            bail!("rating.home_field_advantage must be a non-zero number");
        }

        let cap = self.engine.risk_cap;
        if !(cap > 0.0 && cap <= 1.0) {
            bail!("engine.risk_cap must be in (0, 1], got {cap}");
        }

        let max_impact = self.injury.max_team_impact;
        if !max_impact.is_finite() || max_impact < 0.0 {
            bail!("injury.max_team_impact must be non-negative");
        }

        let s = &self.stake;
        if [s.very_strong, s.strong, s.medium, s.weak, s.kelly_multiplier]
            .iter()
            .any(|f| !f.is_finite() || *f < 0.0)
        {
            bail!("stake fractions and kelly_multiplier must be non-negative");
        }

        Ok(())
    }

    /// Resolve an environment variable, falling back to `default`.
    pub fn env_or(env_name: &str, default: &str) -> String {
        std::env::var(env_name).unwrap_or_else(|_| default.to_string())
    }
}
