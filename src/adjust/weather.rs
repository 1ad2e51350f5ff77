//! Weather impact.
//!
//! Only outdoor games with a forecast are adjusted, and only the total
//! moves: wind, precipitation and extreme cold all suppress scoring. Indoor
//! venues and missing forecasts both contribute exactly zero, with distinct
//! statuses so reports can tell them apart.

use serde::Deserialize;
use tracing::debug;

use super::{Adjust, Adjustment, AdjustmentContext, AdjustmentSource, AdjustmentStatus};
use crate::types::WeatherSnapshot;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Wind below this has no effect.
    pub wind_threshold_mph: f64,
    /// Total points removed per mph above the threshold.
    pub points_per_mph: f64,
    pub max_wind_penalty: f64,
    /// Precipitation probability (0–1) at which rain starts to count.
    pub precipitation_threshold: f64,
    /// Points removed at 100% precipitation probability.
    pub precipitation_penalty: f64,
    pub cold_threshold_f: f64,
    pub cold_penalty: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            wind_threshold_mph: 15.0,
            points_per_mph: 0.25,
            max_wind_penalty: 5.0,
            precipitation_threshold: 0.5,
            precipitation_penalty: 2.0,
            cold_threshold_f: 20.0,
            cold_penalty: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Weather information resolved for one game before adjustment.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherInput {
    /// Indoor venue; weather cannot matter.
    NotApplicable,
    /// Outdoor venue without a usable forecast.
    Unavailable { reason: String },
    Forecast(WeatherSnapshot),
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WeatherImpact {
    config: WeatherConfig,
}

impl WeatherImpact {
    pub fn new(config: WeatherConfig) -> Self {
        Self { config }
    }

    /// Access the weather configuration.
    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    /// Points removed from the total for a forecast (non-negative).
    pub fn total_penalty(&self, snapshot: &WeatherSnapshot) -> f64 {
        let c = &self.config;

        let wind = ((snapshot.wind_mph - c.wind_threshold_mph).max(0.0) * c.points_per_mph)
            .min(c.max_wind_penalty);

        let precip_prob = snapshot.precipitation_probability.clamp(0.0, 1.0);
        let precip = if precip_prob >= c.precipitation_threshold {
            c.precipitation_penalty * precip_prob
        } else {
            0.0
        };

        let cold = if snapshot.temperature_f <= c.cold_threshold_f {
            c.cold_penalty
        } else {
            0.0
        };

        (wind + precip + cold).max(0.0)
    }
}

impl Adjust for WeatherImpact {
    fn adjust(&self, ctx: &AdjustmentContext<'_>) -> Adjustment {
        if ctx.game.venue.indoor {
            return Adjustment::zero(
                AdjustmentSource::Weather,
                AdjustmentStatus::NotApplicable,
                format!("{} is indoor", ctx.game.venue.name),
            );
        }

        match ctx.weather {
            WeatherInput::NotApplicable => Adjustment::zero(
                AdjustmentSource::Weather,
                AdjustmentStatus::NotApplicable,
                "roof closed",
            ),
            WeatherInput::Unavailable { reason } => Adjustment::zero(
                AdjustmentSource::Weather,
                AdjustmentStatus::Unavailable,
                reason.clone(),
            ),
            WeatherInput::Forecast(snapshot) if snapshot.indoor => Adjustment::zero(
                AdjustmentSource::Weather,
                AdjustmentStatus::NotApplicable,
                "roof closed",
            ),
            WeatherInput::Forecast(snapshot) => {
                let penalty = self.total_penalty(snapshot);
                let total = if penalty > 0.0 { -penalty } else { 0.0 };

                debug!(
                    game_id = %ctx.game.id,
                    wind_mph = snapshot.wind_mph,
                    precip = snapshot.precipitation_probability,
                    temperature_f = snapshot.temperature_f,
                    total = format!("{total:+.2}"),
                    "Weather impact"
                );

                Adjustment {
                    source: AdjustmentSource::Weather,
                    margin: 0.0,
                    total,
                    status: AdjustmentStatus::Applied,
                    reason: snapshot.to_string(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
