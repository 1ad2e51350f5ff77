//! Prediction model: base ratings plus additive adjustments.

pub mod rating;
pub mod valuation;
