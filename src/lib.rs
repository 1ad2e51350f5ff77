//! SHARPLINE: Sports Edge Detection & Valuation Engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod data;
pub mod market;
pub mod model;
pub mod adjust;
pub mod strategy;
pub mod engine;
