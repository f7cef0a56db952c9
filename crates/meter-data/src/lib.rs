//! Data layer for meter-trends.
//!
//! Reads raw meter exports, validates and normalizes them into a canonical
//! gallon series, computes statistics and trends, and runs the top-level
//! analysis pipeline.

pub mod analysis;
pub mod analyzer;
pub mod export;
pub mod normalizer;
pub mod reader;
pub mod validator;

pub use meter_core as core;
