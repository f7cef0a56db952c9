//! Core domain for meter-trends.
//!
//! Raw table and canonical series types, the required column schema, the
//! error taxonomy, unit and date handling, report formatting and CLI
//! settings. Everything here is free of file I/O except the settings file.

pub mod dates;
pub mod error;
pub mod formatting;
pub mod models;
pub mod schema;
pub mod settings;
pub mod units;

pub use error::{ErrorKind, MeterError, Result};
