//! Core domain + application logic for the paperbot PDF conversion bot.
//!
//! This crate is intentionally framework-agnostic. Telegram / ConvertAPI /
//! Tenor live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod pipeline;
pub mod ports;
pub mod raster;
pub mod tempfiles;
pub mod transfer;

pub use errors::{Error, Result};
