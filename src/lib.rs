//! A toolkit for Vietnam's 2025-2026 tax rules: personal income tax, household business (HKD)
//! revenue tracking and declarations, e-commerce withholding reconciliation and corporate income
//! tax estimates. Records live in a local SQLite store under `$TAX_HELPER_HOME`.

pub mod api;
pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod export;
pub mod model;
pub mod store;
pub mod tax;
mod utils;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::Config;
pub use error::{error_type, Error, ErrorType, Result};
