//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{self, Assistant, Mode};
use crate::Config;
use std::path::Path;
use tempfile::TempDir;

/// A tax helper home in a temporary directory with its `Config` and SQLite store. Holds the
/// `TempDir` to keep the directory alive for the duration of the test.
pub struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::create(temp_dir.path().join("tax-helper"))
            .await
            .unwrap();
        Self { temp_dir, config }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// A scratch directory outside the home, for input files.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The canned assistant used in test mode.
    pub fn assistant(&self) -> Box<dyn Assistant> {
        api::assistant(&self.config, Mode::Test)
    }
}
