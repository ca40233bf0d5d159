//! Command handlers for the taxhelper CLI.
//!
//! Each subcommand of the CLI has one function here. Calculators only take values, commands that
//! keep records take the `Config` that owns the store.

mod chat;
mod corporate;
mod ecommerce;
mod expense;
mod hkd;
mod init;
mod pit;
mod profile;
mod quick;
mod revenue;
mod roadmap;

use crate::model::{InputInvoice, Transaction, UserProfile};
use crate::store::{self, Key, Store};
use crate::{utils, Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use chat::{chat, chat_session, ChatLog};
pub use corporate::{corporate_estimate, corporate_incentives, CorporateReport};
pub use ecommerce::{ecommerce_reconcile, ecommerce_sample};
pub use expense::{expense_add, expense_list, expense_scan, ExpenseList};
pub use hkd::{hkd_declare, hkd_quote, hkd_reset, hkd_setup, hkd_status, HkdStatus};
pub use init::init;
pub use pit::{pit_calc, pit_compare, pit_dependents, DependentReport};
pub use profile::{profile_set, profile_show};
pub use quick::{quick, QuickResult};
pub use revenue::{revenue_add, revenue_export, revenue_list, RevenueList};
pub use roadmap::roadmap;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// The revenue ledger, newest first.
async fn transactions(store: &dyn Store) -> Result<Vec<Transaction>> {
    store::load_or_default(store, Key::HkdRevenue)
        .await
        .context("Unable to load the revenue ledger")
}

/// Expense invoices, newest first.
async fn expenses(store: &dyn Store) -> Result<Vec<InputInvoice>> {
    store::load_or_default(store, Key::HkdExpenses)
        .await
        .context("Unable to load the expense invoices")
}

async fn profile(store: &dyn Store) -> Result<Option<UserProfile>> {
    store::load(store, Key::UserProfile)
        .await
        .context("Unable to load the profile")
}

/// Writes an exported file to `out`, or to `file_name` in the exports directory.
async fn write_export(
    config: &Config,
    out: Option<&Path>,
    file_name: &str,
    contents: impl AsRef<[u8]>,
) -> Result<PathBuf> {
    let path = match out {
        Some(p) => p.to_path_buf(),
        None => {
            let dir = config.exports();
            utils::make_dir(&dir).await?;
            dir.join(file_name)
        }
    };
    utils::write(&path, contents).await?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[test]
    fn test_out_from_message() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());
    }

    #[tokio::test]
    async fn test_write_export_defaults_to_exports_dir() {
        let env = TestEnv::new().await;
        let config = env.config();
        let path = write_export(&config, None, "a.csv", "x").await.unwrap();
        assert_eq!(path, config.exports().join("a.csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x");

        let custom = env.dir().join("b.csv");
        let path = write_export(&config, Some(&custom), "a.csv", "y").await.unwrap();
        assert_eq!(path, custom);
    }

    #[tokio::test]
    async fn test_empty_store_loads_empty_lists() {
        let env = TestEnv::new().await;
        let config = env.config();
        assert!(transactions(config.store()).await.unwrap().is_empty());
        assert!(expenses(config.store()).await.unwrap().is_empty());
        assert!(profile(config.store()).await.unwrap().is_none());
    }
}
