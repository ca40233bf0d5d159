use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and:
/// - Creates an initial `config.json` file with default settings
/// - Creates the `exports` directory
/// - Creates the SQLite store and brings its schema up to date
///
/// # Arguments
/// - `home` - The directory that will be the root of data directory, e.g. `$HOME/tax-helper`
///
/// # Errors
/// - Returns an error if any file operations fail or if the directory was already initialized.
pub async fn init(home: &Path) -> Result<Out<()>> {
    let config = Config::create(home)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the tax helper directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_twice() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let out = init(&home).await.unwrap();
        assert!(out.message().contains("Successfully"));
        assert!(home.join("config.json").is_file());

        let e = init(&home).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Config));
    }
}
