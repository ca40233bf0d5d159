//! Configuration file handling for the tax helper.
//!
//! The configuration file is stored at `$TAX_HELPER_HOME/config.json` and contains the settings for
//! the AI assistant and the location of exported files. The home directory also holds the SQLite
//! store that replaces the browser's local storage.

use crate::db::Db;
use crate::store::Store;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "tax-helper";
const CONFIG_VERSION: u8 = 1;
const EXPORTS: &str = "exports";
const CONFIG_JSON: &str = "config.json";
const SQLITE: &str = "tax-helper.sqlite";
const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$TAX_HELPER_HOME` and from there it loads `$TAX_HELPER_HOME/config.json`. It also
/// owns the opened SQLite store.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the home directory and:
    /// - Creates an initial `config.json` file with default settings
    /// - Creates the `exports` directory
    /// - Creates and migrates the SQLite store
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if the store already exists.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the tax helper home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The tax helper home at '{}' is already initialized",
                root.display()
            );
        }

        let config_file = ConfigFile::default();
        utils::make_dir(config_file.exports_dir(&root)).await?;
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(SQLITE);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - open the SQLite store, running any pending migrations
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The tax helper home is missing, run 'taxhelper init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = root.join(SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    /// The persistence interface handed to commands.
    pub fn store(&self) -> &dyn Store {
        &self.db
    }

    /// Where exported CSV and XML files land when no explicit output path is given.
    pub fn exports(&self) -> PathBuf {
        self.config_file.exports_dir(&self.root)
    }

    pub fn ai_model(&self) -> &str {
        &self.config_file.ai_model
    }

    pub fn ai_base_url(&self) -> &str {
        &self.config_file.ai_base_url
    }

    pub fn api_key_env(&self) -> &str {
        &self.config_file.api_key_env
    }

    /// Reads the AI API key from the environment variable named in the config. Empty values are
    /// treated as missing.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(self.api_key_env())
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "tax-helper",
///   "config_version": 1,
///   "ai_model": "gemini-2.5-flash",
///   "ai_base_url": "https://generativelanguage.googleapis.com/",
///   "api_key_env": "GEMINI_API_KEY",
///   "exports_dir": "exports"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "tax-helper"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The generative model used for chat and invoice extraction
    #[serde(default = "default_ai_model")]
    ai_model: String,

    /// Base URL of the generative language REST API
    #[serde(default = "default_ai_base_url")]
    ai_base_url: String,

    /// Name of the environment variable holding the API key. The key itself is never stored.
    #[serde(default = "default_api_key_env")]
    api_key_env: String,

    /// Directory for exported files (optional, relative to the home directory or absolute)
    #[serde(skip_serializing_if = "Option::is_none")]
    exports_dir: Option<PathBuf>,
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_string()
}

fn default_ai_base_url() -> String {
    DEFAULT_AI_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            ai_model: default_ai_model(),
            ai_base_url: default_ai_base_url(),
            api_key_env: default_api_key_env(),
            exports_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `app_name` is wrong.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Resolves the exports directory against `root` unless it is absolute.
    fn exports_dir(&self, root: &Path) -> PathBuf {
        match &self.exports_dir {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => root.join(EXPORTS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Key;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("tax_home");

        let created = Config::create(&home).await.unwrap();
        assert!(created.config_path().is_file());
        assert!(created.sqlite_path().is_file());
        assert!(created.exports().is_dir());
        assert_eq!(created.ai_model(), DEFAULT_AI_MODEL);

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(created.root(), loaded.root());
        assert_eq!(loaded.api_key_env(), DEFAULT_API_KEY_ENV);
        assert!(loaded.store().get_raw(Key::UserProfile).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path()).await.unwrap();
        assert!(Config::create(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("nope")).await;
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("taxhelper init"));
    }

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.app_name, APP_NAME);
        assert_eq!(config.ai_base_url, DEFAULT_AI_BASE_URL);
        assert_eq!(
            config.exports_dir(Path::new("/home/x")),
            PathBuf::from("/home/x/exports")
        );
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "tax-helper",
            "config_version": 1,
            "exports_dir": "/tmp/out"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.ai_model, DEFAULT_AI_MODEL);
        assert_eq!(config.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(
            config.exports_dir(temp_dir.path()),
            PathBuf::from("/tmp/out")
        );
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "other", "config_version": 1 }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("exports_dir"));
    }
}
