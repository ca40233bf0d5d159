//! The key-value persistence interface handed to commands.
//!
//! Every value is a JSON document stored under one of a fixed set of keys. `db::Db` is the SQLite
//! implementation.

use crate::Result;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The fixed set of keys the app persists.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Key {
    /// The revenue ledger, newest first.
    HkdRevenue,
    /// Expense invoices, newest first.
    HkdExpenses,
    UserProfile,
    HkdGroup,
    HkdSector,
    HkdPrimaryCategory,
}

serde_plain::derive_display_from_serialize!(Key);
serde_plain::derive_fromstr_from_deserialize!(Key);

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Returns the raw JSON stored under `key`, if any.
    async fn get_raw(&self, key: Key) -> Result<Option<String>>;

    /// Replaces the value under `key`.
    async fn put_raw(&self, key: Key, value: String) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: Key) -> Result<()>;
}

/// Loads and deserializes the value under `key`.
pub async fn load<T>(store: &dyn Store, key: Key) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    let Some(json) = store.get_raw(key).await? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&json)
        .with_context(|| format!("The stored value for '{key}' is not valid"))?;
    Ok(Some(value))
}

/// Loads the value under `key`, or its default when nothing is stored.
pub async fn load_or_default<T>(store: &dyn Store, key: Key) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    Ok(load(store, key).await?.unwrap_or_default())
}

/// Serializes `value` and stores it under `key`.
pub async fn save<T>(store: &dyn Store, key: Key, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let json =
        serde_json::to_string(value).with_context(|| format!("Unable to serialize '{key}'"))?;
    trace!("Saving {} bytes under '{key}'", json.len());
    store.put_raw(key, json).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{UserProfile, Vnd};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// A `Store` that lives in memory and is lost when dropped.
    #[derive(Debug, Default)]
    struct MemoryStore {
        data: Mutex<HashMap<Key, String>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self::default()
        }

        fn data(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Key, String>>> {
            self.data
                .lock()
                .map_err(|_| anyhow::anyhow!("The in-memory store lock is poisoned"))
        }
    }

    #[async_trait::async_trait]
    impl Store for MemoryStore {
        async fn get_raw(&self, key: Key) -> Result<Option<String>> {
            Ok(self.data()?.get(&key).cloned())
        }

        async fn put_raw(&self, key: Key, value: String) -> Result<()> {
            self.data()?.insert(key, value);
            Ok(())
        }

        async fn remove(&self, key: Key) -> Result<()> {
            self.data()?.remove(&key);
            Ok(())
        }
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::HkdRevenue.to_string(), "hkd-revenue");
        assert_eq!(Key::HkdPrimaryCategory.to_string(), "hkd-primary-category");
        assert_eq!("user-profile".parse::<Key>().unwrap(), Key::UserProfile);
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(load::<UserProfile>(&store, Key::UserProfile)
            .await
            .unwrap()
            .is_none());

        let profile = UserProfile {
            name: "Nguyễn Văn A".to_string(),
            ..UserProfile::default()
        };
        save(&store, Key::UserProfile, &profile).await.unwrap();
        let loaded: UserProfile = load_or_default(&store, Key::UserProfile).await.unwrap();
        assert_eq!(loaded, profile);

        store.remove(Key::UserProfile).await.unwrap();
        store.remove(Key::UserProfile).await.unwrap();
        assert!(store.get_raw(Key::UserProfile).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let store = MemoryStore::new();
        store
            .put_raw(Key::HkdRevenue, "not json".to_string())
            .await
            .unwrap();
        assert!(load::<Vec<Vnd>>(&store, Key::HkdRevenue).await.is_err());
    }
}
