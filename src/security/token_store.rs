//! Token store with environment override and masking capabilities
//!
//! This module provides credential storage for platform authentication.
//! Tokens are resolved from environment variables first, then from a JSON
//! settings file that also holds the saved file-path and host settings.
//! Secrets are wrapped in `secrecy::SecretString` to prevent accidental
//! exposure in logs.

use crate::core::error::PublishError;
use crate::core::traits::Platform;
use secrecy::SecretString;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Keys the store accepts: one token per platform plus saved settings
pub const SAVED_KEYS: &[&str] = &[
    "medium_token",
    "devto_token",
    "hashnode_token",
    "file_path",
    "host",
];

/// Credential provider backed by env vars and a JSON settings file
pub struct TokenStore {
    file_path: PathBuf,
}

impl TokenStore {
    /// Create a store at the default location
    /// (~/.blog-publisher/settings.json)
    pub fn new() -> Self {
        let base = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let file_path = PathBuf::from(base)
            .join(".blog-publisher")
            .join("settings.json");

        Self { file_path }
    }

    /// Create a store backed by a specific file
    pub fn with_path(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Retrieve a value; token keys check their environment variable first
    ///
    /// Returns `None` when the key is set nowhere.
    pub fn get(&self, key: &str) -> Option<SecretString> {
        if let Some(platform) = Platform::ALL.iter().find(|p| p.token_key() == key) {
            if let Ok(value) = env::var(platform.token_env_var()) {
                if !value.is_empty() {
                    return Some(SecretString::from(value));
                }
            }
        }

        self.load_map()
            .ok()?
            .remove(key)
            .map(SecretString::from)
    }

    /// Retrieve the token for a platform
    pub fn token_for(&self, platform: Platform) -> Option<SecretString> {
        self.get(platform.token_key())
    }

    /// Save a value under a known key
    pub fn put(&self, key: &str, value: &str) -> Result<(), PublishError> {
        Self::validate_key(key)?;

        if value.trim().is_empty() {
            return Err(PublishError::TokenStore(format!(
                "空の値は保存できません: {}",
                key
            )));
        }

        let mut map = self.load_map()?;
        map.insert(key.to_string(), value.to_string());
        self.save_map(&map)
    }

    /// Delete a saved value; returns whether the key existed
    pub fn delete(&self, key: &str) -> Result<bool, PublishError> {
        Self::validate_key(key)?;

        let mut map = self.load_map()?;
        let existed = map.remove(key).is_some();
        if existed {
            self.save_map(&map)?;
        }

        Ok(existed)
    }

    /// List saved keys with masked values, in key order
    pub fn list_saved(&self) -> Result<Vec<(String, String)>, PublishError> {
        let map = self.load_map()?;

        Ok(map
            .into_iter()
            .map(|(key, value)| {
                let masked = Self::mask_token(&value);
                (key, masked)
            })
            .collect())
    }

    /// Masks a token for safe display
    ///
    /// Shows only the first 3 and last 3 characters for identification.
    /// Tokens shorter than 10 characters are fully masked as "****".
    pub fn mask_token(token: &str) -> String {
        if token.is_empty() || token.len() < 10 {
            return "****".to_string();
        }

        let prefix = &token[..3];
        let suffix = &token[token.len() - 3..];
        format!("{}...{}", prefix, suffix)
    }

    fn validate_key(key: &str) -> Result<(), PublishError> {
        if SAVED_KEYS.contains(&key) {
            Ok(())
        } else {
            Err(PublishError::TokenStore(format!(
                "不明なキーです: {}（対応キー: {}）",
                key,
                SAVED_KEYS.join(", ")
            )))
        }
    }

    fn load_map(&self) -> Result<BTreeMap<String, String>, PublishError> {
        match fs::read_to_string(&self.file_path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                PublishError::TokenStore(format!(
                    "設定ファイルが破損しています（{}）: {}",
                    self.file_path.display(),
                    e
                ))
            }),
            Err(_) => Ok(BTreeMap::new()),
        }
    }

    fn save_map(&self, map: &BTreeMap<String, String>) -> Result<(), PublishError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| PublishError::TokenStore(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(map)
            .map_err(|e| PublishError::TokenStore(e.to_string()))?;
        fs::write(&self.file_path, content)
            .map_err(|e| PublishError::TokenStore(e.to_string()))
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> TokenStore {
        TokenStore::with_path(dir.path().join("settings.json"))
    }

    #[test]
    fn test_get_returns_none_when_unset() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        assert!(store.get("host").is_none());
    }

    #[test]
    fn test_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.put("host", "myblog.hashnode.dev").unwrap();

        let value = store.get("host").unwrap();
        assert_eq!(value.expose_secret(), "myblog.hashnode.dev");
    }

    #[test]
    fn test_put_rejects_unknown_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let result = store.put("unknown_key", "value");

        assert!(matches!(result, Err(PublishError::TokenStore(_))));
    }

    #[test]
    fn test_put_rejects_empty_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let result = store.put("host", "  ");

        assert!(matches!(result, Err(PublishError::TokenStore(_))));
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.put("devto_token", "devto-token-12345").unwrap();
        assert!(store.delete("devto_token").unwrap());
        assert!(!store.delete("devto_token").unwrap());
        assert!(store.get("devto_token").is_none());
    }

    #[test]
    fn test_env_var_overrides_saved_token() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        store.put("medium_token", "saved-token-12345").unwrap();

        unsafe {
            env::set_var("MEDIUM_TOKEN", "env-token-12345");
        }
        let token = store.token_for(Platform::Medium).unwrap();
        assert_eq!(token.expose_secret(), "env-token-12345");
        unsafe {
            env::remove_var("MEDIUM_TOKEN");
        }

        let token = store.token_for(Platform::Medium).unwrap();
        assert_eq!(token.expose_secret(), "saved-token-12345");
    }

    #[test]
    fn test_list_saved_masks_values() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.put("hashnode_token", "hashnode-token-12345").unwrap();
        store.put("host", "myblog.hashnode.dev").unwrap();

        let saved = store.list_saved().unwrap();

        assert_eq!(saved.len(), 2);
        assert!(saved.iter().any(|(k, v)| k == "hashnode_token" && v == "has...345"));
        assert!(!saved.iter().any(|(_, v)| v.contains("hashnode-token-12345")));
    }

    #[test]
    fn test_corrupt_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        let store = TokenStore::with_path(&path);

        assert!(matches!(
            store.list_saved(),
            Err(PublishError::TokenStore(_))
        ));
    }

    #[test]
    fn test_mask_token_with_short_token() {
        assert_eq!(TokenStore::mask_token("short"), "****");
        assert_eq!(TokenStore::mask_token(""), "****");
    }

    #[test]
    fn test_mask_token_with_long_token() {
        assert_eq!(TokenStore::mask_token("abcdef123456"), "abc...456");
    }
}
