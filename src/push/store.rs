//! FCM registration-token store.
//!
//! The original (`examples/original_source/receiver/push.go`) kept tokens
//! in a `diskv` key-value store keyed by a `satori/go.uuid` identifier. This
//! crate follows the teacher's own `Capture`/`Storage` idiom instead: each
//! token is a small serde-tagged struct persisted as its own JSON file under
//! the config directory, named by a generated UUID.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub id: Uuid,
    pub token: String,
}

/// JSON-file-per-token store, rooted at `<config_dir>/tokens/`.
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            dir: config_dir.join("tokens"),
        }
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Store `token`, deduplicating by value against everything already on
    /// disk. Returns the id of the (possibly pre-existing) entry.
    pub fn add(&self, token: &str) -> anyhow::Result<Uuid> {
        if let Some(existing) = self.load_all()?.into_iter().find(|t| t.token == token) {
            return Ok(existing.id);
        }

        std::fs::create_dir_all(&self.dir)?;
        let entry = StoredToken {
            id: Uuid::new_v4(),
            token: token.to_string(),
        };
        let contents = serde_json::to_string_pretty(&entry)?;
        std::fs::write(self.path_for(entry.id), contents)?;
        Ok(entry.id)
    }

    /// Remove a token after a delivery failure, matching the original's
    /// `s.db.Erase(key)` on send error.
    pub fn remove(&self, id: Uuid) -> anyhow::Result<()> {
        let path = self.path_for(id);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn load_all(&self) -> anyhow::Result<Vec<StoredToken>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut tokens = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let contents = std::fs::read_to_string(entry.path())?;
            match serde_json::from_str::<StoredToken>(&contents) {
                Ok(token) => tokens.push(token),
                Err(e) => tracing::warn!(path = %entry.path().display(), error = %e, "skipping malformed token file"),
            }
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rfmeterd-push-test-{name}-{}", std::process::id()))
    }

    #[test]
    fn add_then_load_round_trips() {
        let dir = temp_dir("roundtrip");
        let store = TokenStore::new(&dir);
        let id = store.add("token-a").unwrap();
        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, id);
        assert_eq!(loaded[0].token, "token-a");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn add_deduplicates_by_value() {
        let dir = temp_dir("dedup");
        let store = TokenStore::new(&dir);
        let first = store.add("token-a").unwrap();
        let second = store.add("token-a").unwrap();
        assert_eq!(first, second);
        assert_eq!(store.load_all().unwrap().len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn remove_deletes_the_entry() {
        let dir = temp_dir("remove");
        let store = TokenStore::new(&dir);
        let id = store.add("token-a").unwrap();
        store.remove(id).unwrap();
        assert!(store.load_all().unwrap().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_all_on_missing_dir_is_empty() {
        let dir = temp_dir("missing");
        let store = TokenStore::new(&dir);
        assert!(store.load_all().unwrap().is_empty());
    }
}
