use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{EpisodeId, ShowId};

/// On-disk layout. Flags are kept as `id -> bool` maps so files written by
/// older versions load unchanged.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    token: String,
    #[serde(default)]
    episodes: BTreeMap<ShowId, bool>,
    #[serde(default)]
    sent: BTreeMap<EpisodeId, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct StoreState {
    token: String,
    watched: BTreeSet<ShowId>,
    sent: BTreeSet<EpisodeId>,
}

impl From<PersistedState> for StoreState {
    fn from(persisted: PersistedState) -> Self {
        Self {
            token: persisted.token,
            watched: flagged(persisted.episodes),
            sent: flagged(persisted.sent),
        }
    }
}

fn flagged(map: BTreeMap<u64, bool>) -> BTreeSet<u64> {
    map.into_iter()
        .filter_map(|(id, on)| on.then_some(id))
        .collect()
}

/// Watchlist, sent markers and the catalog token for one run.
///
/// Every accessor takes the same lock, so a shared `&ShowsManager` stays
/// consistent even if callers run on several threads.
pub struct ShowsManager {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl ShowsManager {
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Never fails: an unusable cache file means a cold start.
    pub fn load(path: &Path) -> Self {
        match read_persisted(path) {
            Ok(persisted) => {
                debug!(
                    path = %path.display(),
                    saved_at = persisted.saved_at.as_deref().unwrap_or("unknown"),
                    "loaded show cache"
                );
                Self {
                    path: path.to_path_buf(),
                    state: Mutex::new(persisted.into()),
                }
            }
            Err(err) => {
                warn!("load of {} failed: {err:#}", path.display());
                debug!("empty cache initialized");
                Self::empty(path)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_watch(&self, ids: &[ShowId], watched: bool) {
        let mut state = self.state();
        for id in ids {
            if watched {
                state.watched.insert(*id);
            } else {
                state.watched.remove(id);
            }
        }
    }

    pub fn is_watched(&self, id: ShowId) -> bool {
        self.state().watched.contains(&id)
    }

    pub fn mark_sent(&self, id: EpisodeId) {
        self.state().sent.insert(id);
    }

    pub fn is_sent(&self, id: EpisodeId) -> bool {
        self.state().sent.contains(&id)
    }

    pub fn token(&self) -> String {
        self.state().token.clone()
    }

    pub fn set_token(&self, token: String) {
        self.state().token = token;
    }

    pub fn save(&self) -> Result<()> {
        let started = Instant::now();
        let persisted = {
            let state = self.state();
            PersistedState {
                token: state.token.clone(),
                episodes: state.watched.iter().map(|id| (*id, true)).collect(),
                sent: state.sent.iter().map(|id| (*id, true)).collect(),
                saved_at: Some(Utc::now().to_rfc3339()),
            }
        };
        write_persisted(&self.path, &persisted)?;
        debug!("storing data to disk took {:?}", started.elapsed());
        Ok(())
    }
}

fn read_persisted(path: &Path) -> Result<PersistedState> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to decode {}", path.display()))
}

fn write_persisted(path: &Path, persisted: &PersistedState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create cache directory {}", parent.display()))?;
    }
    let encoded = serde_json::to_string_pretty(persisted).context("failed to encode cache")?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, encoded).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn absent_ids_are_neither_watched_nor_sent() {
        let store = ShowsManager::empty(Path::new("/nonexistent/cache"));
        assert!(!store.is_watched(1));
        assert!(!store.is_sent(1));
        assert_eq!(store.token(), "");
    }

    #[test]
    fn watch_and_unwatch_are_idempotent() {
        let store = ShowsManager::empty(Path::new("/nonexistent/cache"));
        store.set_watch(&[1, 2, 2], true);
        store.set_watch(&[1], true);
        assert!(store.is_watched(1));
        assert!(store.is_watched(2));

        store.set_watch(&[2, 3], false);
        store.set_watch(&[2], false);
        assert!(store.is_watched(1));
        assert!(!store.is_watched(2));
        assert!(!store.is_watched(3));
    }

    #[test]
    fn mark_sent_twice_keeps_single_marker() {
        let store = ShowsManager::empty(Path::new("/nonexistent/cache"));
        store.mark_sent(1001);
        store.mark_sent(1001);
        assert!(store.is_sent(1001));
        assert_eq!(store.state().sent.len(), 1);
    }

    #[test]
    fn missing_file_is_a_cold_start() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ShowsManager::load(&dir.path().join("mshows.cache"));
        assert_eq!(*store.state(), StoreState::default());
    }

    #[test]
    fn corrupt_file_is_a_cold_start() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mshows.cache");
        fs::write(&path, "{\"token\": \"abc\", \"episodes\": [").expect("write");

        let store = ShowsManager::load(&path);

        assert_eq!(*store.state(), StoreState::default());
    }

    #[test]
    fn reads_legacy_layout_and_drops_false_flags() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mshows.cache");
        fs::write(
            &path,
            r#"{"token":"tok","episodes":{"42":true,"7":false},"sent":{"1001":true,"1002":false}}"#,
        )
        .expect("write");

        let store = ShowsManager::load(&path);

        assert_eq!(store.token(), "tok");
        assert!(store.is_watched(42));
        assert!(!store.is_watched(7));
        assert!(store.is_sent(1001));
        assert!(!store.is_sent(1002));
    }

    #[test]
    fn save_then_load_restores_everything() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("mshows.cache");
        let store = ShowsManager::load(&path);
        store.set_token("renewed".to_string());
        store.set_watch(&[42, 43], true);
        store.set_watch(&[43], false);
        store.mark_sent(1001);
        store.save().expect("save should succeed");

        let raw = fs::read_to_string(&path).expect("read back");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(json["token"], "renewed");
        assert_eq!(json["episodes"], serde_json::json!({"42": true}));
        assert_eq!(json["sent"], serde_json::json!({"1001": true}));
        assert!(json["saved_at"].is_string());

        let reloaded = ShowsManager::load(&path);
        assert_eq!(*reloaded.state(), *store.state());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").expect("write");

        let store = ShowsManager::empty(&blocker.join("mshows.cache"));

        assert!(store.save().is_err());
    }

    #[test]
    fn concurrent_marks_are_not_lost() {
        let store = Arc::new(ShowsManager::empty(Path::new("/nonexistent/cache")));
        let handles = (0..8u64)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for n in 0..100 {
                        store.mark_sent(worker * 1000 + n);
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("worker");
        }
        assert_eq!(store.state().sent.len(), 800);
    }
}
