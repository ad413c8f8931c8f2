//! Session store
//!
//! One pretty-printed JSON record per session in a single directory.
//! After every write the directory is trimmed to the `max_sessions` most
//! recently modified records.

use crate::config::GameConfig;
use crate::data::*;
use crate::GameError;
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

/// Version tag written into exported session documents
pub const EXPORT_VERSION: &str = "1.0";

/// File-backed session persistence
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
    max_sessions: usize,
}

impl SessionStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>, max_sessions: usize) -> Result<Self, GameError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), max_sessions, "Opened session store");
        Ok(Self {
            dir,
            max_sessions: max_sessions.max(1),
        })
    }

    pub fn from_config(config: &GameConfig) -> Result<Self, GameError> {
        Self::open(&config.sessions_dir, config.max_sessions)
    }

    /// Record path for an id. Ids that could escape the directory have none.
    fn record_path(&self, session_id: &str) -> Option<PathBuf> {
        let valid = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.dir.join(format!("{session_id}.json")))
    }

    /// Start and persist a fresh session
    pub fn create(
        &self,
        scenario_id: &str,
        scenario_name: &str,
        player_name: &str,
        initial_phase: &str,
    ) -> Result<SessionState, GameError> {
        let state = SessionState::new(scenario_id, scenario_name, player_name, initial_phase);
        self.save(&state)?;
        info!(
            session_id = %state.session_id,
            scenario = %scenario_id,
            player = %player_name,
            "Created session"
        );
        Ok(state)
    }

    /// Write the full state, replacing any earlier version
    pub fn save(&self, state: &SessionState) -> Result<(), GameError> {
        let path = self
            .record_path(state.session_id.as_str())
            .ok_or_else(|| GameError::InvalidState(format!("invalid session id '{}'", state.session_id)))?;

        let json = serde_json::to_string_pretty(state)?;
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = std::fs::write(&tmp, json) {
            error!(session_id = %state.session_id, error = %e, "Failed to save session");
            return Err(e.into());
        }
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            error!(session_id = %state.session_id, error = %e, "Failed to replace session record");
            return Err(e.into());
        }
        debug!(session_id = %state.session_id, path = %path.display(), "Saved session");

        self.enforce_retention();
        Ok(())
    }

    /// Load a session; missing and unreadable records are both `None`
    pub fn load(&self, session_id: &str) -> Option<SessionState> {
        let path = self.record_path(session_id)?;
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(session_id, "No such session");
                return None;
            }
            Err(e) => {
                warn!(session_id, error = %e, "Failed to read session");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(session_id, error = %e, "Malformed session record");
                None
            }
        }
    }

    pub fn exists(&self, session_id: &str) -> bool {
        self.record_path(session_id).is_some_and(|p| p.is_file())
    }

    /// Session records with their modification times, newest first
    fn records(&self) -> Vec<(PathBuf, SystemTime)> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Failed to read session directory");
                return Vec::new();
            }
        };

        let mut records: Vec<(PathBuf, SystemTime)> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .filter_map(|path| {
                let modified = path.metadata().and_then(|m| m.modified()).ok()?;
                Some((path, modified))
            })
            .collect();
        records.sort_by(|a, b| b.1.cmp(&a.1));
        records
    }

    /// Summaries of stored sessions, newest start time first
    pub fn list(&self, include_completed: bool) -> Vec<SessionListing> {
        let mut listings: Vec<SessionListing> = self
            .records()
            .into_iter()
            .filter_map(|(path, _)| {
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| warn!(path = %path.display(), error = %e, "Skipping unreadable session"))
                    .ok()?;
                serde_json::from_str::<SessionState>(&contents)
                    .map_err(|e| warn!(path = %path.display(), error = %e, "Skipping malformed session"))
                    .ok()
            })
            .filter(|state| include_completed || !state.is_completed)
            .map(|state| state.listing())
            .collect();

        listings.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        listings
    }

    /// Remove a session record. False if there was nothing to remove.
    pub fn delete(&self, session_id: &str) -> bool {
        let Some(path) = self.record_path(session_id) else {
            return false;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(session_id, "Deleted session");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(session_id, error = %e, "Failed to delete session");
                false
            }
        }
    }

    /// Keep only the `max_sessions` most recently modified records
    pub fn cleanup_sessions(&self, max_sessions: usize) -> usize {
        let mut removed = 0;
        for (path, _) in self.records().into_iter().skip(max_sessions) {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove old session"),
            }
        }
        if removed > 0 {
            info!(removed, kept = max_sessions, "Cleaned up old sessions");
        }
        removed
    }

    fn enforce_retention(&self) {
        self.cleanup_sessions(self.max_sessions);
    }

    /// Delete completed sessions that started more than `days` ago
    pub fn cleanup_completed_older_than(&self, days: i64, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(days);
        let stale: Vec<SessionListing> = self
            .list(true)
            .into_iter()
            .filter(|s| s.is_completed && s.start_time < cutoff)
            .collect();

        let removed = stale.iter().filter(|s| self.delete(s.session_id.as_str())).count();
        if removed > 0 {
            info!(removed, days, "Removed completed sessions");
        }
        removed
    }

    /// Write a standalone JSON export of a session to `path`
    pub fn export(&self, session_id: &str, path: &Path, now: DateTime<Utc>) -> Result<(), GameError> {
        let state = self
            .load(session_id)
            .ok_or_else(|| GameError::SessionNotFound(session_id.to_string()))?;

        let document = serde_json::json!({
            "session_summary": state.summary(now),
            "full_session_data": state,
            "export_timestamp": now,
            "export_version": EXPORT_VERSION,
        });

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&document)?)?;
        info!(session_id, path = %path.display(), "Exported session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(max: usize) -> (TempDir, SessionStore) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::open(dir.path(), max).unwrap();
        (dir, store)
    }

    #[test]
    fn test_create_then_load() {
        let (_dir, store) = store(10);
        let state = store.create("S1", "Scenario One", "Ana", "Initial Access").unwrap();
        assert!(store.exists(state.session_id.as_str()));
        assert_eq!(store.load(state.session_id.as_str()), Some(state));
    }

    #[test]
    fn test_failed_replace_leaves_no_temp_file() {
        let (dir, store) = store(10);
        let state = SessionState::new("S1", "One", "Ana", "Initial Access");
        // A directory in the record's place makes the rename fail
        std::fs::create_dir(dir.path().join(format!("{}.json", state.session_id))).unwrap();

        assert!(matches!(store.save(&state), Err(GameError::Persistence(_))));
        assert!(!dir.path().join(format!("{}.json.tmp", state.session_id)).exists());
    }

    #[test]
    fn test_missing_and_unsafe_ids() {
        let (_dir, store) = store(10);
        assert!(store.load("nope1234").is_none());
        assert!(store.load("../etc/passwd").is_none());
        assert!(!store.delete("nope1234"));
        assert!(!store.delete(""));
    }

    #[test]
    fn test_corrupt_record_is_not_found() {
        let (dir, store) = store(10);
        std::fs::write(dir.path().join("garbled.json"), "{ not json").unwrap();
        assert!(store.load("garbled").is_none());

        store.create("S1", "Scenario One", "Ana", "Initial Access").unwrap();
        assert_eq!(store.list(true).len(), 1);
    }

    #[test]
    fn test_list_filters_completed() {
        let (_dir, store) = store(10);
        let mut done = store.create("S1", "One", "Ana", "Initial Access").unwrap();
        store.create("S2", "Two", "Ben", "Initial Access").unwrap();
        done.is_completed = true;
        store.save(&done).unwrap();

        assert_eq!(store.list(true).len(), 2);
        let open = store.list(false);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].scenario_name, "Two");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, store) = store(10);
        let state = store.create("S1", "One", "Ana", "Initial Access").unwrap();
        assert!(store.delete(state.session_id.as_str()));
        assert!(!store.delete(state.session_id.as_str()));
        assert!(store.load(state.session_id.as_str()).is_none());
    }

    #[test]
    fn test_manual_cleanup_counts_removed() {
        let (_dir, store) = store(10);
        for _ in 0..4 {
            store.create("S1", "One", "Ana", "Initial Access").unwrap();
            std::thread::sleep(std::time::Duration::from_millis(15));
        }
        assert_eq!(store.cleanup_sessions(1), 3);
        assert_eq!(store.cleanup_sessions(1), 0);
        assert_eq!(store.list(true).len(), 1);
    }

    #[test]
    fn test_cleanup_completed_older_than() {
        let (_dir, store) = store(10);
        let mut old = store.create("S1", "Old", "Ana", "Initial Access").unwrap();
        old.start_time = Utc::now() - Duration::days(40);
        old.is_completed = true;
        store.save(&old).unwrap();

        let mut old_open = store.create("S1", "Old open", "Ana", "Initial Access").unwrap();
        old_open.start_time = Utc::now() - Duration::days(40);
        store.save(&old_open).unwrap();

        assert_eq!(store.cleanup_completed_older_than(30, Utc::now()), 1);
        assert!(store.load(old.session_id.as_str()).is_none());
        assert!(store.load(old_open.session_id.as_str()).is_some());
    }

    #[test]
    fn test_export_document() {
        let (dir, store) = store(10);
        let state = store.create("S1", "One", "Ana", "Initial Access").unwrap();
        let out = dir.path().join("exports").join("session.export");
        store.export(state.session_id.as_str(), &out, Utc::now()).unwrap();

        let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(doc["export_version"], "1.0");
        assert_eq!(doc["session_summary"]["player_name"], "Ana");
        assert_eq!(doc["full_session_data"]["session_id"], state.session_id.as_str());

        assert!(matches!(
            store.export("missing1", &out, Utc::now()),
            Err(GameError::SessionNotFound(_))
        ));
    }
}
