//! Session storage for the in-progress rotation.
//!
//! A session records who is driving which branch. It lives in a single
//! JSON file per working copy, is written by `start` and cleared right
//! before `next`/`done` hand control to the mob tool. Every mutation is on
//! disk before the call returns, since each command is a fresh process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::atomic::write_atomic;
use crate::error::{MobError, Result};

/// Session data structure stored in current.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub branch: String,
    pub repo_url: String,
    pub started_at: DateTime<Utc>,
    pub driver_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workstream_id: Option<String>,
}

/// Session store
///
/// Manages session persistence in <project>/.claude/mob/current.json.
pub struct SessionStore {
    session_path: PathBuf,
}

impl SessionStore {
    pub fn new(session_path: impl Into<PathBuf>) -> Self {
        Self {
            session_path: session_path.into(),
        }
    }

    /// Get the session file path
    #[allow(dead_code)]
    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    /// Start tracking a new rotation, replacing any existing session.
    pub fn begin(
        &self,
        branch: &str,
        repo_url: &str,
        driver_name: &str,
        workstream_id: Option<String>,
    ) -> Result<Session> {
        let session = Session {
            branch: branch.to_string(),
            repo_url: repo_url.to_string(),
            started_at: Utc::now(),
            driver_name: driver_name.to_string(),
            workstream_id,
        };
        self.save(&session)?;
        Ok(session)
    }

    /// Persist a session exactly as given.
    pub fn save(&self, session: &Session) -> Result<()> {
        let content = serde_json::to_string_pretty(session).map_err(|source| {
            MobError::CorruptState {
                path: self.session_path.clone(),
                source,
            }
        })?;

        write_atomic(&self.session_path, &content)
            .map_err(|e| MobError::persistence("write session file", &self.session_path, e))?;

        info!(
            "Session saved for {} on {}",
            session.driver_name, session.branch
        );
        debug!("Session saved to {:?}", self.session_path);

        Ok(())
    }

    /// Get the current session, if a rotation is in progress.
    pub fn current(&self) -> Result<Option<Session>> {
        let content = match std::fs::read_to_string(&self.session_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MobError::persistence(
                    "read session file",
                    &self.session_path,
                    e,
                ))
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| MobError::CorruptState {
                path: self.session_path.clone(),
                source,
            })
    }

    /// Remove the current session. Succeeds when there is none.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.session_path) {
            Ok(()) => {
                info!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MobError::persistence(
                "remove session file",
                &self.session_path,
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> SessionStore {
        SessionStore::new(dir.join(".claude/mob/current.json"))
    }

    #[test]
    fn test_no_session_is_absent() {
        let tmp = tempdir().unwrap();
        let store = store_in(tmp.path());
        assert!(store.current().unwrap().is_none());
    }

    #[test]
    fn test_begin_and_current() {
        let tmp = tempdir().unwrap();
        let store = store_in(tmp.path());

        let session = store
            .begin("feature-x", "git@example.com:team/app.git", "ada", None)
            .unwrap();
        assert!(store.session_path().exists());

        let loaded = store.current().unwrap().unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.branch, "feature-x");
        assert_eq!(loaded.driver_name, "ada");
    }

    #[test]
    fn test_file_format() {
        let tmp = tempdir().unwrap();
        let store = store_in(tmp.path());
        store
            .begin("feature-x", "repo", "ada", Some("ws-42".to_string()))
            .unwrap();

        let raw = std::fs::read_to_string(store.session_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["branch"], "feature-x");
        assert_eq!(value["repoUrl"], "repo");
        assert_eq!(value["driverName"], "ada");
        assert_eq!(value["workstreamId"], "ws-42");
        let started = value["startedAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(started).is_ok());
    }

    #[test]
    fn test_workstream_id_omitted_when_absent() {
        let tmp = tempdir().unwrap();
        let store = store_in(tmp.path());
        store.begin("main", "repo", "ada", None).unwrap();

        let raw = std::fs::read_to_string(store.session_path()).unwrap();
        assert!(!raw.contains("workstreamId"));
    }

    #[test]
    fn test_last_begin_wins() {
        let tmp = tempdir().unwrap();
        let store = store_in(tmp.path());
        store.begin("feature-x", "repo", "ada", None).unwrap();
        store.begin("feature-y", "repo", "grace", None).unwrap();

        let loaded = store.current().unwrap().unwrap();
        assert_eq!(loaded.branch, "feature-y");
        assert_eq!(loaded.driver_name, "grace");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let tmp = tempdir().unwrap();
        let store = store_in(tmp.path());
        store.begin("feature-x", "repo", "ada", None).unwrap();

        store.clear().unwrap();
        assert!(store.current().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_failed_save_keeps_previous_session() {
        let tmp = tempdir().unwrap();
        let store = store_in(tmp.path());
        store.begin("feature-x", "repo", "ada", None).unwrap();

        let mut tmp_name = store.session_path().as_os_str().to_os_string();
        tmp_name.push(".tmp");
        std::fs::create_dir(&tmp_name).unwrap();

        assert!(matches!(
            store.begin("feature-y", "repo", "grace", None),
            Err(MobError::Persistence { .. })
        ));
        let loaded = store.current().unwrap().unwrap();
        assert_eq!(loaded.branch, "feature-x");
        assert_eq!(loaded.driver_name, "ada");
    }

    #[test]
    fn test_save_leaves_only_session_file() {
        let tmp = tempdir().unwrap();
        let store = store_in(tmp.path());
        store.begin("feature-x", "repo", "ada", None).unwrap();
        store.begin("feature-y", "repo", "grace", None).unwrap();

        let names: Vec<_> = std::fs::read_dir(store.session_path().parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["current.json"]);
    }

    #[test]
    fn test_corrupt_session_is_an_error() {
        let tmp = tempdir().unwrap();
        let store = store_in(tmp.path());
        std::fs::create_dir_all(store.session_path().parent().unwrap()).unwrap();
        std::fs::write(store.session_path(), "{\"branch\": ").unwrap();

        assert!(matches!(
            store.current(),
            Err(MobError::CorruptState { .. })
        ));
    }
}
