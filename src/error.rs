//! Error taxonomy for rotation commands.
//!
//! Only a few of these abort a command: a missing mob tool, a missing
//! session where one is mandatory, and session persistence failures.
//! Everything else is downgraded to a warning by the orchestrator.

use std::path::PathBuf;

use thiserror::Error;

use crate::exec::ExecError;

#[derive(Debug, Error)]
pub enum MobError {
    #[error("mob is not installed or not in PATH. Install from: https://mob.sh")]
    MobNotInstalled,

    #[error("no active mob session. Run 'mob-relay start' first")]
    NoActiveSession,

    #[error("failed to {action} {}: {source}", path.display())]
    Persistence {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} contains invalid JSON: {source}", path.display())]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("mob {command} failed: {source}")]
    Mob {
        command: &'static str,
        #[source]
        source: ExecError,
    },

    #[error("could not determine current branch: {0}")]
    UnknownBranch(String),
}

impl MobError {
    pub(crate) fn persistence(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        MobError::Persistence {
            action,
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts a command before any state is touched.
    pub fn is_hard_precondition(&self) -> bool {
        matches!(self, MobError::MobNotInstalled | MobError::NoActiveSession)
    }
}

pub type Result<T> = std::result::Result<T, MobError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        assert!(MobError::MobNotInstalled.is_hard_precondition());
        assert!(MobError::NoActiveSession.is_hard_precondition());

        let err = MobError::persistence(
            "write session file",
            "/tmp/current.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_hard_precondition());
        assert_eq!(
            err.to_string(),
            "failed to write session file /tmp/current.json: denied"
        );
    }

    #[test]
    fn test_no_session_message_names_start() {
        assert!(MobError::NoActiveSession
            .to_string()
            .contains("mob-relay start"));
    }
}
