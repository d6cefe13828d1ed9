//! Start-of-session plan reconciliation.
//!
//! There is no version vector for plans, so the decision is purely
//! structural: which copies exist and whether they are equal. When both
//! exist and differ the remote copy wins, and the displaced local copy is
//! kept next to the plan so the conflict is visible.

use std::path::PathBuf;
use tracing::{info, warn};

use super::store::PlanStore;
use crate::error::Result;

/// What the dashboard said about the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemotePlan {
    Present(String),
    Absent,
    /// The fetch failed; treated exactly like `Absent`.
    Unreachable(String),
}

impl RemotePlan {
    /// Normalize a fetch result; an empty plan counts as absent.
    pub fn from_fetch<E: std::fmt::Display>(
        fetched: std::result::Result<Option<String>, E>,
    ) -> Self {
        match fetched {
            Ok(Some(text)) if !text.is_empty() => RemotePlan::Present(text),
            Ok(_) => RemotePlan::Absent,
            Err(e) => RemotePlan::Unreachable(e.to_string()),
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            RemotePlan::Present(text) => Some(text),
            RemotePlan::Absent | RemotePlan::Unreachable(_) => None,
        }
    }
}

/// The action the reconciliation table selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    CreateDefault,
    AdoptRemote,
    KeepLocal,
    InSync,
    OverwriteLocal,
}

/// Pick the action for a local/remote pair. Empty copies count as absent.
pub fn decide(local: Option<&str>, remote: Option<&str>) -> PlanAction {
    let local = local.filter(|text| !text.is_empty());
    let remote = remote.filter(|text| !text.is_empty());
    match (local, remote) {
        (None, None) => PlanAction::CreateDefault,
        (None, Some(_)) => PlanAction::AdoptRemote,
        (Some(_), None) => PlanAction::KeepLocal,
        (Some(l), Some(r)) if l == r => PlanAction::InSync,
        (Some(_), Some(_)) => PlanAction::OverwriteLocal,
    }
}

/// Result of reconciling, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub action: PlanAction,
    pub plan_path: PathBuf,
    /// Set when a differing local plan was replaced by the remote one.
    pub displaced_local: Option<PathBuf>,
    /// Warnings raised along the way (unreachable remote, conflicts).
    pub warnings: Vec<String>,
}

/// Make the local plan for `branch` authoritative per the table above.
///
/// Never writes to the remote side.
pub fn reconcile(store: &PlanStore, branch: &str, remote: &RemotePlan) -> Result<Reconciliation> {
    let mut warnings = Vec::new();
    if let RemotePlan::Unreachable(reason) = remote {
        let message = format!("could not fetch plan from dashboard: {}", reason);
        warn!("{}", message);
        warnings.push(message);
    }

    let local = store.load_plan(branch)?;
    let action = decide(local.as_deref(), remote.text());
    let plan_path = store.plan_path(branch);
    let mut displaced_local = None;

    match action {
        PlanAction::CreateDefault => {
            store.create_default_plan(branch)?;
            info!("Created new plan for branch {} at {:?}", branch, plan_path);
        }
        PlanAction::AdoptRemote => {
            if let Some(text) = remote.text() {
                store.save_plan(branch, text)?;
            }
            info!("Synced plan from dashboard");
        }
        PlanAction::KeepLocal => {
            info!("Using existing plan: {:?}", plan_path);
        }
        PlanAction::InSync => {
            info!("Plan already in sync with dashboard");
        }
        PlanAction::OverwriteLocal => {
            if let (Some(local_text), Some(remote_text)) = (local.as_deref(), remote.text()) {
                let backup = store.save_displaced_plan(branch, local_text)?;
                store.save_plan(branch, remote_text)?;
                let message = format!(
                    "local plan differed from dashboard; dashboard copy adopted at {}, previous local copy kept at {}",
                    plan_path.display(),
                    backup.display()
                );
                warn!("{}", message);
                warnings.push(message);
                displaced_local = Some(backup);
            }
        }
    }

    Ok(Reconciliation {
        action,
        plan_path,
        displaced_local,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ProjectLayout;
    use tempfile::tempdir;

    fn store(root: &std::path::Path) -> PlanStore {
        PlanStore::new(&ProjectLayout::new(root))
    }

    #[test]
    fn test_decision_table() {
        assert_eq!(decide(None, None), PlanAction::CreateDefault);
        assert_eq!(decide(None, Some("R")), PlanAction::AdoptRemote);
        assert_eq!(decide(Some("L"), None), PlanAction::KeepLocal);
        assert_eq!(decide(Some("A"), Some("A")), PlanAction::InSync);
        assert_eq!(decide(Some("A"), Some("B")), PlanAction::OverwriteLocal);
        assert_eq!(decide(Some(""), Some("")), PlanAction::CreateDefault);
        assert_eq!(decide(Some(""), Some("R")), PlanAction::AdoptRemote);
    }

    #[test]
    fn test_remote_plan_from_fetch() {
        assert_eq!(
            RemotePlan::from_fetch::<String>(Ok(Some("x".into()))),
            RemotePlan::Present("x".into())
        );
        assert_eq!(
            RemotePlan::from_fetch::<String>(Ok(Some(String::new()))),
            RemotePlan::Absent
        );
        assert_eq!(RemotePlan::from_fetch::<String>(Ok(None)), RemotePlan::Absent);
        assert_eq!(
            RemotePlan::from_fetch::<String>(Err("timeout".into())),
            RemotePlan::Unreachable("timeout".into())
        );
    }

    #[test]
    fn test_cold_start_creates_template() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());

        let outcome = reconcile(&store, "feature-x", &RemotePlan::Absent).unwrap();
        assert_eq!(outcome.action, PlanAction::CreateDefault);
        let plan = store.load_plan("feature-x").unwrap().unwrap();
        assert!(plan.contains("# Mob Session: feature-x"));
    }

    #[test]
    fn test_remote_wins_and_local_is_kept_aside() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());
        store.save_plan("feature-x", "A").unwrap();

        let outcome =
            reconcile(&store, "feature-x", &RemotePlan::Present("B".into())).unwrap();
        assert_eq!(outcome.action, PlanAction::OverwriteLocal);
        assert_eq!(store.load_plan("feature-x").unwrap().as_deref(), Some("B"));

        let backup = outcome.displaced_local.unwrap();
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "A");
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_unreachable_keeps_local() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());
        store.save_plan("feature-x", "A").unwrap();

        let outcome = reconcile(
            &store,
            "feature-x",
            &RemotePlan::Unreachable("connection refused".into()),
        )
        .unwrap();
        assert_eq!(outcome.action, PlanAction::KeepLocal);
        assert_eq!(store.load_plan("feature-x").unwrap().as_deref(), Some("A"));
        assert!(outcome.warnings[0].contains("connection refused"));
    }

    #[test]
    fn test_reconcile_twice_is_idempotent() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());
        store.save_plan("feature-x", "A").unwrap();
        let remote = RemotePlan::Present("B".into());

        reconcile(&store, "feature-x", &remote).unwrap();
        let path = store.plan_path("feature-x");
        let first = std::fs::read(&path).unwrap();

        let second = reconcile(&store, "feature-x", &remote).unwrap();
        assert_eq!(second.action, PlanAction::InSync);
        assert!(second.displaced_local.is_none());
        assert_eq!(std::fs::read(&path).unwrap(), first);
    }
}
