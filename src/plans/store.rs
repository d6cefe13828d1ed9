//! Local plan documents and rotation summary records.

use chrono::Utc;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

use crate::atomic::write_atomic;
use crate::cli::ProjectLayout;
use crate::domain::RotationSummary;
use crate::error::{MobError, Result};

/// Filename layout for summary records, sortable by time.
const SUMMARY_FILE_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[/\\:]").expect("static pattern"))
}

/// Turn a branch name into something safe to use inside a filename.
pub fn sanitize_branch(branch: &str) -> String {
    separator_pattern().replace_all(branch, "-").into_owned()
}

/// Reads and writes plans and summaries under the project root.
#[derive(Debug, Clone)]
pub struct PlanStore {
    plans_dir: PathBuf,
    summaries_dir: PathBuf,
}

impl PlanStore {
    pub fn new(layout: &ProjectLayout) -> Self {
        Self {
            plans_dir: layout.plans_dir(),
            summaries_dir: layout.summaries_dir(),
        }
    }

    /// Path of the plan file for `branch`.
    pub fn plan_path(&self, branch: &str) -> PathBuf {
        self.plans_dir
            .join(format!("mob-{}.md", sanitize_branch(branch)))
    }

    /// Where a displaced local plan is kept after the remote copy won.
    pub fn displaced_plan_path(&self, branch: &str) -> PathBuf {
        self.plans_dir
            .join(format!("mob-{}.local.md", sanitize_branch(branch)))
    }

    /// Load the plan for `branch`. A missing file is `None`.
    pub fn load_plan(&self, branch: &str) -> Result<Option<String>> {
        let path = self.plan_path(branch);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MobError::persistence("read plan", path, e)),
        }
    }

    pub fn save_plan(&self, branch: &str, content: &str) -> Result<PathBuf> {
        let path = self.plan_path(branch);
        write_file(&path, content, "write plan")?;
        debug!("Plan saved to {:?}", path);
        Ok(path)
    }

    pub(crate) fn save_displaced_plan(&self, branch: &str, content: &str) -> Result<PathBuf> {
        let path = self.displaced_plan_path(branch);
        write_file(&path, content, "write displaced plan")?;
        Ok(path)
    }

    /// Create the templated plan used when neither copy exists.
    pub fn create_default_plan(&self, branch: &str) -> Result<PathBuf> {
        self.save_plan(branch, &default_plan(branch))
    }

    /// Append a rotation summary as its own file. Existing records are
    /// never overwritten.
    pub fn save_summary(&self, summary: &RotationSummary) -> Result<PathBuf> {
        fs::create_dir_all(&self.summaries_dir).map_err(|e| {
            MobError::persistence("create summaries directory", &self.summaries_dir, e)
        })?;

        let stem = summary.timestamp.format(SUMMARY_FILE_FORMAT).to_string();
        let mut path = self.summaries_dir.join(format!("{}.json", stem));
        let mut suffix = 1;
        while path.exists() {
            path = self.summaries_dir.join(format!("{}-{}.json", stem, suffix));
            suffix += 1;
        }

        let content = serde_json::to_string_pretty(summary).map_err(|source| {
            MobError::CorruptState {
                path: path.clone(),
                source,
            }
        })?;
        write_file(&path, &content, "write summary")?;
        debug!("Summary saved to {:?}", path);
        Ok(path)
    }

    /// All readable summaries, oldest first.
    pub fn list_summaries(&self) -> Result<Vec<(PathBuf, RotationSummary)>> {
        let entries = match fs::read_dir(&self.summaries_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(MobError::persistence(
                    "list summaries in",
                    &self.summaries_dir,
                    e,
                ))
            }
        };

        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    debug!("Skipping unreadable summary {:?}: {}", path, e);
                    continue;
                }
            };
            match serde_json::from_str::<RotationSummary>(&content) {
                Ok(summary) => summaries.push((path, summary)),
                Err(e) => debug!("Skipping malformed summary {:?}: {}", path, e),
            }
        }

        summaries.sort_by(|(a_path, a), (b_path, b)| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a_path.cmp(b_path))
        });
        Ok(summaries)
    }

    pub fn latest_summary(&self) -> Result<Option<RotationSummary>> {
        Ok(self.list_summaries()?.pop().map(|(_, summary)| summary))
    }
}

fn write_file(path: &Path, content: &str, action: &'static str) -> Result<()> {
    write_atomic(path, content).map_err(|e| MobError::persistence(action, path, e))
}

fn default_plan(branch: &str) -> String {
    format!(
        "# Mob Session: {branch}

## Goal
_Describe the goal of this mob session_

## Current Status
- [ ] Task 1
- [ ] Task 2

## Notes
_Add notes during the session_

## Decisions Made
_Document important decisions_

---
Created: {created}
",
        branch = branch,
        created = Utc::now().to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SummaryContent;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn store(root: &Path) -> PlanStore {
        PlanStore::new(&ProjectLayout::new(root))
    }

    fn summary_at(secs: i64, tldr: &str) -> RotationSummary {
        let mut summary = RotationSummary::new(
            SummaryContent::note_only(tldr),
            "ada",
            tldr,
            "feature-x",
        );
        summary.timestamp = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
            + Duration::seconds(secs);
        summary
    }

    #[test]
    fn test_sanitized_filename_has_no_separators() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());

        for branch in ["feature/auth", "team\\x", "a/b/c", "odd:name", "plain"] {
            let path = store.plan_path(branch);
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(!name.contains('/'), "{name}");
            assert!(!name.contains('\\'), "{name}");
            assert!(!name.contains(':'), "{name}");
            assert_eq!(path.parent().unwrap(), tmp.path().join(".claude/plans"));
            // Same branch always maps to the same file
            assert_eq!(store.plan_path(branch), path);
        }
        assert_eq!(
            store.plan_path("feature/auth").file_name().unwrap(),
            "mob-feature-auth.md"
        );
    }

    #[test]
    fn test_plan_load_missing_is_none() {
        let tmp = tempdir().unwrap();
        assert!(store(tmp.path()).load_plan("feature-x").unwrap().is_none());
    }

    #[test]
    fn test_plan_save_and_load() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());
        store.save_plan("feature/x", "# Plan\n").unwrap();
        assert_eq!(
            store.load_plan("feature/x").unwrap().as_deref(),
            Some("# Plan\n")
        );
    }

    #[test]
    fn test_interrupted_plan_write_keeps_previous_plan() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());
        let path = store.save_plan("feature-x", "A").unwrap();

        std::fs::create_dir(tmp.path().join(".claude/plans/mob-feature-x.md.tmp")).unwrap();
        assert!(matches!(
            store.save_plan("feature-x", "B"),
            Err(MobError::Persistence { .. })
        ));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "A");
    }

    #[test]
    fn test_default_plan_template() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());
        let path = store.create_default_plan("feature-x").unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("# Mob Session: feature-x"));
        assert!(content.contains("## Goal"));
        assert!(content.contains("Created: "));
    }

    #[test]
    fn test_summary_filename_and_ordering() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());

        let later = store.save_summary(&summary_at(30, "second")).unwrap();
        store.save_summary(&summary_at(0, "first")).unwrap();
        assert_eq!(later.file_name().unwrap(), "2026-10-16T09-00-30.json");

        let listed = store.list_summaries().unwrap();
        let tldrs: Vec<_> = listed.iter().map(|(_, s)| s.tldr.as_str()).collect();
        assert_eq!(tldrs, vec!["first", "second"]);
        assert_eq!(store.latest_summary().unwrap().unwrap().tldr, "second");
    }

    #[test]
    fn test_summary_never_overwrites() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());

        let first = store.save_summary(&summary_at(0, "one")).unwrap();
        let second = store.save_summary(&summary_at(0, "two")).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.list_summaries().unwrap().len(), 2);

        let raw = std::fs::read_to_string(&first).unwrap();
        assert!(raw.contains("\"tldr\": \"one\""));
    }

    #[test]
    fn test_summary_file_fields() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());
        let path = store.save_summary(&summary_at(0, "note")).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        for field in [
            "timestamp",
            "driverName",
            "driverNote",
            "tldr",
            "changes",
            "nextSteps",
            "branch",
        ] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
    }

    #[test]
    fn test_no_summaries() {
        let tmp = tempdir().unwrap();
        let store = store(tmp.path());
        assert!(store.list_summaries().unwrap().is_empty());
        assert!(store.latest_summary().unwrap().is_none());
    }
}
