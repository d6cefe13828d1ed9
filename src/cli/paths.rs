use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Plan documents, one per branch.
pub const PLANS_DIR: &str = ".claude/plans";
/// Session, config and rotation summaries.
pub const MOB_DIR: &str = ".claude/mob";

const CONFIG_FILE: &str = "config.json";
const SESSION_FILE: &str = "current.json";
const SUMMARIES_DIR: &str = "summaries";

/// Find the git root directory by searching upward from current directory.
pub fn find_git_root() -> Option<PathBuf> {
    let current = std::env::current_dir().ok()?;
    let mut path = current.as_path();

    loop {
        if path.join(".git").exists() {
            return Some(path.to_path_buf());
        }
        path = path.parent()?;
    }
}

/// Resolve the project root the local state lives under.
pub fn resolve_project_root(project_root: Option<String>) -> Result<PathBuf> {
    if let Some(path) = project_root {
        return PathBuf::from(&path)
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize provided project root: {}", path));
    }
    match find_git_root() {
        Some(root) => Ok(root),
        None => std::env::current_dir().context("Failed to get current directory"),
    }
}

/// On-disk locations of everything mob-relay persists for a project.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn plans_dir(&self) -> PathBuf {
        self.root.join(PLANS_DIR)
    }

    pub fn mob_dir(&self) -> PathBuf {
        self.root.join(MOB_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.mob_dir().join(CONFIG_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.mob_dir().join(SESSION_FILE)
    }

    pub fn summaries_dir(&self) -> PathBuf {
        self.mob_dir().join(SUMMARIES_DIR)
    }
}
