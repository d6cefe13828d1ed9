//! The mob session tool and the git queries around it.

use std::sync::Arc;
use tracing::debug;

use crate::error::{MobError, Result};
use crate::exec::{ExecError, Invocation, ProcessRunner};

const MOB_PROGRAM: &str = "mob";
const GIT_PROGRAM: &str = "git";

/// Bases tried, in order, when diffing the rotation's work.
pub const BASE_CANDIDATES: &[&str] = &["origin/main", "origin/master", "main", "master"];

const MOB_BRANCH_PREFIX: &str = "mob/";
const WIP_SUFFIX: &str = "-wip";

/// Logical branch name for a mob branch: "mob/feature-auth" and
/// "feature-auth-wip" both become "feature-auth".
pub fn base_branch_of(branch: &str) -> String {
    let branch = branch.strip_prefix(MOB_BRANCH_PREFIX).unwrap_or(branch);
    branch.strip_suffix(WIP_SUFFIX).unwrap_or(branch).to_string()
}

/// Wraps `mob` and the git plumbing needed around a rotation.
#[derive(Clone)]
pub struct MobTool {
    runner: Arc<dyn ProcessRunner>,
}

impl MobTool {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    async fn mob_passthrough(&self, command: &'static str, args: Vec<String>) -> Result<()> {
        let invocation = Invocation::new(MOB_PROGRAM, args);
        self.runner
            .passthrough(&invocation)
            .await
            .map_err(|source| MobError::Mob { command, source })
    }

    async fn git(&self, args: &[&str]) -> std::result::Result<String, ExecError> {
        self.runner
            .capture(&Invocation::new(GIT_PROGRAM, args.iter().copied()))
            .await
    }

    /// Fails with `MobNotInstalled` if `mob version` cannot run.
    pub async fn check_installed(&self) -> Result<()> {
        self.runner
            .capture(&Invocation::new(MOB_PROGRAM, ["version"]))
            .await
            .map(|_| ())
            .map_err(|e| {
                debug!("mob version failed: {}", e);
                MobError::MobNotInstalled
            })
    }

    pub async fn start(&self, branch: Option<&str>, extra: &[String]) -> Result<()> {
        let mut args = vec!["start".to_string()];
        if let Some(branch) = branch {
            args.push("--branch".to_string());
            args.push(branch.to_string());
        }
        args.extend(extra.iter().cloned());
        self.mob_passthrough("start", args).await
    }

    pub async fn next(&self, extra: &[String]) -> Result<()> {
        let mut args = vec!["next".to_string()];
        args.extend(extra.iter().cloned());
        self.mob_passthrough("next", args).await
    }

    pub async fn done(&self, extra: &[String]) -> Result<()> {
        let mut args = vec!["done".to_string()];
        args.extend(extra.iter().cloned());
        self.mob_passthrough("done", args).await
    }

    /// Captured `mob status` output.
    pub async fn status(&self) -> Result<String> {
        self.runner
            .capture(&Invocation::new(MOB_PROGRAM, ["status"]))
            .await
            .map_err(|source| MobError::Mob {
                command: "status",
                source,
            })
    }

    pub async fn current_branch(&self) -> Result<String> {
        let branch = self
            .git(&["branch", "--show-current"])
            .await
            .map_err(|e| MobError::UnknownBranch(e.to_string()))?;
        let branch = branch.trim();
        if branch.is_empty() {
            return Err(MobError::UnknownBranch("detached HEAD".to_string()));
        }
        Ok(branch.to_string())
    }

    pub async fn base_branch(&self) -> Result<String> {
        Ok(base_branch_of(&self.current_branch().await?))
    }

    pub async fn repo_url(&self) -> std::result::Result<String, ExecError> {
        Ok(self
            .git(&["remote", "get-url", "origin"])
            .await?
            .trim()
            .to_string())
    }

    /// git's configured user name, if any.
    pub async fn user_name(&self) -> Option<String> {
        self.git(&["config", "--get", "user.name"])
            .await
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    /// Staged and unstaged changes against HEAD, or the working tree diff
    /// in a repository without commits.
    pub async fn diff_since_last_commit(&self) -> std::result::Result<String, ExecError> {
        match self.git(&["diff", "HEAD"]).await {
            Ok(diff) => Ok(diff),
            Err(e) => {
                debug!("git diff HEAD failed, retrying without HEAD: {}", e);
                self.git(&["diff"]).await
            }
        }
    }

    /// Diff against the merge base of the first resolvable base branch.
    pub async fn diff_from_base(&self) -> std::result::Result<String, ExecError> {
        for base in BASE_CANDIDATES {
            let merge_base = match self.git(&["merge-base", base, "HEAD"]).await {
                Ok(out) => out.trim().to_string(),
                Err(_) => continue,
            };
            if merge_base.is_empty() {
                continue;
            }
            match self.git(&["diff", &merge_base]).await {
                Ok(diff) => {
                    debug!("Diffing against {} ({})", base, merge_base);
                    return Ok(diff);
                }
                Err(_) => continue,
            }
        }
        self.diff_since_last_commit().await
    }

    pub async fn recent_commits(&self, count: usize) -> std::result::Result<String, ExecError> {
        let count = format!("-{}", count);
        self.git(&["log", &count, "--oneline"]).await
    }
}
