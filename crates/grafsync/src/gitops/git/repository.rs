//! Git repository operations.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use tokio::process::Command as TokioCommand;
use tracing::debug;

use super::parse::{first_line, format_git_error};
use super::types::{CommitResult, StageMode};
use crate::gitops::error::{classify_git_error, GitOpsError, Result};

/// Handle on the work tree that contains the backup directory.
pub struct GitRepository {
    /// Any directory inside the work tree; git resolves the top level itself.
    repo_path: PathBuf,
}

impl GitRepository {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Checks that the path lies inside a git work tree.
    pub fn is_git_repo(&self) -> bool {
        self.run_git(&["rev-parse", "--is-inside-work-tree"])
            .map(|output| output.status.success() && first_line(&output) == "true")
            .unwrap_or(false)
    }

    /// Points `remote` at `url`, adding the remote when it does not exist yet.
    pub fn set_remote(&self, remote: &str, url: &str) -> Result<()> {
        self.ensure_repo()?;

        let remote_exists = self
            .run_git(&["remote", "get-url", remote])
            .map(|output| output.status.success())
            .unwrap_or(false);

        let output = if remote_exists {
            self.run_git(&["remote", "set-url", remote, url])?
        } else {
            self.run_git(&["remote", "add", remote, url])?
        };

        if output.status.success() {
            Ok(())
        } else {
            Err(classify_git_error(&format_git_error(&output)))
        }
    }

    /// Stages changes of the whole work tree.
    pub fn stage(&self, mode: StageMode) -> Result<()> {
        self.ensure_repo()?;

        let output = self.run_git(&mode.as_args())?;
        if output.status.success() {
            Ok(())
        } else {
            Err(classify_git_error(&format_git_error(&output)))
        }
    }

    /// Whether the index differs from `HEAD`.
    pub fn has_staged_changes(&self) -> Result<bool> {
        let output = self.run_git(&["diff", "--cached", "--quiet"])?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(classify_git_error(&format_git_error(&output))),
        }
    }

    /// Commits the index. Callers check [`Self::has_staged_changes`] first.
    pub fn commit(&self, message: &str) -> Result<CommitResult> {
        self.ensure_repo()?;

        let output = self.run_git(&["commit", "-m", message])?;
        if !output.status.success() {
            return Err(GitOpsError::GitOperation(format_git_error(&output)));
        }

        let hash_output = self.run_git(&["rev-parse", "--short", "HEAD"])?;
        Ok(CommitResult {
            commit_hash: first_line(&hash_output),
            summary: first_line(&output),
        })
    }

    /// Pushes `branch` to `remote`, killing git when it outlives `timeout`.
    pub async fn push(&self, remote: &str, branch: &str, timeout: Duration) -> Result<()> {
        self.ensure_repo()?;

        let mut cmd = TokioCommand::new("git");
        cmd.current_dir(&self.repo_path)
            .args(["push", remote, branch])
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(remote = %remote, branch = %branch, "Running git push");

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(result) => result.map_err(|e| GitOpsError::GitOperation(e.to_string()))?,
            Err(_) => return Err(GitOpsError::GitTimeout(timeout.as_secs())),
        };

        if output.status.success() {
            Ok(())
        } else {
            Err(classify_git_error(&format_git_error(&output)))
        }
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn ensure_repo(&self) -> Result<()> {
        if self.is_git_repo() {
            Ok(())
        } else {
            Err(GitOpsError::GitNotInitialized)
        }
    }

    /// Runs a git command in the repository directory.
    fn run_git(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new("git")
            .current_dir(&self.repo_path)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| GitOpsError::GitOperation(e.to_string()))?;

        Ok(output)
    }
}
