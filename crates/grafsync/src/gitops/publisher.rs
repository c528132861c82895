use std::path::PathBuf;

use tracing::{info, warn};

use super::error::{GitOpsError, Result};
use super::git::{GitRepository, PublishOutcome, StageMode};
use crate::config::RemoteSettings;
use crate::sanitize::redact_repo_url;

/// Stages the exported tree, commits it and pushes it to the backup remote.
pub struct RemotePublisher {
    repo: GitRepository,
    settings: RemoteSettings,
}

impl RemotePublisher {
    pub fn new(repo_dir: impl Into<PathBuf>, settings: RemoteSettings) -> Self {
        Self {
            repo: GitRepository::new(repo_dir),
            settings,
        }
    }

    /// Publishes with the configured commit message.
    pub async fn publish(&self) -> Result<PublishOutcome> {
        self.publish_with_message(&self.settings.message).await
    }

    /// Stages, commits with `message` and pushes.
    ///
    /// Nothing staged is not an error: no commit is made and nothing is pushed.
    pub async fn publish_with_message(&self, message: &str) -> Result<PublishOutcome> {
        if !self.repo.is_git_repo() {
            warn!(
                path = %self.repo.repo_path().display(),
                "Backup directory is not inside a git work tree"
            );
            return Err(GitOpsError::GitNotInitialized);
        }

        if let Some(url) = &self.settings.url {
            info!(remote = %self.settings.remote, url = %redact_repo_url(url), "Configuring remote");
            self.repo.set_remote(&self.settings.remote, url)?;
        }

        let mode = if self.settings.stage_untracked {
            StageMode::All
        } else {
            StageMode::TrackedOnly
        };
        self.repo.stage(mode)?;

        if !self.repo.has_staged_changes()? {
            info!("Nothing to commit");
            return Ok(PublishOutcome::NothingToCommit);
        }

        let commit = self.repo.commit(message)?;
        info!(commit = %commit.commit_hash, summary = %commit.summary, "Committed backup");

        self.repo
            .push(
                &self.settings.remote,
                &self.settings.branch,
                self.settings.push_timeout,
            )
            .await?;
        info!(
            remote = %self.settings.remote,
            branch = %self.settings.branch,
            commit = %commit.commit_hash,
            "Pushed backup"
        );

        Ok(PublishOutcome::Pushed {
            commit: commit.commit_hash,
        })
    }
}
