//! Pure data types for git operations.

use serde::Serialize;

/// How the working tree is staged before committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMode {
    /// `git add --update`: modified and deleted tracked files only.
    TrackedOnly,
    /// `git add --all`: new files as well.
    All,
}

impl StageMode {
    pub(crate) fn as_args(&self) -> [&'static str; 2] {
        match self {
            StageMode::TrackedOnly => ["add", "--update"],
            StageMode::All => ["add", "--all"],
        }
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitResult {
    /// Abbreviated hash of the new commit.
    pub commit_hash: String,
    /// Summary line printed by git.
    pub summary: String,
}

/// What publishing did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    Pushed { commit: String },
    NothingToCommit,
}
