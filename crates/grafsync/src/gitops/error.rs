//! Version-control error types.

use thiserror::Error;

/// Errors raised while staging, committing or pushing the backup tree.
#[derive(Error, Debug)]
pub enum GitOpsError {
    #[error("Git operation failed: {0}")]
    GitOperation(String),

    #[error("Git network error: {0}")]
    GitNetworkError(String),

    #[error("Git push timed out after {0}s")]
    GitTimeout(u64),

    #[error("Git repository not initialized")]
    GitNotInitialized,

    #[error("Git authentication failed: {0}")]
    GitAuthFailed(String),
}

impl GitOpsError {
    /// Returns true if the error is likely transient and the next run may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GitOpsError::GitNetworkError(_) | GitOpsError::GitTimeout(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GitOpsError::GitNotInitialized => "GitNotInitialized",
            GitOpsError::GitNetworkError(_) => "GitNetworkError",
            GitOpsError::GitTimeout(_) => "GitTimeout",
            GitOpsError::GitAuthFailed(_) => "GitAuthFailed",
            GitOpsError::GitOperation(_) => "VcsError",
        }
    }
}

/// Maps git stderr onto the matching error variant.
pub fn classify_git_error(stderr: &str) -> GitOpsError {
    let lower = stderr.to_lowercase();
    let trimmed = stderr.trim().to_string();

    if lower.contains("not a git repository") {
        return GitOpsError::GitNotInitialized;
    }

    if lower.contains("could not resolve host")
        || lower.contains("connection refused")
        || lower.contains("connection timed out")
        || lower.contains("network is unreachable")
        || lower.contains("unable to access")
        || lower.contains("failed to connect")
        || lower.contains("couldn't connect to server")
        || lower.contains("the remote end hung up unexpectedly")
    {
        return GitOpsError::GitNetworkError(trimmed);
    }

    if lower.contains("authentication failed")
        || lower.contains("permission denied")
        || lower.contains("invalid credentials")
        || lower.contains("could not read username")
    {
        return GitOpsError::GitAuthFailed(trimmed);
    }

    GitOpsError::GitOperation(trimmed)
}

pub type Result<T> = std::result::Result<T, GitOpsError>;
