//! Publishing the exported tree to the backup repository.

pub mod error;
pub mod git;
pub mod publisher;

pub use error::{classify_git_error, GitOpsError};
pub use git::{CommitResult, GitRepository, PublishOutcome, StageMode};
pub use publisher::RemotePublisher;
