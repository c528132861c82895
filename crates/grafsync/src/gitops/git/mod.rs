//! Git CLI operations on the backup working tree.

pub mod parse;
pub mod repository;
pub mod types;

pub use repository::GitRepository;
pub use types::*;
