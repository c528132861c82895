pub mod filesystem;
pub mod layout;

pub use filesystem::FileStore;
pub use layout::OutputLayout;
