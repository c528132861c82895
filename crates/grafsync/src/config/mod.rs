pub mod settings;
pub mod store;

pub use settings::{
    ArtifactLayout, Credentials, RemoteSettings, RequestTimeouts, SettingsOverrides, SyncSettings,
    DEFAULT_API_PORT, DEFAULT_CONCURRENCY,
};
pub use store::{
    ConfigStore, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, DEFAULT_SECTION, TIMEOUTS_SECTION,
};
