#[cfg(feature = "cli")]
pub mod cli;
pub mod map_config;
pub mod storage;

pub use map_config::MapConfig;
pub use storage::LocalStorage;
