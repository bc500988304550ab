pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::config::{LocalStorage, MapConfig};
pub use crate::core::{
    engine::{MapEngine, RunSummary},
    pipeline::MarkerPipeline,
    projection::GridTransform,
};
pub use crate::domain::model::{GeoPosition, GridPosition, ProjectedMarker, SiteRecord};
pub use crate::utils::error::{MapError, Result};
