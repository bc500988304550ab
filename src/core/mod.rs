pub mod engine;
pub mod ingest;
pub mod markers;
pub mod pipeline;
pub mod projection;

pub use crate::domain::model::{ProjectedMarker, ProjectionOutcome, SiteRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
