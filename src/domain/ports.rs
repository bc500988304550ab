use crate::domain::model::{ProjectionOutcome, SiteRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
    fn bundle_output(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SiteRecord>>;
    async fn transform(&self, records: Vec<SiteRecord>) -> Result<ProjectionOutcome>;
    async fn load(&self, outcome: ProjectionOutcome) -> Result<String>;
}
