use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub markers: usize,
    pub rejected: usize,
}

/// Runs a pipeline once: extract, then transform, then load.
pub struct MapEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> MapEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting map build");
        self.monitor.log_phase("Start");

        let records = self.pipeline.extract().await?;
        self.monitor.log_phase("Extract");

        let outcome = self.pipeline.transform(records).await?;
        let (markers, rejected) = (outcome.markers.len(), outcome.rejections.len());
        tracing::info!("Projected {} markers, rejected {} rows", markers, rejected);
        self.monitor.log_phase("Transform");

        let output_path = self.pipeline.load(outcome).await?;
        self.monitor.log_phase("Load");
        self.monitor.log_final();

        Ok(RunSummary {
            output_path,
            markers,
            rejected,
        })
    }
}
