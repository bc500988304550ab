use crate::config::map_config::MapConfig;
use crate::core::ingest::fetch_site_records;
use crate::core::markers::MarkerBuilder;
use crate::core::projection::GridTransform;
use crate::domain::model::{ProjectionOutcome, SiteRecord};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::render::geojson::feature_collection;
use crate::render::report::rejections_csv;
use crate::render::{MapDocument, SearchIndex};
use crate::utils::error::Result;
use reqwest::Client;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const GEOJSON_FILENAME: &str = "markers.geojson";
pub const DOCUMENT_FILENAME: &str = "map.json";
pub const SEARCH_INDEX_FILENAME: &str = "search_index.json";
pub const REJECTIONS_FILENAME: &str = "rejections.csv";

/// Fetches the site dataset, projects every row and writes the map payloads.
///
/// Holds everything one run needs (configuration, HTTP client, grid
/// transform, storage) so nothing lives in globals.
pub struct MarkerPipeline<S: Storage> {
    storage: S,
    config: MapConfig,
    client: Client,
    transform: GridTransform,
}

impl<S: Storage> MarkerPipeline<S> {
    pub fn new(storage: S, config: MapConfig) -> Self {
        let transform = GridTransform::from_settings(config.projection.apply_datum_shift);
        Self {
            storage,
            config,
            client: Client::new(),
            transform,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Output files in the order they are written or bundled.
    fn render_outputs(&self, outcome: &ProjectionOutcome) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let document = MapDocument::build(
            &self.config.map,
            &self.config.icon,
            &self.config.search,
            outcome,
            chrono::Utc::now(),
        );
        let search_index =
            SearchIndex::from_markers(&self.config.search.property_name, &outcome.markers);

        Ok(vec![
            (
                GEOJSON_FILENAME,
                serde_json::to_vec_pretty(&feature_collection(&outcome.markers))?,
            ),
            (DOCUMENT_FILENAME, serde_json::to_vec_pretty(&document)?),
            (SEARCH_INDEX_FILENAME, serde_json::to_vec_pretty(&search_index)?),
            (REJECTIONS_FILENAME, rejections_csv(&outcome.rejections)?),
        ])
    }
}

fn bundle(files: &[(&str, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file(*name, SimpleFileOptions::default())?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for MarkerPipeline<S> {
    async fn extract(&self) -> Result<Vec<SiteRecord>> {
        tracing::info!("🚀 Fetching site dataset from: {}", self.config.source_url());

        let records = fetch_site_records(
            &self.client,
            self.config.source_url(),
            self.config.request_timeout(),
            &self.config.columns,
        )
        .await?;

        tracing::info!("📊 Extracted {} site records", records.len());
        Ok(records)
    }

    async fn transform(&self, records: Vec<SiteRecord>) -> Result<ProjectionOutcome> {
        tracing::info!(
            "🔧 Projecting {} records (datum shift: {})",
            records.len(),
            if self.transform.applies_datum_shift() {
                "OSGB36 → WGS84"
            } else {
                "off"
            }
        );

        let outcome = MarkerBuilder::new(&self.config.columns, &self.transform).project_all(&records);

        if outcome.rejections.is_empty() {
            tracing::info!("✅ All {} records projected", outcome.markers.len());
        } else {
            tracing::warn!(
                "⚠️ {} of {} records rejected, see {}",
                outcome.rejections.len(),
                outcome.total(),
                REJECTIONS_FILENAME
            );
        }
        Ok(outcome)
    }

    /// Everything is rendered before the first write, so a serialization
    /// failure writes nothing. The loose-file writes are not atomic: a storage
    /// error partway through leaves the files written so far in place. Use
    /// `load.bundle` when a single all-or-nothing artifact is needed.
    async fn load(&self, outcome: ProjectionOutcome) -> Result<String> {
        tracing::info!("💾 Writing map output for {} markers", outcome.markers.len());
        let files = self.render_outputs(&outcome)?;

        if self.config.bundle_output() {
            let filename = &self.config.load.bundle_filename;
            let zip_data = bundle(&files)?;
            tracing::debug!("Writing {} ({} bytes)", filename, zip_data.len());
            self.storage.write_file(filename, &zip_data).await?;

            let output_path = format!("{}/{}", self.config.output_path(), filename);
            tracing::info!("📦 Map bundle saved: {}", output_path);
            return Ok(output_path);
        }

        for (written, (name, data)) in files.iter().enumerate() {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            if let Err(e) = self.storage.write_file(name, data).await {
                tracing::error!(
                    "❌ Writing {} failed after {} of {} files: {}",
                    name,
                    written,
                    files.len(),
                    e
                );
                return Err(e);
            }
        }

        tracing::info!("📁 Map files saved under: {}", self.config.output_path());
        Ok(self.config.output_path().to_string())
    }
}
