use crate::config::map_config::ColumnMapping;
use crate::core::projection::GridTransform;
use crate::domain::model::{
    ConversionDefect, GridPosition, ProjectedMarker, ProjectionOutcome, RecordRejection,
    SiteRecord,
};

/// Popup description line, e.g. `Cross-slab: Aberlemno 1`.
pub fn describe(site_type: &str, name: &str) -> String {
    format!("{}: {}", site_type, name)
}

/// Turns site records into markers using one column mapping and one grid transform.
pub struct MarkerBuilder<'a> {
    columns: &'a ColumnMapping,
    transform: &'a GridTransform,
}

impl<'a> MarkerBuilder<'a> {
    pub fn new(columns: &'a ColumnMapping, transform: &'a GridTransform) -> Self {
        Self { columns, transform }
    }

    pub fn build(&self, record: &SiteRecord) -> Result<ProjectedMarker, ConversionDefect> {
        let easting = parse_coordinate(record, &self.columns.easting)?;
        let northing = parse_coordinate(record, &self.columns.northing)?;

        let position = self
            .transform
            .to_geographic(GridPosition::new(easting, northing));
        if !position.is_finite() {
            return Err(ConversionDefect::OutOfDomain { easting, northing });
        }

        let name = text_field(record, &self.columns.name);
        let site_type = text_field(record, &self.columns.site_type);

        Ok(ProjectedMarker {
            description: describe(&site_type, &name),
            url: text_field(record, &self.columns.url),
            name,
            position,
        })
    }

    /// Single pass in input order. Bad rows are collected, never fatal.
    pub fn project_all(&self, records: &[SiteRecord]) -> ProjectionOutcome {
        let mut outcome = ProjectionOutcome::default();

        for record in records {
            match self.build(record) {
                Ok(marker) => outcome.markers.push(marker),
                Err(defect) => {
                    let name = text_field(record, &self.columns.name);
                    tracing::warn!("⚠️ Skipping line {} ({}): {}", record.line, name, defect);
                    outcome.rejections.push(RecordRejection {
                        line: record.line,
                        name,
                        defect,
                    });
                }
            }
        }

        outcome
    }
}

fn parse_coordinate(record: &SiteRecord, column: &str) -> Result<f64, ConversionDefect> {
    let raw = record
        .get(column)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConversionDefect::MissingField {
            column: column.to_string(),
        })?;

    let value: f64 = raw.parse().map_err(|_| ConversionDefect::NotNumeric {
        column: column.to_string(),
        value: raw.to_string(),
    })?;

    if !value.is_finite() {
        return Err(ConversionDefect::NonFinite {
            column: column.to_string(),
            value: raw.to_string(),
        });
    }

    Ok(value)
}

fn text_field(record: &SiteRecord, column: &str) -> String {
    record.get(column).unwrap_or_default().to_string()
}
