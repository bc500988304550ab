use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// One raw row of the site dataset, keyed by header column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    /// 1-based line in the source file, header included
    pub line: u64,
    pub fields: HashMap<String, String>,
}

impl SiteRecord {
    pub fn new(line: u64, fields: HashMap<String, String>) -> Self {
        Self { line, fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

/// WGS84 geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Planar National Grid coordinates in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPosition {
    pub easting: f64,
    pub northing: f64,
}

impl GridPosition {
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }
}

/// A site that survived validation and projection, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedMarker {
    pub name: String,
    pub description: String,
    pub url: String,
    pub position: GeoPosition,
}

/// Why a single row could not become a marker. Never aborts the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionDefect {
    #[error("column '{column}' is missing or empty")]
    MissingField { column: String },

    #[error("column '{column}' is not a number: '{value}'")]
    NotNumeric { column: String, value: String },

    #[error("column '{column}' is not finite: '{value}'")]
    NonFinite { column: String, value: String },

    #[error("grid position ({easting}, {northing}) does not project to a finite position")]
    OutOfDomain { easting: f64, northing: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordRejection {
    pub line: u64,
    pub name: String,
    pub defect: ConversionDefect,
}

/// Result of projecting a batch: accepted markers and rejected rows, both in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionOutcome {
    pub markers: Vec<ProjectedMarker>,
    pub rejections: Vec<RecordRejection>,
}

impl ProjectionOutcome {
    pub fn total(&self) -> usize {
        self.markers.len() + self.rejections.len()
    }
}
