use crate::domain::ports::ConfigProvider;
use crate::render::icon::MAX_ICON_SIZE;
use crate::render::{IconStyle, MapView, SearchOptions};
use crate::utils::error::{MapError, Result};
use crate::utils::validation::{self, Validate, SOURCE_SCHEMES};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/mommo1/username.github.io/main/pictish_stones.csv";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub source: SourceConfig,
    pub columns: ColumnMapping,
    pub projection: ProjectionConfig,
    pub map: MapView,
    pub icon: IconStyle,
    pub search: SearchOptions,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SOURCE_URL.to_string(),
            timeout_seconds: None,
        }
    }
}

/// Header names of the columns the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub easting: String,
    pub northing: String,
    pub name: String,
    pub site_type: String,
    pub url: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            easting: "SITE EASTING".to_string(),
            northing: "SITE NORTHING".to_string(),
            name: "SITE NAME".to_string(),
            site_type: "SITE TYPE".to_string(),
            url: "URL".to_string(),
        }
    }
}

impl ColumnMapping {
    pub fn required(&self) -> [&str; 5] {
        [
            &self.easting,
            &self.northing,
            &self.name,
            &self.site_type,
            &self.url,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Shift OSGB36 results onto WGS84. Off leaves positions on the grid's own datum.
    pub apply_datum_shift: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            apply_datum_shift: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub bundle: bool,
    pub bundle_filename: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            bundle: false,
            bundle_filename: "stone_map.zip".to_string(),
        }
    }
}

impl MapConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，`${VAR}` 以環境變數替換
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| MapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

/// Unset variables are left as written.
fn substitute_env_vars(content: &str) -> String {
    env_var_pattern()
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

impl ConfigProvider for MapConfig {
    fn source_url(&self) -> &str {
        &self.source.endpoint
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn bundle_output(&self) -> bool {
        self.load.bundle
    }
}

impl Validate for MapConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint, SOURCE_SCHEMES)?;
        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout, 1)?;
        }

        for (field, column) in [
            ("columns.easting", &self.columns.easting),
            ("columns.northing", &self.columns.northing),
            ("columns.name", &self.columns.name),
            ("columns.site_type", &self.columns.site_type),
            ("columns.url", &self.columns.url),
        ] {
            validation::validate_non_empty_string(field, column)?;
        }

        validation::validate_range("map.center[0]", self.map.center[0], -90.0, 90.0)?;
        validation::validate_range("map.center[1]", self.map.center[1], -180.0, 180.0)?;
        validation::validate_range("map.zoom", self.map.zoom, 0, 22)?;
        validation::validate_range("search.zoom", self.search.zoom, 0, 22)?;
        validation::validate_non_empty_string("search.property_name", &self.search.property_name)?;

        if self.map.layers.is_empty() {
            return Err(MapError::MissingConfigError {
                field: "map.layers".to_string(),
            });
        }
        let defaults = self.map.layers.iter().filter(|l| l.default).count();
        if defaults > 1 {
            return Err(MapError::InvalidConfigValueError {
                field: "map.layers".to_string(),
                value: defaults.to_string(),
                reason: "At most one base layer can be the default".to_string(),
            });
        }
        for layer in &self.map.layers {
            validation::validate_non_empty_string("map.layers.name", &layer.name)?;
            validation::validate_non_empty_string("map.layers.url_template", &layer.url_template)?;
        }

        validation::validate_non_empty_string("icon.base.url", &self.icon.base.url)?;
        validation::validate_range("icon.hover_size", self.icon.hover_size, 1, MAX_ICON_SIZE)?;

        validation::validate_path("load.output_path", &self.load.output_path)?;
        if self.load.bundle {
            validation::validate_file_extensions(
                "load.bundle_filename",
                std::slice::from_ref(&self.load.bundle_filename),
                &["zip"],
            )?;
        }

        Ok(())
    }
}
