use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to ingest '{source_url}': {message}")]
    IngestionError { source_url: String, message: String },

    #[error("Dataset is missing required columns: {}", columns.join(", "))]
    MissingColumnsError { columns: Vec<String> },

    #[error("Dataset header repeats required columns: {}", columns.join(", "))]
    DuplicateColumnsError { columns: Vec<String> },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Ingestion,
    Configuration,
    Storage,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MapError {
    pub fn ingestion(source_url: &str, message: impl Into<String>) -> Self {
        MapError::IngestionError {
            source_url: source_url.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MapError::HttpError(_) => ErrorCategory::Network,
            MapError::IngestionError { .. }
            | MapError::MissingColumnsError { .. }
            | MapError::DuplicateColumnsError { .. }
            | MapError::CsvError(_) => ErrorCategory::Ingestion,
            MapError::ConfigValidationError { .. }
            | MapError::InvalidConfigValueError { .. }
            | MapError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MapError::IoError(_) | MapError::ZipError(_) => ErrorCategory::Storage,
            MapError::SerializationError(_) => ErrorCategory::Output,
        }
    }

    /// 網路問題可以重跑；資料或設定錯誤需要人為修正
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Ingestion | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn is_ingestion_failure(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Ingestion
        )
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            MapError::HttpError(e) if e.is_timeout() => {
                "The dataset host did not answer in time; raise --timeout-seconds or try again later"
                    .to_string()
            }
            MapError::HttpError(_) => {
                "Check network connectivity and that the dataset URL is reachable".to_string()
            }
            MapError::IngestionError { source_url, .. } => {
                format!("Verify that {} serves the site dataset as CSV", source_url)
            }
            MapError::DuplicateColumnsError { columns } => {
                format!(
                    "Rename the repeated header columns ({}) so each appears once",
                    columns.join(", ")
                )
            }
            MapError::MissingColumnsError { .. } => {
                "Fix the dataset header or remap the column names in the [columns] section"
                    .to_string()
            }
            MapError::CsvError(_) => {
                "The dataset is not valid delimited text; inspect the file for broken quoting"
                    .to_string()
            }
            MapError::ConfigValidationError { field, .. }
            | MapError::InvalidConfigValueError { field, .. } => {
                format!("Correct the '{}' setting in the configuration", field)
            }
            MapError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            MapError::IoError(_) | MapError::ZipError(_) => {
                "Make sure the output directory exists and is writable".to_string()
            }
            MapError::SerializationError(_) => {
                "Output serialization failed; please report this with the input dataset".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not download the site dataset: {}", self),
            ErrorCategory::Ingestion => format!("Could not read the site dataset: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Storage => format!("Could not write map output: {}", self),
            ErrorCategory::Output => format!("Could not build map output: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
