use crate::utils::error::{MapError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Dataset locations may be remote (`http`, `https`) or a local `file` URL.
pub const SOURCE_SCHEMES: &[&str] = &["http", "https", "file"];

pub fn validate_url(field_name: &str, url_str: &str, allowed_schemes: &[&str]) -> Result<()> {
    if url_str.is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) if allowed_schemes.contains(&url.scheme()) => Ok(()),
        Ok(url) => Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!(
                "Unsupported URL scheme: {}. Allowed schemes: {}",
                url.scheme(),
                allowed_schemes.join(", ")
            ),
        }),
        Err(e) => Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension) => {}
            Some(extension) => {
                return Err(MapError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(MapError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 也不通過
    if !(value >= min && value <= max) {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.endpoint", "https://example.com/stones.csv", SOURCE_SCHEMES).is_ok());
        assert!(validate_url("source.endpoint", "http://example.com", SOURCE_SCHEMES).is_ok());
        assert!(validate_url("source.endpoint", "file:///tmp/stones.csv", SOURCE_SCHEMES).is_ok());
        assert!(validate_url("source.endpoint", "", SOURCE_SCHEMES).is_err());
        assert!(validate_url("source.endpoint", "invalid-url", SOURCE_SCHEMES).is_err());
        assert!(validate_url("source.endpoint", "ftp://example.com", SOURCE_SCHEMES).is_err());
        assert!(validate_url("icon.base.url", "file:///icon.png", &["http", "https"]).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("icon.hover_size", 40, 1).is_ok());
        assert!(validate_positive_number("icon.hover_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["stone_map.zip".to_string()];
        assert!(validate_file_extensions("load.bundle_filename", &files, &["zip"]).is_ok());

        let invalid_files = vec!["stone_map.tar".to_string()];
        assert!(validate_file_extensions("load.bundle_filename", &invalid_files, &["zip"]).is_err());

        let no_extension = vec!["stone_map".to_string()];
        assert!(validate_file_extensions("load.bundle_filename", &no_extension, &["zip"]).is_err());
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("map.center[0]", 58.5, -90.0, 90.0).is_ok());
        assert!(validate_range("map.center[0]", 91.0, -90.0, 90.0).is_err());
        assert!(validate_range("map.center[0]", f64::NAN, -90.0, 90.0).is_err());
    }
}
