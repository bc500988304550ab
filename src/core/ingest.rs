use crate::config::map_config::ColumnMapping;
use crate::domain::model::SiteRecord;
use crate::utils::error::{MapError, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Downloads the dataset and parses it into records, in file order.
///
/// `file://` URLs are read from the local filesystem. Any failure here is
/// terminal for the run: there is no retry and no fallback data.
pub async fn fetch_site_records(
    client: &Client,
    source_url: &str,
    timeout: Option<Duration>,
    columns: &ColumnMapping,
) -> Result<Vec<SiteRecord>> {
    let url = Url::parse(source_url)
        .map_err(|e| MapError::ingestion(source_url, format!("invalid URL: {}", e)))?;

    let body = match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| MapError::ingestion(source_url, "not a local file path"))?;
            tracing::debug!("Reading dataset from {}", path.display());
            tokio::fs::read(&path)
                .await
                .map_err(|e| MapError::ingestion(source_url, e.to_string()))?
        }
        _ => {
            tracing::debug!("Requesting dataset from {}", source_url);
            let mut request = client.get(url);
            if let Some(timeout) = timeout {
                request = request.timeout(timeout);
            }

            let response = request.send().await?;
            tracing::debug!("Dataset response status: {}", response.status());

            if !response.status().is_success() {
                return Err(MapError::ingestion(
                    source_url,
                    format!("HTTP {}", response.status()),
                ));
            }
            response.bytes().await?.to_vec()
        }
    };

    tracing::debug!("Fetched {} bytes", body.len());
    parse_site_records(&body, columns)
}

/// Parses delimited text with a header row into records.
///
/// Short rows are accepted (missing trailing fields are simply absent) and
/// rows with only blank fields are skipped.
pub fn parse_site_records(data: &[u8], columns: &ColumnMapping) -> Result<Vec<SiteRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let missing: Vec<String> = columns
        .required()
        .iter()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(MapError::MissingColumnsError { columns: missing });
    }

    // 重複欄位會讓後面的值蓋掉前面的
    let duplicated: Vec<String> = columns
        .required()
        .iter()
        .filter(|column| headers.iter().filter(|h| h == *column).count() > 1)
        .map(|column| column.to_string())
        .collect();
    if !duplicated.is_empty() {
        return Err(MapError::DuplicateColumnsError {
            columns: duplicated,
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let fields: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(row.iter().map(str::to_string))
            .collect();
        records.push(SiteRecord::new(line, fields));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const SAMPLE: &str = "\
SITE NAME,SITE TYPE,SITE EASTING,SITE NORTHING,URL
Aberlemno 1,Symbol stone,352300,755600,https://example.com/1
Aberlemno 2,Cross-slab,352300,755500,https://example.com/2
";

    #[test]
    fn test_parse_preserves_row_order_and_lines() {
        let records = parse_site_records(SAMPLE.as_bytes(), &ColumnMapping::default()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("SITE NAME"), Some("Aberlemno 1"));
        assert_eq!(records[1].get("SITE TYPE"), Some("Cross-slab"));
        assert_eq!(records[0].line, 2);
        assert_eq!(records[1].line, 3);
    }

    #[test]
    fn test_parse_strips_bom_and_skips_blank_rows() {
        let data = format!("\u{feff}{}\n,,,,\n", SAMPLE);
        let records = parse_site_records(data.as_bytes(), &ColumnMapping::default()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("SITE NAME"), Some("Aberlemno 1"));
    }

    #[test]
    fn test_parse_accepts_short_rows() {
        let data = "SITE NAME,SITE TYPE,SITE EASTING,SITE NORTHING,URL\nFragment,Symbol stone,352300\n";
        let records = parse_site_records(data.as_bytes(), &ColumnMapping::default()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("SITE EASTING"), Some("352300"));
        assert_eq!(records[0].get("SITE NORTHING"), None);
    }

    #[test]
    fn test_parse_reports_missing_columns() {
        let data = "SITE NAME,SITE TYPE,URL\nA,B,C\n";
        let err = parse_site_records(data.as_bytes(), &ColumnMapping::default()).unwrap_err();

        match err {
            MapError::MissingColumnsError { columns } => {
                assert_eq!(columns, vec!["SITE EASTING", "SITE NORTHING"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_repeated_required_columns() {
        let data = "SITE NAME,SITE TYPE,SITE EASTING,SITE NORTHING,SITE EASTING,URL\n\
                    Aberlemno 1,Symbol stone,352300,755600,0,https://example.com/1\n";
        let err = parse_site_records(data.as_bytes(), &ColumnMapping::default()).unwrap_err();

        assert!(err.is_ingestion_failure());
        match err {
            MapError::DuplicateColumnsError { columns } => {
                assert_eq!(columns, vec!["SITE EASTING"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_tolerates_repeated_unmapped_columns() {
        let data = "SITE NAME,SITE TYPE,SITE EASTING,SITE NORTHING,URL,NOTES,NOTES\n\
                    Rhynie 1,Symbol stone,350000,827000,,a,b\n";
        let records = parse_site_records(data.as_bytes(), &ColumnMapping::default()).unwrap();
        assert_eq!(records[0].get("SITE EASTING"), Some("350000"));
    }

    #[test]
    fn test_parse_uses_remapped_columns() {
        let columns = ColumnMapping {
            easting: "E".to_string(),
            northing: "N".to_string(),
            ..ColumnMapping::default()
        };
        let data = "SITE NAME,SITE TYPE,E,N,URL\nRhynie 1,Symbol stone,350000,827000,\n";
        let records = parse_site_records(data.as_bytes(), &columns).unwrap();
        assert_eq!(records[0].get("E"), Some("350000"));
    }

    #[tokio::test]
    async fn test_fetch_over_http() {
        let server = MockServer::start_async().await;
        let csv_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/stones.csv");
                then.status(200)
                    .header("Content-Type", "text/csv")
                    .body(SAMPLE);
            })
            .await;

        let records = fetch_site_records(
            &Client::new(),
            &server.url("/stones.csv"),
            Some(Duration::from_secs(5)),
            &ColumnMapping::default(),
        )
        .await
        .unwrap();

        csv_mock.assert_async().await;
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_http_error_is_ingestion_failure() {
        let server = MockServer::start_async().await;
        let csv_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.csv");
                then.status(404);
            })
            .await;

        let err = fetch_site_records(
            &Client::new(),
            &server.url("/missing.csv"),
            None,
            &ColumnMapping::default(),
        )
        .await
        .unwrap_err();

        csv_mock.assert_async().await;
        assert!(err.is_ingestion_failure());
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, SAMPLE.as_bytes()).unwrap();
        let url = Url::from_file_path(file.path()).unwrap();

        let records = fetch_site_records(&Client::new(), url.as_str(), None, &ColumnMapping::default())
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }
}
