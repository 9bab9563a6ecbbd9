//! CSV loading and normalization.
//!
//! Rows are deserialized as raw optional strings first and then converted,
//! so one malformed cell never fails the whole load.

use crate::dataset::{Dataset, LoadError, Source};
use crate::models::{FundingRecord, LoadStats};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Columns the source must provide, by header name.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "date",
    "startup",
    "vertical",
    "subvertical",
    "city",
    "investors",
    "round",
    "amount",
];

/// Options for loading a dataset.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// `chrono` formats tried in order for the date column.
    pub date_formats: Vec<String>,
    /// Timeout for URL sources.
    pub timeout_seconds: u64,
    /// Whether to show a spinner while loading.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            date_formats: crate::config::default_date_formats(),
            timeout_seconds: 60,
            show_progress: false,
        }
    }
}

impl From<&crate::config::DataConfig> for LoadOptions {
    fn from(config: &crate::config::DataConfig) -> Self {
        Self {
            date_formats: config.date_formats.clone(),
            timeout_seconds: config.timeout_seconds,
            show_progress: false,
        }
    }
}

/// Direct mapping of the CSV columns. Every cell is optional here.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    startup: Option<String>,
    #[serde(default)]
    vertical: Option<String>,
    #[serde(default)]
    subvertical: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    investors: Option<String>,
    #[serde(default)]
    round: Option<String>,
    #[serde(default)]
    amount: Option<String>,
}

/// Load a dataset from a path or URL.
pub async fn load_source(source: &Source, options: &LoadOptions) -> Result<Dataset, LoadError> {
    info!("Loading dataset from: {}", source);

    let spinner = if options.show_progress {
        Some(loading_spinner(source))
    } else {
        None
    };

    let result = read_source(source, options).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let dataset = result?;
    let stats = dataset.stats();
    info!(
        "Loaded {} records ({} rows skipped, {} unknown dates, {} amounts defaulted to 0)",
        dataset.len(),
        stats.rows_skipped,
        stats.unknown_dates,
        stats.defaulted_amounts
    );

    Ok(dataset)
}

async fn read_source(source: &Source, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let label = source.to_string();

    match source {
        Source::Path(path) => {
            let file = File::open(path).map_err(|e| LoadError::Io {
                path: path.clone(),
                source: e,
            })?;
            parse_records(BufReader::new(file), &label, options)
        }
        Source::Url(url) => {
            let body = fetch_bytes(url, options.timeout_seconds).await?;
            parse_records(body.as_slice(), &label, options)
        }
    }
}

async fn fetch_bytes(url: &str, timeout_seconds: u64) -> Result<Vec<u8>, LoadError> {
    let http_error = |e: reqwest::Error| LoadError::Http {
        url: url.to_string(),
        source: e,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(http_error)?;

    debug!("GET {}", url);
    let response = client.get(url).send().await.map_err(http_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.bytes().await.map_err(http_error)?;
    debug!("Fetched {} bytes", body.len());

    Ok(body.to_vec())
}

fn loading_spinner(source: &Source) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Loading {}", source));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Parse CSV text into a dataset.
///
/// Fails only when the header is unreadable or lacks a required column.
pub fn parse_records<R: Read>(
    reader: R,
    source: &str,
    options: &LoadOptions,
) -> Result<Dataset, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let mut stats = LoadStats::default();
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<RawRow>().enumerate() {
        stats.rows_read += 1;
        // Header is line 1.
        let line = index + 2;

        let raw = match row {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping undecodable row at line {}: {}", line, e);
                stats.rows_skipped += 1;
                continue;
            }
        };

        match build_record(raw, &options.date_formats, &mut stats) {
            Some(record) => records.push(record),
            None => {
                debug!("Skipping row at line {}: no startup name", line);
                stats.rows_skipped += 1;
            }
        }
    }

    Ok(Dataset::new(source, records, stats))
}

fn build_record(
    raw: RawRow,
    date_formats: &[String],
    stats: &mut LoadStats,
) -> Option<FundingRecord> {
    let startup = non_blank(raw.startup)?;

    let date = non_blank(raw.date)
        .as_deref()
        .and_then(|d| parse_date(d, date_formats));
    if date.is_none() {
        stats.unknown_dates += 1;
    }

    let amount = non_blank(raw.amount)
        .as_deref()
        .and_then(parse_amount)
        .unwrap_or_else(|| {
            stats.defaulted_amounts += 1;
            0.0
        });

    Some(
        FundingRecord::new(startup)
            .with_date(date)
            .with_vertical(non_blank(raw.vertical).unwrap_or_default())
            .with_subvertical(non_blank(raw.subvertical))
            .with_city(non_blank(raw.city))
            .with_round(non_blank(raw.round).unwrap_or_default())
            .with_amount(amount)
            .with_investors(non_blank(raw.investors).unwrap_or_default()),
    )
}

fn non_blank(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse a date cell, ignoring any time-of-day suffix.
pub fn parse_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split([' ', 'T']).next().unwrap_or(raw);

    formats.iter().find_map(|format| {
        NaiveDate::parse_from_str(raw, format)
            .or_else(|_| NaiveDate::parse_from_str(date_part, format))
            .ok()
    })
}

/// Parse an amount cell. Returns `None` for anything that is not a
/// finite, non-negative number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "date,startup,vertical,subvertical,city,investors,round,amount\n";

    fn parse(body: &str) -> Result<Dataset, LoadError> {
        let text = format!("{}{}", HEADER, body);
        parse_records(text.as_bytes(), "test.csv", &LoadOptions::default())
    }

    #[test]
    fn test_parse_well_formed_rows() {
        let dataset = parse(
            "2020-01-05,A,Tech,SaaS,Bengaluru,\"Accel, Sequoia Capital\",Seed,10\n\
             2020-02-10,A,Tech,SaaS,Bengaluru,Accel,Series A,20\n",
        )
        .unwrap();

        assert_eq!(dataset.len(), 2);
        let first = &dataset.records()[0];
        assert_eq!(first.startup, "A");
        assert_eq!(first.date(), NaiveDate::from_ymd_opt(2020, 1, 5));
        assert_eq!(first.month(), Some(1));
        assert_eq!(first.year(), Some(2020));
        assert_eq!(first.city.as_deref(), Some("Bengaluru"));
        assert_eq!(first.investors, "Accel, Sequoia Capital");
        assert_eq!(first.amount, 10.0);
        assert_eq!(dataset.stats().rows_skipped, 0);
    }

    #[test]
    fn test_malformed_date_becomes_unknown() {
        let dataset = parse("not-a-date,A,Tech,,,,Seed,5\n").unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].date(), None);
        assert_eq!(dataset.records()[0].year(), None);
        assert_eq!(dataset.stats().unknown_dates, 1);
    }

    #[test]
    fn test_missing_amount_defaults_to_zero() {
        let dataset = parse("2020-01-05,A,Tech,,,,Seed,\n2020-01-06,B,Tech,,,,Seed,n/a\n").unwrap();

        assert_eq!(dataset.records()[0].amount, 0.0);
        assert_eq!(dataset.records()[1].amount, 0.0);
        assert_eq!(dataset.stats().defaulted_amounts, 2);
    }

    #[test]
    fn test_missing_optional_fields_are_none() {
        let dataset = parse("2020-01-05,A,Tech,,,Accel,Seed,1\n").unwrap();
        let record = &dataset.records()[0];

        assert_eq!(record.city, None);
        assert_eq!(record.subvertical, None);
        assert_eq!(record.vertical, "Tech");
    }

    #[test]
    fn test_blank_startup_row_is_skipped() {
        let dataset = parse("2020-01-05,,Tech,,,,Seed,1\n2020-01-05,B,Tech,,,,Seed,2\n").unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.stats().rows_read, 2);
        assert_eq!(dataset.stats().rows_skipped, 1);
        assert_eq!(dataset.stats().records_loaded(), 1);
    }

    #[test]
    fn test_short_row_is_tolerated() {
        let dataset = parse("2020-01-05,A,Tech\n").unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].amount, 0.0);
        assert_eq!(dataset.records()[0].investors, "");
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let text = "idx,date,startup,vertical,subvertical,city,investors,round,amount\n\
                    0,2020-01-05,A,Tech,,,,Seed,3\n";
        let dataset = parse_records(text.as_bytes(), "t", &LoadOptions::default()).unwrap();
        assert_eq!(dataset.records()[0].amount, 3.0);
    }

    #[test]
    fn test_missing_columns_is_load_error() {
        let text = "date,startup,amount\n2020-01-05,A,1\n";
        let err = parse_records(text.as_bytes(), "t", &LoadOptions::default()).unwrap_err();

        match err {
            LoadError::MissingColumns(columns) => {
                assert!(columns.contains(&"vertical".to_string()));
                assert!(columns.contains(&"investors".to_string()));
                assert!(!columns.contains(&"date".to_string()));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_input_is_load_error() {
        let err = parse_records("".as_bytes(), "t", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumns(_)));
    }

    #[test]
    fn test_header_only_gives_empty_dataset() {
        let dataset = parse("").unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        let formats = crate::config::default_date_formats();
        let expected = NaiveDate::from_ymd_opt(2020, 1, 5);

        assert_eq!(parse_date("2020-01-05", &formats), expected);
        assert_eq!(parse_date("01/05/2020", &formats), expected);
        assert_eq!(parse_date("2020/01/05", &formats), expected);
        assert_eq!(parse_date("2020-01-05 00:00:00", &formats), expected);
        assert_eq!(parse_date("2020-01-05T10:30:00", &formats), expected);
        assert_eq!(parse_date("05.01.2020", &formats), expected);
        assert_eq!(parse_date("2020-13-45", &formats), None);
        assert_eq!(parse_date("", &formats), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("42"), Some(42.0));
        assert_eq!(parse_amount("1,250.5"), Some(1250.5));
        assert_eq!(parse_amount("0"), Some(0.0));
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("unknown"), None);
    }

    #[test]
    fn test_load_source_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}2020-01-05,A,Tech,,,Accel,Seed,10\n", HEADER).unwrap();

        let source = Source::Path(file.path().to_path_buf());
        let dataset = tokio_test::block_on(load_source(&source, &LoadOptions::default())).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.source(), file.path().display().to_string());
    }

    #[test]
    fn test_load_sample_fixture() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("startup_funding_sample.csv");
        let source = Source::Path(path);
        let dataset = tokio_test::block_on(load_source(&source, &LoadOptions::default())).unwrap();

        let stats = dataset.stats();
        assert_eq!(stats.rows_read, 7);
        assert_eq!(stats.rows_skipped, 1);
        assert_eq!(stats.unknown_dates, 1);
        assert_eq!(stats.defaulted_amounts, 2);
        assert_eq!(dataset.len(), 6);

        let zomato = &dataset.records()[1];
        assert_eq!(zomato.amount, 1200.0);

        let cred = &dataset.records()[5];
        assert_eq!(cred.date(), NaiveDate::from_ymd_opt(2020, 3, 15));
        assert_eq!(cred.amount, 0.0);

        let total = crate::analysis::total_funding(dataset.records());
        assert!((total - 1750.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_load_source_from_url() {
        let body = format!(
            "{}2020-01-05,A,Tech,,,\"Accel, Sequoia Capital\",Seed,\"1,000\"\n",
            HEADER
        );
        let url = crate::dataset::test_server::serve_once("200 OK", &body);
        let source = Source::parse(&url);

        let dataset = load_source(&source, &LoadOptions::default()).await.unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.source(), url);
        assert_eq!(dataset.records()[0].amount, 1000.0);
        assert_eq!(dataset.records()[0].investors, "Accel, Sequoia Capital");
    }

    #[tokio::test]
    async fn test_http_error_status_is_load_error() {
        let url = crate::dataset::test_server::serve_once("404 Not Found", "");
        let source = Source::parse(&url);

        let err = load_source(&source, &LoadOptions::default())
            .await
            .unwrap_err();

        match err {
            LoadError::Status { url: failed, status } => {
                assert_eq!(failed, url);
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_source_missing_file() {
        let source = Source::Path("/definitely/not/here/funding.csv".into());
        let err = tokio_test::block_on(load_source(&source, &LoadOptions::default())).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
