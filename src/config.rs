//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.fundscope.toml` files.

use crate::models::{InvestorMatch, TrendMetric};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".fundscope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset settings.
    #[serde(default)]
    pub data: DataConfig,

    /// View settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Write reports here instead of stdout.
    #[serde(default)]
    pub output: Option<String>,
}

/// Dataset source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path or URL of the funding CSV.
    #[serde(default = "default_source")]
    pub source: String,

    /// Date formats tried in order.
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,

    /// Timeout for URL sources, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            date_formats: default_date_formats(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_source() -> String {
    "startup_cleaned.csv".to_string()
}

/// Formats accepted for the date column, in the order they are tried.
pub fn default_date_formats() -> Vec<String> {
    vec!["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_timeout() -> u64 {
    60
}

/// View settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Sectors shown in the overall ranking.
    #[serde(default = "default_top_n")]
    pub top_sectors: usize,

    /// Rows in an investor's recent investments.
    #[serde(default = "default_top_n")]
    pub recent_investments: usize,

    /// Startups in an investor's biggest investments.
    #[serde(default = "default_top_n")]
    pub biggest_investments: usize,

    /// Trend plotted when none is chosen.
    #[serde(default)]
    pub trend: TrendMetric,

    /// How investor names are matched against records.
    #[serde(default)]
    pub investor_match: InvestorMatch,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_sectors: default_top_n(),
            recent_investments: default_top_n(),
            biggest_investments: default_top_n(),
            trend: TrendMetric::default(),
            investor_match: InvestorMatch::default(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Unit appended to amounts.
    #[serde(default = "default_currency_unit")]
    pub currency_unit: String,

    /// Draw text bars next to chart tables.
    #[serde(default = "default_true")]
    pub include_charts: bool,

    /// Width of the longest text bar, in characters.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency_unit: default_currency_unit(),
            include_charts: true,
            bar_width: default_bar_width(),
        }
    }
}

fn default_currency_unit() -> String {
    "Cr".to_string()
}

fn default_true() -> bool {
    true
}

fn default_bar_width() -> usize {
    30
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings. Only values
    /// the user actually passed override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref source) = args.source {
            self.data.source = source.clone();
        }
        if let Some(timeout) = args.timeout {
            self.data.timeout_seconds = timeout;
        }

        if let Some(trend) = args.trend {
            self.dashboard.trend = trend;
        }
        if let Some(mode) = args.investor_match {
            self.dashboard.investor_match = mode;
        }

        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        if let Some(ref unit) = args.currency_unit {
            self.report.currency_unit = unit.clone();
        }
        // Flags always override
        if args.no_charts {
            self.report.include_charts = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
