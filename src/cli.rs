//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::dashboard::View;
use crate::models::{InvestorMatch, TrendMetric};
use clap::Parser;
use std::path::PathBuf;

/// Fundscope - startup funding dashboard
///
/// Market, startup and investor views over a startup funding CSV,
/// rendered as Markdown or JSON.
///
/// Examples:
///   fundscope --source startup_cleaned.csv
///   fundscope --source data.csv --trend investment-count
///   fundscope --source data.csv --view startup --name Ola
///   fundscope --source data.csv --view investor --name "Sequoia Capital" --format json
///   fundscope --source data.csv --list investors
///   fundscope --source data.csv --interactive
///   fundscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Funding CSV to load (file path or http(s) URL)
    ///
    /// GitHub "blob" page URLs are fetched from their raw location.
    /// Falls back to the config file, then to ./startup_cleaned.csv.
    #[arg(short, long, value_name = "PATH|URL", env = "FUNDSCOPE_SOURCE")]
    pub source: Option<String>,

    /// View to render
    #[arg(long, default_value = "overall", value_name = "VIEW")]
    pub view: ViewKind,

    /// Startup or investor name for the startup/investor views
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Trend plotted in the overall view
    #[arg(short, long, value_name = "TREND")]
    pub trend: Option<TrendMetric>,

    /// How investor names are matched against records
    ///
    /// "substring" matches any record whose investor text contains the name
    /// (so "Sequoia" matches "Sequoia Capital"); "exact" requires the name
    /// to be one of the listed investors.
    #[arg(long, value_name = "MODE")]
    pub investor_match: Option<InvestorMatch>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the selectable startup or investor names and exit
    #[arg(long, value_name = "WHAT", conflicts_with = "interactive")]
    pub list: Option<ListTarget>,

    /// Read view commands from stdin until "quit"
    #[arg(short, long)]
    pub interactive: bool,

    /// Timeout in seconds for URL sources
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Unit appended to amounts in Markdown output
    #[arg(long, value_name = "UNIT")]
    pub currency_unit: Option<String>,

    /// Leave text bar charts out of Markdown output
    #[arg(long)]
    pub no_charts: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .fundscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .fundscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Which view to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ViewKind {
    /// Market-wide overview (default)
    #[default]
    Overall,
    /// A single startup
    Startup,
    /// A single investor
    Investor,
}

/// Name lists available through --list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListTarget {
    Startups,
    Investors,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref source) = self.source {
            if source.trim().is_empty() {
                return Err("Source must not be empty".to_string());
            }
        }

        if self.interactive && self.output.is_some() {
            return Err("--output cannot be used with --interactive".to_string());
        }

        // A one-shot startup/investor view needs someone to look at
        let one_shot = self.list.is_none() && !self.interactive;
        if one_shot && self.view != ViewKind::Overall && self.selected_name().is_none() {
            return Err(format!(
                "--name is required for the {} view",
                match self.view {
                    ViewKind::Startup => "startup",
                    _ => "investor",
                }
            ));
        }

        Ok(())
    }

    /// The trimmed --name, if one was given.
    pub fn selected_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// The view requested on the command line.
    ///
    /// Returns `None` for a startup/investor view without a name.
    pub fn requested_view(&self, default_trend: TrendMetric) -> Option<View> {
        match self.view {
            ViewKind::Overall => Some(View::Overall {
                trend: self.trend.unwrap_or(default_trend),
            }),
            ViewKind::Startup => self.selected_name().map(|name| View::Startup {
                name: name.to_string(),
            }),
            ViewKind::Investor => self.selected_name().map(|name| View::Investor {
                name: name.to_string(),
            }),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            source: Some("startup_cleaned.csv".to_string()),
            view: ViewKind::Overall,
            name: None,
            trend: None,
            investor_match: None,
            format: OutputFormat::Markdown,
            output: None,
            list: None,
            interactive: false,
            timeout: None,
            currency_unit: None,
            no_charts: false,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "fundscope",
            "--source",
            "data.csv",
            "--view",
            "investor",
            "--name",
            "Sequoia Capital",
            "--investor-match",
            "exact",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.source.as_deref(), Some("data.csv"));
        assert_eq!(args.view, ViewKind::Investor);
        assert_eq!(args.investor_match, Some(InvestorMatch::Exact));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_list_conflicts_with_interactive() {
        let result = Args::try_parse_from([
            "fundscope",
            "--list",
            "startups",
            "--interactive",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_requires_name_for_startup_view() {
        let mut args = make_args();
        args.view = ViewKind::Startup;
        assert!(args.validate().is_err());

        args.name = Some("   ".to_string());
        assert!(args.validate().is_err());

        args.name = Some("Ola".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_name_not_needed_for_list() {
        let mut args = make_args();
        args.view = ViewKind::Investor;
        args.list = Some(ListTarget::Investors);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_output_in_interactive_mode() {
        let mut args = make_args();
        args.interactive = true;
        assert!(args.validate().is_ok());

        args.output = Some(PathBuf::from("dashboard.md"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_trend_and_match_values() {
        let args = Args::try_parse_from([
            "fundscope",
            "--trend",
            "investment-count",
            "--investor-match",
            "substring",
        ])
        .unwrap();

        assert_eq!(args.trend, Some(TrendMetric::InvestmentCount));
        assert_eq!(args.investor_match, Some(InvestorMatch::Substring));
        assert!(Args::try_parse_from(["fundscope", "--trend", "weekly"]).is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_requested_view() {
        let mut args = make_args();
        assert_eq!(
            args.requested_view(TrendMetric::InvestmentCount),
            Some(View::Overall {
                trend: TrendMetric::InvestmentCount
            })
        );

        args.trend = Some(TrendMetric::TotalFunding);
        assert_eq!(
            args.requested_view(TrendMetric::InvestmentCount),
            Some(View::Overall {
                trend: TrendMetric::TotalFunding
            })
        );

        args.view = ViewKind::Startup;
        args.name = Some(" Ola ".to_string());
        assert_eq!(
            args.requested_view(TrendMetric::TotalFunding),
            Some(View::Startup {
                name: "Ola".to_string()
            })
        );

        args.name = None;
        assert_eq!(args.requested_view(TrendMetric::TotalFunding), None);
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
