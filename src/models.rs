//! Data models for the funding dashboard.
//!
//! This module contains the funding record held in the immutable table
//! and the row shapes produced by the aggregation queries.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delimiter between investor names in the raw `investors` column.
pub const INVESTOR_DELIMITER: char = ',';

/// One funding event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingRecord {
    date: Option<NaiveDate>,
    month: Option<u32>,
    year: Option<i32>,
    /// Startup name (non-empty, repeated across rounds).
    pub startup: String,
    /// Sector classification. Empty when the source cell was missing.
    pub vertical: String,
    /// Finer sector classification.
    pub subvertical: Option<String>,
    /// Headquarters city.
    pub city: Option<String>,
    /// Funding round label.
    pub round: String,
    /// Amount raised, always finite and non-negative.
    pub amount: f64,
    /// Raw comma-delimited investor text.
    pub investors: String,
}

impl FundingRecord {
    /// Creates a record for `startup` with every other field empty.
    pub fn new(startup: impl Into<String>) -> Self {
        Self {
            date: None,
            month: None,
            year: None,
            startup: startup.into(),
            vertical: String::new(),
            subvertical: None,
            city: None,
            round: String::new(),
            amount: 0.0,
            investors: String::new(),
        }
    }

    /// Sets the date and the calendar fields derived from it.
    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self.month = date.map(|d| d.month());
        self.year = date.map(|d| d.year());
        self
    }

    pub fn with_vertical(mut self, vertical: impl Into<String>) -> Self {
        self.vertical = vertical.into();
        self
    }

    pub fn with_subvertical(mut self, subvertical: Option<String>) -> Self {
        self.subvertical = subvertical;
        self
    }

    pub fn with_city(mut self, city: Option<String>) -> Self {
        self.city = city;
        self
    }

    pub fn with_round(mut self, round: impl Into<String>) -> Self {
        self.round = round.into();
        self
    }

    /// Sets the amount, coercing negative and non-finite values to 0.
    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = coerce_amount(amount);
        self
    }

    pub fn with_investors(mut self, investors: impl Into<String>) -> Self {
        self.investors = investors.into();
        self
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Calendar month (1-12), or `None` for an unknown date.
    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// Individual investor names, split on the delimiter and trimmed.
    pub fn investor_names(&self) -> impl Iterator<Item = &str> {
        self.investors
            .split(INVESTOR_DELIMITER)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Whether this record mentions `investor` under the given policy.
    pub fn mentions_investor(&self, investor: &str, mode: InvestorMatch) -> bool {
        if investor.trim().is_empty() {
            return false;
        }
        match mode {
            InvestorMatch::Substring => self.investors.contains(investor),
            InvestorMatch::Exact => self.investor_names().any(|name| name == investor),
        }
    }
}

/// Clamp an amount into the non-negative finite range.
pub fn coerce_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

/// How investor names are matched against a record's investor text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InvestorMatch {
    /// Case-sensitive substring of the raw investor text. "Sequoia" matches
    /// "Sequoia Capital".
    #[default]
    Substring,
    /// Exact membership in the split and trimmed investor names.
    Exact,
}

impl fmt::Display for InvestorMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvestorMatch::Substring => write!(f, "substring"),
            InvestorMatch::Exact => write!(f, "exact"),
        }
    }
}

/// Value plotted by the month-on-month trend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum TrendMetric {
    /// Summed amount per month.
    #[default]
    TotalFunding,
    /// Number of funding records per month.
    InvestmentCount,
}

impl fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendMetric::TotalFunding => write!(f, "Total Funding"),
            TrendMetric::InvestmentCount => write!(f, "Number of Investments"),
        }
    }
}

/// One (year, month) bucket of the trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Display key, `"{month}-{year}"`.
    pub period: String,
    pub year: i32,
    pub month: u32,
    pub value: f64,
}

/// A sector ranked by total funding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorSummary {
    pub vertical: String,
    pub total_amount: f64,
    pub investments: usize,
}

/// Descriptive fields of a startup, first known value per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StartupProfile {
    pub city: Option<String>,
    pub vertical: Option<String>,
    pub subvertical: Option<String>,
}

/// One row of a startup's funding history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingRound {
    pub date: Option<NaiveDate>,
    pub round: String,
    pub amount: f64,
    pub investors: String,
}

/// One row of an investor's recent investments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentRow {
    pub date: Option<NaiveDate>,
    pub startup: String,
    pub vertical: String,
    pub amount: f64,
}

/// Total invested into one startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartupTotal {
    pub startup: String,
    pub total_amount: f64,
}

/// Total invested into one sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorTotal {
    pub vertical: String,
    pub total_amount: f64,
}

/// Counters collected while loading a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Data rows seen in the source, including skipped ones.
    pub rows_read: usize,
    /// Rows dropped because they were undecodable or had no startup name.
    pub rows_skipped: usize,
    /// Kept rows whose date could not be parsed.
    pub unknown_dates: usize,
    /// Kept rows whose amount was missing or invalid and became 0.
    pub defaulted_amounts: usize,
}

impl LoadStats {
    /// Rows that made it into the table.
    pub fn records_loaded(&self) -> usize {
        self.rows_read - self.rows_skipped
    }
}

/// Metadata about a rendered dashboard view.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path or URL the dataset was loaded from.
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    pub records_loaded: usize,
    pub rows_skipped: usize,
    pub unknown_dates: usize,
    /// Investor matching policy used for investor panels.
    pub investor_match: InvestorMatch,
}

/// A complete rendered dashboard view.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub view: crate::dashboard::DashboardView,
}
