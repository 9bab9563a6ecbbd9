//! View selection.
//!
//! A [`View`] maps to a fixed, ordered list of [`Query`]s. Running the plan
//! against the table yields one [`Panel`] per query. Nothing is kept between
//! runs, so switching views is just building another plan.

use crate::analysis;
use crate::models::{
    FundingRecord, FundingRound, InvestmentRow, InvestorMatch, SectorSummary, SectorTotal,
    StartupProfile, StartupTotal, TrendMetric, TrendPoint,
};
use serde::Serialize;
use tracing::debug;

/// What the user asked to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum View {
    /// Market-wide metrics, trend and sector ranking.
    Overall { trend: TrendMetric },
    /// One startup's profile and funding history.
    Startup { name: String },
    /// One investor's portfolio.
    Investor { name: String },
}

impl View {
    /// Heading for the rendered view.
    pub fn title(&self) -> String {
        match self {
            View::Overall { .. } => "Overall Startup Funding Analysis".to_string(),
            View::Startup { name } | View::Investor { name } => format!("{} Details", name),
        }
    }
}

/// Ranking sizes and matching policy used when planning a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSettings {
    pub top_sectors: usize,
    pub recent_investments: usize,
    pub biggest_investments: usize,
    pub investor_match: InvestorMatch,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            top_sectors: 5,
            recent_investments: 5,
            biggest_investments: 5,
            investor_match: InvestorMatch::default(),
        }
    }
}

impl From<&crate::config::DashboardConfig> for ViewSettings {
    fn from(config: &crate::config::DashboardConfig) -> Self {
        Self {
            top_sectors: config.top_sectors,
            recent_investments: config.recent_investments,
            biggest_investments: config.biggest_investments,
            investor_match: config.investor_match,
        }
    }
}

/// One aggregation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    TotalFunding,
    MaxFunding,
    AverageTicketSize,
    FundedStartupCount,
    MonthlyTrend(TrendMetric),
    TopSectors(usize),
    StartupProfile(String),
    FundingRounds(String),
    RecentInvestments { investor: String, k: usize },
    BiggestInvestments { investor: String, k: usize },
    SectorBreakdown(String),
}

/// The result of one query, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "panel", content = "data", rename_all = "snake_case")]
pub enum Panel {
    TotalFunding(f64),
    MaxFunding(f64),
    AverageTicketSize(f64),
    FundedStartups(usize),
    MonthlyTrend {
        metric: TrendMetric,
        points: Vec<TrendPoint>,
    },
    TopSectors(Vec<SectorSummary>),
    StartupProfile(StartupProfile),
    FundingRounds(Vec<FundingRound>),
    RecentInvestments(Vec<InvestmentRow>),
    BiggestInvestments(Vec<StartupTotal>),
    SectorBreakdown(Vec<SectorTotal>),
}

impl Panel {
    pub fn title(&self) -> &'static str {
        match self {
            Panel::TotalFunding(_) => "Total Funding",
            Panel::MaxFunding(_) => "Highest Funding",
            Panel::AverageTicketSize(_) => "Average Ticket Size",
            Panel::FundedStartups(_) => "Funded Startups",
            Panel::MonthlyTrend { .. } => "Funding Trends (Month-on-Month)",
            Panel::TopSectors(_) => "Top Sectors",
            Panel::StartupProfile(_) => "Profile",
            Panel::FundingRounds(_) => "Funding Rounds",
            Panel::RecentInvestments(_) => "Recent Investments",
            Panel::BiggestInvestments(_) => "Biggest Investments",
            Panel::SectorBreakdown(_) => "Sector-wise Investments",
        }
    }

    /// Whether this is a single-number metric.
    pub fn is_metric(&self) -> bool {
        matches!(
            self,
            Panel::TotalFunding(_)
                | Panel::MaxFunding(_)
                | Panel::AverageTicketSize(_)
                | Panel::FundedStartups(_)
        )
    }
}

/// A view together with its computed panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub view: View,
    pub panels: Vec<Panel>,
}

/// The queries backing `view`, in display order.
pub fn plan(view: &View, settings: &ViewSettings) -> Vec<Query> {
    match view {
        View::Overall { trend } => vec![
            Query::TotalFunding,
            Query::MaxFunding,
            Query::AverageTicketSize,
            Query::FundedStartupCount,
            Query::MonthlyTrend(*trend),
            Query::TopSectors(settings.top_sectors),
        ],
        View::Startup { name } => vec![
            Query::StartupProfile(name.clone()),
            Query::FundingRounds(name.clone()),
        ],
        View::Investor { name } => vec![
            Query::RecentInvestments {
                investor: name.clone(),
                k: settings.recent_investments,
            },
            Query::BiggestInvestments {
                investor: name.clone(),
                k: settings.biggest_investments,
            },
            Query::SectorBreakdown(name.clone()),
        ],
    }
}

/// Run one query.
pub fn evaluate(records: &[FundingRecord], query: &Query, mode: InvestorMatch) -> Panel {
    match query {
        Query::TotalFunding => Panel::TotalFunding(analysis::total_funding(records)),
        Query::MaxFunding => Panel::MaxFunding(analysis::max_funding(records)),
        Query::AverageTicketSize => {
            Panel::AverageTicketSize(analysis::average_ticket_size(records))
        }
        Query::FundedStartupCount => {
            Panel::FundedStartups(analysis::funded_startup_count(records))
        }
        Query::MonthlyTrend(metric) => Panel::MonthlyTrend {
            metric: *metric,
            points: analysis::monthly_trend(records, *metric),
        },
        Query::TopSectors(n) => Panel::TopSectors(analysis::top_sectors(records, *n)),
        Query::StartupProfile(name) => {
            Panel::StartupProfile(analysis::startup_profile(records, name))
        }
        Query::FundingRounds(name) => Panel::FundingRounds(analysis::funding_rounds(records, name)),
        Query::RecentInvestments { investor, k } => {
            Panel::RecentInvestments(analysis::recent_investments(records, investor, *k, mode))
        }
        Query::BiggestInvestments { investor, k } => {
            Panel::BiggestInvestments(analysis::biggest_investments(records, investor, *k, mode))
        }
        Query::SectorBreakdown(investor) => {
            Panel::SectorBreakdown(analysis::sector_breakdown(records, investor, mode))
        }
    }
}

/// Plan and run a whole view.
pub fn build_view(records: &[FundingRecord], view: &View, settings: &ViewSettings) -> DashboardView {
    let queries = plan(view, settings);
    debug!("Running {} queries for {:?}", queries.len(), view);

    let panels = queries
        .iter()
        .map(|query| evaluate(records, query, settings.investor_match))
        .collect();

    DashboardView {
        title: view.title(),
        view: view.clone(),
        panels,
    }
}
