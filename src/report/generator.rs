//! Markdown and JSON dashboard rendering.
//!
//! Rendering only sees the panels produced by the view selector, never the
//! raw records.

use crate::analysis::share_of_total;
use crate::dashboard::{DashboardView, Panel};
use crate::models::{
    FundingRound, InvestmentRow, Report, ReportMetadata, SectorSummary, SectorTotal,
    StartupProfile, StartupTotal, TrendMetric, TrendPoint,
};
use anyhow::Result;
use chrono::NaiveDate;

/// Presentation settings.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Unit appended to amounts ("Cr").
    pub currency_unit: String,
    /// Draw text bars for chart panels.
    pub include_charts: bool,
    /// Width of the longest bar.
    pub bar_width: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            currency_unit: "Cr".to_string(),
            include_charts: true,
            bar_width: 30,
        }
    }
}

impl From<&crate::config::ReportConfig> for ReportSettings {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            currency_unit: config.currency_unit.clone(),
            include_charts: config.include_charts,
            bar_width: config.bar_width,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, settings: &ReportSettings) -> String {
    let mut output = String::new();

    output.push_str(&generate_view_markdown(&report.view, settings));
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_footer());

    output
}

/// Render just the view: title, metrics and panels.
pub fn generate_view_markdown(view: &DashboardView, settings: &ReportSettings) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", view.title));

    let metrics: Vec<&Panel> = view.panels.iter().filter(|p| p.is_metric()).collect();
    if !metrics.is_empty() {
        output.push_str(&generate_metrics_section(&metrics, settings));
    }

    for panel in view.panels.iter().filter(|p| !p.is_metric()) {
        output.push_str(&generate_panel_section(panel, settings));
    }

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Dataset\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Records Loaded:** {}\n",
        metadata.records_loaded
    ));
    if metadata.rows_skipped > 0 {
        section.push_str(&format!("- **Rows Skipped:** {}\n", metadata.rows_skipped));
    }
    if metadata.unknown_dates > 0 {
        section.push_str(&format!(
            "- **Unknown Dates:** {} (excluded from trends)\n",
            metadata.unknown_dates
        ));
    }
    section.push_str(&format!(
        "- **Investor Matching:** {}\n",
        metadata.investor_match
    ));
    section.push('\n');

    section
}

/// Summary metrics as a single table row.
fn generate_metrics_section(metrics: &[&Panel], settings: &ReportSettings) -> String {
    let mut section = String::new();

    let headers: Vec<&str> = metrics.iter().map(|p| p.title()).collect();
    let values: Vec<String> = metrics
        .iter()
        .map(|p| match p {
            Panel::TotalFunding(v) | Panel::MaxFunding(v) | Panel::AverageTicketSize(v) => {
                format_amount(*v, &settings.currency_unit)
            }
            Panel::FundedStartups(n) => n.to_string(),
            _ => String::new(),
        })
        .collect();

    section.push_str(&format!("| {} |\n", headers.join(" | ")));
    section.push_str(&format!("|{}\n", ":---:|".repeat(headers.len())));
    section.push_str(&format!("| {} |\n\n", values.join(" | ")));

    section
}

/// Render one non-metric panel.
fn generate_panel_section(panel: &Panel, settings: &ReportSettings) -> String {
    let mut section = format!("## {}\n\n", panel.title());

    let body = match panel {
        Panel::MonthlyTrend { metric, points } => trend_table(*metric, points, settings),
        Panel::TopSectors(sectors) => top_sectors_table(sectors, settings),
        Panel::StartupProfile(profile) => profile_table(profile),
        Panel::FundingRounds(rounds) => funding_rounds_table(rounds, settings),
        Panel::RecentInvestments(rows) => recent_investments_table(rows, settings),
        Panel::BiggestInvestments(totals) => biggest_investments_table(totals, settings),
        Panel::SectorBreakdown(sectors) => sector_breakdown_table(sectors, settings),
        Panel::TotalFunding(_)
        | Panel::MaxFunding(_)
        | Panel::AverageTicketSize(_)
        | Panel::FundedStartups(_) => String::new(),
    };

    if body.is_empty() {
        section.push_str("_No data._\n\n");
    } else {
        section.push_str(&body);
        section.push('\n');
    }

    section
}

fn trend_table(metric: TrendMetric, points: &[TrendPoint], settings: &ReportSettings) -> String {
    if points.is_empty() {
        return String::new();
    }

    let max = points.iter().map(|p| p.value).fold(0.0, f64::max);
    let label = metric.to_string();
    let mut table = chart_header(&["Month", label.as_str()], settings);

    for point in points {
        let value = match metric {
            TrendMetric::TotalFunding => format_amount(point.value, &settings.currency_unit),
            TrendMetric::InvestmentCount => format!("{:.0}", point.value),
        };
        table.push_str(&chart_row(&[point.period.clone(), value], point.value, max, settings));
    }

    table
}

fn top_sectors_table(sectors: &[SectorSummary], settings: &ReportSettings) -> String {
    if sectors.is_empty() {
        return String::new();
    }

    let totals: Vec<f64> = sectors.iter().map(|s| s.total_amount).collect();
    let shares = share_of_total(&totals);

    let mut table = String::new();
    table.push_str("| Sector | Total Funding | Investments | Share |\n");
    table.push_str("|:---|---:|---:|---:|\n");
    for (sector, share) in sectors.iter().zip(shares) {
        table.push_str(&format!(
            "| {} | {} | {} | {:.1}% |\n",
            cell(&sector.vertical),
            format_amount(sector.total_amount, &settings.currency_unit),
            sector.investments,
            share
        ));
    }

    table
}

fn profile_table(profile: &StartupProfile) -> String {
    let show = |field: &Option<String>| field.as_deref().map(cell).unwrap_or_else(|| "-".into());

    let mut table = String::new();
    table.push_str("| Location | Industry | Sub-vertical |\n");
    table.push_str("|:---:|:---:|:---:|\n");
    table.push_str(&format!(
        "| {} | {} | {} |\n",
        show(&profile.city),
        show(&profile.vertical),
        show(&profile.subvertical)
    ));

    table
}

fn funding_rounds_table(rounds: &[FundingRound], settings: &ReportSettings) -> String {
    if rounds.is_empty() {
        return String::new();
    }

    let mut table = String::new();
    table.push_str(&format!(
        "| Date | Funding Round | Amount ({}) | Investors |\n",
        settings.currency_unit
    ));
    table.push_str("|:---|:---|---:|:---|\n");
    for round in rounds {
        table.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            format_date(round.date),
            cell(&round.round),
            format_number(round.amount),
            cell(&round.investors)
        ));
    }

    table
}

fn recent_investments_table(rows: &[InvestmentRow], settings: &ReportSettings) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = String::new();
    table.push_str(&format!(
        "| Date | Startup | Sector | Amount ({}) |\n",
        settings.currency_unit
    ));
    table.push_str("|:---|:---|:---|---:|\n");
    for row in rows {
        table.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            format_date(row.date),
            cell(&row.startup),
            cell(&row.vertical),
            format_number(row.amount)
        ));
    }

    table
}

fn biggest_investments_table(totals: &[StartupTotal], settings: &ReportSettings) -> String {
    if totals.is_empty() {
        return String::new();
    }

    let max = totals.iter().map(|t| t.total_amount).fold(0.0, f64::max);
    let mut table = chart_header(&["Startup", "Total Funding"], settings);
    for total in totals {
        table.push_str(&chart_row(
            &[
                cell(&total.startup),
                format_amount(total.total_amount, &settings.currency_unit),
            ],
            total.total_amount,
            max,
            settings,
        ));
    }

    table
}

fn sector_breakdown_table(sectors: &[SectorTotal], settings: &ReportSettings) -> String {
    if sectors.is_empty() {
        return String::new();
    }

    let totals: Vec<f64> = sectors.iter().map(|s| s.total_amount).collect();
    let shares = share_of_total(&totals);

    let mut table = String::new();
    table.push_str("| Sector | Total Funding | Share |\n");
    table.push_str("|:---|---:|---:|\n");
    for (sector, share) in sectors.iter().zip(shares) {
        table.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            cell(&sector.vertical),
            format_amount(sector.total_amount, &settings.currency_unit),
            share
        ));
    }

    table
}

/// Header for a table whose last column may be a bar chart.
fn chart_header(columns: &[&str], settings: &ReportSettings) -> String {
    let mut names: Vec<&str> = columns.to_vec();
    let mut aligns = vec![":---"; columns.len()];
    if settings.include_charts {
        names.push("Chart");
        aligns.push(":---");
    }

    format!("| {} |\n|{}|\n", names.join(" | "), aligns.join("|"))
}

fn chart_row(cells: &[String], value: f64, max: f64, settings: &ReportSettings) -> String {
    let mut cells = cells.to_vec();
    if settings.include_charts {
        cells.push(format!("`{}`", text_bar(value, max, settings.bar_width)));
    }

    format!("| {} |\n", cells.join(" | "))
}

/// A bar of block characters scaled against `max`.
pub fn text_bar(value: f64, max: f64, width: usize) -> String {
    if width == 0 || max <= 0.0 || value <= 0.0 {
        return String::new();
    }

    let len = ((value / max) * width as f64).round() as usize;
    "█".repeat(len.clamp(1, width))
}

/// Amount with unit, no decimals: `"120 Cr"`.
pub fn format_amount(value: f64, unit: &str) -> String {
    if unit.is_empty() {
        format_number(value)
    } else {
        format!("{} {}", format_number(value), unit)
    }
}

fn format_number(value: f64) -> String {
    format!("{:.0}", value)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Escape a value for a Markdown table cell.
fn cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Markdown list of names, e.g. the startups or investors to choose from.
pub fn generate_name_list(title: &str, names: &[String]) -> String {
    let mut output = format!("## {} ({})\n\n", title, names.len());

    if names.is_empty() {
        output.push_str("_No data._\n");
    }
    for name in names {
        output.push_str(&format!("- {}\n", name));
    }

    output
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by fundscope*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::View;
    use crate::models::InvestorMatch;
    use chrono::Utc;

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            source: "startup_cleaned.csv".to_string(),
            generated_at: Utc::now(),
            records_loaded: 3,
            rows_skipped: 1,
            unknown_dates: 0,
            investor_match: InvestorMatch::Substring,
        }
    }

    fn overall_report() -> Report {
        Report {
            metadata: metadata(),
            view: DashboardView {
                title: "Overall Startup Funding Analysis".to_string(),
                view: View::Overall {
                    trend: TrendMetric::TotalFunding,
                },
                panels: vec![
                    Panel::TotalFunding(35.0),
                    Panel::MaxFunding(20.0),
                    Panel::AverageTicketSize(17.5),
                    Panel::FundedStartups(2),
                    Panel::MonthlyTrend {
                        metric: TrendMetric::TotalFunding,
                        points: vec![
                            TrendPoint {
                                period: "1-2020".to_string(),
                                year: 2020,
                                month: 1,
                                value: 15.0,
                            },
                            TrendPoint {
                                period: "2-2020".to_string(),
                                year: 2020,
                                month: 2,
                                value: 20.0,
                            },
                        ],
                    },
                    Panel::TopSectors(vec![
                        SectorSummary {
                            vertical: "Tech".to_string(),
                            total_amount: 30.0,
                            investments: 2,
                        },
                        SectorSummary {
                            vertical: "Health".to_string(),
                            total_amount: 5.0,
                            investments: 1,
                        },
                    ]),
                ],
            },
        }
    }

    #[test]
    fn test_generate_overall_markdown() {
        let markdown = generate_markdown_report(&overall_report(), &ReportSettings::default());

        assert!(markdown.contains("# Overall Startup Funding Analysis"));
        assert!(markdown.contains(
            "| Total Funding | Highest Funding | Average Ticket Size | Funded Startups |"
        ));
        assert!(markdown.contains("| 35 Cr | 20 Cr | 18 Cr | 2 |"));
        assert!(markdown.contains("## Funding Trends (Month-on-Month)"));
        assert!(markdown.contains("| 1-2020 | 15 Cr |"));
        assert!(markdown.contains("| Tech | 30 Cr | 2 | 85.7% |"));
        assert!(markdown.contains("- **Rows Skipped:** 1"));
        assert!(markdown.contains("- **Investor Matching:** substring"));
    }

    #[test]
    fn test_charts_can_be_disabled() {
        let settings = ReportSettings {
            include_charts: false,
            ..ReportSettings::default()
        };
        let markdown = generate_markdown_report(&overall_report(), &settings);

        assert!(!markdown.contains("█"));
        assert!(markdown.contains("| Month | Total Funding |\n"));
    }

    #[test]
    fn test_empty_panels_render_no_data() {
        let view = DashboardView {
            title: "Nobody Details".to_string(),
            view: View::Startup {
                name: "Nobody".to_string(),
            },
            panels: vec![
                Panel::StartupProfile(StartupProfile::default()),
                Panel::FundingRounds(Vec::new()),
            ],
        };

        let markdown = generate_view_markdown(&view, &ReportSettings::default());
        assert!(markdown.contains("| - | - | - |"));
        assert!(markdown.contains("## Funding Rounds\n\n_No data._"));
    }

    #[test]
    fn test_funding_rounds_unknown_date_and_escaping() {
        let table = funding_rounds_table(
            &[FundingRound {
                date: None,
                round: "Seed".to_string(),
                amount: 12.4,
                investors: "A | B".to_string(),
            }],
            &ReportSettings::default(),
        );

        assert!(table.contains("| Date | Funding Round | Amount (Cr) | Investors |"));
        assert!(table.contains("| Unknown | Seed | 12 | A \\| B |"));
    }

    #[test]
    fn test_text_bar() {
        assert_eq!(text_bar(10.0, 10.0, 4), "████");
        assert_eq!(text_bar(5.0, 10.0, 4), "██");
        assert_eq!(text_bar(0.1, 10.0, 4), "█");
        assert_eq!(text_bar(0.0, 10.0, 4), "");
        assert_eq!(text_bar(5.0, 0.0, 4), "");
    }

    #[test]
    fn test_zero_bar_width_renders_empty_bars() {
        assert_eq!(text_bar(5.0, 10.0, 0), "");

        let settings = ReportSettings {
            bar_width: 0,
            ..ReportSettings::default()
        };
        let view = DashboardView {
            title: "Sequoia Capital Details".to_string(),
            view: View::Investor {
                name: "Sequoia Capital".to_string(),
            },
            panels: vec![Panel::BiggestInvestments(vec![StartupTotal {
                startup: "Zomato".to_string(),
                total_amount: 50.0,
            }])],
        };

        let markdown = generate_view_markdown(&view, &settings);
        assert!(markdown.contains("| Zomato | 50 Cr | `` |"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234.6, "Cr"), "1235 Cr");
        assert_eq!(format_amount(0.0, ""), "0");
    }

    #[test]
    fn test_generate_name_list() {
        let list = generate_name_list("Investors", &["Accel".to_string(), "Sequoia".to_string()]);
        assert!(list.starts_with("## Investors (2)"));
        assert!(list.contains("- Accel\n"));
        assert!(generate_name_list("Startups", &[]).contains("_No data._"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&overall_report()).unwrap();

        assert!(json.contains("\"source\""));
        assert!(json.contains("\"panels\""));
        assert!(json.contains("\"total_funding\""));
        assert!(json.contains("\"kind\": \"overall\""));
    }
}
