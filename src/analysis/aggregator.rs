//! Funding aggregation queries.
//!
//! Every function here is a pure read over a slice of records. Empty input
//! or an unknown name yields zero or an empty list, never an error.

use crate::models::{
    FundingRecord, FundingRound, InvestmentRow, InvestorMatch, SectorSummary, SectorTotal,
    StartupProfile, StartupTotal, TrendMetric, TrendPoint,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Sum of all amounts.
pub fn total_funding(records: &[FundingRecord]) -> f64 {
    records.iter().map(|r| r.amount).sum()
}

/// Largest single amount, 0 for an empty table.
pub fn max_funding(records: &[FundingRecord]) -> f64 {
    records.iter().map(|r| r.amount).fold(0.0, f64::max)
}

/// Average total raised per funded startup.
///
/// Amounts are summed per startup first and the per-startup totals are
/// averaged. This is not the mean round size.
pub fn average_ticket_size(records: &[FundingRecord]) -> f64 {
    let totals = sum_by_key(records.iter(), |r| r.startup.as_str());
    if totals.is_empty() {
        return 0.0;
    }

    let sum: f64 = totals.iter().map(|(_, total, _)| total).sum();
    sum / totals.len() as f64
}

/// Number of distinct startups.
pub fn funded_startup_count(records: &[FundingRecord]) -> usize {
    records
        .iter()
        .map(|r| r.startup.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Month-on-month trend in chronological order.
///
/// Records with an unknown date are left out.
pub fn monthly_trend(records: &[FundingRecord], metric: TrendMetric) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();

    for record in records {
        if let (Some(year), Some(month)) = (record.year(), record.month()) {
            let bucket = buckets.entry((year, month)).or_default();
            bucket.0 += record.amount;
            bucket.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|((year, month), (sum, count))| TrendPoint {
            period: format!("{}-{}", month, year),
            year,
            month,
            value: match metric {
                TrendMetric::TotalFunding => sum,
                TrendMetric::InvestmentCount => count as f64,
            },
        })
        .collect()
}

/// Top `n` sectors by total funding, with their record counts.
pub fn top_sectors(records: &[FundingRecord], n: usize) -> Vec<SectorSummary> {
    let mut sectors: Vec<SectorSummary> = sum_by_key(with_vertical(records.iter()), |r| {
        r.vertical.as_str()
    })
    .into_iter()
    .map(|(vertical, total_amount, investments)| SectorSummary {
        vertical: vertical.to_string(),
        total_amount,
        investments,
    })
    .collect();

    sectors.sort_by(|a, b| cmp_amount_desc(a.total_amount, b.total_amount));
    sectors.truncate(n);
    sectors
}

/// Location and sector of a startup, first known value per field.
pub fn startup_profile(records: &[FundingRecord], name: &str) -> StartupProfile {
    let mut profile = StartupProfile::default();

    for record in records.iter().filter(|r| r.startup == name) {
        if profile.city.is_none() {
            profile.city = record.city.clone();
        }
        if profile.vertical.is_none() && !record.vertical.is_empty() {
            profile.vertical = Some(record.vertical.clone());
        }
        if profile.subvertical.is_none() {
            profile.subvertical = record.subvertical.clone();
        }
    }

    profile
}

/// A startup's funding rounds, newest first, unknown dates last.
pub fn funding_rounds(records: &[FundingRecord], name: &str) -> Vec<FundingRound> {
    let mut rows: Vec<&FundingRecord> = records.iter().filter(|r| r.startup == name).collect();
    rows.sort_by(|a, b| cmp_date_desc(a, b));

    rows.into_iter()
        .map(|r| FundingRound {
            date: r.date(),
            round: r.round.clone(),
            amount: r.amount,
            investors: r.investors.clone(),
        })
        .collect()
}

/// All startup names, sorted.
pub fn list_startups(records: &[FundingRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.startup.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Every individual investor name in the table.
pub fn list_investors(records: &[FundingRecord]) -> BTreeSet<String> {
    records
        .iter()
        .flat_map(|r| r.investor_names())
        .map(String::from)
        .collect()
}

/// Records that mention `investor`, in table order.
pub fn investments_of<'a>(
    records: &'a [FundingRecord],
    investor: &str,
    mode: InvestorMatch,
) -> Vec<&'a FundingRecord> {
    records
        .iter()
        .filter(|r| r.mentions_investor(investor, mode))
        .collect()
}

/// The `k` most recent investments of `investor`.
pub fn recent_investments(
    records: &[FundingRecord],
    investor: &str,
    k: usize,
    mode: InvestorMatch,
) -> Vec<InvestmentRow> {
    let mut rows = investments_of(records, investor, mode);
    rows.sort_by(|a, b| cmp_date_desc(a, b));

    rows.into_iter()
        .take(k)
        .map(|r| InvestmentRow {
            date: r.date(),
            startup: r.startup.clone(),
            vertical: r.vertical.clone(),
            amount: r.amount,
        })
        .collect()
}

/// The `k` startups that received the most from `investor`.
pub fn biggest_investments(
    records: &[FundingRecord],
    investor: &str,
    k: usize,
    mode: InvestorMatch,
) -> Vec<StartupTotal> {
    let rows = investments_of(records, investor, mode);

    let mut totals: Vec<StartupTotal> = sum_by_key(rows.into_iter(), |r| r.startup.as_str())
        .into_iter()
        .map(|(startup, total_amount, _)| StartupTotal {
            startup: startup.to_string(),
            total_amount,
        })
        .collect();

    totals.sort_by(|a, b| cmp_amount_desc(a.total_amount, b.total_amount));
    totals.truncate(k);
    totals
}

/// Amount `investor` put into each sector, largest first.
pub fn sector_breakdown(
    records: &[FundingRecord],
    investor: &str,
    mode: InvestorMatch,
) -> Vec<SectorTotal> {
    let rows = investments_of(records, investor, mode);

    let mut sectors: Vec<SectorTotal> =
        sum_by_key(with_vertical(rows.into_iter()), |r| r.vertical.as_str())
            .into_iter()
            .map(|(vertical, total_amount, _)| SectorTotal {
                vertical: vertical.to_string(),
                total_amount,
            })
            .collect();

    sectors.sort_by(|a, b| cmp_amount_desc(a.total_amount, b.total_amount));
    sectors
}

/// Percentage share of each value in their total.
pub fn share_of_total(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return vec![0.0; values.len()];
    }

    values.iter().map(|v| v / total * 100.0).collect()
}

/// Group by key, keeping first-seen order: (key, amount sum, row count).
fn sum_by_key<'a, I, F>(records: I, key: F) -> Vec<(&'a str, f64, usize)>
where
    I: Iterator<Item = &'a FundingRecord>,
    F: Fn(&'a FundingRecord) -> &'a str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, f64, usize)> = Vec::new();

    for record in records {
        let k = key(record);
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push((k, 0.0, 0));
            groups.len() - 1
        });
        groups[slot].1 += record.amount;
        groups[slot].2 += 1;
    }

    groups
}

/// Records with a missing sector do not form a sector group.
fn with_vertical<'a>(
    records: impl Iterator<Item = &'a FundingRecord>,
) -> impl Iterator<Item = &'a FundingRecord> {
    records.filter(|r| !r.vertical.is_empty())
}

fn cmp_amount_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Newest date first; unknown dates after every known one.
fn cmp_date_desc(a: &FundingRecord, b: &FundingRecord) -> Ordering {
    match (a.date(), b.date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
