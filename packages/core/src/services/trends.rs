//! Trends Aggregation
//!
//! Pure summaries over the log journal: time-range filtering, per-day series
//! for charts, per-category totals, and the calendar grouping helpers. All
//! grouping uses the local calendar day of the log timestamp.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

use crate::models::{TrainingNode, WorkoutLog};

/// Category color too pale to read on chart surfaces.
const PALE_CATEGORY_COLOR: &str = "#e2e8f0";
/// Readable replacement used wherever the pale color would be drawn.
const PALE_CATEGORY_REMAP: &str = "#94a3b8";

/// Lookback window for trend queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeRange {
    Month,
    Quarter,
    Year,
    All,
}

impl TimeRange {
    pub const ALL_RANGES: [TimeRange; 4] = [
        TimeRange::Month,
        TimeRange::Quarter,
        TimeRange::Year,
        TimeRange::All,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Month => "1M",
            TimeRange::Quarter => "3M",
            TimeRange::Year => "1Y",
            TimeRange::All => "ALL",
        }
    }

    fn days(&self) -> Option<i64> {
        match self {
            TimeRange::Month => Some(31),
            TimeRange::Quarter => Some(90),
            TimeRange::Year => Some(365),
            TimeRange::All => None,
        }
    }

    /// Inclusive lower bound for logs in this range, or `None` for ALL.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|days| now - Duration::days(days))
    }

    pub fn contains(&self, logged_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.cutoff(now) {
            Some(cutoff) => logged_at >= cutoff,
            None => true,
        }
    }
}

/// Aggregated volume for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTotals {
    pub date: NaiveDate,
    /// Per-node subtotals, keyed by node id.
    pub by_node: BTreeMap<String, f64>,
    pub total: f64,
}

/// Group logs within `range` by calendar day, ascending by date.
pub fn daily_series(logs: &[WorkoutLog], range: TimeRange, now: DateTime<Utc>) -> Vec<DayTotals> {
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for log in logs {
        if !range.contains(log.logged_at, now) {
            continue;
        }
        let date = log.logged_at.date_naive();
        let day = days.entry(date).or_insert_with(|| DayTotals {
            date,
            by_node: BTreeMap::new(),
            total: 0.0,
        });
        *day.by_node.entry(log.node_id.clone()).or_insert(0.0) += log.value;
        day.total += log.value;
    }
    days.into_values().collect()
}

/// Total training volume attributed to one top-level category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub id: String,
    pub name: String,
    pub color: String,
    pub value: f64,
}

/// Sum log volume per level-1 category over `range`. Each log resolves
/// upward to its category ancestor; dangling references count nowhere.
/// Categories with zero volume are dropped. Order follows the tree.
pub fn category_series(
    tree: &TrainingNode,
    logs: &[WorkoutLog],
    range: TimeRange,
    now: DateTime<Utc>,
) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for log in logs {
        if !range.contains(log.logged_at, now) {
            continue;
        }
        if let Some(category) = tree.category_of(&log.node_id) {
            *totals.entry(category.id.clone()).or_insert(0.0) += log.value;
        }
    }

    tree.children
        .iter()
        .flatten()
        .filter_map(|category| {
            let value = totals.get(&category.id).copied().unwrap_or(0.0);
            if value <= 0.0 {
                return None;
            }
            Some(CategoryTotal {
                id: category.id.clone(),
                name: category.name.clone(),
                color: readable_color(&category.color),
                value,
            })
        })
        .collect()
}

/// The category with the highest volume in `range`. Ties keep the first
/// category in tree order.
pub fn top_category(
    tree: &TrainingNode,
    logs: &[WorkoutLog],
    range: TimeRange,
    now: DateTime<Utc>,
) -> Option<CategoryTotal> {
    category_series(tree, logs, range, now)
        .into_iter()
        .reduce(|best, next| if next.value > best.value { next } else { best })
}

fn readable_color(color: &str) -> String {
    if color.eq_ignore_ascii_case(PALE_CATEGORY_COLOR) {
        PALE_CATEGORY_REMAP.to_string()
    } else {
        color.to_string()
    }
}

/// Group logs by calendar day, newest day first, entries within a day in
/// journal order. Backs the calendar and history views.
pub fn logs_by_day(logs: &[WorkoutLog]) -> Vec<(NaiveDate, Vec<&WorkoutLog>)> {
    let mut days: BTreeMap<NaiveDate, Vec<&WorkoutLog>> = BTreeMap::new();
    for log in logs {
        days.entry(log.logged_at.date_naive()).or_default().push(log);
    }
    days.into_iter().rev().collect()
}

/// Flattened list of loggable exercises (hierarchy leaves), optionally
/// filtered by a case-insensitive name query. Synthetic add ids are
/// excluded.
pub fn exercise_options<'a>(tree: &'a TrainingNode, query: &str) -> Vec<&'a TrainingNode> {
    let needle = query.to_lowercase();
    tree.leaves()
        .into_iter()
        .filter(|leaf| !leaf.id.starts_with("add-"))
        .filter(|leaf| needle.is_empty() || leaf.name.to_lowercase().contains(&needle))
        .collect()
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Weekday column (0 = Sunday) of the first day of the month containing
/// `date`, for laying out a month grid.
pub fn first_weekday_of_month(date: NaiveDate) -> u32 {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .map(|first| match first.weekday() {
            Weekday::Sun => 0,
            day => day.number_from_monday(),
        })
        .unwrap_or(0)
}
