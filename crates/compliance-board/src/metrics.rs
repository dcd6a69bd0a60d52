//! Derived-metrics value types: the immutable output of one aggregation run.
//!
//! Built fresh per invocation and never partially updated. Percentage
//! helpers guard the zero-total case so no input can produce a division by
//! zero or a value outside 0..=100.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::audit::AuditCountdown;

/// Headline counters for the whole board or one panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    /// Every marked slot, regardless of classification.
    pub total_planned: u64,
    pub completed: u64,
    /// Overdue-classified slots dated within the due-soon window.
    pub due_soon: u64,
    /// Overdue-classified slots whose date has already passed.
    pub missed: u64,
    /// Overdue-classified slots not yet past (includes due-soon and undated).
    pub open_overdue: u64,
    /// `round(completed / total_planned * 100)`, 0 when nothing is planned.
    pub compliance_score: u8,
}

impl Kpis {
    pub(crate) fn finalize_score(&mut self) {
        self.compliance_score = rounded_pct(self.completed, self.total_planned);
    }
}

/// One missed deadline, ordered by date in the missed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedEntry {
    pub task: String,
    pub period_label: String,
    pub date: NaiveDate,
    pub days_overdue: u64,
}

/// One upcoming deadline inside the due-soon window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEntry {
    pub task: String,
    pub period_label: String,
    pub date: NaiveDate,
    pub days_until: u64,
}

/// Per-month counters for charting. Only months with a marked slot appear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub completed: u64,
    /// Overdue-classified but not yet past the deadline.
    pub overdue: u64,
    pub missed_after_deadline: u64,
}

/// Completion breakdown for one task inside a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskBreakdown {
    pub label: String,
    pub planned: u64,
    pub completed: u64,
}

/// Sub-aggregate over the tasks matching one panel's predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelReport {
    pub name: String,
    pub kpis: Kpis,
    /// Earliest not-yet-completed slot dated today or later.
    pub next: Option<UpcomingEntry>,
    pub subtasks: Vec<SubtaskBreakdown>,
}

/// One heatmap row: raw counts for the week starting at `week_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRow {
    pub week_start: NaiveDate,
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub missed: u64,
}

impl WeeklyRow {
    pub fn completed_pct(&self) -> u8 {
        rounded_pct(self.completed, self.total)
    }

    pub fn pending_pct(&self) -> u8 {
        rounded_pct(self.pending, self.total)
    }

    pub fn missed_pct(&self) -> u8 {
        rounded_pct(self.missed, self.total)
    }
}

/// The full dashboard computed from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub kpis: Kpis,
    pub missed_list: Vec<MissedEntry>,
    pub upcoming_list: Vec<UpcomingEntry>,
    pub month_buckets: BTreeMap<String, MonthBucket>,
    pub panels: Vec<PanelReport>,
    pub weekly: Vec<WeeklyRow>,
    pub audits: BTreeMap<String, AuditCountdown>,
}

impl DerivedMetrics {
    /// The defined placeholder rendered when the snapshot is unavailable:
    /// all-zero KPIs, empty lists, no panel or audit entries.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// `round(part / total * 100)` in integer arithmetic; 0 when `total` is 0.
pub(crate) fn rounded_pct(part: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let scaled = (u128::from(part) * 200 + u128::from(total)) / (2 * u128::from(total));
    scaled.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn rounded_pct_zero_total_is_zero() {
        assert_eq!(rounded_pct(0, 0), 0);
        assert_eq!(rounded_pct(5, 0), 0);
    }

    #[test]
    fn rounded_pct_rounds_to_nearest() {
        assert_eq!(rounded_pct(1, 3), 33);
        assert_eq!(rounded_pct(2, 3), 67);
        assert_eq!(rounded_pct(1, 2), 50);
        assert_eq!(rounded_pct(3, 4), 75);
        assert_eq!(rounded_pct(4, 4), 100);
    }

    #[test]
    fn finalize_score_uses_planned_denominator() {
        let mut kpis = Kpis {
            total_planned: 4,
            completed: 3,
            ..Kpis::default()
        };
        kpis.finalize_score();
        assert_eq!(kpis.compliance_score, 75);

        let mut empty = Kpis::default();
        empty.finalize_score();
        assert_eq!(empty.compliance_score, 0);
    }

    #[test]
    fn weekly_row_percentages_guard_zero_total() {
        let row = WeeklyRow {
            week_start: date("2024-03-11"),
            total: 0,
            completed: 0,
            pending: 0,
            missed: 0,
        };
        assert_eq!(row.completed_pct(), 0);
        assert_eq!(row.pending_pct(), 0);
        assert_eq!(row.missed_pct(), 0);
    }

    #[test]
    fn weekly_row_percentages() {
        let row = WeeklyRow {
            week_start: date("2024-03-11"),
            total: 3,
            completed: 2,
            pending: 1,
            missed: 0,
        };
        assert_eq!(row.completed_pct(), 67);
        assert_eq!(row.pending_pct(), 33);
        assert_eq!(row.missed_pct(), 0);
    }

    #[test]
    fn unavailable_is_all_zero() {
        let metrics = DerivedMetrics::unavailable();
        assert_eq!(metrics.kpis, Kpis::default());
        assert!(metrics.missed_list.is_empty());
        assert!(metrics.upcoming_list.is_empty());
        assert!(metrics.month_buckets.is_empty());
        assert!(metrics.panels.is_empty());
        assert!(metrics.weekly.is_empty());
        assert!(metrics.audits.is_empty());
    }
}
