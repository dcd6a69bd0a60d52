//! The aggregation engine: one pass from snapshot to derived metrics.
//!
//! A pure function of (snapshot, reference date, config). It mutates no
//! shared state and allocates a fresh result per call, so callers may
//! invoke it repeatedly and concurrently without debouncing.
//!
//! Key behaviors:
//! - Unmarked slots are skipped entirely; they exist in no count.
//! - Each marked slot lands in exactly one of completed / missed /
//!   open-overdue; neutral-but-marked slots count toward planned only.
//! - Missed and upcoming lists are sorted ascending by date, ties kept in
//!   input order.
//! - Panels are independent re-aggregations over predicate-selected tasks,
//!   so panel sums need not equal the global totals.
//! - Undated slots are excluded from every date-gated bucket but still
//!   counted where color alone is sufficient.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::audit::countdown;
use crate::classify::{self, ColorClass};
use crate::config::{BoardConfig, PanelConfig};
use crate::metrics::{
    DerivedMetrics, Kpis, MissedEntry, MonthBucket, PanelReport, SubtaskBreakdown, UpcomingEntry,
    WeeklyRow,
};
use crate::snapshot::{Slot, Snapshot, Task};
use crate::temporal::{TemporalContext, week_start};

pub const ENGINE_COMPONENT: &str = "aggregation_engine";

/// Disjoint classification of one marked slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotStatus {
    Completed,
    Missed {
        date: NaiveDate,
        days_overdue: u64,
    },
    OpenOverdue {
        due_soon: bool,
    },
    PlannedOnly,
}

#[derive(Debug, Clone, Copy)]
struct SlotEval {
    status: SlotStatus,
    date: Option<NaiveDate>,
}

/// Classify one slot, or `None` when the slot is unmarked.
fn evaluate_slot(slot: &Slot, clock: &TemporalContext, config: &BoardConfig) -> Option<SlotEval> {
    if !classify::is_marked(slot) {
        return None;
    }
    let date = slot
        .date
        .as_deref()
        .and_then(TemporalContext::parse_slot_date);
    let status = match config.color_rules.classify(slot.fill_color.as_deref()) {
        ColorClass::Completed => SlotStatus::Completed,
        ColorClass::OverdueCandidate => match date {
            Some(date) if clock.is_past(date) => SlotStatus::Missed {
                date,
                days_overdue: clock.days_overdue(date) as u64,
            },
            _ => SlotStatus::OpenOverdue {
                due_soon: date
                    .is_some_and(|d| clock.is_within_window(d, config.due_soon_window_days)),
            },
        },
        ColorClass::Neutral => SlotStatus::PlannedOnly,
    };
    Some(SlotEval { status, date })
}

#[derive(Debug, Clone, Copy, Default)]
struct WeekCounts {
    completed: u64,
    pending: u64,
    missed: u64,
}

/// Fold a whole snapshot into one immutable [`DerivedMetrics`] value.
pub fn aggregate(
    snapshot: &Snapshot,
    clock: &TemporalContext,
    config: &BoardConfig,
) -> DerivedMetrics {
    let mut kpis = Kpis::default();
    let mut missed_list: Vec<MissedEntry> = Vec::new();
    let mut upcoming_list: Vec<UpcomingEntry> = Vec::new();
    let mut month_buckets: BTreeMap<String, MonthBucket> = BTreeMap::new();
    let mut weeks: BTreeMap<NaiveDate, WeekCounts> = BTreeMap::new();

    for task in &snapshot.tasks {
        for slot in &task.slots {
            let Some(eval) = evaluate_slot(slot, clock, config) else {
                continue;
            };
            kpis.total_planned += 1;

            let month = slot.month_name.trim();
            let bucket = (!month.is_empty())
                .then(|| month_buckets.entry(month.to_string()).or_default());

            if let Some(date) = eval.date {
                let week = weeks.entry(week_start(date)).or_default();
                match eval.status {
                    SlotStatus::Completed => week.completed += 1,
                    SlotStatus::Missed { .. } => week.missed += 1,
                    _ => week.pending += 1,
                }
            }

            match eval.status {
                SlotStatus::Completed => {
                    kpis.completed += 1;
                    if let Some(bucket) = bucket {
                        bucket.completed += 1;
                    }
                }
                SlotStatus::Missed { date, days_overdue } => {
                    kpis.missed += 1;
                    if let Some(bucket) = bucket {
                        bucket.missed_after_deadline += 1;
                    }
                    missed_list.push(MissedEntry {
                        task: task.label.clone(),
                        period_label: slot.period_label(),
                        date,
                        days_overdue,
                    });
                }
                SlotStatus::OpenOverdue { due_soon } => {
                    kpis.open_overdue += 1;
                    if let Some(bucket) = bucket {
                        bucket.overdue += 1;
                    }
                    if due_soon && let Some(date) = eval.date {
                        kpis.due_soon += 1;
                        upcoming_list.push(UpcomingEntry {
                            task: task.label.clone(),
                            period_label: slot.period_label(),
                            date,
                            days_until: clock.days_until(date) as u64,
                        });
                    }
                }
                SlotStatus::PlannedOnly => {}
            }
        }
    }

    kpis.finalize_score();

    // sort_by_key is stable, so equal dates keep input order.
    missed_list.sort_by_key(|entry| entry.date);
    upcoming_list.sort_by_key(|entry| entry.date);

    let weekly = weeks
        .into_iter()
        .map(|(week_start, counts)| WeeklyRow {
            week_start,
            total: counts.completed + counts.pending + counts.missed,
            completed: counts.completed,
            pending: counts.pending,
            missed: counts.missed,
        })
        .collect();

    let panels = config
        .panels
        .iter()
        .map(|panel| aggregate_panel(panel, snapshot, clock, config))
        .collect();

    let audits = config
        .audits
        .iter()
        .map(|(name, window)| (name.clone(), countdown(name, window, clock.today())))
        .collect();

    DerivedMetrics {
        kpis,
        missed_list,
        upcoming_list,
        month_buckets,
        panels,
        weekly,
        audits,
    }
}

/// Re-derive the same counts restricted to the tasks matching one panel.
fn aggregate_panel(
    panel: &PanelConfig,
    snapshot: &Snapshot,
    clock: &TemporalContext,
    config: &BoardConfig,
) -> PanelReport {
    let mut kpis = Kpis::default();
    let mut next: Option<UpcomingEntry> = None;
    let mut subtasks: Vec<SubtaskBreakdown> = Vec::new();

    for task in snapshot.tasks.iter().filter(|t| panel.matches(&t.label)) {
        let (planned, completed) = fold_panel_task(task, clock, config, &mut kpis, &mut next);
        if planned > 0 {
            subtasks.push(SubtaskBreakdown {
                label: task.label.clone(),
                planned,
                completed,
            });
        }
    }

    kpis.finalize_score();
    PanelReport {
        name: panel.name.clone(),
        kpis,
        next,
        subtasks,
    }
}

fn fold_panel_task(
    task: &Task,
    clock: &TemporalContext,
    config: &BoardConfig,
    kpis: &mut Kpis,
    next: &mut Option<UpcomingEntry>,
) -> (u64, u64) {
    let mut planned = 0u64;
    let mut completed = 0u64;

    for slot in &task.slots {
        let Some(eval) = evaluate_slot(slot, clock, config) else {
            continue;
        };
        planned += 1;
        kpis.total_planned += 1;

        match eval.status {
            SlotStatus::Completed => {
                completed += 1;
                kpis.completed += 1;
            }
            SlotStatus::Missed { .. } => kpis.missed += 1,
            SlotStatus::OpenOverdue { due_soon } => {
                kpis.open_overdue += 1;
                if due_soon {
                    kpis.due_soon += 1;
                }
            }
            SlotStatus::PlannedOnly => {}
        }

        // Earliest not-yet-completed slot dated today or later. Unlike the
        // upcoming list this is not window-gated: the next work item should
        // show even when it is months out.
        if !matches!(eval.status, SlotStatus::Completed)
            && let Some(date) = eval.date
            && !clock.is_past(date)
            && next.as_ref().is_none_or(|current| date < current.date)
        {
            *next = Some(UpcomingEntry {
                task: task.label.clone(),
                period_label: slot.period_label(),
                date,
                days_until: clock.days_until(date) as u64,
            });
        }
    }

    (planned, completed)
}
