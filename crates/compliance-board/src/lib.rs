#![forbid(unsafe_code)]
//! Deterministic compliance-dashboard aggregation.
//!
//! Takes one immutable snapshot of a calendar-style compliance tracker
//! (tasks × scheduled slots with fill colors, annotations, and dates) and
//! folds it into derived metrics: KPIs, missed/upcoming deadline lists,
//! monthly buckets, per-category panels, a weekly heatmap, and audit
//! countdowns. The whole pipeline is a pure function of
//! (snapshot, reference date, config); it performs no I/O and always
//! returns a well-formed result.

pub mod audit;
pub mod classify;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod report;
pub mod snapshot;
pub mod temporal;

pub use audit::{AuditCountdown, AuditWindow, countdown};
pub use classify::{ColorClass, ColorRules, is_marked, is_white_equivalent};
pub use config::{BoardConfig, DEFAULT_DUE_SOON_WINDOW_DAYS, PanelConfig};
pub use engine::aggregate;
pub use metrics::{
    DerivedMetrics, Kpis, MissedEntry, MonthBucket, PanelReport, SubtaskBreakdown, UpcomingEntry,
    WeeklyRow,
};
pub use report::{BOARD_SCHEMA_VERSION, BoardError, BoardEvent, BoardPublication, publish_board};
pub use snapshot::{
    PeriodColumn, Slot, Snapshot, SnapshotEnvelope, SnapshotMeta, SourceFile, Task,
};
pub use temporal::{TemporalContext, week_start};
