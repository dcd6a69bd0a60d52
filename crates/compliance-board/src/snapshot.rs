//! Snapshot data model for the compliance tracker grid.
//!
//! One snapshot is a full extraction of the tracker: an ordered list of
//! tasks, each owning an ordered row of scheduled slots, plus the period
//! column headers and pass-through source metadata. The aggregation engine
//! only ever reads a snapshot; nothing here is mutated after ingest.
//!
//! Key behaviors:
//! - Wire names are camelCase; the fill color accepts the legacy `bg` key
//!   still emitted by older extractors.
//! - Missing `tasks` / `weekCols` deserialize as empty sequences so a sparse
//!   upload aggregates to an all-zero dashboard instead of failing.
//! - The retrieval envelope carries a top-level `ok` flag; `ok = false`
//!   surfaces as [`BoardError::SnapshotUnavailable`] and the engine is never
//!   invoked on the payload.

use serde::{Deserialize, Serialize};

use crate::report::BoardError;

pub const SNAPSHOT_COMPONENT: &str = "snapshot_ingest";

/// One scheduled cell for one task in one time period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Fill color as extracted from the sheet. Absent means neutral/white.
    #[serde(default, alias = "bg", skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Free-form annotation typed into the cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Calendar date of the period, ISO `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub month_name: String,
    #[serde(default)]
    pub week_of_month: u32,
}

impl Slot {
    /// Display key for this slot's period, e.g. `March W2 (2024-03-11)`.
    pub fn period_label(&self) -> String {
        let month = self.month_name.trim();
        match self.date.as_deref() {
            Some(date) if !date.is_empty() => {
                format!("{month} W{} ({date})", self.week_of_month)
            }
            _ => format!("{month} W{}", self.week_of_month),
        }
    }
}

/// A named unit of recurring compliance work and its scheduled slots.
///
/// Slot order is chronological period order as supplied by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "cells")]
    pub slots: Vec<Slot>,
}

/// One period column header, used only for display ordering downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodColumn {
    #[serde(default)]
    pub month_name: String,
    #[serde(default)]
    pub week_of_month: u32,
}

/// Origin file stamp, passed through to the publication unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub updated_iso: String,
}

/// Extraction metadata, opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    #[serde(default)]
    pub sheet_name: String,
    #[serde(default)]
    pub extracted_at_iso: String,
}

/// The full tracker extraction handed to the aggregation engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub week_cols: Vec<PeriodColumn>,
    #[serde(default)]
    pub source_file: SourceFile,
    #[serde(default)]
    pub meta: SnapshotMeta,
}

/// Retrieval-boundary shape: success flag plus the snapshot fields.
///
/// On failure the payload carries an error description instead of data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEnvelope {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

impl SnapshotEnvelope {
    /// Unwrap the envelope, surfacing an upstream failure as a typed error.
    pub fn into_snapshot(self) -> Result<Snapshot, BoardError> {
        if self.ok {
            Ok(self.snapshot)
        } else {
            Err(BoardError::SnapshotUnavailable {
                reason: self
                    .error
                    .unwrap_or_else(|| "unknown upstream error".to_string()),
            })
        }
    }
}
