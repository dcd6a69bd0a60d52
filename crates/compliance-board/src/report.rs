//! Deterministic dashboard publication.
//!
//! Wraps one aggregation run into a versioned, content-identified artifact:
//! the derived metrics, the pass-through source metadata, the effective
//! configuration, and the structured events emitted along the way. Same
//! snapshot + same reference date + same config → byte-identical artifact
//! and the same `board_id`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::BoardConfig;
use crate::engine::{ENGINE_COMPONENT, aggregate};
use crate::metrics::DerivedMetrics;
use crate::snapshot::{SNAPSHOT_COMPONENT, SnapshotEnvelope, SnapshotMeta, SourceFile};
use crate::temporal::TemporalContext;

pub const BOARD_COMPONENT: &str = "board_report";
pub const BOARD_SCHEMA_VERSION: &str = "compliance-board.dashboard.v1";

const ERROR_UNAVAILABLE: &str = "CB-BOARD-1001";
const ERROR_INVALID_CONFIG: &str = "CB-BOARD-1002";
const ERROR_SERIALIZATION: &str = "CB-BOARD-1003";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("snapshot unavailable: {reason}")]
    SnapshotUnavailable { reason: String },
    #[error("invalid config field `{field}`: {detail}")]
    InvalidConfig { field: String, detail: String },
    #[error("serialization failure: {0}")]
    SerializationFailure(String),
}

impl BoardError {
    pub fn stable_code(&self) -> &'static str {
        match self {
            Self::SnapshotUnavailable { .. } => ERROR_UNAVAILABLE,
            Self::InvalidConfig { .. } => ERROR_INVALID_CONFIG,
            Self::SerializationFailure(_) => ERROR_SERIALIZATION,
        }
    }
}

/// One structured log record embedded in the publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEvent {
    pub component: String,
    pub event: String,
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn make_event(component: &str, event: &str, outcome: &str, detail: Option<String>) -> BoardEvent {
    BoardEvent {
        component: component.to_string(),
        event: event.to_string(),
        outcome: outcome.to_string(),
        error_code: None,
        detail,
    }
}

/// The published dashboard artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPublication {
    pub schema_version: String,
    pub board_id: String,
    pub generated_on: NaiveDate,
    pub source_file: SourceFile,
    pub meta: SnapshotMeta,
    pub config: BoardConfig,
    pub metrics: DerivedMetrics,
    pub events: Vec<BoardEvent>,
}

// The id is derived over everything except itself and the event trail.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnsignedBoardPublication<'a> {
    schema_version: &'a str,
    generated_on: NaiveDate,
    source_file: &'a SourceFile,
    meta: &'a SnapshotMeta,
    config: &'a BoardConfig,
    metrics: &'a DerivedMetrics,
}

impl BoardPublication {
    pub fn to_json_pretty(&self) -> Result<String, BoardError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| BoardError::SerializationFailure(err.to_string()))
    }

    pub fn to_markdown_report(&self) -> String {
        let mut out = String::new();
        out.push_str("# Compliance Board\n\n");
        out.push_str(&format!("- Board ID: `{}`\n", self.board_id));
        out.push_str(&format!("- Generated On: `{}`\n", self.generated_on));
        if !self.source_file.name.is_empty() {
            out.push_str(&format!(
                "- Source: `{}` (updated {})\n",
                self.source_file.name, self.source_file.updated_iso
            ));
        }
        if !self.meta.sheet_name.is_empty() {
            out.push_str(&format!(
                "- Sheet: `{}` (extracted {})\n",
                self.meta.sheet_name, self.meta.extracted_at_iso
            ));
        }
        out.push('\n');

        let kpis = &self.metrics.kpis;
        out.push_str("## KPIs\n\n");
        out.push_str("| Planned | Completed | Due Soon | Missed | Score |\n");
        out.push_str("|---:|---:|---:|---:|---:|\n");
        out.push_str(&format!(
            "| {} | {} | {} | {} | {}% |\n\n",
            kpis.total_planned, kpis.completed, kpis.due_soon, kpis.missed, kpis.compliance_score
        ));

        if !self.metrics.panels.is_empty() {
            out.push_str("## Panels\n\n");
            out.push_str("| Panel | Planned | Completed | Missed | Score | Next |\n");
            out.push_str("|---|---:|---:|---:|---:|---|\n");
            for panel in &self.metrics.panels {
                let next = panel
                    .next
                    .as_ref()
                    .map(|n| n.period_label.clone())
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {}% | {} |\n",
                    panel.name,
                    panel.kpis.total_planned,
                    panel.kpis.completed,
                    panel.kpis.missed,
                    panel.kpis.compliance_score,
                    next
                ));
            }
            out.push('\n');
        }

        if !self.metrics.missed_list.is_empty() {
            out.push_str("## Missed Deadlines\n\n");
            for entry in &self.metrics.missed_list {
                out.push_str(&format!(
                    "- **{}** — {} ({} days overdue)\n",
                    entry.task, entry.period_label, entry.days_overdue
                ));
            }
            out.push('\n');
        }

        if !self.metrics.upcoming_list.is_empty() {
            out.push_str("## Due Soon\n\n");
            for entry in &self.metrics.upcoming_list {
                out.push_str(&format!(
                    "- **{}** — {} (in {} days)\n",
                    entry.task, entry.period_label, entry.days_until
                ));
            }
            out.push('\n');
        }

        if !self.metrics.audits.is_empty() {
            out.push_str("## Audits\n\n");
            out.push_str("| Audit | Start | End | Days To Start |\n");
            out.push_str("|---|---|---|---:|\n");
            for countdown in self.metrics.audits.values() {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    countdown.name, countdown.start, countdown.end, countdown.days_to_start
                ));
            }
            out.push('\n');
        }

        out
    }
}

/// Validate the config, unwrap the envelope, aggregate, and publish.
///
/// An envelope with `ok = false` short-circuits with
/// [`BoardError::SnapshotUnavailable`]; the caller renders
/// [`DerivedMetrics::unavailable`] in that case.
pub fn publish_board(
    envelope: SnapshotEnvelope,
    today: NaiveDate,
    config: &BoardConfig,
) -> Result<BoardPublication, BoardError> {
    config.validate()?;

    let snapshot = envelope.into_snapshot()?;
    let clock = TemporalContext::new(today);

    let mut events = vec![make_event(
        BOARD_COMPONENT,
        "board_publication_started",
        "pass",
        None,
    )];
    events.push(make_event(
        SNAPSHOT_COMPONENT,
        "snapshot_ingested",
        "pass",
        Some(format!(
            "tasks={} week_cols={}",
            snapshot.tasks.len(),
            snapshot.week_cols.len()
        )),
    ));

    let metrics = aggregate(&snapshot, &clock, config);
    events.push(make_event(
        ENGINE_COMPONENT,
        "slots_aggregated",
        "pass",
        Some(format!(
            "planned={} completed={} missed={} due_soon={}",
            metrics.kpis.total_planned,
            metrics.kpis.completed,
            metrics.kpis.missed,
            metrics.kpis.due_soon
        )),
    ));

    let unsigned = UnsignedBoardPublication {
        schema_version: BOARD_SCHEMA_VERSION,
        generated_on: today,
        source_file: &snapshot.source_file,
        meta: &snapshot.meta,
        config,
        metrics: &metrics,
    };
    let payload = serde_json::to_vec(&unsigned)
        .map_err(|err| BoardError::SerializationFailure(err.to_string()))?;
    let board_id = derive_board_id(&payload);

    events.push(make_event(
        BOARD_COMPONENT,
        "board_publication_published",
        "pass",
        Some(format!("board_id={board_id}")),
    ));

    Ok(BoardPublication {
        schema_version: BOARD_SCHEMA_VERSION.to_string(),
        board_id,
        generated_on: today,
        source_file: snapshot.source_file,
        meta: snapshot.meta,
        config: config.clone(),
        metrics,
        events,
    })
}

fn derive_board_id(payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    let mut short = String::with_capacity(30);
    for byte in &digest[..12] {
        short.push_str(&format!("{byte:02x}"));
    }
    format!("board-{short}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Slot, Snapshot, Task};

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn envelope(tasks: Vec<Task>) -> SnapshotEnvelope {
        SnapshotEnvelope {
            ok: true,
            error: None,
            snapshot: Snapshot {
                tasks,
                source_file: SourceFile {
                    name: "tracker.xlsx".to_string(),
                    updated_iso: "2024-03-10T08:00:00Z".to_string(),
                },
                meta: SnapshotMeta {
                    sheet_name: "2024".to_string(),
                    extracted_at_iso: "2024-03-10T08:05:00Z".to_string(),
                },
                ..Snapshot::default()
            },
        }
    }

    fn one_task() -> Vec<Task> {
        vec![Task {
            label: "Fire drill".to_string(),
            slots: vec![Slot {
                fill_color: Some("#00ff00".to_string()),
                date: Some("2024-03-11".to_string()),
                month_name: "March".to_string(),
                week_of_month: 2,
                ..Slot::default()
            }],
        }]
    }

    #[test]
    fn failed_envelope_surfaces_unavailable_with_stable_code() {
        let failed = SnapshotEnvelope {
            ok: false,
            error: Some("fetch timed out".to_string()),
            snapshot: Snapshot::default(),
        };
        let err = publish_board(failed, date("2024-03-15"), &BoardConfig::default()).unwrap_err();
        assert_eq!(err.stable_code(), "CB-BOARD-1001");
        assert!(err.to_string().contains("fetch timed out"));
    }

    #[test]
    fn invalid_config_is_rejected_before_aggregation() {
        let config = BoardConfig {
            panels: vec![crate::config::PanelConfig::new("", &["x"])],
            ..BoardConfig::default()
        };
        let err = publish_board(envelope(Vec::new()), date("2024-03-15"), &config).unwrap_err();
        assert_eq!(err.stable_code(), "CB-BOARD-1002");
    }

    #[test]
    fn identical_inputs_yield_identical_board_id() {
        let config = BoardConfig::default();
        let first = publish_board(envelope(one_task()), date("2024-03-15"), &config).unwrap();
        let second = publish_board(envelope(one_task()), date("2024-03-15"), &config).unwrap();
        assert_eq!(first.board_id, second.board_id);
        assert_eq!(first, second);
    }

    #[test]
    fn different_reference_date_changes_board_id() {
        let config = BoardConfig::default();
        let first = publish_board(envelope(one_task()), date("2024-03-15"), &config).unwrap();
        let second = publish_board(envelope(one_task()), date("2024-03-16"), &config).unwrap();
        assert_ne!(first.board_id, second.board_id);
    }

    #[test]
    fn metadata_passes_through_unchanged() {
        let publication =
            publish_board(envelope(one_task()), date("2024-03-15"), &BoardConfig::default())
                .unwrap();
        assert_eq!(publication.source_file.name, "tracker.xlsx");
        assert_eq!(publication.meta.sheet_name, "2024");
        assert_eq!(publication.meta.extracted_at_iso, "2024-03-10T08:05:00Z");
    }

    #[test]
    fn events_cover_every_stage() {
        let publication =
            publish_board(envelope(one_task()), date("2024-03-15"), &BoardConfig::default())
                .unwrap();
        let names: Vec<&str> = publication.events.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "board_publication_started",
                "snapshot_ingested",
                "slots_aggregated",
                "board_publication_published",
            ]
        );
        assert!(publication.events.iter().all(|e| e.outcome == "pass"));
    }

    #[test]
    fn markdown_report_shows_kpis_and_source() {
        let publication =
            publish_board(envelope(one_task()), date("2024-03-15"), &BoardConfig::default())
                .unwrap();
        let markdown = publication.to_markdown_report();
        assert!(markdown.contains("# Compliance Board"));
        assert!(markdown.contains("tracker.xlsx"));
        assert!(markdown.contains("| 1 | 1 | 0 | 0 | 100% |"));
    }

    #[test]
    fn json_round_trips() {
        let publication =
            publish_board(envelope(one_task()), date("2024-03-15"), &BoardConfig::default())
                .unwrap();
        let json = publication.to_json_pretty().unwrap();
        let parsed: BoardPublication = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, publication);
    }
}
