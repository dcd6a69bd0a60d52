//! Caller-facing configuration surface for the aggregation engine.
//!
//! Everything has a default and everything is overridable: the color
//! equivalence sets, the due-soon window length, the panel categories with
//! their task-label predicates, and the named audit windows.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::audit::AuditWindow;
use crate::classify::ColorRules;
use crate::report::BoardError;

fn normalize_label(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Default due-soon window in days. Some deployments override this to 14.
pub const DEFAULT_DUE_SOON_WINDOW_DAYS: u32 = 30;

/// One named panel category and its task-matching predicate.
///
/// A task belongs to the panel when its normalized label contains any of
/// the keywords. Panels may overlap or leave tasks uncategorized; each is
/// an independent re-aggregation, not a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub name: String,
    pub keywords: Vec<String>,
}

impl PanelConfig {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn matches(&self, label: &str) -> bool {
        let label = normalize_label(label);
        self.keywords
            .iter()
            .any(|keyword| label.contains(&normalize_label(keyword)))
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub color_rules: ColorRules,
    pub due_soon_window_days: u32,
    pub panels: Vec<PanelConfig>,
    pub audits: BTreeMap<String, AuditWindow>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            color_rules: ColorRules::default(),
            due_soon_window_days: DEFAULT_DUE_SOON_WINDOW_DAYS,
            panels: vec![
                PanelConfig::new("training", &["training"]),
                PanelConfig::new("staffing", &["staffing"]),
                PanelConfig::new("inspections", &["inspection"]),
            ],
            audits: BTreeMap::new(),
        }
    }
}

impl BoardConfig {
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut seen = BTreeSet::new();
        for panel in &self.panels {
            if panel.name.trim().is_empty() {
                return Err(BoardError::InvalidConfig {
                    field: "panels[].name".to_string(),
                    detail: "must not be empty".to_string(),
                });
            }
            if !seen.insert(panel.name.clone()) {
                return Err(BoardError::InvalidConfig {
                    field: "panels[].name".to_string(),
                    detail: format!("duplicate panel `{}`", panel.name),
                });
            }
            if panel.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(BoardError::InvalidConfig {
                    field: format!("panels.{}.keywords", panel.name),
                    detail: "must contain at least one non-empty keyword".to_string(),
                });
            }
        }
        for (name, window) in &self.audits {
            if name.trim().is_empty() {
                return Err(BoardError::InvalidConfig {
                    field: "audits".to_string(),
                    detail: "audit name must not be empty".to_string(),
                });
            }
            window.validate(name)?;
        }
        Ok(())
    }
}
