//! Color classification and slot marking detection.
//!
//! Sheet fill colors vary by source, so the classifier matches against
//! configurable equivalence sets rather than a fixed enumeration. Unknown
//! colors degrade to [`ColorClass::Neutral`]; nothing here can fail.
//!
//! Key behaviors:
//! - Inputs are normalized (trim + ASCII lowercase) before comparison.
//! - The completed set is checked before the overdue set, so a color
//!   mistakenly present in both resolves to `Completed`.
//! - A slot is *marked* iff it carries annotation text or a non-white fill;
//!   unmarked slots are invisible to every downstream aggregate.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::snapshot::Slot;

/// Spellings that all mean "no fill". Absent and empty values count too.
const WHITE_EQUIVALENTS: &[&str] = &["#fff", "#ffffff", "white", "transparent", "none"];

/// Semantic category of a slot's fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorClass {
    Completed,
    OverdueCandidate,
    Neutral,
}

impl ColorClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::OverdueCandidate => "overdue_candidate",
            Self::Neutral => "neutral",
        }
    }
}

/// Configurable color equivalence sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRules {
    pub completed: BTreeSet<String>,
    pub overdue: BTreeSet<String>,
}

impl Default for ColorRules {
    fn default() -> Self {
        Self {
            completed: ["#00ff00", "#00b050", "#92d050"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            overdue: ["#ff0000", "#c00000", "#ff5050"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl ColorRules {
    /// Canonical form used for every color comparison.
    pub fn normalize(value: &str) -> String {
        value.trim().to_ascii_lowercase()
    }

    /// Map a raw fill color to its semantic category.
    ///
    /// Completed wins over overdue when a color appears in both sets.
    /// Absent, empty, and unrecognized values are `Neutral`.
    pub fn classify(&self, value: Option<&str>) -> ColorClass {
        let Some(raw) = value else {
            return ColorClass::Neutral;
        };
        let normalized = Self::normalize(raw);
        if normalized.is_empty() {
            return ColorClass::Neutral;
        }
        if set_contains(&self.completed, &normalized) {
            return ColorClass::Completed;
        }
        if set_contains(&self.overdue, &normalized) {
            return ColorClass::OverdueCandidate;
        }
        ColorClass::Neutral
    }
}

// Entries are normalized at comparison time so caller-supplied sets do not
// have to be pre-normalized.
fn set_contains(set: &BTreeSet<String>, normalized: &str) -> bool {
    set.iter()
        .any(|entry| ColorRules::normalize(entry) == normalized)
}

/// Whether a fill color means "no fill at all".
pub fn is_white_equivalent(value: Option<&str>) -> bool {
    let Some(raw) = value else {
        return true;
    };
    let normalized = ColorRules::normalize(raw);
    normalized.is_empty() || WHITE_EQUIVALENTS.contains(&normalized.as_str())
}

/// Whether a slot represents an actually-planned unit of work.
///
/// Text alone marks a slot even with no fill; a fill alone marks it even
/// with no text. Only the true default (no color, no text) is excluded.
pub fn is_marked(slot: &Slot) -> bool {
    let has_text = slot
        .text
        .as_deref()
        .is_some_and(|text| !text.trim().is_empty());
    has_text || !is_white_equivalent(slot.fill_color.as_deref())
}
