//! Audit-readiness countdowns for named compliance-audit windows.
//!
//! Purely a date subtraction; classification never touches this module.
//! The sign convention is the contract the presentation layer relies on:
//! `days_to_start` is positive before the start day, zero on it, and
//! negative once the window has begun.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::report::BoardError;

/// A named audit program's scheduled window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AuditWindow {
    pub fn validate(&self, name: &str) -> Result<(), BoardError> {
        if self.end < self.start {
            return Err(BoardError::InvalidConfig {
                field: format!("audits.{name}"),
                detail: format!("end {} precedes start {}", self.end, self.start),
            });
        }
        Ok(())
    }
}

/// Derived countdown for one audit window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditCountdown {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days_to_start: i64,
}

/// Compute the day-delta countdown for one audit window.
pub fn countdown(name: &str, window: &AuditWindow, today: NaiveDate) -> AuditCountdown {
    AuditCountdown {
        name: name.to_string(),
        start: window.start,
        end: window.end,
        days_to_start: (window.start - today).num_days(),
    }
}
