//! Relative-time evaluation against a single per-run reference date.
//!
//! The reference date is fixed once per aggregation run, truncated to day
//! precision in UTC. Every downstream decision asks this module the same
//! two questions: is a date already past, and is it within the due-soon
//! window. Absent or malformed dates are "undated": neither past nor within
//! any future window.
//!
//! Key behaviors:
//! - `is_past` is strict: a slot dated today is not overdue.
//! - `is_within_window` is inclusive at both ends, computed by calendar-day
//!   addition with no time-of-day component.

use chrono::{Datelike, Days, NaiveDate, Utc};

/// Reference date for one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalContext {
    today: NaiveDate,
}

impl TemporalContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Fix the reference date to the current UTC day.
    ///
    /// Computed once here so a run stays internally date-consistent even if
    /// it crosses a local midnight while executing.
    pub fn for_today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Strict `%Y-%m-%d` parse; anything else is undated.
    pub fn parse_slot_date(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
    }

    /// Whether a date is strictly before the reference date.
    pub fn is_past(&self, date: NaiveDate) -> bool {
        date < self.today
    }

    /// Whether `today <= date <= today + window_days`, inclusive both ends.
    pub fn is_within_window(&self, date: NaiveDate, window_days: u32) -> bool {
        if date < self.today {
            return false;
        }
        match self.today.checked_add_days(Days::new(u64::from(window_days))) {
            Some(end) => date <= end,
            None => true,
        }
    }

    /// Whole days the reference date is past `date`. Positive for past dates.
    pub fn days_overdue(&self, date: NaiveDate) -> i64 {
        (self.today - date).num_days()
    }

    /// Whole days until `date`. Zero when the date is today.
    pub fn days_until(&self, date: NaiveDate) -> i64 {
        (date - self.today).num_days()
    }
}

/// Monday of the ISO week containing `date`, used for heatmap grouping.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn ctx() -> TemporalContext {
        TemporalContext::new(date("2024-03-15"))
    }

    #[test]
    fn parse_rejects_malformed_dates() {
        assert_eq!(TemporalContext::parse_slot_date("2024-03-11"), Some(date("2024-03-11")));
        assert_eq!(TemporalContext::parse_slot_date(" 2024-03-11 "), Some(date("2024-03-11")));
        assert!(TemporalContext::parse_slot_date("03/11/2024").is_none());
        assert!(TemporalContext::parse_slot_date("2024-13-40").is_none());
        assert!(TemporalContext::parse_slot_date("").is_none());
    }

    #[test]
    fn is_past_is_strict() {
        let ctx = ctx();
        assert!(ctx.is_past(date("2024-03-14")));
        assert!(!ctx.is_past(date("2024-03-15")));
        assert!(!ctx.is_past(date("2024-03-16")));
    }

    #[test]
    fn window_is_inclusive_at_both_ends() {
        let ctx = ctx();
        assert!(ctx.is_within_window(date("2024-03-15"), 30));
        assert!(ctx.is_within_window(date("2024-04-14"), 30));
        assert!(!ctx.is_within_window(date("2024-04-15"), 30));
        assert!(!ctx.is_within_window(date("2024-03-14"), 30));
    }

    #[test]
    fn zero_window_means_due_today_only() {
        let ctx = ctx();
        assert!(ctx.is_within_window(date("2024-03-15"), 0));
        assert!(!ctx.is_within_window(date("2024-03-16"), 0));
    }

    #[test]
    fn day_deltas() {
        let ctx = ctx();
        assert_eq!(ctx.days_overdue(date("2024-03-12")), 3);
        assert_eq!(ctx.days_until(date("2024-03-20")), 5);
        assert_eq!(ctx.days_until(date("2024-03-15")), 0);
    }

    #[test]
    fn week_start_is_monday() {
        // 2024-03-15 is a Friday.
        assert_eq!(week_start(date("2024-03-15")), date("2024-03-11"));
        assert_eq!(week_start(date("2024-03-11")), date("2024-03-11"));
        assert_eq!(week_start(date("2024-03-17")), date("2024-03-11"));
    }
}
