//! Deadline monitor implementation.
//!
//! The monitor is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically (the async [`watcher`](super::watcher) does this at a
//! fixed period).
//!
//! ## Alert semantics
//!
//! Three one-shot thresholds are checked on every tick, coarsest first:
//! one week, one day, one hour. Each fires at most once per distinct
//! deadline value. All three are evaluated on the same tick, so a monitor
//! created 30 minutes before its deadline fires all three alerts on its
//! first evaluation, in week -> day -> hour order.
//!
//! ## Usage
//!
//! ```ignore
//! let mut monitor = DeadlineMonitor::new("2026-09-01T12:00:00Z", TaskStatus::Pending);
//! // In a loop:
//! for event in monitor.tick() {
//!     // Event::ThresholdCrossed carries the alert message.
//! }
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::task::TaskStatus;

pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const DAY_MS: i64 = 24 * HOUR_MS;
pub const WEEK_MS: i64 = 7 * DAY_MS;

/// Fixed alert checkpoints, ordered coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertThreshold {
    Week,
    Day,
    Hour,
}

impl AlertThreshold {
    /// Evaluation order per tick: week, then day, then hour.
    pub const ALL: [AlertThreshold; 3] = [
        AlertThreshold::Week,
        AlertThreshold::Day,
        AlertThreshold::Hour,
    ];

    /// Remaining-time window at or below which this threshold fires.
    pub fn window_ms(self) -> i64 {
        match self {
            AlertThreshold::Week => WEEK_MS,
            AlertThreshold::Day => DAY_MS,
            AlertThreshold::Hour => HOUR_MS,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            AlertThreshold::Week => "Less than one week remaining to complete the task!",
            AlertThreshold::Day => "Less than one day remaining to complete the task!",
            AlertThreshold::Hour => "Less than one hour remaining to complete the task!",
        }
    }
}

/// One-shot firing state, one flag per threshold.
///
/// Flags only move false -> true while a deadline value is in effect;
/// replacing the deadline resets all three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFlags {
    pub week_fired: bool,
    pub day_fired: bool,
    pub hour_fired: bool,
}

impl AlertFlags {
    pub fn fired(&self, threshold: AlertThreshold) -> bool {
        match threshold {
            AlertThreshold::Week => self.week_fired,
            AlertThreshold::Day => self.day_fired,
            AlertThreshold::Hour => self.hour_fired,
        }
    }

    fn mark(&mut self, threshold: AlertThreshold) {
        match threshold {
            AlertThreshold::Week => self.week_fired = true,
            AlertThreshold::Day => self.day_fired = true,
            AlertThreshold::Hour => self.hour_fired = true,
        }
    }

    pub fn any(&self) -> bool {
        self.week_fired || self.day_fired || self.hour_fired
    }
}

/// Core deadline monitor.
///
/// Operates on wall-clock deltas -- no internal thread. The caller is
/// responsible for calling `tick()` periodically. All evaluation methods
/// have `_at(now)` variants so tests control the clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineMonitor {
    /// Deadline as supplied by the host. Kept raw so an unparseable value
    /// degrades to "already passed" instead of an error.
    deadline_raw: String,
    #[serde(default)]
    deadline: Option<DateTime<Utc>>,
    status: TaskStatus,
    #[serde(default)]
    flags: AlertFlags,
}

impl DeadlineMonitor {
    pub fn new(deadline: &str, status: TaskStatus) -> Self {
        Self {
            deadline_raw: deadline.to_string(),
            deadline: parse_deadline(deadline),
            status,
            flags: AlertFlags::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn deadline_raw(&self) -> &str {
        &self.deadline_raw
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn flags(&self) -> AlertFlags {
        self.flags
    }

    /// Milliseconds until the deadline at `now`. `None` means the deadline
    /// never parsed; callers treat that the same as a non-positive value.
    pub fn remaining_ms_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.deadline
            .map(|deadline| (deadline - now).num_milliseconds())
    }

    /// Countdown display at `now`: `HH:MM:SS` with unbounded hours, or
    /// `"Deadline passed"` once remaining time is non-positive.
    pub fn countdown_at(&self, now: DateTime<Utc>) -> String {
        super::countdown::render(self.remaining_ms_at(now))
    }

    pub fn countdown(&self) -> String {
        self.countdown_at(Utc::now())
    }

    /// Build a full state snapshot event.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            status: self.status,
            remaining_ms: self.remaining_ms_at(now),
            countdown: self.countdown_at(now),
            week_fired: self.flags.week_fired,
            day_fired: self.flags.day_fired,
            hour_fired: self.flags.hour_fired,
            at: now,
        }
    }

    pub fn snapshot(&self) -> Event {
        self.snapshot_at(Utc::now())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the deadline. A new value resets all three one-shot flags
    /// and restarts monitoring; supplying the identical value is a no-op.
    pub fn set_deadline(&mut self, deadline: &str) -> Option<Event> {
        if deadline == self.deadline_raw {
            return None;
        }
        self.deadline_raw = deadline.to_string();
        self.deadline = parse_deadline(deadline);
        self.flags = AlertFlags::default();
        Some(Event::DeadlineChanged {
            deadline: self.deadline_raw.clone(),
            at: Utc::now(),
        })
    }

    /// Update the task status. Transition into `Completed` suspends all
    /// further checks without clearing already-fired flags.
    pub fn set_status(&mut self, status: TaskStatus) -> Option<Event> {
        if status == self.status {
            return None;
        }
        self.status = status;
        Some(Event::StatusChanged {
            status,
            at: Utc::now(),
        })
    }

    /// One evaluation against the clock `now`. Returns a
    /// `ThresholdCrossed` event for every threshold newly crossed, in
    /// week -> day -> hour order.
    ///
    /// No events are produced when the task is completed, the deadline has
    /// passed, or the deadline never parsed.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.status == TaskStatus::Completed {
            return Vec::new();
        }
        let remaining = match self.remaining_ms_at(now) {
            Some(remaining) if remaining > 0 => remaining,
            _ => return Vec::new(),
        };

        let mut events = Vec::new();
        for threshold in AlertThreshold::ALL {
            if !self.flags.fired(threshold) && remaining <= threshold.window_ms() {
                self.flags.mark(threshold);
                events.push(Event::ThresholdCrossed {
                    threshold,
                    message: threshold.message().to_string(),
                    remaining_ms: remaining,
                    at: now,
                });
            }
        }
        events
    }

    /// Call periodically. Wall-clock variant of [`tick_at`](Self::tick_at).
    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(Utc::now())
    }
}

/// Lenient deadline parsing: RFC 3339 first, then the date / datetime-local
/// shapes a host form typically submits. Naive values are taken as UTC.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
