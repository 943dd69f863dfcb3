use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::monitor::AlertThreshold;
use crate::task::TaskStatus;

/// Every observable monitor effect is an Event. The CLI prints them;
/// the watcher delivers them to the injected sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Remaining time dropped at or below a threshold for the first time
    /// under the current deadline value.
    ThresholdCrossed {
        threshold: AlertThreshold,
        message: String,
        remaining_ms: i64,
        at: DateTime<Utc>,
    },
    /// Deadline replaced; one-shot flags were reset.
    DeadlineChanged {
        deadline: String,
        at: DateTime<Utc>,
    },
    StatusChanged {
        status: TaskStatus,
        at: DateTime<Utc>,
    },
    /// Full monitor state, emitted once per watcher tick and by `snapshot()`.
    StateSnapshot {
        status: TaskStatus,
        /// `None` when the deadline never parsed.
        remaining_ms: Option<i64>,
        countdown: String,
        week_fired: bool,
        day_fired: bool,
        hour_fired: bool,
        at: DateTime<Utc>,
    },
    WatcherStopped {
        at: DateTime<Utc>,
    },
}
