pub mod countdown;
pub mod engine;
pub mod watcher;

pub use countdown::DEADLINE_PASSED;
pub use engine::{parse_deadline, AlertFlags, AlertThreshold, DeadlineMonitor};
pub use watcher::{spawn, WatcherHandle, DEFAULT_TICK_PERIOD};
