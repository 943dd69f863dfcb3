//! # Duewatch Core Library
//!
//! This library provides the core logic for Duewatch, a deadline
//! countdown and alerting tool. All operations are available via a
//! standalone CLI binary; any GUI host would be a thin layer over the
//! same core library.
//!
//! ## Architecture
//!
//! - **Deadline Monitor**: a wall-clock-based state machine that requires
//!   the caller to periodically invoke `tick()`; three one-shot alert
//!   thresholds (week / day / hour) fire at most once per deadline value
//! - **Watcher**: async driver ticking a monitor at a fixed period, with
//!   deterministic cancellation through its handle
//! - **Storage**: SQLite-based task storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`DeadlineMonitor`]: core threshold/countdown state machine
//! - [`WatcherHandle`]: cancellation handle for a running watcher
//! - [`Database`]: task and monitor-state persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod monitor;
pub mod storage;
pub mod task;

pub use error::{ConfigError, CoreError, DatabaseError};
pub use events::Event;
pub use monitor::{AlertFlags, AlertThreshold, DeadlineMonitor, WatcherHandle};
pub use storage::{Config, Database};
pub use task::{Task, TaskStatus};
