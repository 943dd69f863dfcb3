//! Async driver for the deadline monitor.
//!
//! One tokio task per watcher, ticking the engine at a fixed period and
//! forwarding events to an injected sink. The handle owns the shutdown
//! channel: `stop()` cancels the pending tick before the task joins, so a
//! stale tick can never fire after teardown or against a replacement
//! watcher's state. Changing the deadline means stopping the watcher and
//! spawning a new one from the returned engine.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::engine::DeadlineMonitor;
use crate::error::{CoreError, Result};
use crate::events::Event;

/// Default evaluation period: one second of wall-clock time.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle for a running watcher task.
pub struct WatcherHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<DeadlineMonitor>,
}

impl WatcherHandle {
    /// Request shutdown and wait for the task to finish, returning the
    /// engine with its final flag state.
    pub async fn stop(self) -> Result<DeadlineMonitor> {
        let _ = self.shutdown.send(true);
        self.join
            .await
            .map_err(|e| CoreError::Custom(format!("watcher task failed: {e}")))
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Spawn a watcher over `monitor`, delivering events to `sink`.
///
/// Every tick produces zero or more `ThresholdCrossed` events followed by
/// one `Snapshot` carrying the countdown display. The first evaluation
/// happens immediately, so a monitor already inside a threshold window
/// alerts without waiting a full period. A final `WatcherStopped` event is
/// delivered on shutdown.
pub fn spawn<S>(mut monitor: DeadlineMonitor, tick_period: Duration, mut sink: S) -> WatcherHandle
where
    S: FnMut(Event) + Send + 'static,
{
    let (shutdown, mut stop_rx) = watch::channel(false);
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(tick_period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Utc::now();
                    for event in monitor.tick_at(now) {
                        sink(event);
                    }
                    sink(monitor.snapshot_at(now));
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }
        sink(Event::WatcherStopped { at: Utc::now() });
        monitor
    });
    WatcherHandle { shutdown, join }
}
