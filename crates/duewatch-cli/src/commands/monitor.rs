use clap::Subcommand;
use duewatch_core::storage::{Config, Database};
use duewatch_core::{DeadlineMonitor, Event, Task};

#[derive(Subcommand)]
pub enum MonitorAction {
    /// Run one evaluation tick and print newly crossed alerts
    Check {
        /// Task ID
        id: String,
    },
    /// Print monitor state as JSON without ticking
    Status {
        /// Task ID
        id: String,
    },
    /// Clear persisted one-shot alert flags
    Reset {
        /// Task ID
        id: String,
    },
}

pub(crate) fn monitor_key(task_id: &str) -> String {
    format!("monitor:{task_id}")
}

/// Load the persisted monitor for a task, or build a fresh one. The stored
/// state is re-synced against the task: a changed deadline resets the
/// one-shot flags, a status change carries over as-is.
pub(crate) fn load_monitor(db: &Database, task: &Task) -> DeadlineMonitor {
    let mut monitor = db
        .kv_get(&monitor_key(&task.id))
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str::<DeadlineMonitor>(&json).ok())
        .unwrap_or_else(|| DeadlineMonitor::new(&task.deadline, task.status));
    monitor.set_deadline(&task.deadline);
    monitor.set_status(task.status);
    monitor
}

pub(crate) fn save_monitor(
    db: &Database,
    task_id: &str,
    monitor: &DeadlineMonitor,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(monitor)?;
    db.kv_set(&monitor_key(task_id), &json)?;
    Ok(())
}

fn find_task(db: &Database, id: &str) -> Result<Task, Box<dyn std::error::Error>> {
    db.get_task(id)?
        .ok_or_else(|| format!("no such task: {id}").into())
}

pub fn run(action: MonitorAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();

    match action {
        MonitorAction::Check { id } => {
            let task = find_task(&db, &id)?;
            let mut monitor = load_monitor(&db, &task);
            for event in monitor.tick() {
                if let Event::ThresholdCrossed { message, .. } = &event {
                    if config.notifications.enabled {
                        eprintln!("{message}");
                    }
                }
            }
            println!("{}", serde_json::to_string_pretty(&monitor.snapshot())?);
            save_monitor(&db, &task.id, &monitor)?;
        }
        MonitorAction::Status { id } => {
            let task = find_task(&db, &id)?;
            let monitor = load_monitor(&db, &task);
            println!("{}", serde_json::to_string_pretty(&monitor.snapshot())?);
        }
        MonitorAction::Reset { id } => {
            db.kv_delete(&monitor_key(&id))?;
            eprintln!("Monitor state cleared: {id}");
        }
    }

    Ok(())
}
