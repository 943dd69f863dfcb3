use std::future::Future;
use std::io::Write;
use std::time::Duration;

use clap::Args;
use duewatch_core::monitor::{spawn, WatcherHandle};
use duewatch_core::storage::{Config, Database};
use duewatch_core::{DeadlineMonitor, Event};

use super::monitor::{load_monitor, save_monitor};

#[derive(Args)]
pub struct WatchArgs {
    /// Task ID
    pub id: String,
    /// Evaluation period in seconds (defaults to monitor.tick_secs)
    #[arg(long)]
    pub interval: Option<u64>,
}

/// Live countdown loop. Renders the countdown in place on stdout, writes
/// alert messages to stderr, and stops cleanly on Ctrl-C, persisting the
/// one-shot flag state.
pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let task = db
        .get_task(&args.id)?
        .ok_or_else(|| format!("no such task: {}", args.id))?;
    let monitor = load_monitor(&db, &task);

    let tick_secs = args.interval.unwrap_or(config.monitor.tick_secs).max(1);
    let notifications = config.notifications.enabled;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result: Result<DeadlineMonitor, Box<dyn std::error::Error>> = runtime
        .block_on(async move {
            let handle = spawn(monitor, Duration::from_secs(tick_secs), move |event| {
                match event {
                    Event::ThresholdCrossed { message, .. } => {
                        if notifications {
                            eprintln!("\n{message}");
                        }
                    }
                    Event::StateSnapshot { countdown, .. } => {
                        print!("\r{countdown}    ");
                        let _ = std::io::stdout().flush();
                    }
                    _ => {}
                }
            });

            watch_until(handle, tokio::signal::ctrl_c()).await
        });
    let monitor = result?;

    println!();
    save_monitor(&db, &task.id, &monitor)?;
    eprintln!("Watch stopped: {}", task.id);
    Ok(())
}

/// Wait for the shutdown trigger, then stop the watcher. The handle is
/// stopped even when waiting fails, so the one-shot flag state always makes
/// it back to the caller for persistence.
async fn watch_until<F>(
    handle: WatcherHandle,
    wait: F,
) -> Result<DeadlineMonitor, Box<dyn std::error::Error>>
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = wait.await {
        eprintln!("warning: failed to wait for shutdown signal: {e}");
    }
    handle.stop().await.map_err(Into::into)
}
