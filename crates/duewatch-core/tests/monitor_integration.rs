//! End-to-end monitor scenarios driven with a synthetic clock, plus
//! watcher behavior over a recording sink.

use chrono::{DateTime, Duration, TimeZone, Utc};
use duewatch_core::monitor::{spawn, DeadlineMonitor};
use duewatch_core::{AlertThreshold, Event, TaskStatus};
use std::sync::{Arc, Mutex};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 27, 9, 0, 0).unwrap()
}

fn crossed(events: &[Event]) -> Vec<AlertThreshold> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ThresholdCrossed { threshold, .. } => Some(*threshold),
            _ => None,
        })
        .collect()
}

#[test]
fn nothing_fires_outside_the_week_window() {
    let start = now();
    let mut monitor =
        DeadlineMonitor::new(&(start + Duration::days(8)).to_rfc3339(), TaskStatus::Pending);

    // A full day of ticks, one per second would be excessive; sample hourly.
    for hour in 0..24 {
        assert!(monitor.tick_at(start + Duration::hours(hour)).is_empty());
    }
    assert!(!monitor.flags().any());
}

#[test]
fn thresholds_fire_progressively_as_time_advances() {
    let start = now();
    let mut monitor =
        DeadlineMonitor::new(&(start + Duration::days(8)).to_rfc3339(), TaskStatus::Pending);

    // Crossing into the week window.
    let events = monitor.tick_at(start + Duration::days(1) + Duration::seconds(1));
    assert_eq!(crossed(&events), vec![AlertThreshold::Week]);

    // Inside the day window: only the day alert is new.
    let events = monitor.tick_at(start + Duration::days(7) + Duration::hours(2));
    assert_eq!(crossed(&events), vec![AlertThreshold::Day]);

    // Inside the hour window: only the hour alert is new.
    let events = monitor.tick_at(start + Duration::days(8) - Duration::minutes(30));
    assert_eq!(crossed(&events), vec![AlertThreshold::Hour]);

    // Everything fired; later ticks are silent.
    assert!(monitor
        .tick_at(start + Duration::days(8) - Duration::minutes(10))
        .is_empty());
}

#[test]
fn thirty_minute_scenario_fires_all_three_in_order() {
    let start = now();
    let mut monitor = DeadlineMonitor::new(
        &(start + Duration::minutes(30)).to_rfc3339(),
        TaskStatus::Pending,
    );

    let events = monitor.tick_at(start + Duration::seconds(1));
    assert_eq!(
        crossed(&events),
        vec![AlertThreshold::Week, AlertThreshold::Day, AlertThreshold::Hour]
    );
    let messages: Vec<String> = events
        .iter()
        .filter_map(|event| match event {
            Event::ThresholdCrossed { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        messages,
        vec![
            "Less than one week remaining to complete the task!",
            "Less than one day remaining to complete the task!",
            "Less than one hour remaining to complete the task!",
        ]
    );
    assert!(monitor
        .countdown_at(start + Duration::seconds(1))
        .starts_with("00:29:5"));
}

#[test]
fn passed_deadline_renders_literal_and_stays_silent() {
    let start = now();
    let mut monitor = DeadlineMonitor::new(
        &(start - Duration::seconds(10)).to_rfc3339(),
        TaskStatus::Pending,
    );
    assert_eq!(monitor.countdown_at(start), "Deadline passed");
    assert!(monitor.tick_at(start).is_empty());
    assert!(!monitor.flags().any());
}

#[test]
fn completed_task_never_alerts_but_countdown_renders() {
    let start = now();
    let mut monitor = DeadlineMonitor::new(
        &(start + Duration::days(10)).to_rfc3339(),
        TaskStatus::Completed,
    );
    for minute in 0..10 {
        assert!(monitor.tick_at(start + Duration::minutes(minute)).is_empty());
    }
    assert_eq!(monitor.countdown_at(start), "240:00:00");
}

#[test]
fn completing_suspends_future_alerts() {
    let start = now();
    let mut monitor =
        DeadlineMonitor::new(&(start + Duration::days(6)).to_rfc3339(), TaskStatus::Pending);
    assert_eq!(crossed(&monitor.tick_at(start)), vec![AlertThreshold::Week]);

    monitor.set_status(TaskStatus::Completed);
    // Would be inside the hour window by now.
    assert!(monitor
        .tick_at(start + Duration::days(6) - Duration::minutes(5))
        .is_empty());
    // Flags from before completion are retained.
    assert!(monitor.flags().week_fired);
}

#[test]
fn new_deadline_rearms_fired_thresholds() {
    let start = now();
    let mut monitor = DeadlineMonitor::new(
        &(start + Duration::minutes(20)).to_rfc3339(),
        TaskStatus::InProgress,
    );
    assert_eq!(monitor.tick_at(start).len(), 3);

    monitor.set_deadline(&(start + Duration::minutes(45)).to_rfc3339());
    assert!(!monitor.flags().any());
    assert_eq!(
        crossed(&monitor.tick_at(start + Duration::seconds(1))),
        vec![AlertThreshold::Week, AlertThreshold::Day, AlertThreshold::Hour]
    );
}

#[test]
fn monitor_state_survives_serialization() {
    // One-shot semantics must hold across a persist/restore cycle.
    let start = now();
    let mut monitor =
        DeadlineMonitor::new(&(start + Duration::days(6)).to_rfc3339(), TaskStatus::Pending);
    monitor.tick_at(start);

    let json = serde_json::to_string(&monitor).unwrap();
    let mut restored: DeadlineMonitor = serde_json::from_str(&json).unwrap();
    assert!(restored.tick_at(start + Duration::seconds(5)).is_empty());
    assert!(restored.flags().week_fired);
}

#[tokio::test]
async fn watcher_delivers_alerts_then_snapshots_and_stops_cleanly() {
    let deadline = (Utc::now() + Duration::minutes(30)).to_rfc3339();
    let monitor = DeadlineMonitor::new(&deadline, TaskStatus::Pending);

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink_events = Arc::clone(&events);
    let handle = spawn(
        monitor,
        std::time::Duration::from_millis(10),
        move |event| {
            sink_events.lock().unwrap().push(event);
        },
    );

    tokio::time::sleep(std::time::Duration::from_millis(60)).await;
    let monitor = handle.stop().await.unwrap();
    assert!(monitor.flags().hour_fired);

    let recorded = events.lock().unwrap();
    assert_eq!(
        crossed(&recorded),
        vec![AlertThreshold::Week, AlertThreshold::Day, AlertThreshold::Hour]
    );
    // Alerts precede the first snapshot of the same tick.
    let first_snapshot = recorded
        .iter()
        .position(|event| matches!(event, Event::StateSnapshot { .. }))
        .unwrap();
    assert!(first_snapshot >= 3);
    assert!(matches!(
        recorded.last(),
        Some(Event::WatcherStopped { .. })
    ));
}
