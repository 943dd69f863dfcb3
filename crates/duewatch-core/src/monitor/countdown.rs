//! Countdown rendering.
//!
//! Remaining time renders as `HH:MM:SS` with zero padding. Hours are
//! unbounded (no 24-hour rollover into days), so ten days out renders as
//! `240:00:00`. Non-positive or unknown remaining time renders as the
//! literal `"Deadline passed"`.

pub const DEADLINE_PASSED: &str = "Deadline passed";

/// Render remaining milliseconds for display. `None` means the deadline
/// never parsed and is treated as already past.
pub fn render(remaining_ms: Option<i64>) -> String {
    match remaining_ms {
        Some(ms) if ms > 0 => format_hms(ms),
        _ => DEADLINE_PASSED.to_string(),
    }
}

fn format_hms(ms: i64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
