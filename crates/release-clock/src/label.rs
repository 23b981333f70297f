//! Relative-time and countdown label rendering.
//!
//! Two renderers: a word-based relative label ("In 1h 5m", "12m ago",
//! "Starting now") for tooltips and timeline chips, and a fixed-format
//! `H:MM:SS` countdown for monospace digit displays. Both are pure functions
//! of instants the caller supplies; neither reads a clock.

use crate::classify::in_now_window;
use crate::STARTING_NOW_DEADZONE_MS;

/// The label shown around the release instant instead of a countdown.
pub const STARTING_NOW_LABEL: &str = "Starting now";

/// Render a relative label for an event against an evaluation instant.
///
/// Inside the NOW window and within [`STARTING_NOW_DEADZONE_MS`] of `now_ms`
/// the literal [`STARTING_NOW_LABEL`] is returned. The dead-zone is
/// deliberately wide: with a minute-granularity label, text right at release
/// would otherwise flicker between "In 0m" and "0m ago" across refresh
/// ticks. Inside the window but past the dead-zone the general magnitude
/// form applies and reads "Xm ago".
///
/// Magnitude form: the absolute difference decomposed into days, hours, and
/// minutes, joined as `{d}d {h}h {m}m`. The day token is omitted when zero,
/// but once a day token is present the hour token always follows, even at
/// zero ("1d 0h 5m", never "1d 5m"); the minutes token is always present
/// ("0m" is valid). Future instants get an "In " prefix, elapsed ones an
/// " ago" suffix.
pub fn format_relative(event_ms: i64, now_ms: i64, window_ms: i64) -> String {
    let diff = event_ms - now_ms;

    if in_now_window(event_ms, now_ms, window_ms) && diff.abs() < STARTING_NOW_DEADZONE_MS {
        return STARTING_NOW_LABEL.to_string();
    }

    let magnitude = diff.abs();
    let days = magnitude / 86_400_000;
    let remainder = magnitude % 86_400_000;
    let hours = remainder / 3_600_000;
    let minutes = (remainder % 3_600_000) / 60_000;

    let body = if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    };

    if diff > 0 {
        format!("In {body}")
    } else {
        format!("{body} ago")
    }
}

/// Render a non-negative duration as a fixed `H:MM:SS` countdown.
///
/// Hours are unbounded and unpadded; minutes and seconds are zero-padded.
/// Negative input clamps to `0:00:00` — a countdown never runs below zero.
pub fn format_countdown(remaining_ms: i64) -> String {
    let total_seconds = remaining_ms.max(0) / 1_000;
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

// ── Tests ───────────────────────────────────────────────────────────────────
