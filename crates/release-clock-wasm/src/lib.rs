//! WASM bindings for the release-clock engine.
//!
//! The browser dashboard was the engine's original consumer, so the binding
//! surface mirrors what its presentation components call: one classification
//! entry point returning JSON, plus label passthroughs for tooltips and the
//! monospace countdown. Failures come back as a JSON `{"error": ...}` object
//! rather than a thrown exception — rendering code must never have to
//! try/catch around a classification tick.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use release_clock::{classify, time_state, CalendarEvent, Classification, TimeState};

#[derive(Serialize)]
struct WasmReport {
    #[serde(flatten)]
    classification: Classification,
    states: Vec<WasmEventState>,
}

#[derive(Serialize)]
struct WasmEventState {
    identity: String,
    /// `None` when the event's date field could not be parsed.
    state: Option<TimeState>,
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

fn finite_ms(value: f64, name: &str) -> Result<i64, String> {
    if value.is_finite() {
        Ok(value as i64)
    } else {
        Err(format!("{name} must be a finite number of milliseconds"))
    }
}

fn build_report(
    events_json: &str,
    now_ms: f64,
    window_ms: f64,
    timezone: &str,
) -> Result<String, String> {
    let now_ms = finite_ms(now_ms, "now_ms")?;
    let window_ms = finite_ms(window_ms, "window_ms")?;
    release_clock::parse_timezone(timezone).map_err(|err| err.to_string())?;
    let events = CalendarEvent::from_json_array(events_json).map_err(|err| err.to_string())?;

    let classification = classify(&events, now_ms, window_ms);
    let states = events
        .iter()
        .enumerate()
        .map(|(position, event)| WasmEventState {
            identity: event.identity(position),
            state: event
                .instant()
                .map(|instant| time_state(instant, now_ms, window_ms, timezone)),
        })
        .collect();

    let report = WasmReport {
        classification,
        states,
    };
    serde_json::to_string(&report).map_err(|err| err.to_string())
}

/// Classify an events document and return the result as JSON.
///
/// The payload carries the NOW set, the NEXT tie set, `next_instant`, and a
/// per-event `states` array (`"now"` / `"past"` / `"upcoming"`, or `null`
/// for an unparseable date field).
#[wasm_bindgen]
pub fn classify_events(events_json: &str, now_ms: f64, window_ms: f64, timezone: &str) -> String {
    match build_report(events_json, now_ms, window_ms, timezone) {
        Ok(json) => json,
        Err(message) => error_json(&message),
    }
}

/// Relative label for one event ("In 1h 5m", "3m ago", "Starting now").
#[wasm_bindgen]
pub fn relative_label(event_ms: f64, now_ms: f64, window_ms: f64) -> String {
    if !(event_ms.is_finite() && now_ms.is_finite() && window_ms.is_finite()) {
        return String::new();
    }
    release_clock::format_relative(event_ms as i64, now_ms as i64, window_ms as i64)
}

/// Fixed `H:MM:SS` countdown; non-finite or negative input reads `0:00:00`.
#[wasm_bindgen]
pub fn countdown(remaining_ms: f64) -> String {
    let ms = if remaining_ms.is_finite() {
        remaining_ms as i64
    } else {
        0
    };
    release_clock::format_countdown(ms)
}

// ── Tests ───────────────────────────────────────────────────────────────────
