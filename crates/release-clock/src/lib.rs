//! # release-clock
//!
//! The event time-state engine behind an economic-calendar trading
//! dashboard: given raw event records and an evaluation instant, decide
//! which events are NOW (inside a reaction window after release), which
//! share the NEXT upcoming release, which are PAST in a selected timezone,
//! and render the countdown/relative labels shown alongside them.
//!
//! This logic used to live in two independently-drifted inline copies inside
//! presentation components; one of them compared zone-shifted wall-clock
//! values, which corrupts exact-duration math around DST and non-integer
//! offsets. This crate is the consolidated single definition. Every function
//! is pure and takes its inputs explicitly — no system clock, no ambient
//! timezone, no module-level state — so the engine is safe to call from any
//! number of presentation consumers on whatever refresh cadence they choose.
//!
//! ## Modules
//!
//! - [`event`] — event records, the epoch extractor, impact priority
//! - [`calendar`] — timezone-aware day serials for "future day" decisions
//! - [`classify`] — NOW/NEXT set computation and per-event time state
//! - [`label`] — relative labels ("In 1h 5m") and `H:MM:SS` countdowns
//! - [`cache`] — per-session one-slot classification memo
//! - [`error`] — error types for the strict parsing surfaces

pub mod cache;
pub mod calendar;
pub mod classify;
pub mod error;
pub mod event;
pub mod label;

pub use cache::SnapshotCache;
pub use calendar::{day_serial, is_future_local_day, parse_timezone};
pub use classify::{classify, select_display_event, time_state, Classification, TimeState};
pub use error::ClockError;
pub use event::{extract_instant, parse_instant, CalendarEvent, Impact, RawInstant};
pub use label::{format_countdown, format_relative, STARTING_NOW_LABEL};

/// Default NOW window: how long after release an event stays highlighted.
///
/// Nine minutes is the shipped product value; earlier revisions used five
/// and ten, so the window is a parameter on every API and this constant is
/// only the default.
pub const DEFAULT_NOW_WINDOW_MS: i64 = 9 * 60_000;

/// Half-width of the "Starting now" dead-zone around the release instant.
///
/// Within this distance of "now" (and inside the NOW window) the relative
/// label is the literal [`STARTING_NOW_LABEL`] instead of a countdown, so
/// minute-granularity text does not flicker at release.
pub const STARTING_NOW_DEADZONE_MS: i64 = 45_000;

/// Caller-side re-evaluation cadence, in seconds.
///
/// The engine itself never ticks; consumers sample a fresh "now" on this
/// interval and re-classify. Shortening it improves freshness only —
/// correctness does not depend on it.
pub const REFRESH_INTERVAL_SECS: u64 = 60;
