//! Timezone-aware calendar-day mapping.
//!
//! NOW/NEXT classification compares absolute instants and never needs a
//! timezone; the one timezone-dependent question in the engine is "does this
//! event fall on a later calendar day than the evaluation instant, as the
//! dashboard's selected zone observes it?". That question is answered here by
//! mapping instants to integer day serials via a real calendar conversion
//! ([`chrono_tz::Tz`]), never by formatting a wall-clock string in the target
//! zone and re-parsing it — the round trip silently shifts the instant by the
//! zone offset and breaks around DST transitions.

use chrono::{Datelike, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{ClockError, Result};

// ── Timezone resolution ─────────────────────────────────────────────────────

/// Resolve an IANA timezone name, strictly.
///
/// This is the opt-in strict surface for callers validating user input (CLI
/// arguments, request parameters). The classification path never uses it:
/// there an unrecognized zone degrades to [`day_serial`] returning `None`.
///
/// # Errors
///
/// Returns [`ClockError::InvalidTimezone`] if the name is not a valid IANA
/// timezone.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ClockError::InvalidTimezone(name.to_string()))
}

// ── Day serial ──────────────────────────────────────────────────────────────

/// Map an instant to an integer calendar-day serial in the given timezone.
///
/// The serial encodes the local date as `year * 10_000 + month * 100 + day`
/// (e.g. `20260105` for 2026-01-05), which orders the same way the calendar
/// does. It is suitable only for "same day" / "later day" comparisons —
/// never for duration math, where days are not uniformly long.
///
/// Returns `None` when the instant is outside the representable range or the
/// timezone name is unrecognized; the failure never escapes as a panic.
///
/// # Examples
///
/// ```
/// use release_clock::calendar::day_serial;
///
/// // 2026-01-05T13:30:00Z is still Jan 5 in New York (08:30 EST) ...
/// let instant = 1_767_619_800_000;
/// assert_eq!(day_serial(instant, "America/New_York"), Some(20260105));
/// // ... and already Jan 6 at UTC+14.
/// assert_eq!(day_serial(instant, "Pacific/Kiritimati"), Some(20260106));
/// assert_eq!(day_serial(instant, "Mars/Olympus_Mons"), None);
/// ```
pub fn day_serial(instant_ms: i64, timezone: &str) -> Option<i64> {
    let tz: Tz = timezone.parse().ok()?;
    let utc = Utc.timestamp_millis_opt(instant_ms).single()?;
    let local = utc.with_timezone(&tz);
    Some(i64::from(local.year()) * 10_000 + i64::from(local.month()) * 100 + i64::from(local.day()))
}

/// Whether `instant_ms` falls on a strictly later calendar day than
/// `reference_ms`, as observed in `timezone`.
///
/// Returns `false` whenever either day serial is unavailable (out-of-range
/// instant, unrecognized zone): "cannot confirm future day" degrades to the
/// plain instant comparison downstream, it never aborts classification.
pub fn is_future_local_day(instant_ms: i64, reference_ms: i64, timezone: &str) -> bool {
    match (
        day_serial(instant_ms, timezone),
        day_serial(reference_ms, timezone),
    ) {
        (Some(event_day), Some(reference_day)) => event_day > reference_day,
        _ => false,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
