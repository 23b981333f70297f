//! NOW / NEXT / PAST classification.
//!
//! The one canonical definition of an event's time state. Every consumer
//! (clock overlay, timeline, tooltip) calls into this module instead of
//! re-deriving the window arithmetic inline — the pre-consolidation codebase
//! carried two independently-drifted copies of this logic, one of which did
//! its comparisons on zone-shifted wall-clock values, and the copies
//! disagreed at exactly the boundaries that matter (release instant, window
//! edge, local midnight).
//!
//! All functions are pure: no clock access, no shared state, identical
//! inputs give identical outputs. The caller samples "now" on its own
//! refresh cadence and passes it in.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::calendar::is_future_local_day;
use crate::event::CalendarEvent;

// ── Classification result ───────────────────────────────────────────────────

/// The NOW set, the NEXT tie set, and the next release instant.
///
/// Sets hold event identities (see [`CalendarEvent::identity`]), so results
/// correlate back to events without relying on object identity. NEXT is a
/// *tie set*: every event sharing the earliest strictly-future instant is a
/// member — simultaneous releases have no single winner here. Ranking a tie
/// set for display is a presentation concern; see [`select_display_event`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Classification {
    /// Identities of events inside the NOW window.
    pub now: BTreeSet<String>,
    /// Identities of events sharing the earliest future instant.
    pub next: BTreeSet<String>,
    /// The earliest future instant (epoch ms), when any event is upcoming.
    pub next_instant: Option<i64>,
}

/// Partition events into the NOW set and the NEXT tie set.
///
/// Per event: derive the absolute instant ([`CalendarEvent::instant`]);
/// events with an underivable instant contribute to neither set — never
/// treated as epoch zero or as "now". An event is NOW when
/// `instant ≤ now_ms && now_ms − instant < window_ms` (half-open: the
/// window-edge instant is excluded) and NOW membership excludes it from NEXT
/// consideration. Among the remaining strictly-future events, NEXT is the
/// running-minimum instant with ties joining the set.
///
/// NOW and NEXT compare absolute instants only, so no timezone is involved;
/// the timezone-dependent part of the contract is [`time_state`]'s PAST
/// predicate.
pub fn classify(events: &[CalendarEvent], now_ms: i64, window_ms: i64) -> Classification {
    let mut result = Classification::default();

    for (position, event) in events.iter().enumerate() {
        let Some(instant) = event.instant() else {
            continue;
        };
        let identity = event.identity(position);

        if in_now_window(instant, now_ms, window_ms) {
            result.now.insert(identity);
            continue;
        }

        if instant > now_ms {
            match result.next_instant {
                Some(best) if instant > best => {}
                Some(best) if instant == best => {
                    result.next.insert(identity);
                }
                _ => {
                    result.next.clear();
                    result.next.insert(identity);
                    result.next_instant = Some(instant);
                }
            }
        }
    }

    result
}

/// The NOW window test shared by [`classify`], [`time_state`], and the
/// label formatter: `instant ≤ now < instant + window` (half-open).
pub(crate) fn in_now_window(instant_ms: i64, now_ms: i64, window_ms: i64) -> bool {
    instant_ms <= now_ms && now_ms - instant_ms < window_ms
}

// ── Per-event time state ────────────────────────────────────────────────────

/// An individual event's temporal state relative to an evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeState {
    /// Released within the last `window_ms` milliseconds.
    Now,
    /// Already elapsed on or before today's local calendar day.
    Past,
    /// Not yet released, or on a later local calendar day.
    Upcoming,
}

/// Classify one instant as NOW, PAST, or upcoming.
///
/// PAST is the timezone-dependent predicate: an event whose calendar day in
/// `timezone` is strictly after the evaluation instant's is never PAST, even
/// when its instant precedes `now_ms`. Local-day mapping is not monotonic:
/// tzdb contains backward day jumps (dateline moves such as Alaska's 1867
/// transfer, where the local date steps from Oct 19 back to Oct 18), so an
/// earlier instant really can sit on a later calendar day. The override also
/// guards day-boundary and DST artifacts in caller-supplied data. An
/// unresolvable zone means "cannot confirm future day" and PAST falls back
/// to the plain instant comparison — never a panic.
pub fn time_state(instant_ms: i64, now_ms: i64, window_ms: i64, timezone: &str) -> TimeState {
    if in_now_window(instant_ms, now_ms, window_ms) {
        return TimeState::Now;
    }
    if !is_future_local_day(instant_ms, now_ms, timezone) && instant_ms < now_ms {
        return TimeState::Past;
    }
    TimeState::Upcoming
}

// ── Display tie-breaking ────────────────────────────────────────────────────

/// Pick the "top" event of a tie set for display (badge, z-order).
///
/// Highest impact priority wins ([`crate::event::Impact`]); among equal
/// impacts the first-encountered event wins. This ordering is presentation
/// policy layered on top of [`classify`] — the classifier itself never ranks
/// simultaneous events against each other.
pub fn select_display_event<'a>(
    events: &'a [CalendarEvent],
    identities: &BTreeSet<String>,
) -> Option<&'a CalendarEvent> {
    let mut best: Option<&CalendarEvent> = None;
    for (position, event) in events.iter().enumerate() {
        if !identities.contains(&event.identity(position)) {
            continue;
        }
        match best {
            Some(current) if event.impact_level() <= current.impact_level() => {}
            _ => best = Some(event),
        }
    }
    best
}

// ── Tests ───────────────────────────────────────────────────────────────────
