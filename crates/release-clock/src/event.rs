//! Calendar event records and the epoch extractor.
//!
//! Events arrive from an external feed as loosely-typed JSON documents whose
//! release-time field has drifted across several wire shapes over the years:
//! Firestore-style `{seconds, nanoseconds}` objects, epoch milliseconds as
//! integers or floats, and ISO-8601 strings with or without an offset.
//! [`extract_instant`] is the single place any of those shapes becomes an
//! absolute epoch-milliseconds instant; everything downstream compares plain
//! integers and never touches the raw field again.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ClockError, Result};

// ── Raw release-time field ──────────────────────────────────────────────────

/// The release-time field exactly as delivered by the event source.
///
/// Variants are tried in declaration order during deserialization. A value
/// that matches a variant but cannot be converted to a finite instant (a
/// non-finite float, an overflowing seconds count) is handled later by
/// [`extract_instant`] returning `None`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawInstant {
    /// Firestore-style timestamp object (seconds + nanoseconds since epoch).
    /// Both the public `{seconds, nanoseconds}` and the serialized
    /// `{_seconds, _nanoseconds}` spellings occur in the wild.
    Timestamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    /// Epoch milliseconds.
    Millis(i64),
    /// Epoch milliseconds as a JSON float.
    MillisFloat(f64),
    /// RFC 3339, or a timezone-naive ISO form read as UTC.
    Text(String),
}

/// Convert a raw release-time field to an absolute instant (epoch ms).
///
/// Returns `None` when the value cannot be converted to a finite instant.
/// Callers must treat `None` as "exclude this event from temporal
/// computation" — never as epoch zero or as "now", either of which would
/// corrupt NOW/NEXT selection.
///
/// The conversion never consults a timezone: timezone-naive strings are read
/// as UTC, so the result is identical no matter which zone the dashboard is
/// displaying. Call sites used to route both "now" and the event time
/// through the display zone's wall-clock string before comparing; the offset
/// cancels out for plain ordering but corrupts exact-duration math whenever
/// DST or non-integer-hour offsets are involved, so the conversion lives
/// here and nowhere else.
pub fn extract_instant(raw: &RawInstant) -> Option<i64> {
    match raw {
        RawInstant::Timestamp {
            seconds,
            nanoseconds,
        } => seconds
            .checked_mul(1_000)?
            .checked_add(i64::from(*nanoseconds) / 1_000_000),
        RawInstant::Millis(ms) => Some(*ms),
        RawInstant::MillisFloat(ms) if ms.is_finite() => Some(*ms as i64),
        RawInstant::MillisFloat(_) => None,
        RawInstant::Text(s) => parse_instant_text(s),
    }
}

/// Parse a date string to epoch milliseconds.
///
/// Accepted forms, in priority order: RFC 3339 with offset; the
/// timezone-naive forms `YYYY-MM-DDTHH:MM[:SS[.fff]]` and
/// `YYYY-MM-DD HH:MM[:SS[.fff]]`; bare `YYYY-MM-DD` (midnight). Naive forms
/// are read as UTC.
fn parse_instant_text(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&chrono::Utc).timestamp_millis());
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    let date = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// Strict string-to-instant parsing for caller-supplied evaluation times.
///
/// Accepts every string form [`extract_instant`] accepts, plus a bare
/// (optionally signed) integer read as epoch milliseconds.
///
/// # Errors
///
/// Returns [`ClockError::InvalidDatetime`] when nothing parses.
pub fn parse_instant(s: &str) -> Result<i64> {
    let trimmed = s.trim();
    if let Ok(ms) = trimmed.parse::<i64>() {
        return Ok(ms);
    }
    parse_instant_text(trimmed).ok_or_else(|| ClockError::InvalidDatetime(format!("'{trimmed}'")))
}

// ── Event record ────────────────────────────────────────────────────────────

/// One economic-calendar event record, as fetched by the external feed.
///
/// The engine reads only the release-time field and the identity; title,
/// impact, currency, and category are opaque passthrough for presentation
/// layers, and fields the engine has never heard of are preserved in
/// [`extra`](Self::extra) in document order.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CalendarEvent {
    /// Stable document id, when the feed provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name of the release (e.g. "Non-Farm Payrolls").
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Raw release time; `None` when the feed omitted the field entirely.
    #[serde(
        default,
        alias = "datetime",
        alias = "time",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<RawInstant>,
    /// Impact/strength label ("High", "moderate", ...), matched
    /// case-insensitively by [`Impact::parse`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Uninterpreted fields, echoed back to consumers untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CalendarEvent {
    /// The event's absolute release instant, when one can be derived.
    pub fn instant(&self) -> Option<i64> {
        self.date.as_ref().and_then(extract_instant)
    }

    /// Stable key correlating classification results back to this event.
    ///
    /// The explicit document id wins. Otherwise a deterministic composite of
    /// title, derived instant, and list position, so repeated evaluations of
    /// the same fetched list agree without relying on object identity.
    pub fn identity(&self, position: usize) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }
        let title = self.title.as_deref().unwrap_or("");
        match self.instant() {
            Some(ms) => format!("{title}|{ms}|{position}"),
            None => format!("{title}|invalid|{position}"),
        }
    }

    /// Parsed impact level; unrecognized labels map to the lowest priority.
    pub fn impact_level(&self) -> Impact {
        self.impact
            .as_deref()
            .map_or(Impact::Unrecognized, Impact::parse)
    }

    /// Decode an events document (JSON array of records).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidPayload`] when the document is not a
    /// JSON array of event records. An individually unparseable *date field*
    /// is not an error here — that event deserializes fine and is excluded
    /// from temporal computation later.
    pub fn from_json_array(document: &str) -> Result<Vec<CalendarEvent>> {
        serde_json::from_str(document).map_err(|e| ClockError::InvalidPayload(e.to_string()))
    }
}

// ── Impact priority ─────────────────────────────────────────────────────────

/// Impact labels ranked for display tie-breaking among simultaneous
/// releases.
///
/// The classifier never ranks simultaneous events against each other; this
/// ordering exists for presentation layers picking the "top" marker of a tie
/// set: `High > Medium > Low > NonEconomic > Unrecognized`, first
/// encountered wins ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Impact {
    Unrecognized,
    NonEconomic,
    Low,
    Medium,
    High,
}

impl Impact {
    /// Parse a feed label, case-insensitively.
    pub fn parse(label: &str) -> Impact {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" | "strong" => Impact::High,
            "medium" | "moderate" => Impact::Medium,
            "low" | "weak" => Impact::Low,
            "non-economic" | "none" => Impact::NonEconomic,
            _ => Impact::Unrecognized,
        }
    }

    /// Numeric badge priority (higher wins).
    pub fn priority(self) -> u8 {
        self as u8
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn event_from(json: &str) -> CalendarEvent {
        serde_json::from_str(json).unwrap()
    }

    // ── extract_instant tests ───────────────────────────────────────────

    #[test]
    fn test_extract_firestore_timestamp() {
        let raw = RawInstant::Timestamp {
            seconds: 1_736_083_800,
            nanoseconds: 500_000_000,
        };
        assert_eq!(extract_instant(&raw), Some(1_736_083_800_500));
    }

    #[test]
    fn test_extract_firestore_private_field_spelling() {
        let event = event_from(r#"{"date": {"_seconds": 1736083800, "_nanoseconds": 0}}"#);
        assert_eq!(event.instant(), Some(1_736_083_800_000));
    }

    #[test]
    fn test_extract_integer_millis() {
        assert_eq!(
            extract_instant(&RawInstant::Millis(1_736_083_800_000)),
            Some(1_736_083_800_000)
        );
    }

    #[test]
    fn test_extract_float_millis_truncates() {
        assert_eq!(
            extract_instant(&RawInstant::MillisFloat(1_736_083_800_000.9)),
            Some(1_736_083_800_000)
        );
    }

    #[test]
    fn test_extract_non_finite_float_is_invalid() {
        assert_eq!(extract_instant(&RawInstant::MillisFloat(f64::NAN)), None);
        assert_eq!(
            extract_instant(&RawInstant::MillisFloat(f64::INFINITY)),
            None
        );
    }

    #[test]
    fn test_extract_overflowing_seconds_is_invalid() {
        let raw = RawInstant::Timestamp {
            seconds: i64::MAX,
            nanoseconds: 0,
        };
        assert_eq!(extract_instant(&raw), None);
    }

    #[test]
    fn test_extract_rfc3339_with_offset() {
        // 2026-01-05T08:30:00-05:00 == 13:30:00Z
        let raw = RawInstant::Text("2026-01-05T08:30:00-05:00".to_string());
        let expected = chrono::DateTime::parse_from_rfc3339("2026-01-05T13:30:00Z")
            .unwrap()
            .timestamp_millis();
        assert_eq!(extract_instant(&raw), Some(expected));
    }

    #[test]
    fn test_extract_naive_string_is_read_as_utc() {
        let naive = RawInstant::Text("2026-01-05T13:30:00".to_string());
        let zulu = RawInstant::Text("2026-01-05T13:30:00Z".to_string());
        assert_eq!(extract_instant(&naive), extract_instant(&zulu));
    }

    #[test]
    fn test_extract_naive_with_fraction_and_space() {
        let a = extract_instant(&RawInstant::Text("2026-01-05T13:30:00.250".into()));
        let b = extract_instant(&RawInstant::Text("2026-01-05 13:30:00.250".into()));
        assert_eq!(a, b);
        assert_eq!(a.map(|ms| ms % 1_000), Some(250));
    }

    #[test]
    fn test_extract_naive_without_seconds() {
        let short = extract_instant(&RawInstant::Text("2026-01-05T13:30".into()));
        let long = extract_instant(&RawInstant::Text("2026-01-05T13:30:00".into()));
        assert_eq!(short, long);
    }

    #[test]
    fn test_extract_bare_date_is_utc_midnight() {
        let date = extract_instant(&RawInstant::Text("2026-01-05".into()));
        let midnight = extract_instant(&RawInstant::Text("2026-01-05T00:00:00Z".into()));
        assert_eq!(date, midnight);
    }

    #[test]
    fn test_extract_garbage_text_is_invalid() {
        assert_eq!(extract_instant(&RawInstant::Text("soon™".into())), None);
        assert_eq!(extract_instant(&RawInstant::Text("".into())), None);
        assert_eq!(extract_instant(&RawInstant::Text("  ".into())), None);
    }

    #[test]
    fn test_missing_date_field_is_invalid() {
        let event = event_from(r#"{"title": "FOMC Statement"}"#);
        assert_eq!(event.instant(), None);
    }

    // ── parse_instant tests ─────────────────────────────────────────────

    #[test]
    fn test_parse_instant_accepts_bare_millis() {
        assert_eq!(parse_instant("1736083800000").unwrap(), 1_736_083_800_000);
        assert_eq!(parse_instant("-1000").unwrap(), -1_000);
    }

    #[test]
    fn test_parse_instant_accepts_rfc3339() {
        let ms = parse_instant("1970-01-01T00:00:01Z").unwrap();
        assert_eq!(ms, 1_000);
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        let err = parse_instant("next tuesday").unwrap_err();
        assert!(err.to_string().contains("Invalid datetime"), "got: {err}");
    }

    // ── record tests ────────────────────────────────────────────────────

    #[test]
    fn test_record_deserializes_heterogeneous_shapes() {
        let doc = r#"[
            {"id": "a1", "title": "CPI y/y", "date": "2026-01-05T13:30:00Z", "impact": "High"},
            {"name": "Retail Sales", "date": 1736083800000, "currency": "USD"},
            {"title": "Rate Decision", "date": {"seconds": 1736083800, "nanoseconds": 0}}
        ]"#;
        let events = CalendarEvent::from_json_array(doc).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].title.as_deref(), Some("Retail Sales"));
        assert_eq!(events[1].instant(), Some(1_736_083_800_000));
        assert_eq!(events[2].instant(), Some(1_736_083_800_000));
    }

    #[test]
    fn test_record_preserves_unknown_fields() {
        let event = event_from(r#"{"title": "GDP q/q", "date": 0, "forecast": "0.3%"}"#);
        assert_eq!(
            event.extra.get("forecast"),
            Some(&Value::String("0.3%".into()))
        );
    }

    #[test]
    fn test_malformed_document_is_a_payload_error() {
        let err = CalendarEvent::from_json_array("{\"not\": \"an array\"}").unwrap_err();
        assert!(err.to_string().contains("Invalid events document"));
    }

    #[test]
    fn test_identity_prefers_explicit_id() {
        let event = event_from(r#"{"id": "doc-42", "title": "CPI", "date": 1000}"#);
        assert_eq!(event.identity(7), "doc-42");
    }

    #[test]
    fn test_identity_composite_is_deterministic() {
        let event = event_from(r#"{"title": "CPI", "date": 1000}"#);
        assert_eq!(event.identity(3), "CPI|1000|3");
        assert_eq!(event.identity(3), event.identity(3));
        // Position keeps two otherwise-identical records distinct.
        assert_ne!(event.identity(3), event.identity(4));
    }

    #[test]
    fn test_identity_of_invalid_date() {
        let event = event_from(r#"{"title": "CPI", "date": "???"}"#);
        assert_eq!(event.identity(0), "CPI|invalid|0");
    }

    // ── impact tests ────────────────────────────────────────────────────

    #[test]
    fn test_impact_labels_case_insensitive() {
        assert_eq!(Impact::parse("High"), Impact::High);
        assert_eq!(Impact::parse("STRONG"), Impact::High);
        assert_eq!(Impact::parse("medium"), Impact::Medium);
        assert_eq!(Impact::parse("Moderate"), Impact::Medium);
        assert_eq!(Impact::parse("low"), Impact::Low);
        assert_eq!(Impact::parse("weak"), Impact::Low);
        assert_eq!(Impact::parse("Non-Economic"), Impact::NonEconomic);
        assert_eq!(Impact::parse("none"), Impact::NonEconomic);
        assert_eq!(Impact::parse("holiday"), Impact::Unrecognized);
    }

    #[test]
    fn test_impact_priority_ordering() {
        assert_eq!(Impact::High.priority(), 4);
        assert_eq!(Impact::Medium.priority(), 3);
        assert_eq!(Impact::Low.priority(), 2);
        assert_eq!(Impact::NonEconomic.priority(), 1);
        assert_eq!(Impact::Unrecognized.priority(), 0);
        assert!(Impact::High > Impact::Medium);
        assert!(Impact::NonEconomic > Impact::Unrecognized);
    }
}
