//! `relclock` — a terminal consumer of the release-clock engine.
//!
//! Plays the role of a presentation component: loads an events document,
//! classifies it against a caller-supplied or wall-clock "now", and renders
//! a status report. With `--watch` it re-evaluates on the same 60-second
//! cadence the dashboard uses, sampling a fresh "now" each tick.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use release_clock::{
    format_countdown, format_relative, select_display_event, time_state, CalendarEvent,
    Classification, SnapshotCache, TimeState, DEFAULT_NOW_WINDOW_MS, REFRESH_INTERVAL_SECS,
};

#[derive(Parser)]
#[command(
    name = "relclock",
    version,
    about = "Classify economic-calendar events into NOW/NEXT/PAST and render countdown labels"
)]
struct Args {
    /// Events document: a JSON array of event records.
    events: PathBuf,

    /// IANA timezone for day-boundary (PAST vs future-day) decisions.
    #[arg(long, default_value = "UTC")]
    timezone: String,

    /// Evaluation instant: RFC 3339, an ISO date/time, or epoch
    /// milliseconds. Defaults to the wall clock.
    #[arg(long)]
    now: Option<String>,

    /// NOW window duration in minutes.
    #[arg(long, default_value_t = DEFAULT_NOW_WINDOW_MS / 60_000)]
    window_mins: i64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Keep running, re-evaluating every 60 seconds against a fresh
    /// wall-clock "now". Incompatible with --now: watch mode always
    /// samples the wall clock, never a simulated instant.
    #[arg(long, conflicts_with = "now")]
    watch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

// ── Report ──────────────────────────────────────────────────────────────────

/// One evaluation of the document, in a shape both renderers share.
#[derive(Debug, Serialize)]
struct Report {
    evaluated_at_ms: i64,
    timezone: String,
    window_ms: i64,
    events: Vec<EventLine>,
    #[serde(flatten)]
    classification: Classification,
    next_top_title: Option<String>,
    next_countdown: Option<String>,
}

#[derive(Debug, Serialize)]
struct EventLine {
    identity: String,
    state: &'static str,
    label: Option<String>,
    title: Option<String>,
    impact: Option<String>,
}

fn build_report(
    events: &[CalendarEvent],
    classification: Classification,
    now_ms: i64,
    window_ms: i64,
    timezone: &str,
) -> Report {
    let lines = events
        .iter()
        .enumerate()
        .map(|(position, event)| {
            let identity = event.identity(position);
            let (state, label) = match event.instant() {
                None => ("INVALID", None),
                Some(instant) => {
                    let tag = if classification.now.contains(&identity) {
                        "NOW"
                    } else if classification.next.contains(&identity) {
                        "NEXT"
                    } else {
                        match time_state(instant, now_ms, window_ms, timezone) {
                            TimeState::Past => "PAST",
                            _ => "LATER",
                        }
                    };
                    (tag, Some(format_relative(instant, now_ms, window_ms)))
                }
            };
            EventLine {
                identity,
                state,
                label,
                title: event.title.clone(),
                impact: event.impact.clone(),
            }
        })
        .collect();

    let next_top_title = select_display_event(events, &classification.next)
        .and_then(|event| event.title.clone());
    let next_countdown = classification
        .next_instant
        .map(|instant| format_countdown(instant - now_ms));

    Report {
        evaluated_at_ms: now_ms,
        timezone: timezone.to_string(),
        window_ms,
        events: lines,
        classification,
        next_top_title,
        next_countdown,
    }
}

// ── Rendering ───────────────────────────────────────────────────────────────

fn render_text(report: &Report) -> String {
    let mut out = String::new();

    for line in &report.events {
        let title = line.title.as_deref().unwrap_or("(untitled)");
        let label = line.label.as_deref().unwrap_or("-");
        out.push_str(&format!("{:<8} {:<20} {title}", line.state, label));
        if let Some(impact) = &line.impact {
            out.push_str(&format!("  [{impact}]"));
        }
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format!(
        "NOW  ({}): {}\n",
        report.classification.now.len(),
        join(&report.classification.now)
    ));
    out.push_str(&format!(
        "NEXT ({}): {}",
        report.classification.next.len(),
        join(&report.classification.next)
    ));
    if let Some(top) = &report.next_top_title {
        out.push_str(&format!("  (top: {top})"));
    }
    out.push('\n');
    if let Some(countdown) = &report.next_countdown {
        out.push_str(&format!("next release in {countdown}\n"));
    }

    out
}

fn join(identities: &std::collections::BTreeSet<String>) -> String {
    if identities.is_empty() {
        return "-".to_string();
    }
    identities
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("failed to serialize report")
        }
    }
}

// ── Entry point ─────────────────────────────────────────────────────────────

fn wall_clock_ms() -> Result<i64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is set before the Unix epoch")?;
    i64::try_from(elapsed.as_millis()).context("system clock is out of range")
}

fn run(args: &Args) -> Result<()> {
    // Argument errors surface before any classification.
    release_clock::parse_timezone(&args.timezone)
        .with_context(|| format!("unrecognized --timezone '{}'", args.timezone))?;
    let window_ms = args
        .window_mins
        .checked_mul(60_000)
        .filter(|ms| *ms >= 0)
        .context("--window-mins must be a non-negative number of minutes")?;

    let document = fs::read_to_string(&args.events)
        .with_context(|| format!("failed to read {}", args.events.display()))?;
    let events = CalendarEvent::from_json_array(&document)
        .with_context(|| format!("failed to parse {}", args.events.display()))?;

    let now_ms = match &args.now {
        Some(value) => release_clock::parse_instant(value)
            .with_context(|| format!("unparseable --now '{value}'"))?,
        None => wall_clock_ms()?,
    };

    let mut cache = SnapshotCache::new();
    let mut tick_now = now_ms;
    loop {
        let classification = cache.classify(0, &events, tick_now, window_ms).clone();
        let report = build_report(&events, classification, tick_now, window_ms, &args.timezone);
        println!("{}", render(&report, args.format)?);

        if !args.watch {
            return Ok(());
        }
        thread::sleep(Duration::from_secs(REFRESH_INTERVAL_SECS));
        tick_now = wall_clock_ms()?;
    }
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use release_clock::{classify, RawInstant};

    const NOW: i64 = 1_767_619_800_000; // 2026-01-05T13:30:00Z

    fn fixture_events() -> Vec<CalendarEvent> {
        vec![
            CalendarEvent {
                // 30s after release: NOW, and inside the "Starting now"
                // dead-zone.
                id: Some("released".to_string()),
                title: Some("Non-Farm Payrolls".to_string()),
                date: Some(RawInstant::Millis(NOW - 30_000)),
                impact: Some("High".to_string()),
                ..CalendarEvent::default()
            },
            CalendarEvent {
                id: Some("upcoming".to_string()),
                title: Some("CPI y/y".to_string()),
                date: Some(RawInstant::Millis(NOW + 3_900_000)),
                ..CalendarEvent::default()
            },
            CalendarEvent {
                id: Some("undated".to_string()),
                title: Some("Broken".to_string()),
                date: Some(RawInstant::Text("???".to_string())),
                ..CalendarEvent::default()
            },
        ]
    }

    #[test]
    fn test_report_states_and_summary() {
        let events = fixture_events();
        let classification = classify(&events, NOW, DEFAULT_NOW_WINDOW_MS);
        let report = build_report(&events, classification, NOW, DEFAULT_NOW_WINDOW_MS, "UTC");

        let states: Vec<&str> = report.events.iter().map(|line| line.state).collect();
        assert_eq!(states, ["NOW", "NEXT", "INVALID"]);
        assert_eq!(report.next_top_title.as_deref(), Some("CPI y/y"));
        assert_eq!(report.next_countdown.as_deref(), Some("1:05:00"));
    }

    #[test]
    fn test_text_rendering_mentions_every_section() {
        let events = fixture_events();
        let classification = classify(&events, NOW, DEFAULT_NOW_WINDOW_MS);
        let report = build_report(&events, classification, NOW, DEFAULT_NOW_WINDOW_MS, "UTC");
        let text = render_text(&report);

        assert!(text.contains("NOW  (1): released"), "got:\n{text}");
        assert!(text.contains("NEXT (1): upcoming"), "got:\n{text}");
        assert!(text.contains("Starting now"), "got:\n{text}");
        assert!(text.contains("next release in 1:05:00"), "got:\n{text}");
        assert!(text.contains("INVALID"), "got:\n{text}");
    }

    #[test]
    fn test_elapsed_events_render_as_past() {
        let events = vec![CalendarEvent {
            id: Some("old".to_string()),
            date: Some(RawInstant::Millis(NOW - 3_600_000)),
            ..CalendarEvent::default()
        }];
        let classification = classify(&events, NOW, DEFAULT_NOW_WINDOW_MS);
        let report = build_report(&events, classification, NOW, DEFAULT_NOW_WINDOW_MS, "UTC");
        assert_eq!(report.events[0].state, "PAST");
        assert_eq!(report.events[0].label.as_deref(), Some("1h 0m ago"));
    }
}
