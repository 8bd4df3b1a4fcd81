//! Terminal output formatting.

use atom_engine::{AtomError, AtomEvent, AtomStats, TrustSnapshot};
use colored::Colorize;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg.green());
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg.red());
}

/// Print an engine error with its stable code.
pub fn engine_error(err: &AtomError) {
    eprintln!(
        "{} {} {}",
        "✗".red().bold(),
        format!("[{}] {}:", err.code(), err.name()).red().bold(),
        err.to_string().red()
    );
}

/// Print an info message.
pub fn info(msg: &str) {
    println!("{} {}", "→".cyan(), msg);
}

/// Print a warning message.
pub fn warn(msg: &str) {
    println!("{} {}", "!".yellow().bold(), msg.yellow());
}

/// Print a header.
pub fn header(msg: &str) {
    println!("\n{}", msg.white().bold());
    println!("{}", "─".repeat(msg.len()).dimmed());
}

/// Print a key-value pair.
pub fn kv(key: &str, value: &str) {
    println!("  {} {}", format!("{}:", key).dimmed(), value);
}

/// Print a helpful hint.
pub fn hint(msg: &str) {
    println!("{} {}", "💡".dimmed(), msg.dimmed());
}

/// Print a pretty JSON value.
pub fn json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            0
        }
        Err(e) => {
            error(&format!("Failed to serialize output: {}", e));
            1
        }
    }
}

/// Print the events emitted by the last engine call.
pub fn events(events: &[AtomEvent]) {
    for event in events {
        let payload = serde_json::to_string(event).unwrap_or_default();
        println!("  {} {}", event.name().cyan(), payload.dimmed());
    }
}

fn tier_label(tier: u8) -> colored::ColoredString {
    let label = format!("tier {}", tier);
    match tier {
        0 => label.red().bold(),
        1 => label.yellow(),
        2 => label.normal(),
        _ => label.green().bold(),
    }
}

fn timestamp(ts: u64) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

/// Print a stats record.
pub fn stats(stats: &AtomStats) {
    header(&format!("Agent {:?}", stats.asset));
    kv("Collection", &format!("{:?}", stats.collection));
    kv("Events", &stats.event_count.to_string());
    kv("Repeats", &stats.repeat_count.to_string());
    kv("Revoked", &stats.recent.revoked_len().to_string());
    kv("Distinct", &format!("~{}", stats.distinct_counterparts()));
    if stats.has_events() {
        kv("First event", &timestamp(stats.first_event_timestamp));
        kv("Last event", &timestamp(stats.last_event_timestamp));
    }
    kv("EMA fast/slow", &format!("{} / {}", stats.ema_fast, stats.ema_slow));
    kv("Volatility", &stats.ema_volatility.to_string());
    kv("Arrival", &format!("{}s", stats.ema_arrival));
    println!();
    kv("Trust", &format!("{} ({})", stats.trust_score, tier_label(stats.trust_tier)));
    kv("Risk", &stats.risk_score.to_string());
    kv("Quality", &stats.quality_score.to_string());
    kv("Confidence", &stats.confidence.to_string());
    flags(&stats.flags.names());
}

/// Print a trust snapshot.
pub fn snapshot(snapshot: &TrustSnapshot) {
    header(&format!("Trust snapshot for {:?}", snapshot.asset));
    kv("As of", &timestamp(snapshot.as_of));
    kv("Events", &snapshot.event_count.to_string());
    kv("Distinct", &format!("~{}", snapshot.distinct_counterparts));
    kv(
        "Trust",
        &format!(
            "{} ({})",
            snapshot.scores.trust_score,
            tier_label(snapshot.scores.trust_tier)
        ),
    );
    kv("Risk", &snapshot.scores.risk_score.to_string());
    kv("Quality", &snapshot.scores.quality_score.to_string());
    kv("Confidence", &snapshot.scores.confidence.to_string());
    flags(&snapshot.flags.names());
}

fn flags(names: &[&str]) {
    if names.is_empty() {
        kv("Flags", &"none".dimmed().to_string());
    } else {
        kv("Flags", &names.join(", ").yellow().to_string());
    }
}
