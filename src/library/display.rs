use std::time::Duration;

use super::model::DisplayDuration;

/// Shown when a song has no usable duration.
pub const UNKNOWN_DURATION: &str = "--:--";

/// Format a duration as `m:ss` (or `h:mm:ss` past an hour).
pub fn format_time(d: Duration) -> String {
    let total = d.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Parse `"m:ss"`, `"h:mm:ss"` or a bare number of seconds.
pub fn parse_time(text: &str) -> Option<Duration> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() > 3 {
        return None;
    }
    for (i, part) in parts.iter().enumerate() {
        let v: u64 = part.trim().parse().ok()?;
        // Every field after the first is a base-60 digit.
        if i > 0 && v >= 60 {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(v)?;
    }
    Some(Duration::from_secs(total))
}

/// Resolve metadata duration into a parsed value and the text to display.
///
/// Unparseable text is shown as written; it only loses the numeric value.
pub fn resolve_duration(raw: Option<&DisplayDuration>) -> (Option<Duration>, String) {
    match raw {
        Some(DisplayDuration::Seconds(s)) => {
            let d = Duration::from_secs(*s);
            (Some(d), format_time(d))
        }
        Some(DisplayDuration::Text(t)) => match parse_time(t) {
            Some(d) => (Some(d), format_time(d)),
            None if !t.trim().is_empty() => (None, t.trim().to_string()),
            None => (None, UNKNOWN_DURATION.to_string()),
        },
        None => (None, UNKNOWN_DURATION.to_string()),
    }
}
