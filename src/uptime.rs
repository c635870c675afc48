// Uptime phrase for the system card, e.g. "2 days, 3 hours, 14 mins".

/// Placeholder shown when a value is unknown.
pub const NOT_AVAILABLE: &str = "N/A";

const HOURS_PER_DAY: u64 = 24;

/// Formats a collector duration ("H:MM:SS[.ffffff]", optionally prefixed with
/// "N day(s), ") as a comma-separated phrase of its non-zero components.
///
/// Missing or empty input yields "N/A". A component that is absent or not a
/// number counts as zero, so an all-zero duration yields an empty string.
pub fn format_uptime(uptime: Option<&str>) -> String {
    let Some(uptime) = uptime.filter(|s| !s.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };

    let (prefix_days, clock) = split_day_prefix(uptime);
    let mut fields = clock.split(':');
    let hours = fields.next().and_then(parse_whole).unwrap_or(0);
    let minutes = fields.next().and_then(parse_whole).unwrap_or(0);
    // Fractional seconds are truncated, never rounded.
    let seconds = fields.next().and_then(parse_whole).unwrap_or(0);

    let total_hours = prefix_days * HOURS_PER_DAY + hours;
    let days = total_hours / HOURS_PER_DAY;
    let remaining_hours = total_hours % HOURS_PER_DAY;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days} days"));
    }
    if remaining_hours > 0 {
        parts.push(format!("{remaining_hours} hours"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} mins"));
    }
    if seconds > 0 {
        parts.push(format!("{seconds} secs"));
    }
    parts.join(", ")
}

/// Splits "3 days, 4:05:06" into (3, "4:05:06"); input without a day prefix is returned as is.
fn split_day_prefix(uptime: &str) -> (u64, &str) {
    let Some((head, clock)) = uptime.split_once(',') else {
        return (0, uptime);
    };
    let days = head
        .trim()
        .strip_suffix("days")
        .or_else(|| head.trim().strip_suffix("day"))
        .and_then(|n| n.trim().parse::<u64>().ok());
    match days {
        Some(days) => (days, clock.trim()),
        None => (0, uptime),
    }
}

/// Leading integer part of a field ("09.5" -> 9). Negative or non-numeric fields are None.
fn parse_whole(field: &str) -> Option<u64> {
    let field = field.trim();
    let digits = field.split('.').next().unwrap_or_default();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
