use chrono::Duration;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
// A year is exactly 365 days here, not calendar-aware. This matches the
// compact age strings the API server prints.
const YEAR: i64 = 365 * DAY;

/// Parse a compact human duration like "1d2h3m" into a [`Duration`].
///
/// Accepted units: `y` (365 days), `w`, `d`, `h`, `m`, `s`. Segments are
/// concatenated with no separators. Returns `None` on any malformed segment
/// or unknown unit. The empty string parses as a zero duration: the segment
/// loop succeeds vacuously.
pub fn parse_human_duration(s: &str) -> Option<Duration> {
    let mut rest = s;
    let mut total = 0i64;

    while !rest.is_empty() {
        let (num, unit, new_rest) = parse_segment(rest)?;
        rest = new_rest;
        let unit_secs = match unit {
            'y' => YEAR,
            'w' => WEEK,
            'd' => DAY,
            'h' => HOUR,
            'm' => MINUTE,
            's' => 1,
            _ => return None,
        };
        total = total.checked_add(num.checked_mul(unit_secs)?)?;
    }
    Some(Duration::seconds(total))
}

fn parse_segment(s: &str) -> Option<(i64, char, &str)> {
    let digits_end = s.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let num: i64 = s[..digits_end].parse().ok()?;
    let mut chars = s[digits_end..].chars();
    let unit = chars.next()?;
    Some((num, unit, chars.as_str()))
}

/// Format a duration in the compact style used for resource ages: "45s",
/// "3m10s", "3h12m", "5d", "2y12d". Coarsens as the duration grows, exactly
/// like the age column of a resource listing. Slightly negative durations
/// (clock skew) clamp to "0s".
pub fn format_duration(d: Duration) -> String {
    let seconds = d.num_seconds();
    if seconds < -1 {
        return "<invalid>".to_string();
    }
    if seconds < 0 {
        return "0s".to_string();
    }
    if seconds < 2 * MINUTE {
        return format!("{seconds}s");
    }
    let minutes = seconds / MINUTE;
    if minutes < 10 {
        let s = seconds % MINUTE;
        if s == 0 {
            return format!("{minutes}m");
        }
        return format!("{minutes}m{s}s");
    }
    if minutes < 3 * 60 {
        return format!("{minutes}m");
    }
    let hours = seconds / HOUR;
    if hours < 8 {
        let m = minutes % 60;
        if m == 0 {
            return format!("{hours}h");
        }
        return format!("{hours}h{m}m");
    }
    if hours < 48 {
        return format!("{hours}h");
    }
    if hours < 24 * 8 {
        let h = hours % 24;
        if h == 0 {
            return format!("{}d", hours / 24);
        }
        return format!("{}d{}h", hours / 24, h);
    }
    if hours < 24 * 365 * 2 {
        return format!("{}d", hours / 24);
    }
    if hours < 24 * 365 * 8 {
        let days = hours / 24;
        let dy = days % 365;
        if dy == 0 {
            return format!("{}y", days / 365);
        }
        return format!("{}y{}d", days / 365, dy);
    }
    format!("{}y", hours / 24 / 365)
}
