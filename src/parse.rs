use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Reads a number out of free text such as `"12,000"`, `"8%"` or
/// `"$5,000/mo"`.
///
/// Everything except ASCII digits and `.` is dropped, then the longest
/// leading decimal literal is read. Signs are dropped along with every
/// other symbol, so the result is never negative. Input with no digits
/// yields `0`, and so does anything that would overflow to infinity.
pub fn parse_number(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    // "1.2.3" reads as 1.2
    let literal = match cleaned.char_indices().filter(|(_, c)| *c == '.').nth(1) {
        Some((second_dot, _)) => &cleaned[..second_dot],
        None => cleaned.as_str(),
    };

    if !literal.chars().any(|c| c.is_ascii_digit()) {
        return 0.0;
    }

    match literal.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Lenient ISO-8601 reader for stored deal timestamps.
///
/// Accepts RFC 3339 with an offset, a naive date-time (taken as UTC) and
/// a bare date (midnight UTC). Returns `None` for anything else.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
