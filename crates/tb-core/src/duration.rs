//! Elapsed-time calculation for `HH:MM` wall-clock pairs.
//!
//! Durations are lenient: a malformed or missing time degrades to a zero
//! duration instead of an error, and a block whose end precedes its start is
//! clamped to zero rather than wrapped to the next day.

const MINUTES_PER_HOUR: u32 = 60;
const HOURS_PER_DAY: u32 = 24;

/// Parses an `H:MM` or `HH:MM` 24-hour time into minutes since midnight.
///
/// Returns `None` for empty input, missing separator, non-digit characters,
/// or out-of-range hours (0-23) and minutes (0-59).
pub fn parse_clock_time(s: &str) -> Option<u32> {
    let (hours, minutes) = s.trim().split_once(':')?;
    if !(1..=2).contains(&hours.len()) || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours >= HOURS_PER_DAY || minutes >= MINUTES_PER_HOUR {
        return None;
    }
    Some(hours * MINUTES_PER_HOUR + minutes)
}

/// Computes the elapsed minutes between two wall-clock times.
///
/// Returns `max(0, end - start)`. Either side being unparseable yields 0.
/// Blocks crossing midnight are not representable and also yield 0.
pub fn compute_duration(start_time: &str, end_time: &str) -> u32 {
    let (Some(start), Some(end)) = (parse_clock_time(start_time), parse_clock_time(end_time))
    else {
        return 0;
    };

    if end < start {
        tracing::debug!(
            start_time,
            end_time,
            "end precedes start; clamping duration to zero"
        );
    }
    end.saturating_sub(start)
}

/// Formats minutes as a compact duration string.
///
/// Returns "Xh Ym", "Xh" on whole hours, or "Ym" below one hour.
pub fn format_minutes(minutes: u64) -> String {
    let per_hour = u64::from(MINUTES_PER_HOUR);
    let hours = minutes / per_hour;
    let mins = minutes % per_hour;

    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock_time_valid() {
        assert_eq!(parse_clock_time("00:00"), Some(0));
        assert_eq!(parse_clock_time("08:30"), Some(510));
        assert_eq!(parse_clock_time("8:30"), Some(510));
        assert_eq!(parse_clock_time("23:59"), Some(1439));
        assert_eq!(parse_clock_time(" 09:15 "), Some(555));
    }

    #[test]
    fn test_parse_clock_time_rejects_garbage() {
        assert_eq!(parse_clock_time(""), None);
        assert_eq!(parse_clock_time("0830"), None);
        assert_eq!(parse_clock_time("8:5"), None);
        assert_eq!(parse_clock_time("24:00"), None);
        assert_eq!(parse_clock_time("12:60"), None);
        assert_eq!(parse_clock_time("-1:30"), None);
        assert_eq!(parse_clock_time("ab:cd"), None);
        assert_eq!(parse_clock_time("123:00"), None);
    }

    #[test]
    fn test_compute_duration_simple() {
        assert_eq!(compute_duration("08:00", "09:30"), 90);
        assert_eq!(compute_duration("00:00", "23:59"), 1439);
    }

    #[test]
    fn test_compute_duration_equal_times_is_zero() {
        assert_eq!(compute_duration("08:00", "08:00"), 0);
    }

    #[test]
    fn test_compute_duration_clamps_reversed_range() {
        // Crossing midnight is not supported; the block counts as zero
        assert_eq!(compute_duration("23:00", "01:00"), 0);
        assert_eq!(compute_duration("09:30", "08:00"), 0);
    }

    #[test]
    fn test_compute_duration_unparseable_is_zero() {
        assert_eq!(compute_duration("", "09:00"), 0);
        assert_eq!(compute_duration("08:00", ""), 0);
        assert_eq!(compute_duration("soon", "later"), 0);
    }

    #[test]
    fn test_compute_duration_matches_minute_difference() {
        for (start, end) in [("06:15", "07:00"), ("12:00", "12:01"), ("10:45", "18:20")] {
            let expected = parse_clock_time(end)
                .unwrap()
                .saturating_sub(parse_clock_time(start).unwrap());
            assert_eq!(compute_duration(start, end), expected);
        }
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(90), "1h 30m");
    }
}
