//! Stopover duration literals.
//!
//! Durations are written as `(<H>h )?<M>m`, e.g. `"3h 25m"` or `"45m"`. The
//! pattern is matched at the start of the text and anything after a valid
//! match is ignored. Text that does not match (including `""` and the dataset's
//! `"0"` placeholder) yields zero minutes: unparseable stopover text is treated
//! as "no stopover", never as an error.

/// Parse a duration literal into whole minutes.
pub fn parse_duration_minutes(text: &str) -> u32 {
    match_hours_minutes(text)
        .or_else(|| match_minutes(text))
        .unwrap_or(0)
}

/// Render minutes in the dataset's notation (`"3h 25m"`, `"45m"`).
pub fn format_duration_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// `<H>h <M>m`
fn match_hours_minutes(text: &str) -> Option<u32> {
    let (hours, rest) = take_digits(text)?;
    let rest = rest.strip_prefix("h ")?;
    let (minutes, rest) = take_digits(rest)?;
    rest.strip_prefix('m')?;
    hours.checked_mul(60)?.checked_add(minutes)
}

/// `<M>m`
fn match_minutes(text: &str) -> Option<u32> {
    let (minutes, rest) = take_digits(text)?;
    rest.strip_prefix('m')?;
    Some(minutes)
}

/// Split a leading run of ASCII digits off `text`.
///
/// Returns `None` for an empty run or a value that does not fit in `u32`.
fn take_digits(text: &str) -> Option<(u32, &str)> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    let value = text[..end].parse::<u32>().ok()?;
    Some((value, &text[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_and_minutes() {
        assert_eq!(parse_duration_minutes("3h 25m"), 205);
        assert_eq!(parse_duration_minutes("0h 5m"), 5);
        assert_eq!(parse_duration_minutes("12h 0m"), 720);
    }

    #[test]
    fn minutes_only() {
        assert_eq!(parse_duration_minutes("45m"), 45);
        assert_eq!(parse_duration_minutes("0m"), 0);
    }

    #[test]
    fn lenient_fallback_is_zero() {
        assert_eq!(parse_duration_minutes("0"), 0);
        assert_eq!(parse_duration_minutes(""), 0);
        assert_eq!(parse_duration_minutes("garbage"), 0);
        assert_eq!(parse_duration_minutes("3h"), 0);
        assert_eq!(parse_duration_minutes("h 5m"), 0);
        assert_eq!(parse_duration_minutes(" 45m"), 0);
    }

    #[test]
    fn trailing_text_after_match_is_ignored() {
        assert_eq!(parse_duration_minutes("1h 10m layover"), 70);
        assert_eq!(parse_duration_minutes("45mins"), 45);
    }

    #[test]
    fn hours_without_space_fall_back_to_minutes_branch() {
        // "2h30m" does not fit `<H>h <M>m`, and the minutes branch needs digits then `m`.
        assert_eq!(parse_duration_minutes("2h30m"), 0);
    }

    #[test]
    fn formatting_uses_dataset_notation() {
        assert_eq!(format_duration_minutes(205), "3h 25m");
        assert_eq!(format_duration_minutes(45), "45m");
        assert_eq!(format_duration_minutes(120), "2h 0m");
        assert_eq!(parse_duration_minutes(&format_duration_minutes(605)), 605);
    }

    #[test]
    fn overflowing_digit_runs_do_not_panic() {
        assert_eq!(parse_duration_minutes("99999999999m"), 0);
        assert_eq!(parse_duration_minutes("99999999h 1m"), 0);
    }
}
