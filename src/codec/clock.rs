//! Clock and calendar decomposition.
//!
//! Datasets carry departure/arrival as 12-hour clock text (`"1:05 PM"`), with
//! arrivals sometimes suffixed by a day-rollover marker (`"1:05 AM+1"`). The
//! marker is dropped: the model never sees that a flight lands on the next day.
//!
//! Serving receives `NaiveTime`/`NaiveDate` values directly, so only the
//! training path needs the text parsers; both paths meet in [`ClockFields`] and
//! [`DateFields`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::codec::CodecError;

/// Hour (0-23) and minute (0-59) as model fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFields {
    pub hour: u32,
    pub minute: u32,
}

impl From<NaiveTime> for ClockFields {
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }
}

/// Day of month, month (1-12) and four-digit year as model fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFields {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl From<NaiveDate> for DateFields {
    fn from(date: NaiveDate) -> Self {
        Self {
            day: date.day(),
            month: date.month(),
            year: date.year(),
        }
    }
}

/// Remove a trailing `+<n>` day-rollover marker.
///
/// Everything from the first `+` onwards is discarded.
pub fn strip_rollover(text: &str) -> &str {
    match text.split_once('+') {
        Some((clock, _)) => clock.trim_end(),
        None => text,
    }
}

/// Parse `h:mm AM|PM` into a 24-hour time.
///
/// 12 AM is hour 0, 12 PM is hour 12, other PM hours gain 12.
pub fn parse_clock_12h(text: &str) -> Result<NaiveTime, CodecError> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%I:%M %p")
        .map_err(|_| CodecError::InvalidClock(trimmed.to_string()))
}

/// Parse an arrival clock value, ignoring any rollover marker.
pub fn parse_arrival_clock(text: &str) -> Result<NaiveTime, CodecError> {
    parse_clock_12h(strip_rollover(text.trim()))
}

/// Parse a flight date.
///
/// ISO dates are preferred. Slash dates are read month-first (`05/06/2024` is
/// May 6), the same way the scraped dataset's tooling reads them.
pub fn parse_flight_date(text: &str) -> Result<NaiveDate, CodecError> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
    let s = text.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    // Spreadsheet exports sometimes keep a midnight timestamp on the date.
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(CodecError::InvalidDate(s.to_string()))
}
