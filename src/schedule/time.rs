use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("invalid time {0:?}, expected H:M:S")]
    Time(String),
    #[error("invalid duration {0:?}, expected H:M:S or M:S")]
    Duration(String),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: u64 },
}

/// Split `s` on `:` into unsigned integers. `None` if any field is not a number.
fn fields(s: &str) -> Option<Vec<u64>> {
    s.trim()
        .split(':')
        .map(|p| p.trim().parse::<u64>().ok())
        .collect()
}

fn check(field: &'static str, value: u64, max: u64) -> Result<u64, TimeParseError> {
    if value > max {
        Err(TimeParseError::OutOfRange { field, value })
    } else {
        Ok(value)
    }
}

/// Parse a time of day: exactly three fields, hour 0-23, minute and second 0-59.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, TimeParseError> {
    let parts = fields(s)
        .filter(|p| p.len() == 3)
        .ok_or_else(|| TimeParseError::Time(s.to_string()))?;

    let hour = check("hour", parts[0], 23)?;
    let minute = check("minute", parts[1], 59)?;
    let second = check("second", parts[2], 59)?;

    NaiveTime::from_hms_opt(hour as u32, minute as u32, second as u32)
        .ok_or_else(|| TimeParseError::Time(s.to_string()))
}

/// Parse a duration in seconds from `H:M:S` or `M:S`. Hours are unbounded;
/// minutes and seconds must be 0-59.
pub fn parse_duration(s: &str) -> Result<u64, TimeParseError> {
    let parts = fields(s).ok_or_else(|| TimeParseError::Duration(s.to_string()))?;
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0, *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(TimeParseError::Duration(s.to_string())),
    };

    let minutes = check("minute", minutes, 59)?;
    let seconds = check("second", seconds, 59)?;

    hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .ok_or(TimeParseError::OutOfRange {
            field: "hour",
            value: hours,
        })
}

/// Format whole seconds as `HH:MM:SS` (hours grow past two digits as needed).
pub fn format_hms(secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// The next instant at which the wall clock reads `at`: today if that has not
/// passed yet, tomorrow otherwise. Never earlier than `now`.
///
/// The current second counts as "not passed": asking for the time that is on
/// the clock right now yields `now` itself.
pub fn next_occurrence(now: DateTime<Local>, at: NaiveTime) -> DateTime<Local> {
    let this_second = now.with_nanosecond(0).unwrap_or(now);
    let today = now.date_naive().and_time(at);

    let candidate = resolve_local(today, now);
    if candidate >= this_second {
        return candidate.max(now);
    }
    resolve_local(today + TimeDelta::days(1), now).max(now)
}

/// Map a local wall-clock reading to an instant. Readings that fall into a
/// DST gap move forward by an hour.
fn resolve_local(naive: NaiveDateTime, now: DateTime<Local>) -> DateTime<Local> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(naive + TimeDelta::hours(1)))
                .earliest()
        })
        .unwrap_or(now)
}
