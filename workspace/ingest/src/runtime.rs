//! Runtime strings as printed on event pages, e.g. `"1 hr 45 min"`,
//! `"1h 45m"`, `"50m"` or `"2h"`.

use chrono::{DateTime, TimeDelta, TimeZone};
use std::fmt;
use thiserror::Error;
use tracing::trace;

const HOUR_MARKER: char = 'h';
const MINUTE_MARKER: char = 'm';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("no number precedes the '{marker}' marker in '{text}'")]
    MissingValue { marker: char, text: String },

    #[error("value '{value}' in '{text}' does not fit a runtime")]
    OutOfRange { value: String, text: String },
}

/// A fixed running time. Minutes are kept as written and may exceed 59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Runtime {
    pub hours: u32,
    pub minutes: u32,
}

impl Runtime {
    pub const ZERO: Runtime = Runtime {
        hours: 0,
        minutes: 0,
    };

    pub const fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }

    pub fn to_delta(self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.hours)) + TimeDelta::minutes(i64::from(self.minutes))
    }

    /// When a showing starting at `start` ends.
    pub fn end_of<Tz: TimeZone>(self, start: DateTime<Tz>) -> DateTime<Tz> {
        start + self.to_delta()
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hours, self.minutes)
    }
}

/// Parses a runtime description.
///
/// The canonical `H hr M min` layout is tried first. Anything else falls
/// back to locating the first `h` and the first `m` and reading the number
/// written immediately before each one. Text without either marker is a
/// zero-length runtime.
pub fn parse_runtime(text: &str) -> Result<Runtime, RuntimeError> {
    if let Some(runtime) = parse_canonical(text) {
        trace!("Parsed '{}' as canonical runtime {}", text, runtime);
        return Ok(runtime);
    }

    let runtime = parse_by_markers(text)?;
    trace!("Parsed '{}' by markers as {}", text, runtime);
    Ok(runtime)
}

/// End timestamps for each start, in the same order.
pub fn end_times<Tz: TimeZone>(starts: &[DateTime<Tz>], runtime: Runtime) -> Vec<DateTime<Tz>> {
    starts
        .iter()
        .cloned()
        .map(|start| runtime.end_of(start))
        .collect()
}

fn parse_canonical(text: &str) -> Option<Runtime> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [hours, "hr" | "hrs", minutes, "min" | "mins"] => {
            Some(Runtime::new(hours.parse().ok()?, minutes.parse().ok()?))
        }
        _ => None,
    }
}

fn parse_by_markers(text: &str) -> Result<Runtime, RuntimeError> {
    let hours = text
        .find(HOUR_MARKER)
        .map(|index| value_before(text, index, HOUR_MARKER))
        .transpose()?;
    let minutes = text
        .find(MINUTE_MARKER)
        .map(|index| value_before(text, index, MINUTE_MARKER))
        .transpose()?;

    Ok(Runtime::new(hours.unwrap_or(0), minutes.unwrap_or(0)))
}

/// Reads the run of digits ending right before `index`, skipping whitespace
/// between the number and its marker.
fn value_before(text: &str, index: usize, marker: char) -> Result<u32, RuntimeError> {
    let head = text[..index].trim_end();
    let digits = &head[head.trim_end_matches(|c: char| c.is_ascii_digit()).len()..];

    if digits.is_empty() {
        return Err(RuntimeError::MissingValue {
            marker,
            text: text.to_string(),
        });
    }

    digits.parse().map_err(|_| RuntimeError::OutOfRange {
        value: digits.to_string(),
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};

    fn at(value: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(value).unwrap()
    }

    #[test]
    fn test_hours_and_minutes() {
        assert_eq!(parse_runtime("1h 45m").unwrap(), Runtime::new(1, 45));
        assert_eq!(parse_runtime("1h45m").unwrap(), Runtime::new(1, 45));
    }

    #[test]
    fn test_minutes_only() {
        assert_eq!(parse_runtime("50m").unwrap(), Runtime::new(0, 50));
        assert_eq!(parse_runtime("50 min").unwrap(), Runtime::new(0, 50));
    }

    #[test]
    fn test_hours_only() {
        assert_eq!(parse_runtime("2h").unwrap(), Runtime::new(2, 0));
        assert_eq!(parse_runtime("2 hrs").unwrap(), Runtime::new(2, 0));
    }

    #[test]
    fn test_no_markers_is_zero() {
        assert_eq!(parse_runtime("").unwrap(), Runtime::ZERO);
        assert_eq!(parse_runtime("TBA").unwrap(), Runtime::ZERO);
        assert_eq!(parse_runtime("").unwrap().to_delta(), TimeDelta::zero());
    }

    #[test]
    fn test_canonical_format() {
        assert_eq!(parse_runtime("1 hr 45 min").unwrap(), Runtime::new(1, 45));
        assert_eq!(parse_runtime("  2 hrs 5 mins ").unwrap(), Runtime::new(2, 5));
        assert_eq!(parse_runtime("0 hr 0 min").unwrap(), Runtime::ZERO);
    }

    #[test]
    fn test_extra_whitespace() {
        assert_eq!(parse_runtime("  1   h    45   m ").unwrap(), Runtime::new(1, 45));
        assert_eq!(parse_runtime("1 hour 30 minutes").unwrap(), Runtime::new(1, 30));
    }

    #[test]
    fn test_minutes_are_not_normalized() {
        let runtime = parse_runtime("90m").unwrap();
        assert_eq!(runtime, Runtime::new(0, 90));
        assert_eq!(runtime.to_delta(), TimeDelta::minutes(90));
        assert_eq!(runtime.to_string(), "0:90");
    }

    #[test]
    fn test_marker_without_number() {
        let err = parse_runtime("about an hour").unwrap_err();
        assert!(matches!(err, RuntimeError::MissingValue { marker: 'h', .. }));
    }

    #[test]
    fn test_number_too_large() {
        let err = parse_runtime("99999999999m").unwrap_err();
        assert!(matches!(err, RuntimeError::OutOfRange { .. }));
    }

    #[test]
    fn test_end_times_preserve_order() {
        let starts = vec![
            at("2022-02-05T21:30:00-05:00"),
            at("2022-02-04T19:00:00-05:00"),
        ];
        let ends = end_times(&starts, Runtime::new(1, 45));
        assert_eq!(
            ends,
            vec![
                at("2022-02-05T23:15:00-05:00"),
                at("2022-02-04T20:45:00-05:00"),
            ]
        );
    }

    #[test]
    fn test_end_of_crosses_midnight() {
        let end = Runtime::new(2, 30).end_of(at("2022-03-01T22:00:00-05:00"));
        assert_eq!(end, at("2022-03-02T00:30:00-05:00"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Runtime::new(1, 5).to_string(), "1:05");
    }
}
