//! Human-readable duration parsing for the countdown command.
//!
//! Accepted forms:
//! - bare seconds: `90`, `12.5`
//! - unit sequences, via `humantime`: `5m30s`, `1h 2m`, `250ms`, `2days`
//! - clock style: `mm:ss`, `hh:mm:ss`

use core::fmt;
use core::time::Duration;

/// Errors from [`parse_duration`].
#[derive(Debug, Clone, PartialEq)]
pub enum DurationParseError {
    /// Nothing to parse.
    Empty,
    /// A numeric component does not parse.
    InvalidNumber(String),
    /// The clock form has the wrong number of fields, or the value overflows.
    Malformed(String),
    /// A unit sequence was rejected.
    Units(humantime::DurationError),
}

impl fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationParseError::Empty => write!(f, "duration is empty"),
            DurationParseError::InvalidNumber(n) => write!(f, "'{}' is not a number", n),
            DurationParseError::Malformed(s) => write!(
                f,
                "cannot read '{}' as a duration (try 90, 5m30s or 05:30)",
                s
            ),
            DurationParseError::Units(err) => write!(f, "{} (try 90, 5m30s or 05:30)", err),
        }
    }
}

impl std::error::Error for DurationParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DurationParseError::Units(err) => Some(err),
            _ => None,
        }
    }
}

fn parse_number(text: &str) -> Result<f64, DurationParseError> {
    let value: f64 = text
        .parse()
        .map_err(|_| DurationParseError::InvalidNumber(text.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(DurationParseError::InvalidNumber(text.to_string()));
    }
    Ok(value)
}

fn to_duration(seconds: f64, text: &str) -> Result<Duration, DurationParseError> {
    let nanos = (seconds * 1e9).round();
    if !(0.0..=u64::MAX as f64).contains(&nanos) {
        return Err(DurationParseError::Malformed(text.to_string()));
    }
    Ok(Duration::from_nanos(nanos as u64))
}

fn parse_clock(text: &str) -> Result<Duration, DurationParseError> {
    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(DurationParseError::Malformed(text.to_string())),
    };
    let whole = |part: &str| -> Result<f64, DurationParseError> {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DurationParseError::InvalidNumber(part.to_string()));
        }
        parse_number(part)
    };
    let total = whole(hours)? * 3_600.0 + whole(minutes)? * 60.0 + parse_number(seconds)?;
    to_duration(total, text)
}

/// Parses a human-readable duration such as `5m30s`.
pub fn parse_duration(text: &str) -> Result<Duration, DurationParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if text.contains(':') {
        return parse_clock(text);
    }
    if text.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return to_duration(parse_number(text)?, text);
    }
    humantime::parse_duration(text).map_err(DurationParseError::Units)
}
