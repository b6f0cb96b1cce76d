use chrono::{DateTime, Utc};
use chrono_tz::America;
use std::time::Duration;

use crate::error::DurationError;

/// Parses a Go-style duration string such as `4h`, `90m`, `1h30m` or `1.5h`.
///
/// Only strictly positive durations are accepted, since the result drives a
/// periodic timer.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());

    let mut rest = input.trim();
    let negative = match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    if rest == "0" {
        return Err(DurationError::NotPositive(input.to_string()));
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut nanos = 0f64;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_end];
        if number.is_empty() {
            return Err(invalid());
        }
        let value: f64 = number.parse().map_err(|_| invalid())?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;
        nanos += value * scale;
        rest = &rest[unit_end..];
    }

    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err(invalid());
    }
    if negative || nanos < 1.0 {
        return Err(DurationError::NotPositive(input.to_string()));
    }

    Ok(Duration::from_nanos(nanos.round() as u64))
}

fn unit_nanos(unit: &str) -> Option<f64> {
    let scale = match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1e3,
        "ms" => 1e6,
        "s" => 1e9,
        "m" => 60.0 * 1e9,
        "h" => 3600.0 * 1e9,
        _ => return None,
    };
    Some(scale)
}

/// Formats a duration as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Launch sites are in Florida, so timestamps are shown in US Eastern time.
pub fn format_eastern(datetime: DateTime<Utc>) -> String {
    datetime
        .with_timezone(&America::New_York)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}
