//! # Duration Parsing
//!
//! Parses the interval flag. Accepts Go-style duration strings made of one or more
//! `<number><unit>` components, e.g. `30s`, `1m`, `1m30s`, `500ms`, `2h`, `1d`.

use super::ConfigError;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static DURATION_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+(?:ms|s|m|h|d))+$").expect("duration format regex is valid")
});

static DURATION_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<number>\d+)(?P<unit>ms|s|m|h|d)").expect("duration component regex is valid")
});

/// Parse a duration string such as `1m30s` into a [`Duration`]
///
/// A bare `0` is accepted and yields a zero duration; validation decides
/// whether zero is meaningful for the field being parsed.
///
/// # Errors
/// Returns [`ConfigError::InvalidDuration`] when the string is empty, uses an
/// unknown unit, or overflows.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let trimmed = input.trim().to_lowercase();

    if trimmed == "0" {
        return Ok(Duration::ZERO);
    }

    if trimmed.is_empty() || !DURATION_FORMAT.is_match(&trimmed) {
        return Err(ConfigError::InvalidDuration {
            value: input.to_string(),
            reason: "expected <number><unit>[<number><unit>...] with units ms, s, m, h, d (e.g. '1m', '1m30s')".to_string(),
        });
    }

    let mut total = Duration::ZERO;
    for captures in DURATION_COMPONENT.captures_iter(&trimmed) {
        let number: u64 = captures["number"].parse().map_err(|e| ConfigError::InvalidDuration {
            value: input.to_string(),
            reason: format!("invalid number '{}': {e}", &captures["number"]),
        })?;

        let component = match &captures["unit"] {
            "ms" => Some(Duration::from_millis(number)),
            "s" => Some(Duration::from_secs(number)),
            "m" => number.checked_mul(60).map(Duration::from_secs),
            "h" => number.checked_mul(3600).map(Duration::from_secs),
            "d" => number.checked_mul(86_400).map(Duration::from_secs),
            unit => {
                return Err(ConfigError::InvalidDuration {
                    value: input.to_string(),
                    reason: format!("unknown unit '{unit}'"),
                })
            }
        };

        total = component
            .and_then(|c| total.checked_add(c))
            .ok_or_else(|| ConfigError::InvalidDuration {
                value: input.to_string(),
                reason: "duration overflows".to_string(),
            })?;
    }

    Ok(total)
}

/// Render a duration the way it is accepted on the command line
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis == 0 {
        return "0s".to_string();
    }
    if millis % 1000 != 0 {
        return format!("{millis}ms");
    }

    let mut secs = duration.as_secs();
    let mut out = String::new();
    for (unit, size) in [("h", 3600), ("m", 60), ("s", 1)] {
        if secs >= size {
            out.push_str(&format!("{}{unit}", secs / size));
            secs %= size;
        }
    }
    out
}
