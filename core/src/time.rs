use crate::error::{BoardError, Result};

/// Upper bound for a single estimate: 10 000 hours.
pub const MAX_ESTIMATE_MINUTES: u32 = 10_000 * 60;

// Working-time units: a day is 8 hours, a week is 5 days.
const MINUTES_PER_HOUR: f64 = 60.0;
const MINUTES_PER_DAY: f64 = 8.0 * MINUTES_PER_HOUR;
const MINUTES_PER_WEEK: f64 = 5.0 * MINUTES_PER_DAY;

/// Parses an estimate such as `3h`, `1h 30m`, `2d` or a bare number of hours
/// into whole minutes.
pub fn parse_minutes(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BoardError::invalid_estimation(input, "estimation is empty"));
    }

    // A bare number is an amount of hours.
    if let Ok(hours) = trimmed.parse::<f64>() {
        return hours_to_minutes(hours)
            .map_err(|reason| BoardError::invalid_estimation(input, reason));
    }

    let mut total = 0.0;
    let mut amount = String::new();
    for c in trimmed.chars() {
        if c.is_ascii_digit() || c == '.' {
            amount.push(c);
            continue;
        }
        if c.is_whitespace() {
            // Each amount needs its unit right after it: `1 2h` is not `12h`.
            if !amount.is_empty() {
                return Err(BoardError::invalid_estimation(
                    input,
                    format!("missing unit after '{amount}'"),
                ));
            }
            continue;
        }
        let unit = unit_minutes(c)
            .ok_or_else(|| BoardError::invalid_estimation(input, format!("unknown unit '{c}'")))?;
        if amount.is_empty() {
            return Err(BoardError::invalid_estimation(
                input,
                format!("missing amount before '{c}'"),
            ));
        }
        let value: f64 = amount.parse().map_err(|_| {
            BoardError::invalid_estimation(input, format!("'{amount}' is not a number"))
        })?;
        total += value * unit;
        amount.clear();
    }

    if !amount.is_empty() {
        return Err(BoardError::invalid_estimation(
            input,
            format!("missing unit after '{amount}'"),
        ));
    }

    round_minutes(total).map_err(|reason| BoardError::invalid_estimation(input, reason))
}

/// Converts a number of hours (as sent by clients that pass a JSON number).
pub fn hours_to_minutes(hours: f64) -> std::result::Result<u32, String> {
    round_minutes(hours * MINUTES_PER_HOUR)
}

fn round_minutes(minutes: f64) -> std::result::Result<u32, String> {
    if !minutes.is_finite() || minutes < 0.0 {
        return Err("must be a finite, non-negative amount".to_string());
    }
    let rounded = minutes.round();
    if rounded > f64::from(MAX_ESTIMATE_MINUTES) {
        return Err(format!(
            "exceeds the maximum of {}",
            format_minutes(MAX_ESTIMATE_MINUTES)
        ));
    }
    Ok(rounded as u32)
}

fn unit_minutes(unit: char) -> Option<f64> {
    match unit.to_ascii_lowercase() {
        'm' => Some(1.0),
        'h' => Some(MINUTES_PER_HOUR),
        'd' => Some(MINUTES_PER_DAY),
        'w' => Some(MINUTES_PER_WEEK),
        _ => None,
    }
}

/// Compact rendering: `45m`, `3h`, `1h30m`.
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h{m}m"),
    }
}
