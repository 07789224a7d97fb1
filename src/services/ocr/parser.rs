use super::vocabulary::classify_line;
use crate::models::stat::{StatKey, StatMap};
use regex::Regex;
use std::sync::OnceLock;

/// First signed number on a line, with optional separators and trailing percent
fn number_regex() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| {
        Regex::new(r"([-+]?[0-9]+(?:[.,][0-9]+)*)\s*%?").expect("number pattern must compile")
    })
}

/// Trailing comma followed by 1-2 digits: a decimal comma ("12,5", "1.234,56")
fn decimal_comma_regex() -> &'static Regex {
    static DECIMAL_COMMA: OnceLock<Regex> = OnceLock::new();
    DECIMAL_COMMA.get_or_init(|| {
        Regex::new(r",([0-9]{1,2})$").expect("decimal comma pattern must compile")
    })
}

/// Convert a locale-formatted numeric fragment into a float.
///
/// Everything except digits, `,`, `.`, `+` and `-` is dropped first. A comma
/// followed by 1-2 trailing digits is the decimal separator, and any periods
/// before it are thousands separators. Otherwise commas are thousands
/// separators and a period is the decimal point.
///
/// Returns `None` when the cleaned text is not a finite number.
pub fn normalize_number(fragment: &str) -> Option<f64> {
    let clean: String = fragment
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '+' | '-'))
        .collect();

    if clean.is_empty() {
        return None;
    }

    let canonical = if let Some(caps) = decimal_comma_regex().captures(&clean) {
        let split = caps.get(0).map(|m| m.start()).unwrap_or(clean.len());
        let integer: String = clean[..split]
            .chars()
            .filter(|c| !matches!(c, ',' | '.'))
            .collect();
        format!("{}.{}", integer, &caps[1])
    } else {
        clean.replace(',', "")
    };

    canonical
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// First numeric value on a line, normalized
pub fn parse_line_value(line: &str) -> Option<f64> {
    let caps = number_regex().captures(line)?;
    normalize_number(caps.get(1)?.as_str())
}

/// Extract one stat reading from a single OCR line
pub fn parse_stat_line(line: &str) -> Option<(StatKey, f64)> {
    let key = classify_line(line)?;
    let value = parse_line_value(line)?;
    Some((key, value))
}

/// Extract stats from raw OCR text of one equipment panel.
///
/// Lines that classify as no stat, or whose number does not parse, are
/// skipped. When several lines land on the same stat, the reading with the
/// larger absolute value is kept since OCR tends to drop digits rather than
/// invent them.
pub fn extract_stats(text: &str) -> StatMap {
    let mut stats = StatMap::new();

    for line in text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
        let Some((key, value)) = parse_stat_line(line) else {
            tracing::trace!("Skipped OCR line: {:?}", line);
            continue;
        };

        match stats.get(key) {
            Some(existing) if existing.abs() >= value.abs() => {
                tracing::debug!("{:?}: keeping {} over {} from {:?}", key, existing, value, line);
            }
            _ => {
                tracing::debug!("{:?} = {} from {:?}", key, value, line);
                stats.set(key, value);
            }
        }
    }

    stats
}
