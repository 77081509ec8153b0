//! Pure formatting helpers for raw SNMP scalar values.
//!
//! Everything here is stateless: raw readings in, display text and a
//! classification out. The renderer calls these per cell.

use serde_json::Value;

/// Shown wherever a value is missing or unreadable.
pub const PLACEHOLDER: &str = "-";

/// Display classification for a status-like value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Caution,
    Neutral,
}

/// Classification of an optical power reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerGrade {
    Good,
    Warning,
    Bad,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerReading {
    pub text: String,
    pub grade: PowerGrade,
}

/// Classifies a string-encoded dBm reading.
///
/// Readings above 50 dBm are treated as sensor garbage (the OLT reports
/// e.g. 2147483647 for absent transceivers), same as unparseable input.
pub fn power(raw: &str) -> PowerReading {
    let num: f64 = match raw.trim().parse() {
        Ok(n) => n,
        Err(_) => {
            return PowerReading {
                text: PLACEHOLDER.to_string(),
                grade: PowerGrade::Invalid,
            };
        }
    };

    if num > 50.0 {
        return PowerReading {
            text: PLACEHOLDER.to_string(),
            grade: PowerGrade::Invalid,
        };
    }

    let grade = if (-25.0..=-8.0).contains(&num) {
        PowerGrade::Good
    } else if num >= -28.0 {
        PowerGrade::Warning
    } else {
        PowerGrade::Bad
    };

    PowerReading {
        text: format!("{num:.2} dBm"),
        grade,
    }
}

/// Maps a device status string to a display tone.
///
/// Matching is case-insensitive and substring-based. The bare "1"/"2"
/// entries cover devices that report numeric status codes instead of
/// words; negative vocabulary is checked first so that "inactive" does
/// not match on "active".
pub fn status_tone(status: &str) -> Tone {
    let lowered = status.to_lowercase();
    let matches = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    if matches(&["offline", "down", "inactive", "2"]) {
        Tone::Negative
    } else if matches(&["warning", "degraded", "logging", "synchronization"]) {
        Tone::Caution
    } else if matches(&["online", "active", "up", "in-service", "1"]) {
        Tone::Positive
    } else {
        Tone::Neutral
    }
}

/// `onu_id` -> `Onu Id`
pub fn humanize_key(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Coerces an arbitrary JSON value into display text.
pub fn coerce(value: &Value) -> String {
    match value {
        Value::Null => PLACEHOLDER.to_string(),
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.trim().is_empty() {
                PLACEHOLDER.to_string()
            } else {
                s.clone()
            }
        }
        other => serde_json::to_string(other).unwrap_or_else(|_| PLACEHOLDER.to_string()),
    }
}

/// Breaks a seconds counter into a `DdHhMm` display.
pub fn uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    format!("{days}d {hours}h {minutes}m")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn power_in_good_range() {
        let reading = power("-15.00");
        assert_eq!(reading.text, "-15.00 dBm");
        assert_eq!(reading.grade, PowerGrade::Good);
    }

    #[test]
    fn power_in_warning_band() {
        assert_eq!(power("-26.50").grade, PowerGrade::Warning);
        assert_eq!(power("-28.00").grade, PowerGrade::Warning);
    }

    #[test]
    fn power_below_floor_is_bad() {
        let reading = power("-30.00");
        assert_eq!(reading.grade, PowerGrade::Bad);
        assert_eq!(reading.text, "-30.00 dBm");
    }

    #[test]
    fn power_invalid_inputs() {
        let garbage = power("abc");
        assert_eq!(garbage.text, PLACEHOLDER);
        assert_eq!(garbage.grade, PowerGrade::Invalid);

        // Values above 50 dBm are sensor garbage, not readings.
        let absent = power("100");
        assert_eq!(absent.text, PLACEHOLDER);
        assert_eq!(absent.grade, PowerGrade::Invalid);
    }

    #[test]
    fn status_positive_vocabulary() {
        assert_eq!(status_tone("Online"), Tone::Positive);
        assert_eq!(status_tone("online"), Tone::Positive);
        assert_eq!(status_tone("1"), Tone::Positive);
        assert_eq!(status_tone("In-Service"), Tone::Positive);
    }

    #[test]
    fn status_negative_vocabulary() {
        assert_eq!(status_tone("Offline"), Tone::Negative);
        assert_eq!(status_tone("2"), Tone::Negative);
        assert_eq!(status_tone("Inactive"), Tone::Negative);
        assert_eq!(status_tone("LinkDown"), Tone::Negative);
    }

    #[test]
    fn status_caution_and_neutral() {
        assert_eq!(status_tone("Synchronization"), Tone::Caution);
        assert_eq!(status_tone("Logging"), Tone::Caution);
        assert_eq!(status_tone("Degraded"), Tone::Caution);
        assert_eq!(status_tone("Foo"), Tone::Neutral);
    }

    #[test]
    fn humanizes_snake_case_keys() {
        assert_eq!(humanize_key("onu_id"), "Onu Id");
        assert_eq!(humanize_key("serial_number"), "Serial Number");
        assert_eq!(humanize_key("x"), "X");
    }

    #[test]
    fn coerces_values_for_display() {
        assert_eq!(coerce(&Value::Null), PLACEHOLDER);
        assert_eq!(coerce(&json!(true)), "yes");
        assert_eq!(coerce(&json!(false)), "no");
        assert_eq!(coerce(&json!(42)), "42");
        assert_eq!(coerce(&json!("")), PLACEHOLDER);
        assert_eq!(coerce(&json!({"a": 1})), "{\"a\":1}");
    }

    #[test]
    fn uptime_breakdown() {
        assert_eq!(uptime(0), "0d 0h 0m");
        assert_eq!(uptime(90061), "1d 1h 1m");
        assert_eq!(uptime(86400 * 3 + 3600 * 5 + 60 * 7), "3d 5h 7m");
    }
}
