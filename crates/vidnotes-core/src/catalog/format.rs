//! Display formatting for catalog metadata.

use chrono::{DateTime, Utc};

/// `1234567` -> `1.2M`, `4321` -> `4.3K`, smaller counts unchanged.
pub fn format_views(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Parse an ISO-8601 duration such as `PT1H2M3S` or `P1DT5M` into seconds.
pub fn parse_iso_duration(value: &str) -> Option<u64> {
    let rest = value.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, time),
        None => (rest, ""),
    };

    const DATE_UNITS: &[(char, u64)] = &[('W', 604_800), ('D', 86_400)];
    const TIME_UNITS: &[(char, u64)] = &[('H', 3_600), ('M', 60), ('S', 1)];

    let mut total = 0u64;
    let mut saw_component = false;
    for (part, units) in [(date_part, DATE_UNITS), (time_part, TIME_UNITS)] {
        let mut digits = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let (_, multiplier) = units.iter().find(|(unit, _)| *unit == c)?;
            let amount: u64 = digits.parse().ok()?;
            total += amount * multiplier;
            digits.clear();
            saw_component = true;
        }
        if !digits.is_empty() {
            return None;
        }
    }

    saw_component.then_some(total)
}

/// `3723` -> `1:02:03`, `245` -> `4:05`.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Relative age of an upload: "Today", "Yesterday", "3 days ago", ...
pub fn format_published_at(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - published).num_days();
    match days {
        i64::MIN..=0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        7..=29 => format!("{} weeks ago", days / 7),
        30..=364 => format!("{} months ago", days / 30),
        _ => format!("{} years ago", days / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_views() {
        assert_eq!(format_views(999), "999");
        assert_eq!(format_views(1_000), "1.0K");
        assert_eq!(format_views(4_321), "4.3K");
        assert_eq!(format_views(1_234_567), "1.2M");
    }

    #[test]
    fn test_parse_iso_duration() {
        assert_eq!(parse_iso_duration("PT4M5S"), Some(245));
        assert_eq!(parse_iso_duration("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso_duration("PT45S"), Some(45));
        assert_eq!(parse_iso_duration("P1DT1S"), Some(86_401));
        assert_eq!(parse_iso_duration("PT0M0S"), Some(0));
        assert_eq!(parse_iso_duration("garbage"), None);
        assert_eq!(parse_iso_duration("PT"), None);
        assert_eq!(parse_iso_duration("PT5X"), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(245), "4:05");
        assert_eq!(format_duration(3723), "1:02:03");
    }

    #[test]
    fn test_format_published_at() {
        let now = Utc::now();
        assert_eq!(format_published_at(now - Duration::hours(2), now), "Today");
        assert_eq!(format_published_at(now - Duration::days(1), now), "Yesterday");
        assert_eq!(format_published_at(now - Duration::days(3), now), "3 days ago");
        assert_eq!(format_published_at(now - Duration::days(15), now), "2 weeks ago");
        assert_eq!(format_published_at(now - Duration::days(90), now), "3 months ago");
        assert_eq!(format_published_at(now - Duration::days(800), now), "2 years ago");
    }
}
