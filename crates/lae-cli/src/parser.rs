use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use chrono_english::{parse_date_string, Dialect};

/// ISO dates first, then free-form English ("tomorrow", "next friday").
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    let trimmed = date_str.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date_string(trimmed, Local::now(), Dialect::Uk)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", date_str, e))
}

pub fn parse_time(time_str: &str) -> Result<NaiveTime> {
    let trimmed = time_str.trim();
    ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| anyhow!("Failed to parse time '{}': expected HH:MM", time_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_date("2024-02-29").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_parse_relative_date() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date("today").unwrap(), today);
        assert_eq!(parse_date("tomorrow").unwrap(), today + Duration::days(1));
        assert!(parse_date("whenever").is_err());
    }

    #[rstest]
    #[case("09:30", 9, 30)]
    #[case("07:05:00", 7, 5)]
    #[case("2:15 PM", 14, 15)]
    #[case("11:00am", 11, 0)]
    fn test_parse_time(#[case] input: &str, #[case] hour: u32, #[case] minute: u32) {
        assert_eq!(parse_time(input).unwrap(), NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!(parse_time("noonish").is_err());
        assert!(parse_time("25:00").is_err());
    }
}
