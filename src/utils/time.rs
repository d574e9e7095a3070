use chrono::{DateTime, Utc};

/// Current UTC time.
pub fn datetime_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC time as whole seconds since the unix epoch.
pub fn unix_timestamp_utc() -> i64 {
    Utc::now().timestamp()
}

/// Current UTC wall-clock time formatted as `HH:MM:SS`.
pub fn unix_time_utc() -> String {
    format_clock(&Utc::now())
}

pub fn format_clock(time: &DateTime<Utc>) -> String {
    time.format("%H:%M:%S").to_string()
}

/// `YYYY-MM-DD HH:MM:SS`, the format used in info panels.
pub fn format_datetime(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_formats() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_clock(&time), "07:05:01");
        assert_eq!(format_datetime(&time), "2024-03-09 07:05:01");
    }

    #[test]
    fn test_timestamp_is_recent() {
        // 2020-01-01
        assert!(unix_timestamp_utc() > 1_577_836_800);
        assert_eq!(unix_time_utc().len(), 8);
    }
}
