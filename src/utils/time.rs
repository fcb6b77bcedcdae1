//! Time formatting utilities

/// Format seconds as zero-padded `HH:MM:SS.ss`
pub fn format_duration_hms(seconds: f64) -> String {
    let mut secs = seconds;
    let mut mins = (secs / 60.0).floor();
    secs -= mins * 60.0;
    let hours = (mins / 60.0).floor();
    mins -= hours * 60.0;

    format!("{:02}:{:02}:{:05.2}", hours as i64, mins as i64, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_long_duration() {
        assert_eq!(format_duration_hms(5751.787), "01:35:51.79");
    }

    #[test]
    fn test_format_short_duration() {
        assert_eq!(format_duration_hms(5.5), "00:00:05.50");
        assert_eq!(format_duration_hms(0.0), "00:00:00.00");
    }

    #[test]
    fn test_format_exact_hour() {
        assert_eq!(format_duration_hms(3600.0), "01:00:00.00");
    }

    #[test]
    fn test_format_many_hours() {
        assert_eq!(format_duration_hms(100.0 * 3600.0 + 61.25), "100:01:01.25");
    }
}
