//! Formatting helpers for terminal output.

use chrono::{DateTime, Duration, NaiveDate};

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Eight-point compass direction for a wind bearing in degrees.
pub fn wind_direction(degrees: u16) -> &'static str {
    let index = ((f64::from(degrees) / 45.0).round() as usize) % 8;
    COMPASS[index]
}

/// Provider descriptions arrive lowercased ("broken clouds").
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Local wall-clock time of an epoch at the place's UTC offset. The 0
/// sentinel (unresolvable sunrise/sunset) renders as a placeholder.
pub fn local_time(epoch: i64, utc_offset_secs: i32) -> String {
    if epoch == 0 {
        return "--:--".to_string();
    }

    match DateTime::from_timestamp(epoch, 0) {
        Some(dt) => (dt + Duration::seconds(i64::from(utc_offset_secs)))
            .format("%H:%M")
            .to_string(),
        None => "--:--".to_string(),
    }
}

/// Outlook column header, e.g. "Wed 15 Nov".
pub fn day_heading(date: NaiveDate) -> String {
    date.format("%a %d %b").to_string()
}
