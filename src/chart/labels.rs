use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use super::interval::IntervalToken;

/// X-axis tick label in German date order.
///
/// Week and month windows put the time on a second line to keep ticks
/// narrow. Returns an empty string for a zero or out-of-range timestamp.
#[must_use]
pub fn format_axis_label<Tz>(timestamp: i64, interval: IntervalToken, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(dt) = local_time(timestamp, tz) else {
        return String::new();
    };
    let date = dt.format("%d.%m.%y");
    let time = dt.format("%H:%M");
    match interval {
        IntervalToken::OneWeek | IntervalToken::OneMonth => format!("{date}\n{time}"),
        _ => format!("{date}, {time}"),
    }
}

/// Timestamp of the latest reading as shown next to the current values.
#[must_use]
pub fn format_current_timestamp<Tz>(timestamp: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    local_time(timestamp, tz)
        .map(|dt| dt.format("%d.%m.%y, %H:%M").to_string())
        .unwrap_or_default()
}

fn local_time<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    if timestamp == 0 {
        return None;
    }
    DateTime::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(tz))
}
