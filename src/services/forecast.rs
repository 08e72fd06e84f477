//! Target-date parsing and forecast slot selection.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use crate::errors::InvalidDate;
use crate::services::openweather::ForecastSlot;

/// Naive timestamp layouts accepted besides RFC 3339.
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a normalized date parameter into a calendar date.
///
/// Timestamps with an offset keep the calendar date as written, not the
/// UTC date. `today` anchors the relative words "today" and "tomorrow".
pub fn parse_target_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, InvalidDate> {
    let s = raw.trim();

    match s.to_ascii_lowercase().as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        _ => {}
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    for fmt in &NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| InvalidDate(raw.to_string()))
}

/// Return the first slot falling on `date`.
///
/// Slots are matched on their `YYYY-MM-DD` timestamp prefix; the forecast
/// only spans about five days, so later dates find nothing.
pub fn select_slot(slots: &[ForecastSlot], date: NaiveDate) -> Option<&ForecastSlot> {
    let prefix = date.format("%Y-%m-%d").to_string();
    slots.iter().find(|slot| slot.dt_txt.starts_with(&prefix))
}
