//! Natural-language reply composition.
//!
//! All functions are pure; the current date is passed in by the caller.

use chrono::{Duration, NaiveDate};

use crate::services::openweather::Observation;

/// Difference (°C) above which the feels-like temperature is shown.
const FEELS_LIKE_THRESHOLD_C: i64 = 3;

/// Round for display; halves round up (-2.5 becomes -2).
pub fn round_temperature(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

pub fn format_temperature(temp: i64, feels_like: i64) -> String {
    if (temp - feels_like).abs() > FEELS_LIKE_THRESHOLD_C {
        format!("{}°C (feels like {}°C)", temp, feels_like)
    } else {
        format!("{}°C", temp)
    }
}

/// Pick an emoji from keywords in the weather description.
pub fn weather_emoji(description: &str) -> &'static str {
    let lower = description.to_lowercase();
    if lower.contains("clear") {
        "☀️"
    } else if lower.contains("cloud") {
        "☁️"
    } else if lower.contains("rain") {
        "🌧️"
    } else if lower.contains("thunder") {
        "⛈️"
    } else if lower.contains("snow") {
        "❄️"
    } else if lower.contains("mist") || lower.contains("fog") {
        "🌫️"
    } else {
        "🌤️"
    }
}

pub fn wind_descriptor(speed_ms: f64) -> &'static str {
    if speed_ms < 1.0 {
        "calm"
    } else if speed_ms < 5.0 {
        "light breeze"
    } else if speed_ms < 11.0 {
        "moderate breeze"
    } else if speed_ms < 20.0 {
        "strong breeze"
    } else {
        "very windy"
    }
}

/// Clothing advice for a rounded temperature. Rain wins over temperature;
/// mild weather gets no advice (empty string).
pub fn clothing_advice(temp: i64, description: &str) -> &'static str {
    if description.to_lowercase().contains("rain") {
        "Don't forget your umbrella! ☔"
    } else if temp < 5 {
        "Bundle up warm - it's quite cold! 🧥"
    } else if temp < 15 {
        "A jacket would be a good idea. 🧥"
    } else if temp > 30 {
        "Stay cool and hydrated! 🥤"
    } else if temp > 25 {
        "Light clothing recommended. 👕"
    } else {
        ""
    }
}

/// "today", "tomorrow", or e.g. "Monday, Nov 10".
pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "today".to_string()
    } else if date == today + Duration::days(1) {
        "tomorrow".to_string()
    } else {
        date.format("%A, %b %-d").to_string()
    }
}

fn format_visibility(visibility_m: Option<f64>) -> String {
    match visibility_m {
        Some(m) if m > 0.0 => format!("{:.1}", m / 1000.0),
        _ => "N/A".to_string(),
    }
}

fn push_advice(reply: &mut String, advice: &str) {
    if !advice.is_empty() {
        reply.push_str("\n\n");
        reply.push_str(advice);
    }
}

/// Reply for the current-conditions path.
pub fn compose_current(city: &str, obs: &Observation) -> String {
    let temp = round_temperature(obs.temperature_c);
    let feels_like = round_temperature(obs.feels_like_c);
    let advice = clothing_advice(temp, &obs.description);

    let mut reply = format!(
        "{} Current weather in {}:\n\n\
         Conditions: {}\n\
         Temperature: {}\n\
         Humidity: {}%\n\
         Wind: {} m/s ({})\n\
         Pressure: {} hPa\n\
         Visibility: {} km",
        weather_emoji(&obs.description),
        city,
        obs.description,
        format_temperature(temp, feels_like),
        obs.humidity_pct,
        obs.wind_speed_ms,
        wind_descriptor(obs.wind_speed_ms),
        obs.pressure_hpa,
        format_visibility(obs.visibility_m),
    );
    push_advice(&mut reply, advice);
    reply
}

/// Reply for the forecast path; `label` comes from [`date_label`].
pub fn compose_forecast(city: &str, label: &str, obs: &Observation) -> String {
    let temp = round_temperature(obs.temperature_c);
    let feels_like = round_temperature(obs.feels_like_c);
    let advice = clothing_advice(temp, &obs.description);

    let mut reply = format!(
        "{} Forecast for {} {}:\n\n\
         Weather: {}\n\
         Temperature: {}\n\
         Humidity: {}%\n\
         Wind: {} m/s ({})",
        weather_emoji(&obs.description),
        city,
        label,
        obs.description,
        format_temperature(temp, feels_like),
        obs.humidity_pct,
        obs.wind_speed_ms,
        wind_descriptor(obs.wind_speed_ms),
    );
    push_advice(&mut reply, advice);
    reply
}
