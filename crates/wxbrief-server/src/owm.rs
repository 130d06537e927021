//! General current/forecast weather passthrough.
//!
//! Independent of the briefing pipeline: one location query fans out to
//! the provider's current-conditions and 5-day/3-hour forecast endpoints
//! and merges both into a single report. Either side can fail without
//! taking down the other.

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::state::AppState;

const CARDINAL_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Merged weather report returned to the caller.
#[derive(Debug, Serialize)]
pub struct WeatherReport {
    pub name: Option<String>,
    pub temperature: Option<i64>,
    pub feels_like: Option<i64>,
    pub condition: String,
    pub wind_speed: Option<i64>,
    pub wind_gust: Option<i64>,
    pub wind_direction: String,
    pub humidity: Option<i64>,
    pub pressure: Option<i64>,
    /// Statute miles, bucketed to reporting steps.
    pub visibility: Option<f64>,
    pub hourly_forecast: Vec<ForecastHour>,
    pub query: String,
    pub last_updated_utc: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ForecastHour {
    pub time: String,
    pub condition: String,
    pub temp: i64,
}

/// Report plus which upstream sides produced data, for status mapping.
pub struct WeatherResult {
    pub report: WeatherReport,
    pub had_current: bool,
    pub had_forecast: bool,
}

// ========== Upstream response shapes ==========

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    #[serde(default)]
    cod: Value,
    message: Option<Value>,
    name: Option<String>,
    main: Option<MainReadings>,
    wind: Option<WindReadings>,
    #[serde(default)]
    weather: Vec<ConditionText>,
    visibility: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MainReadings {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<i64>,
    pressure: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WindReadings {
    speed: Option<f64>,
    gust: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionText {
    main: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    cod: Value,
    message: Option<Value>,
    #[serde(default)]
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: Option<i64>,
    main: Option<MainReadings>,
    #[serde(default)]
    weather: Vec<ConditionText>,
}

/// Fetch and merge current plus forecast conditions for a query.
pub async fn basic_weather(state: &AppState, api_key: &str, query: &str) -> WeatherResult {
    let mut errors = Vec::new();

    let (current_outcome, forecast_outcome) = tokio::join!(
        fetch_current(&state.http, &state.config.owm_url, api_key, query),
        fetch_forecast(&state.http, &state.config.owm_url, api_key, query),
    );

    let current = match current_outcome {
        Ok(conditions) => Some(conditions),
        Err(message) => {
            errors.push(message);
            None
        }
    };
    let forecast = match forecast_outcome {
        Ok(response) => Some(response),
        Err(Some(message)) => {
            errors.push(message);
            None
        }
        // A not-found forecast is already covered by the current-side error.
        Err(None) => None,
    };

    let mut report = WeatherReport {
        name: None,
        temperature: None,
        feels_like: None,
        condition: "Unavailable".to_string(),
        wind_speed: None,
        wind_gust: None,
        wind_direction: "N/A".to_string(),
        humidity: None,
        pressure: None,
        visibility: None,
        hourly_forecast: Vec::new(),
        query: query.to_string(),
        last_updated_utc: Utc::now().format("%H:%M UTC").to_string(),
        errors: Vec::new(),
    };

    if let Some(current) = &current {
        let main = current.main.clone().unwrap_or_default();
        let wind = current.wind.clone().unwrap_or_default();

        report.name = current.name.clone();
        report.temperature = main.temp.map(|v| v.round() as i64);
        report.feels_like = main.feels_like.map(|v| v.round() as i64);
        report.condition = capitalize(
            current
                .weather
                .first()
                .and_then(|w| w.description.as_deref())
                .unwrap_or("Unknown"),
        );
        report.wind_speed = wind.speed.map(|v| v.round() as i64);
        report.wind_gust = wind.gust.map(|v| v.round() as i64);
        report.wind_direction = wind_direction_cardinal(wind.deg);
        report.humidity = main.humidity;
        report.pressure = main.pressure;
        report.visibility = meters_to_miles(current.visibility);
    }

    if let Some(forecast) = &forecast {
        for entry in forecast.list.iter().take(8) {
            let dt = entry.dt;
            let temp = entry.main.as_ref().and_then(|m| m.temp);
            let (Some(dt), Some(temp)) = (dt, temp) else {
                continue;
            };
            report.hourly_forecast.push(ForecastHour {
                time: forecast_time(dt),
                condition: entry
                    .weather
                    .first()
                    .and_then(|w| w.main.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                temp: temp.round() as i64,
            });
        }
    }

    report.errors = errors;
    WeatherResult {
        had_current: current.is_some(),
        had_forecast: forecast.is_some(),
        report,
    }
}

async fn fetch_current(
    http: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<CurrentConditions, String> {
    let url = format!("{base_url}/data/2.5/weather");
    let response = http
        .get(&url)
        .query(&[("q", query), ("appid", api_key), ("units", "imperial")])
        .send()
        .await
        .map_err(|err| {
            warn!("Could not reach current weather service for '{}': {:#}", query, err);
            format!("Could not connect to current weather service: {err}")
        })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        warn!("Location query '{}' not found by weather provider", query);
        return Err(format!("Location '{query}' not found for current weather."));
    }
    if !status.is_success() {
        return Err(format!(
            "Current weather service request failed (HTTP {}).",
            status.as_u16()
        ));
    }

    let conditions = response
        .json::<CurrentConditions>()
        .await
        .map_err(|err| {
            warn!("Bad current weather payload for '{}': {:#}", query, err);
            "Failed to process current weather response.".to_string()
        })?;

    if !cod_ok(&conditions.cod) {
        let message = upstream_message(
            conditions.message.as_ref(),
            "Unknown error from the current weather API",
        );
        return Err(format!("Could not get current weather for '{query}'. {message}"));
    }
    Ok(conditions)
}

/// Err(None) marks a not-found response that should not add a second
/// error entry on top of the current-weather one.
async fn fetch_forecast(
    http: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<ForecastResponse, Option<String>> {
    let url = format!("{base_url}/data/2.5/forecast");
    let response = http
        .get(&url)
        .query(&[("q", query), ("appid", api_key), ("units", "imperial")])
        .send()
        .await
        .map_err(|err| {
            warn!("Could not reach forecast weather service for '{}': {:#}", query, err);
            Some(format!("Could not connect to forecast weather service: {err}"))
        })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(None);
    }
    if !status.is_success() {
        return Err(Some(format!(
            "Forecast weather service request failed (HTTP {}).",
            status.as_u16()
        )));
    }

    let forecast = response
        .json::<ForecastResponse>()
        .await
        .map_err(|err| {
            warn!("Bad forecast weather payload for '{}': {:#}", query, err);
            Some("Failed to process forecast weather response.".to_string())
        })?;

    if !cod_ok(&forecast.cod) {
        let message = upstream_message(
            forecast.message.as_ref(),
            "Unknown error from the forecast weather API",
        );
        return Err(Some(format!(
            "Could not get forecast weather for '{query}'. {message}"
        )));
    }
    Ok(forecast)
}

// The provider encodes `cod` as a number on one endpoint and a string
// on the other.
fn cod_ok(cod: &Value) -> bool {
    cod.as_i64() == Some(200) || cod.as_str() == Some("200")
}

fn upstream_message(message: Option<&Value>, fallback: &str) -> String {
    message
        .and_then(|value| value.as_str())
        .unwrap_or(fallback)
        .to_string()
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn wind_direction_cardinal(deg: Option<f64>) -> String {
    match deg {
        Some(deg) if deg.is_finite() => {
            let index = ((deg / 22.5) + 0.5).floor() as i64;
            CARDINAL_POINTS[index.rem_euclid(16) as usize].to_string()
        }
        _ => "N/A".to_string(),
    }
}

fn meters_to_miles(meters: Option<f64>) -> Option<f64> {
    let miles = meters? * 0.000621371;
    let bucketed = if miles >= 10.0 {
        10.0
    } else if miles >= 1.0 {
        miles.round()
    } else if miles >= 0.75 {
        0.75
    } else if miles >= 0.5 {
        0.5
    } else if miles >= 0.25 {
        0.25
    } else {
        (miles * 10.0).round() / 10.0
    };
    Some(bucketed)
}

fn forecast_time(unix_utc: i64) -> String {
    match DateTime::<Utc>::from_timestamp(unix_utc, 0) {
        Some(time) => time.format("%H:%MZ").to_string(),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_direction_covers_the_full_circle() {
        assert_eq!(wind_direction_cardinal(Some(0.0)), "N");
        assert_eq!(wind_direction_cardinal(Some(90.0)), "E");
        assert_eq!(wind_direction_cardinal(Some(225.0)), "SW");
        assert_eq!(wind_direction_cardinal(Some(337.0)), "NNW");
        assert_eq!(wind_direction_cardinal(Some(355.0)), "N", "wraps past NNW");
        assert_eq!(wind_direction_cardinal(None), "N/A");
    }

    #[test]
    fn visibility_buckets_match_reporting_steps() {
        assert_eq!(meters_to_miles(Some(20000.0)), Some(10.0));
        assert_eq!(meters_to_miles(Some(2500.0)), Some(2.0), "1.55 miles rounds up");
        assert_eq!(meters_to_miles(Some(1250.0)), Some(0.75));
        assert_eq!(meters_to_miles(Some(850.0)), Some(0.5));
        assert_eq!(meters_to_miles(Some(410.0)), Some(0.25));
        assert_eq!(meters_to_miles(Some(150.0)), Some(0.1));
        assert_eq!(meters_to_miles(None), None);
    }

    #[test]
    fn capitalize_lowers_the_tail() {
        assert_eq!(capitalize("light rain"), "Light rain");
        assert_eq!(capitalize("HEAVY INTENSITY RAIN"), "Heavy intensity rain");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn forecast_time_renders_utc_with_zulu_suffix() {
        // 2025-03-14 15:00:00 UTC
        assert_eq!(forecast_time(1_741_964_400), "15:00Z");
    }

    #[test]
    fn cod_accepts_both_encodings() {
        assert!(cod_ok(&serde_json::json!(200)));
        assert!(cod_ok(&serde_json::json!("200")));
        assert!(!cod_ok(&serde_json::json!("404")));
        assert!(!cod_ok(&Value::Null));
    }
}
