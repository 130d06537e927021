//! Server configuration from environment.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Aviation weather data API (METAR/PIREP/AIRSIGMET).
    pub awc_url: String,
    /// Geocoding service for waypoint coordinates.
    pub nominatim_url: String,
    pub geocoder_user_agent: String,
    /// General current/forecast weather provider.
    pub owm_url: String,
    pub owm_api_key: Option<String>,
    /// LLM endpoint for the narrative briefing summary.
    pub gemini_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Per-stage budget for each product fetch inside a briefing.
    pub stage_timeout_s: u64,
    /// Whole-request budget for briefing endpoints.
    pub request_timeout_s: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("WXBRIEF_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            awc_url: env::var("WXBRIEF_AWC_URL")
                .unwrap_or_else(|_| "https://aviationweather.gov".to_string()),
            nominatim_url: env::var("WXBRIEF_NOMINATIM_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            geocoder_user_agent: env::var("WXBRIEF_GEOCODER_USER_AGENT")
                .unwrap_or_else(|_| "wxbrief/0.1".to_string()),
            owm_url: env::var("WXBRIEF_OWM_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org".to_string()),
            owm_api_key: env::var("OPENWEATHERMAP_API_KEY").ok(),
            gemini_url: env::var("WXBRIEF_GEMINI_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            gemini_model: env::var("WXBRIEF_GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-pro-exp-03-25".to_string()),
            stage_timeout_s: env::var("WXBRIEF_STAGE_TIMEOUT_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            request_timeout_s: env::var("WXBRIEF_REQUEST_TIMEOUT_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
        }
    }
}
