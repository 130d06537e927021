//! REST API routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::briefing::build_briefing;
use crate::llm;
use crate::owm;
use crate::state::AppState;
use wxbrief_awc::{airsigmet_reports, metar_summaries, pirep_summaries};
use wxbrief_core::Briefing;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/v1/metar", post(metar_summary))
        .route("/v1/pirep", post(pirep_summary))
        .route("/v1/airsigmet", get(airsigmet_list))
        .route("/v1/briefing", post(flight_briefing))
        .route("/v1/briefing/summary", post(briefing_summary))
        .route("/v1/weather", get(basic_weather))
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct AirsigmetQuery {
    /// Feet, kept as text so format errors get a specific message.
    pub altitude: Option<String>,
    pub hazard: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
struct BriefingWithSummary {
    #[serde(flatten)]
    briefing: Briefing,
    summary: String,
}

// === Handlers ===

async fn index() -> impl IntoResponse {
    Json(json!({ "message": "Aviation weather briefing service is running." }))
}

async fn metar_summary(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let Some(ids) = string_list(body.get("ids")) else {
        return bad_request("Invalid request. Body must be JSON with an 'ids' list.")
            .into_response();
    };
    if ids.is_empty() {
        return bad_request("Invalid request. 'ids' must not be empty.").into_response();
    }

    let altitudes = match body.get("altitudes") {
        None | Some(Value::Null) => HashMap::new(),
        Some(value) => match altitude_map(value) {
            Ok(map) => map,
            Err(response) => return response.into_response(),
        },
    };

    let summaries = metar_summaries(&state.awc, &ids, &altitudes).await;
    Json(summaries).into_response()
}

async fn pirep_summary(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let Some(ids) = string_list(body.get("ids")) else {
        return bad_request("Invalid request. Body must be JSON with an 'ids' list.")
            .into_response();
    };
    if ids.is_empty() {
        return bad_request("Invalid request. 'ids' must not be empty.").into_response();
    }

    let summaries = pirep_summaries(&state.awc, &ids).await;
    Json(summaries).into_response()
}

async fn airsigmet_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AirsigmetQuery>,
) -> impl IntoResponse {
    let Some(altitude) = query.altitude else {
        return bad_request("Missing required query parameter: altitude (in feet)")
            .into_response();
    };
    let Ok(altitude_ft) = altitude.trim().parse::<i64>() else {
        return bad_request("Invalid altitude format. Must be an integer.").into_response();
    };

    let hazard = query.hazard.as_deref().unwrap_or("ALL");
    match airsigmet_reports(&state.awc, altitude_ft, hazard).await {
        Ok(reports) => Json(reports).into_response(),
        Err(err) => {
            tracing::error!("AIRSIGMET fetch failed: {:#}", err);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("Failed to fetch AIRMET/SIGMET data: {err:#}") })),
            )
                .into_response()
        }
    }
}

async fn flight_briefing(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let plan = match plan_string(&body) {
        Ok(plan) => plan,
        Err(response) => return response.into_response(),
    };

    let budget = Duration::from_secs(state.config.request_timeout_s);
    match tokio::time::timeout(budget, build_briefing(&state, &plan)).await {
        Ok(briefing) if briefing.errors.is_empty() => Json(briefing).into_response(),
        Ok(briefing) => (StatusCode::BAD_REQUEST, Json(briefing)).into_response(),
        Err(_) => {
            tracing::error!("Briefing for '{}' exceeded the request budget", plan);
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({ "error": "Briefing request timed out." })),
            )
                .into_response()
        }
    }
}

async fn briefing_summary(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let plan = match plan_string(&body) {
        Ok(plan) => plan,
        Err(response) => return response.into_response(),
    };

    let budget = Duration::from_secs(state.config.request_timeout_s);
    let briefing = match tokio::time::timeout(budget, build_briefing(&state, &plan)).await {
        Ok(briefing) => briefing,
        Err(_) => {
            tracing::error!("Briefing for '{}' exceeded the request budget", plan);
            return (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({ "error": "Briefing request timed out." })),
            )
                .into_response();
        }
    };
    if !briefing.errors.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(briefing)).into_response();
    }

    match llm::generate_summary(&state, &briefing).await {
        Ok(summary) => Json(BriefingWithSummary { briefing, summary }).into_response(),
        Err(err) => {
            tracing::error!("AI summary generation failed: {:#}", err);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("Failed to generate AI summary: {err:#}") })),
            )
                .into_response()
        }
    }
}

async fn basic_weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> impl IntoResponse {
    let Some(q) = query.q.filter(|q| !q.trim().is_empty()) else {
        return bad_request("Missing required query parameter: q").into_response();
    };
    let Some(api_key) = state.config.owm_api_key.clone() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Server configuration error: Weather API key missing.",
                "hint": "Set OPENWEATHERMAP_API_KEY"
            })),
        )
            .into_response();
    };

    let result = owm::basic_weather(&state, &api_key, &q).await;
    let status = if !result.report.errors.is_empty() && !result.had_current && !result.had_forecast
    {
        StatusCode::SERVICE_UNAVAILABLE
    } else if !result.report.errors.is_empty() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };
    (status, Json(result.report)).into_response()
}

// === Validation helpers ===

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value?
        .as_array()?
        .iter()
        .map(|entry| entry.as_str().map(str::to_string))
        .collect()
}

fn altitude_map(value: &Value) -> Result<HashMap<String, i64>, (StatusCode, Json<Value>)> {
    let Some(object) = value.as_object() else {
        return Err(bad_request(
            "Invalid request. 'altitudes' must be an object/dictionary.",
        ));
    };

    let mut altitudes = HashMap::new();
    for (id, altitude) in object {
        let Some(altitude) = altitude.as_i64() else {
            return Err(bad_request(&format!(
                "Invalid altitude '{altitude}' for {id}. Must be integer."
            )));
        };
        altitudes.insert(id.clone(), altitude);
    }
    Ok(altitudes)
}

fn plan_string(body: &Value) -> Result<String, (StatusCode, Json<Value>)> {
    let Some(plan) = body.get("plan") else {
        return Err(bad_request(
            "Invalid request. Body must be JSON with a 'plan' string.",
        ));
    };
    match plan.as_str() {
        Some(plan) if !plan.is_empty() => Ok(plan.to_string()),
        _ => Err(bad_request(
            "Invalid 'plan' format. Must be a non-empty string.",
        )),
    }
}
