//! End-to-end briefing tests against an in-process mock upstream.
//!
//! One axum server stands in for every external service (geocoder,
//! aviation weather data API, general weather provider, LLM), so the
//! full pipeline runs without touching the network.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use wxbrief_server::briefing::build_briefing;
use wxbrief_server::config::Config;
use wxbrief_server::state::AppState;

struct MockUpstream {
    geocode_requests: AtomicUsize,
}

async fn geocode_search(
    State(mock): State<Arc<MockUpstream>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    mock.geocode_requests.fetch_add(1, Ordering::SeqCst);
    let q = params.get("q").cloned().unwrap_or_default();
    let id = q.strip_suffix(" airport").unwrap_or(&q);
    let places = match id {
        "KCMH" => json!([{ "lat": "39.9980", "lon": "-82.8919" }]),
        "KJFK" => json!([{ "lat": "40.6413", "lon": "-73.7781" }]),
        _ => json!([]),
    };
    Json(places)
}

async fn metar_data(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let ids = params.get("ids").cloned().unwrap_or_default();
    let reports = match ids.as_str() {
        "KCMH" => json!([{
            "rawOb": "KCMH 141851Z 28010KT 10SM FEW120 21/10 A3012 RMK AO2 SLP201",
            "receiptTime": "2025-03-14T18:53:00Z",
            "name": "John Glenn Intl"
        }]),
        _ => json!([]),
    };
    Json(reports)
}

async fn pirep_data(Query(params): Query<HashMap<String, String>>) -> String {
    let id = params.get("id").cloned().unwrap_or_default();
    match id.as_str() {
        "KCMH" => "KCMH UA /OV APE 230010/TM 1845/FL085/TP C172/SK BKN065/TB LGT".to_string(),
        _ => "No PIREPs found".to_string(),
    }
}

// One advisory whose polygon straddles the KCMH-KJFK leg.
async fn airsigmet_data() -> Json<Value> {
    Json(json!([{
        "airSigmetId": 101,
        "hazard": "TURB",
        "severity": "MOD",
        "altitudeLo1": null,
        "altitudeHi1": 24000,
        "movementDir": 270,
        "movementSpd": 25,
        "area": [
            { "lat": 39.0, "lon": -80.0 },
            { "lat": 41.0, "lon": -80.0 },
            { "lat": 41.0, "lon": -77.0 },
            { "lat": 39.0, "lon": -77.0 }
        ]
    }]))
}

async fn owm_current() -> Json<Value> {
    Json(json!({
        "cod": 200,
        "name": "Columbus",
        "main": { "temp": 63.4, "feels_like": 61.2, "humidity": 55, "pressure": 1018 },
        "weather": [{ "main": "Clouds", "description": "scattered clouds" }],
        "wind": { "speed": 8.6, "deg": 230.0, "gust": 14.2 },
        "visibility": 10000
    }))
}

async fn owm_forecast() -> Json<Value> {
    Json(json!({
        "cod": "200",
        "list": [
            {
                "dt": 1741964400i64,
                "main": { "temp": 60.1 },
                "weather": [{ "main": "Clouds", "description": "scattered clouds" }]
            },
            {
                "dt": 1741975200i64,
                "main": { "temp": 58.6 },
                "weather": [{ "main": "Rain", "description": "light rain" }]
            }
        ]
    }))
}

async fn gemini_generate(Json(body): Json<Value>) -> Json<Value> {
    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    assert!(prompt.contains("### METAR Summary:"), "prompt carries data");
    Json(json!({
        "candidates": [{
            "content": {
                "parts": [
                    { "text": "VFR flight is feasible. " },
                    { "text": "Expect moderate turbulence en route." }
                ]
            }
        }]
    }))
}

async fn spawn_mock() -> (SocketAddr, Arc<MockUpstream>) {
    let mock = Arc::new(MockUpstream {
        geocode_requests: AtomicUsize::new(0),
    });
    let app = Router::new()
        .route("/search", get(geocode_search))
        .route("/api/data/metar", get(metar_data))
        .route("/api/data/pirep", get(pirep_data))
        .route("/api/data/airsigmet", get(airsigmet_data))
        .route("/data/2.5/weather", get(owm_current))
        .route("/data/2.5/forecast", get(owm_forecast))
        .route("/v1beta/models/:model", post(gemini_generate))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, mock)
}

fn test_state(addr: SocketAddr) -> AppState {
    let base = format!("http://{addr}");
    let mut config = Config::from_env();
    config.awc_url = base.clone();
    config.nominatim_url = base.clone();
    config.owm_url = base.clone();
    config.gemini_url = base;
    config.owm_api_key = Some("owm-test-key".to_string());
    config.gemini_api_key = Some("gemini-test-key".to_string());
    config.stage_timeout_s = 5;
    config.request_timeout_s = 10;
    AppState::new(config)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn briefing_covers_route_products() {
    let (addr, _mock) = spawn_mock().await;
    let state = test_state(addr);

    let briefing = build_briefing(&state, "KCMH,5500,KJFK,10000").await;

    assert!(briefing.errors.is_empty());
    assert_eq!(briefing.waypoints.len(), 2);
    assert_eq!(briefing.waypoints[0].id, "KCMH");
    assert_eq!(briefing.waypoints[0].altitude_ft, 5500);
    assert!(briefing.waypoints[0].coords.is_some());
    assert_eq!(briefing.waypoints[1].altitude_ft, 10000);

    let kcmh = &briefing.metar["KCMH"];
    assert_eq!(kcmh.station_name.as_deref(), Some("John Glenn Intl"));
    assert_eq!(kcmh.cloud.as_deref(), Some("Few clouds at 12000ft"));
    assert_eq!(kcmh.vfr_allowed, Some(true));
    assert!(kcmh.error.is_none());

    assert_eq!(
        briefing.pireps["KCMH"].status,
        "KCMH: Reports found with clouds=1, turbulence=1"
    );
    assert_eq!(
        briefing.pireps["KJFK"].status,
        "KJFK: No recent PIREPs found within parameters."
    );

    assert_eq!(briefing.airsigmets.len(), 1);
    assert_eq!(
        briefing.airsigmets[0].summary,
        "TURB (MOD) up to FL240. Moving 270° at 25 kt."
    );

    assert_eq!(briefing.legs.len(), 1);
    assert_eq!(briefing.legs[0].from, "KCMH");
    assert_eq!(briefing.legs[0].to, "KJFK");
    assert_eq!(briefing.legs[0].intersecting_hazards.len(), 1);
    assert_eq!(briefing.legs[0].intersecting_hazards[0].id, "101");
}

#[tokio::test]
async fn one_failing_station_does_not_block_the_rest() {
    let (addr, _mock) = spawn_mock().await;
    let state = test_state(addr);

    let briefing = build_briefing(&state, "KCMH,5500,KJFK,10000").await;

    // The mock has no METAR for KJFK; KCMH still decodes fully.
    assert!(briefing.errors.is_empty());
    assert_eq!(
        briefing.metar["KJFK"].error.as_deref(),
        Some("Failed to fetch METAR data")
    );
    assert!(briefing.metar["KCMH"].error.is_none());
    assert!(briefing.warnings.iter().any(|w| w.message
        == "METAR fetch/parse failed for KJFK: Failed to fetch METAR data"));
}

#[tokio::test]
async fn geocode_cache_avoids_repeat_lookups() {
    let (addr, mock) = spawn_mock().await;
    let state = test_state(addr);

    let first = build_briefing(&state, "KCMH,5500,KJFK,10000").await;
    assert!(first.errors.is_empty());
    let after_first = mock.geocode_requests.load(Ordering::SeqCst);
    assert_eq!(after_first, 2, "one lookup per distinct identifier");

    let second = build_briefing(&state, "KCMH,5500,KJFK,10000").await;
    assert!(second.errors.is_empty());
    assert_eq!(
        mock.geocode_requests.load(Ordering::SeqCst),
        after_first,
        "second briefing is served from the cache"
    );
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap(),
        "identical upstream data yields an identical briefing"
    );
}

#[tokio::test]
async fn unresolved_waypoint_degrades_to_warnings() {
    let (addr, _mock) = spawn_mock().await;
    let state = test_state(addr);

    let briefing = build_briefing(&state, "KCMH,5500,ZZZZ,7500").await;

    assert!(briefing.errors.is_empty());
    assert_eq!(briefing.waypoints.len(), 2);
    assert!(briefing.waypoints[1].coords.is_none());
    assert_eq!(briefing.legs.len(), 1);
    assert!(briefing.legs[0].intersecting_hazards.is_empty());
    assert!(briefing.warnings.iter().any(|w| w.message
        == "Skipping SIGMET intersection check for leg KCMH-ZZZZ due to missing coordinates."));
    assert!(briefing.warnings.iter().any(|w| w.message
        == "Could not determine coordinates for waypoint ZZZZ. Some analysis may be incomplete."));
}

#[tokio::test]
async fn briefing_route_returns_full_payload() {
    let (addr, _mock) = spawn_mock().await;
    let state = Arc::new(test_state(addr));
    let app = wxbrief_server::api::routes().with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/v1/briefing")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "plan": "KCMH,5500,KJFK,10000" }).to_string(),
        ))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = read_json(res).await;
    assert_eq!(body["flight_plan"], "KCMH,5500,KJFK,10000");
    assert_eq!(body["metar"]["KCMH"]["vfr_allowed"], true);
    assert_eq!(body["legs"][0]["intersecting_hazards"][0]["hazard"], "TURB");
    assert_eq!(body["errors"], json!([]));
}

#[tokio::test]
async fn summary_route_appends_narrative() {
    let (addr, _mock) = spawn_mock().await;
    let state = Arc::new(test_state(addr));
    let app = wxbrief_server::api::routes().with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/v1/briefing/summary")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "plan": "KCMH,5500,KJFK,10000" }).to_string(),
        ))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = read_json(res).await;
    assert_eq!(
        body["summary"],
        "VFR flight is feasible. Expect moderate turbulence en route."
    );
    // The briefing fields ride alongside the narrative.
    assert_eq!(body["flight_plan"], "KCMH,5500,KJFK,10000");
    assert_eq!(body["airsigmets"][0]["hazard"], "TURB");
}

#[tokio::test]
async fn weather_route_merges_current_and_forecast() {
    let (addr, _mock) = spawn_mock().await;
    let state = Arc::new(test_state(addr));
    let app = wxbrief_server::api::routes().with_state(state);

    let req = Request::builder()
        .uri("/v1/weather?q=Columbus")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = read_json(res).await;
    assert_eq!(body["name"], "Columbus");
    assert_eq!(body["temperature"], 63);
    assert_eq!(body["condition"], "Scattered clouds");
    assert_eq!(body["wind_speed"], 9);
    assert_eq!(body["wind_direction"], "SW");
    assert_eq!(body["visibility"], json!(6.0));
    assert_eq!(body["hourly_forecast"][0]["time"], "15:00Z");
    assert_eq!(body["hourly_forecast"][0]["condition"], "Clouds");
    assert_eq!(body["hourly_forecast"][0]["temp"], 60);
    assert_eq!(body["query"], "Columbus");
    assert_eq!(body["errors"], json!([]));
}
