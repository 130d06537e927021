//! Live briefing API tests against real upstreams.
//!
//! Run with: cargo test --test live_test -- --ignored
//!
//! Note: Requires a running wxbrief server at http://localhost:3000
//! or set WXBRIEF_TEST_URL environment variable.

use reqwest::Client;

fn base_url() -> String {
    std::env::var("WXBRIEF_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

#[tokio::test]
#[ignore] // Run only when server is running
async fn test_root_and_health() {
    let client = Client::new();
    let base = base_url();

    let resp = client.get(format!("{}/", base)).send().await.expect("Failed to reach server");
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        json["message"].as_str(),
        Some("Aviation weather briefing service is running.")
    );

    let resp = client.get(format!("{}/health", base)).send().await.unwrap();
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"].as_str(), Some("ok"));
}

#[tokio::test]
#[ignore]
async fn test_briefing_for_real_route() {
    let client = Client::new();
    let base = base_url();

    let body = serde_json::json!({"plan": "KCMH,5500,KJFK,10000"});
    let resp = client
        .post(format!("{}/v1/briefing", base))
        .json(&body)
        .send()
        .await
        .expect("Failed to request briefing");
    // Upstream weather sources can be degraded; the briefing shape holds
    // either way.
    let json: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(json["flight_plan"].as_str(), Some("KCMH,5500,KJFK,10000"));
    assert_eq!(json["waypoints"].as_array().unwrap().len(), 2);
    assert!(json["metar"].get("KCMH").is_some());
    assert!(json["metar"].get("KJFK").is_some());
    assert!(json["pireps"].get("KCMH").is_some());
    assert_eq!(json["legs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_malformed_plan_is_rejected() {
    let client = Client::new();
    let base = base_url();

    let body = serde_json::json!({"plan": "KJFK"});
    let resp = client
        .post(format!("{}/v1/briefing", base))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let json: serde_json::Value = resp.json().await.unwrap();
    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["kind"].as_str(), Some("parse"));
}

#[tokio::test]
#[ignore]
async fn test_airsigmet_listing() {
    let client = Client::new();
    let base = base_url();

    let resp = client
        .get(format!("{}/v1/airsigmet?altitude=10000", base))
        .send()
        .await
        .expect("Failed to fetch advisories");
    assert!(resp.status().is_success());

    let reports: Vec<serde_json::Value> = resp.json().await.unwrap();
    for report in &reports {
        assert!(report["summary"].as_str().is_some());
    }
}
