//! Narrative briefing summary via an LLM endpoint.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use wxbrief_core::Briefing;

use crate::state::AppState;

const PROMPT_PREFIX: &str = "You are an aviation weather assistant. Based on the provided weather observations and reports, write a pre-flight briefing for the route";

const OUTPUT_INSTRUCTIONS: &str = r#"### Output Instructions:
- Your summary should be in natural language
- Instead of displaying the numerical data as-is or spelling out numbers (like 9 as "nine"), describe them qualitatively (e.g., "light westerly winds")
- Each airport should have its own paragraph
- VFR is based on cloud condition and altitude: if flying altitude > 18,000 ft, VFR is not permitted
- Surface readings are irrelevant for flyover airports; only their cloud condition matters
- For PIREPs: mention number of reported incidents as low/medium/high to reflect likelihood of in-flight issues
- Conclude with info on **convective SIGMETs** and their impact"#;

/// Assemble the full prompt from an already-built briefing.
pub fn briefing_prompt(briefing: &Briefing) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("### Input data:".to_string());
    lines.push(format!("Flight plan: {}", briefing.flight_plan));

    lines.push("\n### METAR Summary:".to_string());
    for (station, summary) in &briefing.metar {
        lines.push(format!("\nAirport {station}:"));
        if let Some(general) = summary.general.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("General: {general}"));
        }
        if let Some(cloud) = summary.cloud.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("Cloud condition: {cloud}"));
        }
        if !summary.remarks.is_empty() {
            lines.push(format!("Remarks: {}", summary.remarks.join("; ")));
        }
    }

    lines.push("\n### PIREP Summary:".to_string());
    for summary in briefing.pireps.values() {
        lines.push(format!("\n{}", summary.status));
    }

    lines.push("\n### SIGMET Summary:".to_string());
    for advisory in &briefing.airsigmets {
        lines.push(format!("\n{}", advisory.summary));
    }

    format!(
        "{PROMPT_PREFIX} {}.\n\n{}\n\n{OUTPUT_INSTRUCTIONS}",
        briefing.flight_plan,
        lines.join("\n")
    )
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

/// Generate the narrative summary for a briefing.
///
/// Fails when no API key is configured or the upstream call fails; the
/// caller decides whether that is fatal (the plain briefing route never
/// invokes this).
pub async fn generate_summary(state: &AppState, briefing: &Briefing) -> Result<String> {
    let api_key = state
        .config
        .gemini_api_key
        .as_deref()
        .context("GEMINI_API_KEY is not configured")?;

    let prompt = briefing_prompt(briefing);
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        state.config.gemini_url, state.config.gemini_model
    );

    let response = state
        .http
        .post(&url)
        .query(&[("key", api_key)])
        .json(&json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        }))
        .send()
        .await
        .context("Failed to reach LLM service")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("LLM request failed: {} {}", status, body));
    }

    let parsed = response
        .json::<GenerateContentResponse>()
        .await
        .context("Failed to parse LLM response")?;

    let text: String = parsed
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(anyhow::anyhow!("LLM response contained no text"));
    }
    info!("Generated narrative summary ({} chars)", text.len());
    Ok(text)
}
