//! PIREP fetch and per-location summarization.
//!
//! Upstream serves raw newline-delimited pilot reports. Each usable line
//! is split into its slash-delimited groups (OV location, TM time, FL
//! flight level, TP aircraft, SK sky, WX weather, TA temperature, WV
//! wind, TB turbulence, IC icing, RM remarks) and tallied into a
//! one-line status per location.

use std::collections::BTreeMap;

use futures::future::join_all;
use tracing::{debug, warn};
use wxbrief_core::{PirepReport, PirepSummary};

use crate::client::AwcClient;

const GROUP_DESIGNATORS: [&str; 11] = [
    "OV", "TM", "FL", "TP", "SK", "WX", "TA", "WV", "TB", "IC", "RM",
];

/// Fetch and summarize pilot reports near each location concurrently.
///
/// Every requested location gets an entry; a failed fetch yields a
/// status line plus the error text and leaves other locations intact.
pub async fn pirep_summaries(
    client: &AwcClient,
    location_ids: &[String],
) -> BTreeMap<String, PirepSummary> {
    let fetches = location_ids.iter().map(|id| async move {
        let outcome = client.fetch_pirep_raw(id).await;
        (id.clone(), outcome)
    });

    let mut summaries = BTreeMap::new();
    for (id, outcome) in join_all(fetches).await {
        let summary = match outcome {
            Ok(text) => summarize_text(&id, &text),
            Err(err) => {
                warn!("Error fetching PIREPs for {}: {:#}", id, err);
                PirepSummary {
                    status: format!("{id}: Error fetching data."),
                    reports: Vec::new(),
                    error: Some(format!("{err:#}")),
                }
            }
        };
        summaries.insert(id, summary);
    }
    summaries
}

fn summarize_text(location_id: &str, raw_text: &str) -> PirepSummary {
    let trimmed = raw_text.trim();
    if trimmed.is_empty() || trimmed.contains("No PIREPs") {
        return PirepSummary {
            status: format!("{location_id}: No recent PIREPs found within parameters."),
            reports: Vec::new(),
            error: None,
        };
    }

    let mut reports = Vec::new();
    // BTreeMap keeps the tallies in a stable order in the status line.
    let mut counters: BTreeMap<&'static str, usize> = BTreeMap::new();

    for line in trimmed.lines() {
        let line = line.trim();
        // Cloud-top reports carry no conditions at the reporting level.
        if line.is_empty() || line.contains("TOP") {
            continue;
        }
        let Some(report) = parse_pirep_line(line) else {
            debug!("Skipping unrecognized PIREP line near {}: {}", location_id, line);
            continue;
        };
        if report.clouds.is_some() {
            *counters.entry("clouds").or_insert(0) += 1;
        }
        if report.flight_visibility.is_some() {
            *counters.entry("flight_visibility").or_insert(0) += 1;
        }
        if report.icing.is_some() {
            *counters.entry("icing").or_insert(0) += 1;
        }
        if report.turbulence.is_some() {
            *counters.entry("turbulence").or_insert(0) += 1;
        }
        reports.push(report);
    }

    let status = if counters.is_empty() {
        format!(
            "{location_id}: Parsed {} PIREP(s), no specific conditions counted.",
            reports.len()
        )
    } else {
        let tallies = counters
            .iter()
            .map(|(condition, count)| format!("{condition}={count}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{location_id}: Reports found with {tallies}")
    };

    PirepSummary {
        status,
        reports,
        error: None,
    }
}

/// Parse one raw report line. Returns None when no recognized group is
/// present, which drops chatter lines without failing the location.
fn parse_pirep_line(line: &str) -> Option<PirepReport> {
    let mut report = PirepReport {
        raw: line.to_string(),
        ..Default::default()
    };
    let mut matched_groups = 0;

    for segment in line.split('/') {
        let segment = segment.trim();
        let Some((designator, value)) = split_group(segment) else {
            // The leading "XXX UA" header never matches a designator.
            continue;
        };
        matched_groups += 1;
        match designator {
            "OV" => report.location = non_empty(value),
            "TM" => report.time_utc = non_empty(value),
            "FL" => report.flight_level = non_empty(value),
            "TP" => report.aircraft = non_empty(value),
            "SK" => report.clouds = non_empty(value),
            "WX" => {
                let (visibility, weather) = split_flight_visibility(value);
                report.flight_visibility = visibility;
                report.weather = weather;
            }
            "TA" => report.temperature = non_empty(value),
            "WV" => report.wind = non_empty(value),
            "TB" => report.turbulence = non_empty(value),
            "IC" => report.icing = non_empty(value),
            "RM" => report.remarks = non_empty(value),
            _ => {}
        }
    }

    (matched_groups > 0).then_some(report)
}

fn split_group(segment: &str) -> Option<(&str, &str)> {
    let designator = segment.get(..2)?;
    if !GROUP_DESIGNATORS.contains(&designator) {
        return None;
    }
    Some((designator, &segment[2..]))
}

/// The WX group mixes flight visibility ("FV03SM") with weather codes.
/// The FV token becomes the visibility field, the rest stays weather.
fn split_flight_visibility(value: &str) -> (Option<String>, Option<String>) {
    let mut visibility = None;
    let mut weather = Vec::new();
    for token in value.split_whitespace() {
        match token.strip_prefix("FV") {
            Some(rest) if visibility.is_none() && !rest.is_empty() => {
                visibility = Some(rest.to_string());
            }
            _ => weather.push(token),
        }
    }
    let weather = (!weather.is_empty()).then(|| weather.join(" "));
    (visibility, weather)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
