//! Briefing orchestration: parse, resolve, fetch, intersect, assemble.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};
use wxbrief_awc::{airsigmet_reports, metar_summaries, pirep_summaries};
use wxbrief_core::{
    parse_plan, prepare_hazards, leg_hits, Briefing, FlightPlan, Issue, IssueKind, Leg, Waypoint,
};

use crate::state::AppState;

/// Build the full briefing for a plan string.
///
/// A parse failure returns immediately with only `errors` populated.
/// Every later failure (geocoding, any product fetch, bad geometry)
/// degrades to a warning while the rest of the briefing still fills in.
pub async fn build_briefing(state: &AppState, plan_string: &str) -> Briefing {
    let parsed = match parse_plan(plan_string) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Rejected flight plan '{}': {}", plan_string, err);
            return Briefing::fatal(
                plan_string,
                Issue::new(IssueKind::Parse, format!("Flight Plan Parsing Error: {err}")),
            );
        }
    };

    let mut briefing = Briefing::new(plan_string);

    // Altitudes per station for the VFR verdict. Repeated identifiers
    // keep the last altitude, matching the plan order.
    let mut altitudes: HashMap<String, i64> = HashMap::new();
    let mut station_ids: Vec<String> = Vec::new();
    for entry in &parsed.entries {
        if !station_ids.contains(&entry.id) {
            station_ids.push(entry.id.clone());
        }
        altitudes.insert(entry.id.clone(), entry.altitude_ft);
    }

    let flight_plan = resolve_plan(state, &parsed.entries, parsed.max_altitude_ft).await;

    let stage = Duration::from_secs(state.config.stage_timeout_s);
    let (metar, pireps, hazards) = tokio::join!(
        tokio::time::timeout(stage, metar_summaries(&state.awc, &station_ids, &altitudes)),
        tokio::time::timeout(stage, pirep_summaries(&state.awc, &station_ids)),
        tokio::time::timeout(
            stage,
            airsigmet_reports(&state.awc, flight_plan.max_altitude_ft, "ALL")
        ),
    );

    match metar {
        Ok(summaries) => {
            for (id, summary) in &summaries {
                if let Some(err) = &summary.error {
                    briefing.warnings.push(Issue::new(
                        IssueKind::Fetch,
                        format!("METAR fetch/parse failed for {id}: {err}"),
                    ));
                }
            }
            briefing.metar = summaries;
        }
        Err(_) => briefing.warnings.push(Issue::new(
            IssueKind::Fetch,
            format!("METAR fetch timed out after {}s.", state.config.stage_timeout_s),
        )),
    }

    match pireps {
        Ok(summaries) => {
            for (id, summary) in &summaries {
                if let Some(err) = &summary.error {
                    briefing.warnings.push(Issue::new(
                        IssueKind::Fetch,
                        format!("PIREP fetch/parse failed for {id}: {err}"),
                    ));
                }
            }
            briefing.pireps = summaries;
        }
        Err(_) => briefing.warnings.push(Issue::new(
            IssueKind::Fetch,
            format!("PIREP fetch timed out after {}s.", state.config.stage_timeout_s),
        )),
    }

    let hazard_areas = match hazards {
        Ok(Ok(areas)) => areas,
        Ok(Err(err)) => {
            briefing.warnings.push(Issue::new(
                IssueKind::Fetch,
                format!("Failed to fetch AIRMET/SIGMET data: {err:#}"),
            ));
            Vec::new()
        }
        Err(_) => {
            briefing.warnings.push(Issue::new(
                IssueKind::Fetch,
                format!(
                    "AIRMET/SIGMET fetch timed out after {}s.",
                    state.config.stage_timeout_s
                ),
            ));
            Vec::new()
        }
    };

    let (prepared, geometry_issues) = prepare_hazards(&hazard_areas);
    briefing.warnings.extend(geometry_issues);

    for pair in flight_plan.waypoints.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let mut leg = Leg {
            from: from.id.clone(),
            to: to.id.clone(),
            intersecting_hazards: Vec::new(),
        };
        match (from.coords, to.coords) {
            (Some(start), Some(end)) => {
                leg.intersecting_hazards = leg_hits(start, end, &prepared);
            }
            _ => briefing.warnings.push(Issue::new(
                IssueKind::Geocode,
                format!(
                    "Skipping SIGMET intersection check for leg {}-{} due to missing coordinates.",
                    from.id, to.id
                ),
            )),
        }
        briefing.legs.push(leg);
    }

    for waypoint in &flight_plan.waypoints {
        if waypoint.coords.is_none() {
            briefing.warnings.push(Issue::new(
                IssueKind::Geocode,
                format!(
                    "Could not determine coordinates for waypoint {}. Some analysis may be incomplete.",
                    waypoint.id
                ),
            ));
        }
    }

    briefing.airsigmets = hazard_areas;
    briefing.waypoints = flight_plan.waypoints;

    info!(
        "Briefing assembled for '{}': {} waypoints, {} legs, {} advisories, {} warnings",
        plan_string,
        briefing.waypoints.len(),
        briefing.legs.len(),
        briefing.airsigmets.len(),
        briefing.warnings.len()
    );
    briefing
}

/// Resolve coordinates for the parsed entries, one lookup per distinct
/// identifier. Unresolved waypoints stay in the plan with no coords.
async fn resolve_plan(
    state: &AppState,
    entries: &[wxbrief_core::PlanEntry],
    max_altitude_ft: i64,
) -> FlightPlan {
    let mut unique: Vec<&str> = Vec::new();
    for entry in entries {
        if !unique.contains(&entry.id.as_str()) {
            unique.push(&entry.id);
        }
    }

    let lookups = unique.iter().map(|id| async move {
        let coords = state.resolver.resolve(id).await;
        (id.to_string(), coords)
    });
    let resolved: HashMap<_, _> = join_all(lookups).await.into_iter().collect();

    let waypoints = entries
        .iter()
        .map(|entry| Waypoint {
            id: entry.id.clone(),
            altitude_ft: entry.altitude_ft,
            coords: resolved.get(&entry.id).copied().flatten(),
        })
        .collect();

    FlightPlan {
        waypoints,
        max_altitude_ft,
    }
}
