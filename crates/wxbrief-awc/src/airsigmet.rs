//! AIRMET/SIGMET fetch for an altitude band and hazard filter.

use anyhow::Result;
use tracing::{info, warn};
use wxbrief_core::{Coordinate, HazardArea, HazardKind};

use crate::client::{AirSigmetApiReport, AwcClient};

/// Fetch advisories active at `altitude_ft` for a hazard filter.
///
/// Unrecognized hazard names degrade to ALL with a logged warning. The
/// altitude converts to a flight level for the upstream query. Fetch
/// failures surface as errors; a report that decodes at all is never
/// dropped, even with missing severity, altitudes or movement.
pub async fn airsigmet_reports(
    client: &AwcClient,
    altitude_ft: i64,
    hazard: &str,
) -> Result<Vec<HazardArea>> {
    let kind = match HazardKind::from_code(hazard) {
        Some(kind) => kind,
        None => {
            warn!("Invalid hazard type '{}'. Defaulting to 'ALL'.", hazard);
            HazardKind::All
        }
    };
    let level = altitude_ft / 100;

    let reports = client.fetch_airsigmets(level, kind.as_code()).await?;
    info!("Received {} AIRSIGMET reports from API", reports.len());

    Ok(reports.into_iter().map(hazard_area_from_api).collect())
}

fn hazard_area_from_api(report: AirSigmetApiReport) -> HazardArea {
    let id = report
        .air_sigmet_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let hazard = match report.hazard.as_deref().and_then(HazardKind::from_code) {
        Some(kind) => kind,
        None => {
            warn!(
                "Unrecognized hazard '{}' on AIRSIGMET {}, treating as ALL",
                report.hazard.as_deref().unwrap_or(""),
                id
            );
            HazardKind::All
        }
    };

    let area = report
        .area
        .iter()
        .filter_map(|point| match (point.lat, point.lon) {
            (Some(lat), Some(lon)) => Some(Coordinate { lat, lon }),
            _ => None,
        })
        .collect();

    let mut hazard_area = HazardArea {
        id,
        hazard,
        severity: report.severity,
        area,
        altitude_low_ft: report.altitude_lo1,
        altitude_hi_ft: report.altitude_hi1,
        movement_dir_deg: report.movement_dir,
        movement_spd_kt: report.movement_spd,
        summary: String::new(),
    };
    hazard_area.summary = hazard_area.summary_line();
    hazard_area
}
