//! Flight plan string parsing.
//!
//! Plans arrive as a flat comma-separated list alternating identifier and
//! altitude: `ID1,ALT1,ID2,ALT2,...`. Parsing here is pure; coordinate
//! resolution happens later so a geocoder outage can never fail a parse.

use thiserror::Error;

/// Why a flight plan string was rejected. All variants are fatal to the
/// briefing request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("Invalid flight plan format. Expected 'ID1,ALT1,ID2,ALT2,...'")]
    InvalidFormat,
    #[error("Invalid altitude '{value}' for waypoint {waypoint}.")]
    InvalidAltitude { waypoint: String, value: String },
    #[error("Flight plan requires at least two valid waypoints.")]
    TooFewWaypoints,
}

/// One identifier/altitude pair, before coordinate resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub id: String,
    pub altitude_ft: i64,
}

/// Token-level parse result: ordered entries plus the highest altitude,
/// which selects the hazard altitude band later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPlan {
    pub entries: Vec<PlanEntry>,
    pub max_altitude_ft: i64,
}

/// Parse a plan string into ordered identifier/altitude entries.
///
/// Validation order: the token list must be even-length with at least two
/// pairs, then every altitude token must parse as an integer. Identifiers
/// are uppercased. A single pair (`"KDEN,10000"`) is rejected as a format
/// error: a plan needs at least one leg.
pub fn parse_plan(plan: &str) -> Result<ParsedPlan, PlanError> {
    let parts: Vec<&str> = plan.split(',').map(str::trim).collect();
    if parts.len() < 4 || parts.len() % 2 != 0 {
        return Err(PlanError::InvalidFormat);
    }

    let mut entries = Vec::with_capacity(parts.len() / 2);
    let mut max_altitude_ft = 0i64;
    for pair in parts.chunks_exact(2) {
        let id = pair[0].to_uppercase();
        let altitude_ft: i64 = pair[1].parse().map_err(|_| PlanError::InvalidAltitude {
            waypoint: id.clone(),
            value: pair[1].to_string(),
        })?;
        if altitude_ft > max_altitude_ft {
            max_altitude_ft = altitude_ft;
        }
        entries.push(PlanEntry { id, altitude_ft });
    }

    // Unreachable while the token-count rule above requires two pairs.
    if entries.len() < 2 {
        return Err(PlanError::TooFewWaypoints);
    }

    Ok(ParsedPlan {
        entries,
        max_altitude_ft,
    })
}
