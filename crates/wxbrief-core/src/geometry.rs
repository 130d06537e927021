//! Leg-versus-hazard intersection checks.
//!
//! Legs are straight segments in (lon, lat) space; no great-circle
//! correction, which is acceptable for the leg lengths a plan holds.
//! Hazard polygons come from upstream advisories and are frequently messy:
//! too few vertices, self-intersecting rings. Preparation filters and
//! repairs them once so every leg can be tested against the same set.

use crate::models::{Coordinate, HazardArea, HazardHit, Issue, IssueKind};
use geo::{BooleanOps, Coord, Intersects, Line, LineString, MultiPolygon, Polygon, Validation};
use tracing::{debug, warn};

/// A hazard whose polygon survived preparation, ready for intersection
/// tests against any number of legs.
#[derive(Debug, Clone)]
pub struct PreparedHazard {
    hit: HazardHit,
    shape: MultiPolygon<f64>,
}

/// Build test-ready polygons from raw hazard areas.
///
/// Areas with fewer than 3 finite vertices are dropped silently. A polygon
/// that is not simple gets one repair pass (union with an empty polygon,
/// which re-noding resolves the self-intersection into separate rings); if
/// the result is still invalid the hazard is skipped and a geometry issue
/// is returned for the briefing's warnings.
pub fn prepare_hazards(hazards: &[HazardArea]) -> (Vec<PreparedHazard>, Vec<Issue>) {
    let mut prepared = Vec::new();
    let mut issues = Vec::new();

    for hazard in hazards {
        let vertices: Vec<Coord<f64>> = hazard
            .area
            .iter()
            .filter(|c| c.lat.is_finite() && c.lon.is_finite())
            .map(|c| Coord { x: c.lon, y: c.lat })
            .collect();
        if vertices.len() < 3 {
            debug!("Insufficient valid coordinates for hazard polygon {}", hazard.id);
            continue;
        }

        let polygon = Polygon::new(LineString::new(vertices), vec![]);
        let shape = if polygon.is_valid() {
            MultiPolygon::new(vec![polygon])
        } else {
            let repaired = polygon.union(&empty_polygon());
            if !repaired.is_valid() {
                warn!(
                    "Invalid hazard polygon geometry for {}, skipping intersection check",
                    hazard.id
                );
                issues.push(Issue::new(
                    IssueKind::Geometry,
                    format!(
                        "Invalid hazard polygon geometry for {}, skipping intersection check.",
                        hazard.id
                    ),
                ));
                continue;
            }
            repaired
        };

        prepared.push(PreparedHazard {
            hit: HazardHit::from(hazard),
            shape,
        });
    }

    (prepared, issues)
}

/// Hazards whose polygon the leg segment crosses, boundary touches
/// included. An empty prepared set yields an empty result.
pub fn leg_hits(start: Coordinate, end: Coordinate, prepared: &[PreparedHazard]) -> Vec<HazardHit> {
    let leg = Line::new(
        Coord {
            x: start.lon,
            y: start.lat,
        },
        Coord {
            x: end.lon,
            y: end.lat,
        },
    );

    prepared
        .iter()
        .filter(|hazard| hazard.shape.iter().any(|part| leg.intersects(part)))
        .map(|hazard| hazard.hit.clone())
        .collect()
}

/// Single-leg convenience: prepare and test in one call. Preparation
/// problems are logged; callers that need them as warnings should use
/// [`prepare_hazards`] and [`leg_hits`] directly.
pub fn leg_intersections(
    start: Coordinate,
    end: Coordinate,
    hazards: &[HazardArea],
) -> Vec<HazardHit> {
    let (prepared, _) = prepare_hazards(hazards);
    leg_hits(start, end, &prepared)
}

fn empty_polygon() -> Polygon<f64> {
    Polygon::new(LineString::new(Vec::new()), vec![])
}
