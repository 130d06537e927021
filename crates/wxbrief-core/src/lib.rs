pub mod decode;
pub mod geometry;
pub mod models;
pub mod plan;
pub mod vfr;

pub use decode::{decode_metar, DecodedMetar};
pub use geometry::{leg_hits, leg_intersections, prepare_hazards, PreparedHazard};
pub use models::{
    Briefing, Coordinate, FlightPlan, HazardArea, HazardHit, HazardKind, Issue, IssueKind, Leg,
    MetarSummary, PirepReport, PirepSummary, Waypoint,
};
pub use plan::{parse_plan, ParsedPlan, PlanEntry, PlanError};
