//! Core data models for the briefing pipeline.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// A single stop on a flight plan.
///
/// `coords` is None when the geocoder could not resolve the identifier;
/// downstream stages must tolerate that and report it as a warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: String,
    pub altitude_ft: i64,
    pub coords: Option<Coordinate>,
}

/// Parsed flight plan: ordered waypoints plus the highest requested altitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightPlan {
    pub waypoints: Vec<Waypoint>,
    pub max_altitude_ft: i64,
}

/// One segment of the route, with the hazards its straight-line path crosses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leg {
    pub from: String,
    pub to: String,
    pub intersecting_hazards: Vec<HazardHit>,
}

/// AIRMET/SIGMET hazard classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardKind {
    Conv,
    Turb,
    Ice,
    Ifr,
    #[serde(rename = "MTN OBSCN")]
    MtnObscn,
    All,
}

impl HazardKind {
    /// Parse an upstream hazard code. Returns None for unrecognized values;
    /// callers default those to `All` with a logged warning.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "CONV" => Some(Self::Conv),
            "TURB" => Some(Self::Turb),
            "ICE" => Some(Self::Ice),
            "IFR" => Some(Self::Ifr),
            "MTN OBSCN" => Some(Self::MtnObscn),
            "ALL" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Conv => "CONV",
            Self::Turb => "TURB",
            Self::Ice => "ICE",
            Self::Ifr => "IFR",
            Self::MtnObscn => "MTN OBSCN",
            Self::All => "ALL",
        }
    }
}

/// One AIRMET/SIGMET advisory with its boundary polygon.
///
/// Fetched fresh per briefing; advisories are short-lived so they are never
/// cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardArea {
    pub id: String,
    pub hazard: HazardKind,
    pub severity: Option<String>,
    /// Boundary vertices in advisory order. Fewer than 3 usable vertices
    /// makes the area unusable for intersection checks.
    pub area: Vec<Coordinate>,
    pub altitude_low_ft: Option<i64>,
    pub altitude_hi_ft: Option<i64>,
    pub movement_dir_deg: Option<i64>,
    pub movement_spd_kt: Option<i64>,
    pub summary: String,
}

impl HazardArea {
    /// One-line human summary: hazard, severity, altitude phrase and an
    /// optional movement clause.
    pub fn summary_line(&self) -> String {
        let severity = self.severity.as_deref().unwrap_or("unknown severity");
        let level = match (self.altitude_hi_ft, self.altitude_low_ft) {
            (Some(hi), _) => format!("up to FL{}", hi / 100),
            (None, Some(lo)) => format!("at FL{}", lo / 100),
            (None, None) => "at unknown altitude".to_string(),
        };
        let mut line = format!("{} ({}) {}.", self.hazard.as_code(), severity, level);
        if let (Some(dir), Some(spd)) = (self.movement_dir_deg, self.movement_spd_kt) {
            line.push_str(&format!(" Moving {dir}° at {spd} kt."));
        }
        line
    }
}

/// Compact record of one hazard a leg crosses. Carries no geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardHit {
    pub id: String,
    pub hazard: HazardKind,
    pub severity: Option<String>,
    pub summary: String,
}

impl From<&HazardArea> for HazardHit {
    fn from(area: &HazardArea) -> Self {
        Self {
            id: area.id.clone(),
            hazard: area.hazard,
            severity: area.severity.clone(),
            summary: area.summary.clone(),
        }
    }
}

/// Decoded METAR for one station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetarSummary {
    /// Raw observation text as received.
    pub raw: Option<String>,
    /// Condensed conditions: first five comma-separated decoded fields.
    pub general: Option<String>,
    pub cloud: Option<String>,
    /// Decoded remark values, T-group temperature remarks filtered out.
    pub remarks: Vec<String>,
    pub receipt_time: Option<String>,
    pub station_name: Option<String>,
    /// VFR verdict at the requested altitude. None when no altitude was
    /// supplied for this station.
    pub vfr_allowed: Option<bool>,
    /// Set when the fetch or decode failed; siblings are unaffected.
    pub error: Option<String>,
}

impl MetarSummary {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            raw: None,
            general: None,
            cloud: None,
            remarks: Vec::new(),
            receipt_time: None,
            station_name: None,
            vfr_allowed: None,
            error: Some(message.into()),
        }
    }
}

/// One structured pilot report parsed from a raw PIREP line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PirepReport {
    pub raw: String,
    pub location: Option<String>,
    pub time_utc: Option<String>,
    pub flight_level: Option<String>,
    pub aircraft: Option<String>,
    pub clouds: Option<String>,
    pub flight_visibility: Option<String>,
    pub weather: Option<String>,
    pub temperature: Option<String>,
    pub wind: Option<String>,
    pub turbulence: Option<String>,
    pub icing: Option<String>,
    pub remarks: Option<String>,
}

/// Summary of pilot reports near one location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PirepSummary {
    pub status: String,
    pub reports: Vec<PirepReport>,
    pub error: Option<String>,
}

/// Machine-readable classification of a briefing error or warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Flight plan failed to parse. Always fatal.
    Parse,
    /// A waypoint's coordinates could not be resolved.
    Geocode,
    /// An upstream fetch failed or timed out.
    Fetch,
    /// Upstream responded but the payload did not match its schema.
    Upstream,
    /// A hazard polygon could not be used for intersection checks.
    Geometry,
}

/// A human-readable problem report tagged with its kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The assembled briefing returned to callers.
///
/// A fatal parse error short-circuits the pipeline: only `errors` is
/// populated. Every other failure degrades into `warnings` while the rest
/// of the briefing still fills in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Briefing {
    pub flight_plan: String,
    pub waypoints: Vec<Waypoint>,
    pub legs: Vec<Leg>,
    pub metar: std::collections::BTreeMap<String, MetarSummary>,
    pub pireps: std::collections::BTreeMap<String, PirepSummary>,
    pub airsigmets: Vec<HazardArea>,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl Briefing {
    /// Empty briefing shell for a plan string; stages fill it in.
    pub fn new(plan: impl Into<String>) -> Self {
        Self {
            flight_plan: plan.into(),
            waypoints: Vec::new(),
            legs: Vec::new(),
            metar: std::collections::BTreeMap::new(),
            pireps: std::collections::BTreeMap::new(),
            airsigmets: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Briefing carrying only a fatal error, all other sections empty.
    pub fn fatal(plan: impl Into<String>, issue: Issue) -> Self {
        let mut briefing = Self::new(plan);
        briefing.errors.push(issue);
        briefing
    }
}
