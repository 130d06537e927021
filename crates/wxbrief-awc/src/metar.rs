//! METAR fetch and per-station summarization.

use std::collections::{BTreeMap, HashMap};

use futures::future::join_all;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};
use wxbrief_core::{decode_metar, vfr, MetarSummary};

use crate::client::{AwcClient, MetarApiReport};

/// Fields kept in the condensed general summary.
const GENERAL_FIELD_COUNT: usize = 5;

fn t_group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^T\d{8}$").unwrap())
}

/// Fetch and summarize observations for each station concurrently.
///
/// Every requested station gets an entry. A failed fetch or decode
/// produces a summary with only the `error` field set; other stations
/// are unaffected. `altitudes` supplies the planned altitude per
/// station for the VFR verdict; stations without one get no verdict.
pub async fn metar_summaries(
    client: &AwcClient,
    station_ids: &[String],
    altitudes: &HashMap<String, i64>,
) -> BTreeMap<String, MetarSummary> {
    let fetches = station_ids.iter().map(|id| async move {
        let outcome = client.fetch_metar(id).await;
        (id.clone(), outcome)
    });

    let mut summaries = BTreeMap::new();
    for (id, outcome) in join_all(fetches).await {
        let summary = match outcome {
            Ok(Some(report)) => summarize_report(&id, report, altitudes.get(&id).copied()),
            Ok(None) => {
                warn!("No recent observation in METAR response for {}", id);
                MetarSummary::failed("Failed to fetch METAR data")
            }
            Err(err) => {
                warn!("METAR fetch failed for {}: {:#}", id, err);
                MetarSummary::failed("Failed to fetch METAR data")
            }
        };
        summaries.insert(id, summary);
    }
    summaries
}

fn summarize_report(
    station_id: &str,
    report: MetarApiReport,
    altitude_ft: Option<i64>,
) -> MetarSummary {
    let station_name = report.name.unwrap_or_else(|| station_id.to_string());

    let Some(raw) = report.raw_ob else {
        warn!("Missing raw observation text in METAR response for {}", station_id);
        return MetarSummary::failed("Missing raw METAR string in API response");
    };

    let decoded = decode_metar(&raw);
    if decoded.summary_fields.is_empty() && decoded.clouds.is_none() {
        warn!("Could not decode METAR for {}: {}", station_id, raw);
        let mut summary = MetarSummary::failed("Could not parse METAR data");
        summary.raw = Some(raw);
        return summary;
    }

    let general = decoded.general(GENERAL_FIELD_COUNT);
    if altitude_ft.is_none() {
        debug!("Skipping VFR check for {}: altitude not provided", station_id);
    }
    let vfr_allowed = vfr::evaluate(Some(&general), decoded.clouds.as_deref(), altitude_ft);

    // T-group remarks duplicate the tenths-precision temperature already
    // decoded into its own remark, so they are dropped here.
    let remarks = decoded
        .remarks
        .into_iter()
        .filter(|(group, _)| !t_group_re().is_match(group))
        .map(|(_, text)| text)
        .collect();

    MetarSummary {
        raw: Some(raw),
        general: Some(general),
        cloud: decoded.clouds,
        remarks,
        receipt_time: report.receipt_time,
        station_name: Some(station_name),
        vfr_allowed,
        error: None,
    }
}
