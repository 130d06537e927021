//! VFR eligibility rules.
//!
//! Works on the decoded METAR summary strings: visibility comes from the
//! "Vis …sm" field of the general-conditions string, cloud bases from the
//! "… at NNNNft" clauses of the cloud description.

use regex::Regex;
use std::sync::OnceLock;

/// Class A airspace starts at 18,000 ft; VFR flight is not permitted there.
pub const CLASS_A_FLOOR_FT: i64 = 18_000;

/// Required clearance below a reported cloud base.
pub const CLOUD_CLEARANCE_FT: i64 = 1_000;

/// Minimum flight visibility for VFR, statute miles.
pub const MIN_VISIBILITY_SM: f64 = 3.0;

/// Pull visibility in statute miles out of a general-conditions string,
/// e.g. "Winds W-280 at 10kt, Vis 10sm, Temp 21°C". Simple fractions like
/// "1/2sm" are supported. Returns None when no parseable Vis field exists.
pub fn extract_visibility_sm(general: &str) -> Option<f64> {
    let mut visibility = None;
    for part in general.split(',') {
        let part = part.trim();
        let Some(rest) = part.strip_prefix("Vis") else {
            continue;
        };
        let mut value = rest.trim();
        if value.to_lowercase().ends_with("sm") {
            value = value[..value.len() - 2].trim();
        }
        visibility = if let Some((num, den)) = value.split_once('/') {
            match (num.trim().parse::<f64>(), den.trim().parse::<f64>()) {
                (Ok(n), Ok(d)) if d != 0.0 => Some(n / d),
                _ => None,
            }
        } else {
            value.parse::<f64>().ok()
        };
        if visibility.is_some() {
            break;
        }
    }
    visibility
}

/// Cloud base heights (AGL feet) mentioned in a cloud description, in
/// report order.
pub fn cloud_bases_ft(cloud_description: &str) -> Vec<i64> {
    static BASE_RE: OnceLock<Regex> = OnceLock::new();
    let re = BASE_RE.get_or_init(|| Regex::new(r"at (\d+)ft").unwrap());
    re.captures_iter(cloud_description)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// Whether VFR flight at `altitude_ft` is permitted under the reported
/// conditions.
///
/// Rules, in order: visibility must be known and at least 3 sm; the
/// altitude must be below Class A; clear skies (or no cloud report) pass;
/// clouds mentioned without an extractable base fail conservatively; the
/// altitude must stay 1000 ft below every reported base.
pub fn vfr_allowed(
    visibility_sm: Option<f64>,
    cloud_description: Option<&str>,
    altitude_ft: i64,
) -> bool {
    match visibility_sm {
        Some(vis) if vis >= MIN_VISIBILITY_SM => {}
        _ => return false,
    }

    if altitude_ft >= CLASS_A_FLOOR_FT {
        return false;
    }

    let Some(clouds) = cloud_description else {
        return true;
    };
    let lowered = clouds.to_lowercase();
    if lowered.contains("clear") {
        return true;
    }

    let bases = cloud_bases_ft(clouds);
    if bases.is_empty() {
        // A layer with no reported base gives no clearance to verify.
        return !(lowered.contains("clouds") || lowered.contains("overcast"));
    }

    bases
        .iter()
        .all(|&base| altitude_ft < base - CLOUD_CLEARANCE_FT)
}

/// VFR verdict for one station: None when no target altitude was supplied,
/// otherwise the [`vfr_allowed`] result against the decoded summary.
pub fn evaluate(
    general: Option<&str>,
    cloud_description: Option<&str>,
    altitude_ft: Option<i64>,
) -> Option<bool> {
    let altitude_ft = altitude_ft?;
    let visibility = general.and_then(extract_visibility_sm);
    Some(vfr_allowed(visibility, cloud_description, altitude_ft))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_whole_and_fractional_visibility() {
        assert_eq!(
            extract_visibility_sm("Winds W-280 at 10kt, Vis 10sm, Temp 21°C"),
            Some(10.0)
        );
        assert_eq!(extract_visibility_sm("Vis 1/2sm, Temp 5°C"), Some(0.5));
        assert_eq!(extract_visibility_sm("Winds calm, Temp 21°C"), None);
        assert_eq!(extract_visibility_sm("Vis unknown"), None);
        assert_eq!(extract_visibility_sm("Vis 1/0sm"), None);
    }

    #[test]
    fn later_vis_field_recovers_from_unparseable_one() {
        assert_eq!(extract_visibility_sm("Vis bad, Vis 4sm"), Some(4.0));
    }

    #[test]
    fn finds_all_cloud_bases() {
        let bases = cloud_bases_ft("Scattered clouds at 4000ft, Broken clouds at 9000ft");
        assert_eq!(bases, vec![4000, 9000]);
        assert!(cloud_bases_ft("Sky clear").is_empty());
    }

    #[test]
    fn clear_skies_with_good_visibility_pass() {
        assert!(vfr_allowed(Some(10.0), Some("Sky clear"), 5000));
        assert!(vfr_allowed(Some(10.0), None, 5000));
    }

    #[test]
    fn low_visibility_fails() {
        assert!(!vfr_allowed(Some(2.0), Some("Sky clear"), 5000));
        assert!(!vfr_allowed(None, Some("Sky clear"), 5000));
    }

    #[test]
    fn class_a_altitude_fails() {
        assert!(!vfr_allowed(Some(10.0), Some("Sky clear"), 19000));
        assert!(!vfr_allowed(Some(10.0), Some("Sky clear"), 18000));
        assert!(vfr_allowed(Some(10.0), Some("Sky clear"), 17999));
    }

    #[test]
    fn cloud_base_clearance_rule() {
        let clouds = Some("Broken clouds at 3000ft");
        // 2200 is within 1000 ft of the 3000 ft base.
        assert!(!vfr_allowed(Some(10.0), clouds, 2200));
        assert!(vfr_allowed(Some(10.0), clouds, 1900));
        // Exactly at base - 1000 still counts as too close.
        assert!(!vfr_allowed(Some(10.0), clouds, 2000));
    }

    #[test]
    fn lowest_layer_governs() {
        let clouds = Some("Scattered clouds at 2500ft, Overcast at 8000ft");
        assert!(!vfr_allowed(Some(10.0), clouds, 2000));
        assert!(vfr_allowed(Some(10.0), clouds, 1200));
    }

    #[test]
    fn clouds_without_base_fail_conservatively() {
        assert!(!vfr_allowed(Some(10.0), Some("Overcast"), 5000));
        assert!(!vfr_allowed(Some(10.0), Some("Broken clouds"), 5000));
    }

    #[test]
    fn evaluate_distinguishes_missing_altitude() {
        let general = Some("Winds calm, Vis 10sm, Temp 21°C");
        assert_eq!(evaluate(general, Some("Sky clear"), None), None);
        assert_eq!(evaluate(general, Some("Sky clear"), Some(5000)), Some(true));
        assert_eq!(evaluate(general, Some("Sky clear"), Some(19000)), Some(false));
        assert_eq!(evaluate(None, Some("Sky clear"), Some(5000)), Some(false));
    }
}
