//! Compact METAR raw-text decoder.
//!
//! Produces the condensed summary consumed by the briefing: ordered
//! summary fields (wind, visibility, temperature, dewpoint, altimeter,
//! then any weather phenomena), a cloud description, and decoded remark
//! pairs. Unrecognized components are skipped, never fatal; a report this
//! decoder cannot read at all yields an empty summary while the raw text
//! still travels with the briefing.

use regex::Regex;
use std::sync::OnceLock;

/// Decoded view of one raw METAR.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedMetar {
    /// Wind, visibility, temperature, dewpoint, altimeter, weather; each
    /// present only when its group decoded.
    pub summary_fields: Vec<String>,
    /// "Scattered clouds at 4000ft, Broken clouds at 9000ft" style, or
    /// "Sky clear". None when the report carries no sky group.
    pub clouds: Option<String>,
    /// (group, decoded text) pairs from the RMK section.
    pub remarks: Vec<(String, String)>,
}

impl DecodedMetar {
    /// Comma-joined summary limited to the first `n` fields.
    pub fn general(&self, n: usize) -> String {
        self.summary_fields
            .iter()
            .take(n)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

const CARDINALS_8: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

fn wind_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{3}|VRB)(\d{2,3})(?:G(\d{2,3}))?KT$").unwrap())
}

fn temp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(M?\d{2})/(M?\d{2})?$").unwrap())
}

fn cloud_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(FEW|SCT|BKN|OVC|VV)(\d{3})(CB|TCU)?$").unwrap())
}

/// Decode one raw METAR string.
pub fn decode_metar(raw: &str) -> DecodedMetar {
    let (body, remark_section) = match raw.split_once(" RMK ") {
        Some((body, remarks)) => (body, Some(remarks)),
        None => (raw.strip_suffix(" RMK").unwrap_or(raw), None),
    };

    let tokens: Vec<&str> = body.split_whitespace().collect();
    let mut wind = None;
    let mut visibility = None;
    let mut temperature = None;
    let mut dewpoint = None;
    let mut altimeter = None;
    let mut weather: Vec<String> = Vec::new();
    let mut cloud_layers: Vec<String> = Vec::new();
    let mut sky_clear = false;

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];

        if let Some(caps) = wind_re().captures(token) {
            wind = Some(decode_wind(&caps));
        } else if let Some(vis) = decode_visibility(token, tokens.get(i.wrapping_sub(1)).copied()) {
            // A mixed fraction ("1 1/2SM") consumes the previous integer
            // token; that token never matches any other group, so no
            // correction pass is needed.
            visibility = Some(vis);
        } else if let Some(caps) = temp_re().captures(token) {
            temperature = Some(format!("Temp {}°C", signed(&caps[1])));
            if let Some(dew) = caps.get(2) {
                dewpoint = Some(format!("Dew {}°C", signed(dew.as_str())));
            }
        } else if let Some(inhg) = token.strip_prefix('A').filter(|v| is_digits(v, 4)) {
            altimeter = Some(format!("Alt {}.{}inHg", &inhg[..2], &inhg[2..]));
        } else if let Some(hpa) = token.strip_prefix('Q').filter(|v| is_digits(v, 4)) {
            altimeter = Some(format!("Alt {}hPa", hpa.trim_start_matches('0')));
        } else if let Some(caps) = cloud_re().captures(token) {
            cloud_layers.push(decode_cloud_layer(&caps));
        } else if matches!(token, "SKC" | "CLR" | "NSC" | "NCD" | "CAVOK") {
            sky_clear = true;
            if token == "CAVOK" {
                visibility.get_or_insert_with(|| "Vis 6sm".to_string());
            }
        } else if let Some(wx) = decode_weather(token) {
            weather.push(wx);
        }
        i += 1;
    }

    let mut summary_fields = Vec::new();
    summary_fields.extend(wind);
    summary_fields.extend(visibility);
    summary_fields.extend(temperature);
    summary_fields.extend(dewpoint);
    summary_fields.extend(altimeter);
    summary_fields.extend(weather);

    let clouds = if !cloud_layers.is_empty() {
        Some(cloud_layers.join(", "))
    } else if sky_clear {
        Some("Sky clear".to_string())
    } else {
        None
    };

    DecodedMetar {
        summary_fields,
        clouds,
        remarks: remark_section.map(decode_remarks).unwrap_or_default(),
    }
}

fn decode_wind(caps: &regex::Captures<'_>) -> String {
    let speed: u32 = caps[2].parse().unwrap_or(0);
    let gust = caps
        .get(3)
        .and_then(|g| g.as_str().parse::<u32>().ok())
        .map(|g| format!(" gusting to {g}kt"))
        .unwrap_or_default();

    if &caps[1] == "VRB" {
        return format!("Winds variable at {speed}kt{gust}");
    }
    let degrees: u32 = caps[1].parse().unwrap_or(0);
    if degrees == 0 && speed == 0 {
        return "Winds calm".to_string();
    }
    let cardinal = CARDINALS_8[((degrees as f64 / 45.0).round() as usize) % 8];
    format!("Winds {cardinal}-{degrees:03} at {speed}kt{gust}")
}

fn decode_visibility(token: &str, previous: Option<&str>) -> Option<String> {
    let value = token.strip_suffix("SM")?;
    if let Some(value) = value.strip_prefix('P') {
        // "P6SM" means better than the stated value.
        let whole: f64 = value.parse().ok()?;
        return Some(format!("Vis {whole}sm"));
    }
    let value = value.strip_prefix('M').unwrap_or(value);
    if let Some((num, den)) = value.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 {
            return None;
        }
        // Mixed fraction: the preceding token holds the whole miles.
        if let Some(whole) = previous.and_then(|p| p.parse::<f64>().ok()) {
            return Some(format!("Vis {}sm", whole + num / den));
        }
        return Some(format!("Vis {num}/{den}sm"));
    }
    let miles: f64 = value.parse().ok()?;
    Some(format!("Vis {miles}sm"))
}

fn decode_cloud_layer(caps: &regex::Captures<'_>) -> String {
    let height_ft: u32 = caps[2].parse::<u32>().unwrap_or(0) * 100;
    let kind = match &caps[1] {
        "FEW" => "Few clouds",
        "SCT" => "Scattered clouds",
        "BKN" => "Broken clouds",
        "OVC" => "Overcast",
        _ => "Vertical visibility",
    };
    let suffix = match caps.get(3).map(|m| m.as_str()) {
        Some("CB") => " (Cumulonimbus)",
        Some("TCU") => " (Towering cumulus)",
        _ => "",
    };
    format!("{kind} at {height_ft}ft{suffix}")
}

fn decode_weather(token: &str) -> Option<String> {
    let (intensity, code) = match token.as_bytes().first() {
        Some(b'-') => ("Light ", &token[1..]),
        Some(b'+') => ("Heavy ", &token[1..]),
        _ => ("", token),
    };
    let phenomenon = match code {
        "RA" => "rain",
        "SHRA" => "rain showers",
        "DZ" => "drizzle",
        "SN" => "snow",
        "SHSN" => "snow showers",
        "TSRA" => "thunderstorm with rain",
        "TS" => "thunderstorm",
        "BR" => "mist",
        "FG" => "fog",
        "HZ" => "haze",
        "FZRA" => "freezing rain",
        "FZDZ" => "freezing drizzle",
        "GR" => "hail",
        "UP" => "unknown precipitation",
        _ => return None,
    };
    let mut text = format!("{intensity}{phenomenon}");
    if let Some(first) = text.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    Some(text)
}

fn decode_remarks(section: &str) -> Vec<(String, String)> {
    section
        .split_whitespace()
        .map(|group| (group.to_string(), decode_remark_group(group)))
        .collect()
}

fn decode_remark_group(group: &str) -> String {
    if group == "AO1" {
        return "Automated station without precipitation sensor".to_string();
    }
    if group == "AO2" {
        return "Automated station with precipitation sensor".to_string();
    }
    if group == "PRESRR" {
        return "Pressure rising rapidly".to_string();
    }
    if group == "PRESFR" {
        return "Pressure falling rapidly".to_string();
    }
    if group == "PNO" {
        return "Precipitation amount not available".to_string();
    }
    if let Some(value) = group.strip_prefix("SLP").filter(|v| is_digits(v, 3)) {
        if let Ok(raw) = value.parse::<u32>() {
            // Three digits encode tenths of hPa above 900 or 1000.
            let tenths = if raw < 500 { raw + 10_000 } else { raw + 9_000 };
            return format!("Sea level pressure {}.{}hPa", tenths / 10, tenths % 10);
        }
    }
    if let Some(value) = group.strip_prefix('T').filter(|v| is_digits(v, 8)) {
        if let (Some(temp), Some(dew)) = (decode_tenths(&value[..4]), decode_tenths(&value[4..])) {
            return format!("Temperature {temp}°C, dewpoint {dew}°C");
        }
    }
    group.to_string()
}

/// Signed tenths-of-degree group: leading digit 1 marks negative.
fn decode_tenths(value: &str) -> Option<String> {
    let sign = match &value[..1] {
        "0" => "",
        "1" => "-",
        _ => return None,
    };
    let tenths: i32 = value[1..].parse().ok()?;
    Some(format!("{sign}{}.{}", tenths / 10, tenths % 10))
}

fn signed(value: &str) -> String {
    let (sign, digits) = match value.strip_prefix('M') {
        Some(rest) => (-1i32, rest),
        None => (1, value),
    };
    digits
        .parse::<i32>()
        .map(|n| (sign * n).to_string())
        .unwrap_or_else(|_| value.to_string())
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_typical_report() {
        let decoded =
            decode_metar("KDEN 221553Z 28010G18KT 10SM FEW120 SCT200 21/10 A3012 RMK AO2 SLP123");
        assert_eq!(
            decoded.summary_fields,
            vec![
                "Winds W-280 at 10kt gusting to 18kt",
                "Vis 10sm",
                "Temp 21°C",
                "Dew 10°C",
                "Alt 30.12inHg",
            ]
        );
        assert_eq!(
            decoded.clouds.as_deref(),
            Some("Few clouds at 12000ft, Scattered clouds at 20000ft")
        );
        assert_eq!(
            decoded.remarks,
            vec![
                (
                    "AO2".to_string(),
                    "Automated station with precipitation sensor".to_string()
                ),
                ("SLP123".to_string(), "Sea level pressure 1012.3hPa".to_string()),
            ]
        );
    }

    #[test]
    fn general_keeps_first_fields_only() {
        let decoded = decode_metar("KBOS 221554Z 09008KT 10SM -RA BKN009 18/16 A2987");
        let general = decoded.general(5);
        assert!(general.contains("Vis 10sm"));
        assert!(!general.contains("Light rain"));
        assert_eq!(decoded.summary_fields.last().unwrap(), "Light rain");
    }

    #[test]
    fn decodes_calm_and_variable_winds() {
        assert_eq!(
            decode_metar("KDEN 221553Z 00000KT 10SM CLR 21/10 A3012").summary_fields[0],
            "Winds calm"
        );
        assert_eq!(
            decode_metar("KDEN 221553Z VRB05KT 10SM CLR 21/10 A3012").summary_fields[0],
            "Winds variable at 5kt"
        );
    }

    #[test]
    fn clear_sky_codes_translate() {
        let decoded = decode_metar("KDEN 221553Z 28010KT 10SM CLR 21/10 A3012");
        assert_eq!(decoded.clouds.as_deref(), Some("Sky clear"));
    }

    #[test]
    fn decodes_fractional_visibility() {
        let simple = decode_metar("KBOS 221554Z 09008KT 1/2SM FG OVC002 10/10 A2987");
        assert!(simple.summary_fields.contains(&"Vis 1/2sm".to_string()));

        let mixed = decode_metar("KBOS 221554Z 09008KT 1 1/2SM BR OVC004 10/10 A2987");
        assert!(mixed.summary_fields.contains(&"Vis 1.5sm".to_string()));

        let better_than = decode_metar("CYYZ 221600Z 27012KT P6SM FEW040 17/08 A3001");
        assert!(better_than.summary_fields.contains(&"Vis 6sm".to_string()));
    }

    #[test]
    fn decodes_negative_temperatures() {
        let decoded = decode_metar("PAFA 221553Z 36004KT 10SM CLR M05/M08 A2970");
        assert!(decoded.summary_fields.contains(&"Temp -5°C".to_string()));
        assert!(decoded.summary_fields.contains(&"Dew -8°C".to_string()));
    }

    #[test]
    fn decodes_vertical_visibility_and_qnh() {
        let decoded = decode_metar("EGLL 221550Z 24008KT 1/4SM FG VV002 09/09 Q1013");
        assert_eq!(decoded.clouds.as_deref(), Some("Vertical visibility at 200ft"));
        assert!(decoded.summary_fields.contains(&"Alt 1013hPa".to_string()));
        assert!(decoded.summary_fields.contains(&"Vis 1/4sm".to_string()));
    }

    #[test]
    fn temperature_remark_group_decodes_but_stays_keyed() {
        let decoded = decode_metar("KDEN 221553Z 28010KT 10SM CLR 21/10 A3012 RMK AO2 T02110100");
        let t_group = decoded
            .remarks
            .iter()
            .find(|(key, _)| key == "T02110100")
            .unwrap();
        assert_eq!(t_group.1, "Temperature 21.1°C, dewpoint 10.0°C");
    }

    #[test]
    fn unknown_remark_groups_pass_through_raw() {
        let decoded = decode_metar("KDEN 221553Z 28010KT 10SM CLR 21/10 A3012 RMK AO2 60001");
        assert!(decoded
            .remarks
            .iter()
            .any(|(key, text)| key == "60001" && text == "60001"));
    }

    #[test]
    fn garbage_input_yields_empty_summary() {
        let decoded = decode_metar("not a metar at all");
        assert!(decoded.summary_fields.is_empty());
        assert!(decoded.clouds.is_none());
        assert!(decoded.remarks.is_empty());
    }

    #[test]
    fn sea_level_pressure_below_1000() {
        let decoded = decode_metar("KDEN 221553Z 28010KT 10SM CLR 21/10 A3012 RMK SLP982");
        assert!(decoded
            .remarks
            .iter()
            .any(|(_, text)| text == "Sea level pressure 998.2hPa"));
    }
}
