//! Timestamp formatting for the weather data API's `date` parameter.

use chrono::{DateTime, Duration, Timelike, Utc};

/// Which product a timestamp is being built for; METAR queries anchor to
/// the previous hour's observation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Metar,
    AirSigmet,
}

/// Format `now` for the API: `YYYYMMDD_HHMMZ`.
///
/// METAR observations are filed around minute 54, so that product asks for
/// one hour back with the minute pinned to :54. Everything else queries the
/// current instant.
pub fn api_timestamp(product: Product, now: DateTime<Utc>) -> String {
    let stamp = match product {
        Product::Metar => {
            let back = now - Duration::hours(1);
            back.with_minute(54)
                .and_then(|t| t.with_second(0))
                .unwrap_or(back)
        }
        Product::AirSigmet => now,
    };
    stamp.format("%Y%m%d_%H%MZ").to_string()
}

/// [`api_timestamp`] against the current wall clock.
pub fn api_timestamp_now(product: Product) -> String {
    api_timestamp(product, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn metar_anchors_to_previous_hour_minute_54() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 16, 10, 33).unwrap();
        assert_eq!(api_timestamp(Product::Metar, now), "20250314_1554Z");
    }

    #[test]
    fn metar_anchor_crosses_midnight() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 0, 20, 0).unwrap();
        assert_eq!(api_timestamp(Product::Metar, now), "20250313_2354Z");
    }

    #[test]
    fn airsigmet_uses_current_time() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 16, 10, 33).unwrap();
        assert_eq!(api_timestamp(Product::AirSigmet, now), "20250314_1610Z");
    }
}
