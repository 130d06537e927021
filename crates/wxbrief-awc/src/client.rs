//! Weather data API HTTP client.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::timefmt::{api_timestamp_now, Product};

/// One observation as returned by the METAR endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MetarApiReport {
    #[serde(rename = "rawOb")]
    pub raw_ob: Option<String>,
    #[serde(rename = "receiptTime")]
    pub receipt_time: Option<String>,
    pub name: Option<String>,
}

/// One advisory as returned by the AIRMET/SIGMET endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AirSigmetApiReport {
    #[serde(rename = "airSigmetId")]
    pub air_sigmet_id: Option<i64>,
    pub hazard: Option<String>,
    pub severity: Option<String>,
    #[serde(rename = "altitudeLo1")]
    pub altitude_lo1: Option<i64>,
    #[serde(rename = "altitudeHi1")]
    pub altitude_hi1: Option<i64>,
    #[serde(rename = "movementDir")]
    pub movement_dir: Option<i64>,
    #[serde(rename = "movementSpd")]
    pub movement_spd: Option<i64>,
    #[serde(default)]
    pub area: Vec<AreaPoint>,
}

/// Boundary vertex of an advisory area. Either field can be missing in
/// upstream data; such points are dropped before geometry work.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaPoint {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// HTTP client for the aviation weather data API.
#[derive(Debug, Clone)]
pub struct AwcClient {
    client: Client,
    base_url: String,
}

impl AwcClient {
    /// Create a client against a base URL such as
    /// `https://aviationweather.gov`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Latest observation for one station within the past hour, or None
    /// when the station has no recent report.
    pub async fn fetch_metar(&self, station_id: &str) -> Result<Option<MetarApiReport>> {
        let url = format!("{}/api/data/metar", self.base_url);
        let date = api_timestamp_now(Product::Metar);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ids", station_id),
                ("format", "json"),
                ("hours", "1"),
                ("date", date.as_str()),
            ])
            .send()
            .await
            .context("Failed to fetch METAR data")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("METAR request failed: {} {}", status, body));
        }

        let mut reports = response
            .json::<Vec<MetarApiReport>>()
            .await
            .context("Failed to parse METAR response")?;

        if reports.is_empty() {
            return Ok(None);
        }
        Ok(Some(reports.remove(0)))
    }

    /// Raw newline-delimited pilot reports within 100 distance units and
    /// one hour of age around a location.
    pub async fn fetch_pirep_raw(&self, location_id: &str) -> Result<String> {
        let url = format!("{}/api/data/pirep", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("id", location_id),
                ("format", "raw"),
                ("age", "1"),
                ("distance", "100"),
            ])
            .send()
            .await
            .context("Failed to fetch PIREP data")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("PIREP request failed: {} {}", status, body));
        }

        response
            .text()
            .await
            .context("Failed to read PIREP response")
    }

    /// Advisories active at a flight level for one hazard code.
    pub async fn fetch_airsigmets(
        &self,
        level: i64,
        hazard_code: &str,
    ) -> Result<Vec<AirSigmetApiReport>> {
        let url = format!("{}/api/data/airsigmet", self.base_url);
        let date = api_timestamp_now(Product::AirSigmet);
        let level = level.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json"),
                ("level", level.as_str()),
                ("hazard", hazard_code),
                ("date", date.as_str()),
            ])
            .send()
            .await
            .context("Failed to fetch AIRSIGMET data")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "AIRSIGMET request failed: {} {}",
                status,
                body
            ));
        }

        response
            .json::<Vec<AirSigmetApiReport>>()
            .await
            .context("Failed to parse AIRSIGMET response")
    }
}
