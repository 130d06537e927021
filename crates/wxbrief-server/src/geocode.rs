//! Waypoint identifier geocoding with an in-process cache.

use std::time::Duration;

use anyhow::{Context, Result};
use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use wxbrief_core::Coordinate;

/// One place record from the geocoding service. Coordinates arrive as
/// strings.
#[derive(Debug, Deserialize)]
struct GeocoderPlace {
    lat: String,
    lon: String,
}

/// Resolves location identifiers to coordinates.
///
/// Successful lookups and confirmed not-found results are cached for the
/// process lifetime. Transient failures (timeouts, service errors) are
/// not cached, so a later request can retry the identifier.
pub struct GeoResolver {
    client: Client,
    base_url: String,
    cache: DashMap<String, Option<Coordinate>>,
}

impl GeoResolver {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .user_agent(user_agent)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            cache: DashMap::new(),
        }
    }

    /// Resolve one identifier, None when coordinates are unavailable.
    pub async fn resolve(&self, identifier: &str) -> Option<Coordinate> {
        if let Some(cached) = self.cache.get(identifier) {
            debug!("Geocode cache hit for {}", identifier);
            return *cached;
        }

        match self.lookup(identifier).await {
            Ok(found) => {
                if found.is_none() {
                    warn!("Could not geocode identifier: {}", identifier);
                }
                self.cache.insert(identifier.to_string(), found);
                found
            }
            Err(err) => {
                warn!("Error geocoding {}: {:#}", identifier, err);
                None
            }
        }
    }

    /// Station codes geocode better with the airport qualifier; the bare
    /// identifier is the fallback for non-airport names.
    async fn lookup(&self, identifier: &str) -> Result<Option<Coordinate>> {
        if let Some(coords) = self.geocode(&format!("{identifier} airport")).await? {
            return Ok(Some(coords));
        }
        self.geocode(identifier).await
    }

    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .context("Failed to reach geocoding service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Geocoding request failed: {} {}",
                status,
                body
            ));
        }

        let places = response
            .json::<Vec<GeocoderPlace>>()
            .await
            .context("Failed to parse geocoding response")?;

        let Some(place) = places.first() else {
            return Ok(None);
        };
        let lat = place
            .lat
            .parse::<f64>()
            .context("Geocoder returned a non-numeric latitude")?;
        let lon = place
            .lon
            .parse::<f64>()
            .context("Geocoder returned a non-numeric longitude")?;
        Ok(Some(Coordinate { lat, lon }))
    }
}
