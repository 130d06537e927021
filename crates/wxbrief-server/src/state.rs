//! Shared application state.

use std::time::Duration;

use reqwest::Client;
use wxbrief_awc::AwcClient;

use crate::config::Config;
use crate::geocode::GeoResolver;

/// State injected into every route: configuration, upstream clients and
/// the geocode cache. Cheap to share behind an Arc.
pub struct AppState {
    pub config: Config,
    pub awc: AwcClient,
    pub resolver: GeoResolver,
    /// Plain client for the general weather provider and the LLM.
    pub http: Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let awc = AwcClient::new(config.awc_url.clone());
        let resolver = GeoResolver::new(config.nominatim_url.clone(), &config.geocoder_user_agent);
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            config,
            awc,
            resolver,
            http,
        }
    }
}
