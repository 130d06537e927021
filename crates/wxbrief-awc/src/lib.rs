//! Aviation weather data API client and per-product summarizers.
//!
//! Handles all communication with the upstream weather data service:
//! METAR observations, PIREP pilot reports and AIRMET/SIGMET advisories.

pub mod airsigmet;
pub mod client;
pub mod metar;
pub mod pirep;
pub mod timefmt;

pub use airsigmet::airsigmet_reports;
pub use client::{AirSigmetApiReport, AwcClient, MetarApiReport};
pub use metar::metar_summaries;
pub use pirep::pirep_summaries;
pub use timefmt::{api_timestamp, api_timestamp_now, Product};
