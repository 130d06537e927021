use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch current conditions and forecast for a location", long_about = None)]
struct Args {
    /// Briefing server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Location query, e.g. "Columbus" or "London,UK"
    query: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/v1/weather", args.url))
        .query(&[("q", args.query.as_str())])
        .send()
        .await
        .context("Failed to reach briefing server")?;

    let body: serde_json::Value = response
        .json()
        .await
        .context("Failed to parse server response")?;

    if let Some(message) = body["error"].as_str() {
        eprintln!("Error: {}", message);
        return Ok(());
    }

    println!(
        "{} ({} as of {})",
        body["name"].as_str().unwrap_or("Unknown location"),
        body["query"].as_str().unwrap_or(""),
        body["last_updated_utc"].as_str().unwrap_or("")
    );
    println!("  Condition: {}", body["condition"].as_str().unwrap_or(""));
    if let Some(temp) = body["temperature"].as_i64() {
        println!("  Temperature: {}°F", temp);
    }
    if let Some(speed) = body["wind_speed"].as_i64() {
        println!(
            "  Wind: {} at {} mph",
            body["wind_direction"].as_str().unwrap_or("N/A"),
            speed
        );
    }
    if let Some(visibility) = body["visibility"].as_f64() {
        println!("  Visibility: {} mi", visibility);
    }

    if let Some(hours) = body["hourly_forecast"].as_array() {
        if !hours.is_empty() {
            println!("  Forecast:");
        }
        for hour in hours {
            println!(
                "    {}  {}  {}°F",
                hour["time"].as_str().unwrap_or(""),
                hour["condition"].as_str().unwrap_or(""),
                hour["temp"].as_i64().unwrap_or(0)
            );
        }
    }

    if let Some(errors) = body["errors"].as_array() {
        for error in errors {
            eprintln!("  Warning: {}", error.as_str().unwrap_or(""));
        }
    }

    Ok(())
}
