use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use wxbrief_core::Briefing;

#[derive(Parser, Debug)]
#[command(author, version, about = "Request a weather briefing for a flight plan", long_about = None)]
struct Args {
    /// Briefing server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Flight plan as ID,ALTITUDE pairs, e.g. "KCMH,5500,KJFK,10000"
    plan: String,

    /// Also request the AI narrative summary
    #[arg(long)]
    summary: bool,

    /// Print the raw JSON response instead of the formatted briefing
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();

    let endpoint = if args.summary {
        "/v1/briefing/summary"
    } else {
        "/v1/briefing"
    };

    println!("Requesting briefing for {}...", args.plan);
    let response = client
        .post(format!("{}{}", args.url, endpoint))
        .json(&json!({ "plan": args.plan }))
        .send()
        .await
        .context("Failed to reach briefing server")?;

    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .context("Failed to parse server response")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    // Plain {"error": ...} payloads carry no briefing to print.
    if body.get("flight_plan").is_none() {
        eprintln!(
            "Server error ({}): {}",
            status,
            body["error"].as_str().unwrap_or("unknown")
        );
        return Ok(());
    }

    let narrative = body
        .get("summary")
        .and_then(|s| s.as_str())
        .map(str::to_string);
    let briefing: Briefing =
        serde_json::from_value(body).context("Unexpected briefing shape")?;

    print_briefing(&briefing);
    if let Some(text) = narrative {
        println!("\n=== AI Summary ===");
        println!("{}", text);
    }

    Ok(())
}

fn print_briefing(briefing: &Briefing) {
    println!("\nRoute: {}", briefing.flight_plan);
    for wp in &briefing.waypoints {
        match wp.coords {
            Some(c) => println!(
                "  {} at {}ft ({:.4}, {:.4})",
                wp.id, wp.altitude_ft, c.lat, c.lon
            ),
            None => println!("  {} at {}ft (unresolved)", wp.id, wp.altitude_ft),
        }
    }

    println!("\n--- METAR ---");
    for (id, metar) in &briefing.metar {
        if let Some(err) = &metar.error {
            println!("{}: {}", id, err);
            continue;
        }
        println!("{} ({})", id, metar.station_name.as_deref().unwrap_or(id));
        if let Some(general) = &metar.general {
            println!("  {}", general);
        }
        if let Some(cloud) = &metar.cloud {
            println!("  {}", cloud);
        }
        match metar.vfr_allowed {
            Some(true) => println!("  VFR: allowed"),
            Some(false) => println!("  VFR: NOT allowed"),
            None => {}
        }
    }

    println!("\n--- PIREP ---");
    for summary in briefing.pireps.values() {
        println!("{}", summary.status);
    }

    println!("\n--- AIRMET/SIGMET ---");
    if briefing.airsigmets.is_empty() {
        println!("No active advisories for this altitude.");
    }
    for hazard in &briefing.airsigmets {
        println!("{}: {}", hazard.id, hazard.summary);
    }
    for leg in &briefing.legs {
        if !leg.intersecting_hazards.is_empty() {
            let ids: Vec<&str> = leg
                .intersecting_hazards
                .iter()
                .map(|h| h.id.as_str())
                .collect();
            println!("Leg {}-{} crosses: {}", leg.from, leg.to, ids.join(", "));
        }
    }

    if !briefing.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &briefing.warnings {
            println!("  - {}", warning.message);
        }
    }
    if !briefing.errors.is_empty() {
        println!("\nErrors:");
        for error in &briefing.errors {
            println!("  - {}", error.message);
        }
    }
}
