//! Fires concurrent registrations at a running server and checks the
//! serials that come back: all distinct, forming one contiguous run. This
//! is the end-to-end version of the allocator's concurrency property, with
//! the real Redis in the loop.
use std::collections::HashSet;

use anyhow::{Error, bail};
use clap::Parser;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of concurrent registrations to fire.
    count: u32,

    #[arg(long, default_value = "http://localhost:1212")]
    url: String,

    #[arg(long, default_value = "Teacher Council")]
    category: String,

    #[arg(long, default_value = "Greater Accra")]
    region: String,
}

#[derive(Deserialize)]
struct RegistrationResponse {
    membership_id: String,
    serial: u64,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    if args.count == 0 {
        bail!("count must be positive");
    }

    let client = Client::new();

    let mut handles = Vec::new();
    for index in 0..args.count {
        let client = client.clone();
        let url = format!("{}/register", args.url);
        let category = args.category.clone();
        let region = args.region.clone();

        handles.push(tokio::spawn(async move {
            let response = client
                .post(&url)
                .json(&json!({
                    "full_name": format!("Load Tester {index}"),
                    "email": format!("tester{index}@example.com"),
                    "category": category,
                    "region": region,
                }))
                .send()
                .await?
                .error_for_status()?;

            Ok::<RegistrationResponse, Error>(response.json().await?)
        }));
    }

    let mut serials = Vec::new();
    let mut identifiers = HashSet::new();
    for handle in handles {
        let registration = handle.await??;

        if !identifiers.insert(registration.membership_id.clone()) {
            bail!("Duplicate identifier issued: {}", registration.membership_id);
        }
        serials.push(registration.serial);
    }

    let distinct: HashSet<u64> = serials.iter().copied().collect();
    if distinct.len() != serials.len() {
        bail!(
            "Duplicate serials issued: {} registrations, {} distinct serials",
            serials.len(),
            distinct.len()
        );
    }

    let min = *distinct.iter().min().expect("at least one registration");
    let max = *distinct.iter().max().expect("at least one registration");
    if max - min + 1 != serials.len() as u64 {
        bail!(
            "Serial run is not contiguous: {min}..{max} over {} registrations",
            serials.len()
        );
    }

    println!(
        "{} registrations, serials {min}..{max}, no duplicates",
        serials.len()
    );

    Ok(())
}
