//! Download and decode the most recent archive record for a site.
//!
//! Usage: download_record [SITE] [YYYY-MM-DD]

use chrono::{NaiveDate, Utc};
use level2_decode::decode_record;
use level2_storage::{ArchiveClient, ObjectStorageConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let site = args.next().unwrap_or_else(|| "KDMX".to_string());
    let date = match args.next() {
        Some(arg) => NaiveDate::parse_from_str(&arg, "%Y-%m-%d")?,
        None => Utc::now().date_naive(),
    };

    let client = ArchiveClient::new(&ObjectStorageConfig::default())?;

    println!("Listing records for {} on {}", site, date);
    let records = client.list_records(&site, date).await?;
    println!("Found {} records", records.len());

    let Some(record) = records.iter().rev().find(|r| !r.is_metadata()) else {
        println!("No data records available");
        return Ok(());
    };

    println!("Downloading {}", record);
    let data = client.download_record(record).await?;
    println!("Record size: {} bytes", data.len());

    let volume = decode_record(&data)?;
    println!(
        "\nSite: {}  VCP: {:?}  sweeps: {}",
        volume.site.as_deref().unwrap_or("unknown"),
        volume.coverage_pattern,
        volume.sweep_count()
    );

    for moment in volume.moments() {
        let sweeps = volume.sweeps(moment);
        println!("\n=== {} ({} sweeps) ===", moment, sweeps.len());
        for (i, sweep) in sweeps.iter().enumerate() {
            let filled = (0..sweep.az_count)
                .flat_map(|az| (0..sweep.range_count).map(move |gate| (az, gate)))
                .filter(|&(az, gate)| sweep.has_value(az, gate))
                .count();
            println!(
                "  sweep {:2}: elevation {:5.2}°, {} radials x {} gates, {:.1}% filled",
                i,
                sweep.elevation,
                sweep.az_count,
                sweep.range_count,
                100.0 * filled as f64 / sweep.data.len().max(1) as f64
            );
        }
    }

    Ok(())
}
