//! Follow the realtime chunk feed for a site, reassembling the volume in
//! progress as new chunks land.
//!
//! Usage: watch_realtime [SITE]

use std::time::Duration;

use level2_realtime::{reassemble_chunks, Chunk};
use level2_storage::{ObjectStorageConfig, RealtimeClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let site = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "KDMX".to_string());

    let client = RealtimeClient::new(&ObjectStorageConfig::default())?;

    let mut volume = client.latest_volume(&site).await?;
    println!("Watching {} volume {}", site, volume);

    let mut seen = 0usize;
    let mut downloaded: Vec<Chunk> = Vec::new();

    loop {
        let ids = client.list_chunks(&site, volume).await?;
        for id in &ids[seen.min(ids.len())..] {
            let chunk = client.download_chunk(id).await?;
            println!("  chunk {} ({} bytes)", id, chunk.payload().len());
            downloaded.push(chunk);
        }
        seen = ids.len();

        if !downloaded.is_empty() {
            match reassemble_chunks(&downloaded) {
                Ok((partial, is_complete)) => {
                    println!(
                        "volume {}: {} chunks, {} sweeps so far{}",
                        volume,
                        downloaded.len(),
                        partial.sweep_count(),
                        if is_complete { ", COMPLETE" } else { "" }
                    );
                    if is_complete {
                        volume = volume.next();
                        seen = 0;
                        downloaded.clear();
                        println!("Moving to volume {}", volume);
                    }
                }
                Err(e) => println!("volume {} not yet decodable: {}", volume, e),
            }
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}
