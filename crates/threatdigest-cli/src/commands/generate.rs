use anyhow::Result;

use threatdigest_core::{AppConfig, DigestPipeline};

use super::print::print_digest;

/// Generate a digest now and print it
pub async fn run(config: &AppConfig) -> Result<()> {
    let pipeline = DigestPipeline::from_config(config)?;

    println!("Generating digest...");
    let record = pipeline.run().await;

    print_digest(&record);
    Ok(())
}
