use anyhow::Result;

use threatdigest_core::{digest::DigestStore, AppConfig};

use super::print::{print_digest, print_json};

pub async fn run(config: &AppConfig, json: bool) -> Result<()> {
    let store = DigestStore::new(config.digest_dir());

    match store.latest().await? {
        Some(record) if json => print_json(&record)?,
        Some(record) => print_digest(&record),
        None => {
            println!("No digests found.");
            println!("\nTo generate one now, run:");
            println!("  threatdigest generate");
        }
    }
    Ok(())
}
