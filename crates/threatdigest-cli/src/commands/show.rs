use anyhow::{bail, Result};

use threatdigest_core::{digest::DigestStore, AppConfig};

use super::print::{print_digest, print_json};

pub async fn run(config: &AppConfig, filename: &str, json: bool) -> Result<()> {
    let store = DigestStore::new(config.digest_dir());

    let Some(record) = store.get(filename).await? else {
        bail!("Digest not found: {}", filename);
    };

    if json {
        print_json(&record)?;
    } else {
        print_digest(&record);
    }
    Ok(())
}
