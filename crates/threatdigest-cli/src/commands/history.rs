use anyhow::Result;

use threatdigest_core::{digest::DigestStore, AppConfig};

pub async fn run(config: &AppConfig) -> Result<()> {
    let store = DigestStore::new(config.digest_dir());
    let entries = store.list().await?;

    if entries.is_empty() {
        println!("No digests stored in {}", store.dir().display());
        return Ok(());
    }

    println!("Digests ({}):\n", entries.len());
    for entry in &entries {
        println!(
            "  {}  {}  {} articles",
            entry.filename,
            entry.timestamp.format("%Y-%m-%d %H:%M UTC"),
            entry.article_count
        );
    }
    Ok(())
}
