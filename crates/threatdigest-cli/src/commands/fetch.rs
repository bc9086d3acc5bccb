use anyhow::Result;

use threatdigest_core::{digest, AppConfig, Aggregator};

/// Collect articles from every configured source and print them
pub async fn run(config: &AppConfig, raw: bool) -> Result<()> {
    let aggregator = Aggregator::from_config(config)?;
    let items = aggregator.collect_configured().await;

    if items.is_empty() {
        println!("No articles fetched.");
        return Ok(());
    }

    if raw {
        print!("{}", digest::render(&items));
    } else {
        print!("{}", digest::render_markdown(&items));
    }
    Ok(())
}
