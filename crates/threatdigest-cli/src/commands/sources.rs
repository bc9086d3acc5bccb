use anyhow::Result;

use threatdigest_core::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    let sources = &config.sources;

    println!("Feeds ({}, up to {} articles each):", sources.feeds.len(), sources.max_articles_per_source);
    for feed in &sources.feeds {
        println!("  {} - {}", feed.name, feed.url);
    }

    if !sources.social_enabled {
        println!("\nSocial sources disabled.");
        return Ok(());
    }

    println!("\nAccounts ({}, up to {} posts each):", sources.social_accounts.len(), sources.max_posts_per_user);
    for account in &sources.social_accounts {
        println!("  @{}", account.trim_start_matches('@'));
    }

    println!("\nLists ({}):", sources.social_lists.len());
    for list in &sources.social_lists {
        println!("  {}", list);
    }

    println!("\nMirrors:");
    for mirror in &config.social.mirrors {
        println!("  {}", mirror);
    }

    if let Some(hours) = sources.recency_window_hours {
        println!("\nOnly feed entries from the last {} hours are kept.", hours);
    }
    Ok(())
}
