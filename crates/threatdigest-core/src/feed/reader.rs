use chrono::{Duration, Utc};

use super::fetcher::FeedFetcher;
use super::models::{Item, ParsedEntry, SourceKind};
use super::parser::ParsedFeed;

/// Longest recency window accepted by config validation, in hours
pub const MAX_RECENCY_WINDOW_HOURS: u64 = 24 * 365 * 100;

const NO_TITLE: &str = "No Title";

/// Reads one syndication feed into normalized items.
///
/// `fetch` never fails: network and parse errors are logged and produce an
/// empty result so one broken feed cannot abort a run.
#[derive(Clone)]
pub struct FeedReader {
    fetcher: FeedFetcher,
    recency_window: Option<Duration>,
}

impl FeedReader {
    pub fn new(fetcher: FeedFetcher) -> Self {
        Self {
            fetcher,
            recency_window: None,
        }
    }

    /// Drop entries with a known timestamp older than `hours`. A window too
    /// large to represent means no cutoff.
    pub fn with_recency_window(mut self, hours: Option<u64>) -> Self {
        self.recency_window = hours
            .and_then(|h| i64::try_from(h).ok())
            .and_then(Duration::try_hours);
        self
    }

    /// Fetch up to `max_items` items from the feed at `url`, in feed order
    pub async fn fetch(&self, url: &str, source_name: &str, max_items: usize) -> Vec<Item> {
        match self.fetcher.fetch(url).await {
            Ok(parsed) => {
                let items = self.to_items(parsed, source_name, max_items);
                tracing::info!("Fetched {} articles from {}", items.len(), source_name);
                items
            }
            Err(e) => {
                tracing::error!("Error fetching feed from {}: {}", source_name, e);
                Vec::new()
            }
        }
    }

    fn to_items(&self, parsed: ParsedFeed, source_name: &str, max_items: usize) -> Vec<Item> {
        let cutoff = self
            .recency_window
            .and_then(|window| Utc::now().checked_sub_signed(window));

        parsed
            .entries
            .into_iter()
            .filter(|entry| match (cutoff, entry.feed_timestamp()) {
                (Some(cutoff), Some(ts)) => ts >= cutoff,
                _ => true,
            })
            .take(max_items)
            .map(|entry| feed_item(&entry, source_name))
            .collect()
    }
}

/// Normalize a parsed entry from a publisher feed
pub fn feed_item(entry: &ParsedEntry, source_name: &str) -> Item {
    Item {
        title: entry.resolved_title(NO_TITLE),
        link: entry.resolved_link(),
        body: entry.feed_body(),
        published_at: entry.feed_timestamp(),
        source_label: source_name.to_string(),
        source_kind: SourceKind::Feed,
        author: None,
    }
}
