use futures::stream::{self, StreamExt};

use crate::config::{AppConfig, FeedSource, SourcesConfig};
use crate::feed::{FeedFetcher, FeedReader, Item};
use crate::social::{ListSpec, MirrorPool, SocialReader};
use crate::Result;

/// Collects items from every configured source into one ordered list.
///
/// Output order is fixed: feeds in configuration order, then accounts, then
/// lists. Feeds are fetched concurrently but their results keep that order.
pub struct Aggregator {
    feed_reader: FeedReader,
    social_reader: SocialReader,
    sources: SourcesConfig,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(
        feed_reader: FeedReader,
        social_reader: SocialReader,
        sources: SourcesConfig,
        concurrency: usize,
    ) -> Self {
        Self {
            feed_reader,
            social_reader,
            sources,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = FeedFetcher::new(config)?;
        let feed_reader = FeedReader::new(fetcher.clone())
            .with_recency_window(config.sources.recency_window_hours);
        let social_reader = SocialReader::new(fetcher, MirrorPool::new(&config.social.mirrors));

        Ok(Self::new(
            feed_reader,
            social_reader,
            config.sources.clone(),
            config.sync.fetch_concurrency,
        ))
    }

    pub fn sources(&self) -> &SourcesConfig {
        &self.sources
    }

    /// Collect from the configured sources
    pub async fn collect_configured(&self) -> Vec<Item> {
        self.collect(
            &self.sources.feeds,
            &self.sources.social_accounts,
            &self.sources.social_lists,
            self.sources.max_articles_per_source,
            self.sources.max_posts_per_user,
        )
        .await
    }

    /// Collect from explicit sources. List specs are "owner/list"; malformed
    /// ones are skipped with a warning. Accounts and lists are ignored when
    /// social collection is disabled.
    pub async fn collect(
        &self,
        feeds: &[FeedSource],
        users: &[String],
        lists: &[String],
        max_per_feed: usize,
        max_per_user: usize,
    ) -> Vec<Item> {
        let mut items: Vec<Item> = stream::iter(feeds.to_vec())
            .map(|feed| {
                let reader = self.feed_reader.clone();
                async move { reader.fetch(&feed.url, &feed.name, max_per_feed).await }
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();
        let feed_count = items.len();

        if !self.sources.social_enabled {
            if !users.is_empty() || !lists.is_empty() {
                tracing::debug!("Social collection disabled, skipping accounts and lists");
            }
            tracing::info!("Collected {} items from feeds", feed_count);
            return items;
        }

        if !users.is_empty() {
            items.extend(self.social_reader.fetch_multiple_users(users, max_per_user).await);
        }

        for raw in lists {
            match ListSpec::parse(raw) {
                Some(list) => {
                    items.extend(
                        self.social_reader
                            .fetch_list(&list.owner, &list.name, max_per_user)
                            .await,
                    );
                }
                None => tracing::warn!("Skipping malformed list spec: {:?}", raw),
            }
        }

        tracing::info!(
            "Collected {} items ({} from feeds, {} from social)",
            items.len(),
            feed_count,
            items.len() - feed_count
        );
        items
    }
}
