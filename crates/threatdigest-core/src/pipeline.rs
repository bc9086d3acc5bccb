use tokio::sync::Mutex;

use crate::aggregator::Aggregator;
use crate::ai::{error_summary, Summarizer};
use crate::config::AppConfig;
use crate::digest::{DigestRecord, DigestStore};
use crate::Result;

const NO_ARTICLES_FETCHED: &str = "No articles fetched";

/// Keys owned by the record itself; a model reply must not shadow them
const RESERVED_KEYS: &[&str] = &["timestamp", "sources_count", "article_count", "articles", "error"];

/// One end-to-end digest run: collect, summarize, persist.
pub struct DigestPipeline {
    aggregator: Aggregator,
    summarizer: Option<Summarizer>,
    store: DigestStore,
    run_lock: Mutex<()>,
}

impl DigestPipeline {
    pub fn new(aggregator: Aggregator, summarizer: Option<Summarizer>, store: DigestStore) -> Self {
        Self {
            aggregator,
            summarizer,
            store,
            run_lock: Mutex::new(()),
        }
    }

    /// Build the pipeline from configuration. A missing or unusable AI
    /// configuration disables summarization rather than failing.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let aggregator = Aggregator::from_config(config)?;

        let summarizer = if config.ai.enabled {
            match Summarizer::new(config) {
                Ok(summarizer) => {
                    tracing::info!("AI summarization enabled ({})", summarizer.provider_name());
                    Some(summarizer)
                }
                Err(e) => {
                    tracing::warn!("AI summarization unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self::new(aggregator, summarizer, DigestStore::new(config.digest_dir())))
    }

    pub fn store(&self) -> &DigestStore {
        &self.store
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Run once. Concurrent callers wait for the run in progress to finish.
    pub async fn run(&self) -> DigestRecord {
        let _guard = self.run_lock.lock().await;
        tracing::info!("Starting digest generation");

        let sources_count = self.aggregator.sources().feeds.len();
        let items = self.aggregator.collect_configured().await;

        if items.is_empty() {
            tracing::warn!("{}", NO_ARTICLES_FETCHED);
            return DigestRecord::failed(NO_ARTICLES_FETCHED, sources_count);
        }

        let mut summary = match &self.summarizer {
            Some(summarizer) => summarizer.summarize(&items).await,
            None => error_summary("AI summarization is not configured"),
        };
        for key in RESERVED_KEYS {
            summary.remove(*key);
        }

        let mut record = DigestRecord::new(items, summary, sources_count);

        match self.store.save(&record).await {
            Ok(filename) => {
                tracing::info!(
                    "Digest generation complete: {} articles saved to {}",
                    record.article_count,
                    filename
                );
            }
            Err(e) => {
                tracing::error!("Failed to save digest: {}", e);
                record.error = Some(format!("Failed to save digest: {}", e));
            }
        }

        record
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::DigestPipeline;
    use crate::aggregator::Aggregator;
    use crate::ai::{AiProvider, Summarizer};
    use crate::digest::DigestStore;
    use crate::config::{FeedSource, SourcesConfig};
    use crate::feed::{FeedFetcher, FeedReader};
    use crate::social::{MirrorPool, SocialReader};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    pub struct FixedReply(pub &'static str);

    #[async_trait::async_trait]
    impl AiProvider for FixedReply {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> crate::Result<String> {
            Ok(self.0.to_string())
        }
    }

    /// Pipeline reading the given feed URLs, with no social sources
    pub fn pipeline(feed_urls: &[String], reply: Option<&'static str>, dir: &Path) -> DigestPipeline {
        pipeline_with_sources(feed_sources(feed_urls), reply, dir)
    }

    pub fn feed_sources(feed_urls: &[String]) -> SourcesConfig {
        SourcesConfig {
            feeds: feed_urls
                .iter()
                .enumerate()
                .map(|(i, url)| FeedSource::new(format!("Feed {}", i), url.clone()))
                .collect(),
            social_accounts: Vec::new(),
            social_lists: Vec::new(),
            max_articles_per_source: 5,
            max_posts_per_user: 5,
            social_enabled: false,
            recency_window_hours: None,
        }
    }

    pub fn pipeline_with_sources(
        sources: SourcesConfig,
        reply: Option<&'static str>,
        dir: &Path,
    ) -> DigestPipeline {
        let fetcher = FeedFetcher::with_settings(Duration::from_secs(5), None).unwrap();
        let aggregator = Aggregator::new(
            FeedReader::new(fetcher.clone()),
            SocialReader::new(fetcher, MirrorPool::new(Vec::<String>::new())),
            sources,
            2,
        );
        let summarizer = reply.map(|r| Summarizer::with_provider(Arc::new(FixedReply(r)), 256));
        DigestPipeline::new(aggregator, summarizer, DigestStore::new(dir))
    }
}
