use crate::feed::{FeedFetcher, Item, ParsedEntry, SourceKind};
use crate::{Error, Result};

use super::{ListSpec, MirrorPool};

/// List feeds carry several authors per page, so they get a larger cap
const LIST_CAP_MULTIPLIER: usize = 3;

/// Reads social timelines and lists through a pool of RSS mirrors.
///
/// Mirrors are tried in order and the first one that returns at least one
/// entry wins; the rest are not contacted. Every public method is total: an
/// exhausted pool yields an empty result.
#[derive(Clone)]
pub struct SocialReader {
    fetcher: FeedFetcher,
    mirrors: MirrorPool,
}

impl SocialReader {
    pub fn new(fetcher: FeedFetcher, mirrors: MirrorPool) -> Self {
        Self { fetcher, mirrors }
    }

    pub fn mirrors(&self) -> &MirrorPool {
        &self.mirrors
    }

    /// Fetch up to `max_items` recent posts for one account
    pub async fn fetch_user(&self, username: &str, max_items: usize) -> Vec<Item> {
        let username = username.trim().trim_start_matches('@');
        let label = format!("@{}", username);

        let Some(entries) = self
            .first_with_entries(&label, |base| MirrorPool::user_feed_url(base, username))
            .await
        else {
            tracing::error!("All mirrors failed for {}", label);
            return Vec::new();
        };

        let placeholder = format!("Post from {}", label);
        let items: Vec<Item> = entries
            .iter()
            .take(max_items)
            .map(|entry| Item {
                title: entry.resolved_title(&placeholder),
                link: entry.resolved_link(),
                body: entry.post_body(),
                published_at: entry.post_timestamp(),
                source_label: label.clone(),
                source_kind: SourceKind::SocialUser,
                author: Some(username.to_string()),
            })
            .collect();

        tracing::info!("Fetched {} posts from {}", items.len(), label);
        items
    }

    /// Fetch up to `max_items * 3` recent posts from a list
    pub async fn fetch_list(&self, owner: &str, list_name: &str, max_items: usize) -> Vec<Item> {
        let list = ListSpec {
            owner: owner.trim().trim_start_matches('@').to_string(),
            name: list_name.trim().to_string(),
        };
        let label = format!("List: {}", list);

        let Some(entries) = self
            .first_with_entries(&label, |base| MirrorPool::list_feed_url(base, &list))
            .await
        else {
            tracing::error!("All mirrors failed for {}", label);
            return Vec::new();
        };

        let placeholder = format!("Post from list {}", list.name);
        let items: Vec<Item> = entries
            .iter()
            .take(max_items.saturating_mul(LIST_CAP_MULTIPLIER))
            .map(|entry| Item {
                title: entry.resolved_title(&placeholder),
                link: entry.resolved_link(),
                body: entry.post_body(),
                published_at: entry.post_timestamp(),
                source_label: label.clone(),
                source_kind: SourceKind::SocialList,
                author: Some(entry.list_author()),
            })
            .collect();

        tracing::info!("Fetched {} posts from {}", items.len(), label);
        items
    }

    /// Fetch several accounts in order; one failing account doesn't affect the others
    pub async fn fetch_multiple_users(&self, usernames: &[String], max_items: usize) -> Vec<Item> {
        let mut all_posts = Vec::new();

        for username in usernames {
            all_posts.extend(self.fetch_user(username, max_items).await);
        }

        tracing::info!(
            "Fetched total of {} posts from {} users",
            all_posts.len(),
            usernames.len()
        );
        all_posts
    }

    /// Walk the mirror pool and return the entries of the first mirror that has any
    async fn first_with_entries<F>(&self, label: &str, feed_url: F) -> Option<Vec<ParsedEntry>>
    where
        F: Fn(&str) -> String,
    {
        for base in self.mirrors.iter() {
            let url = feed_url(base);
            tracing::debug!("Fetching {} via {}", label, base);

            match self.try_mirror(&url).await {
                Ok(entries) => return Some(entries),
                Err(e) => {
                    tracing::warn!("Mirror {} failed for {}: {}", base, label, e);
                }
            }
        }
        None
    }

    async fn try_mirror(&self, url: &str) -> Result<Vec<ParsedEntry>> {
        let parsed = self.fetcher.fetch(url).await?;
        if parsed.entries.is_empty() {
            return Err(Error::FeedParse("feed has no entries".to_string()));
        }
        Ok(parsed.entries)
    }
}
