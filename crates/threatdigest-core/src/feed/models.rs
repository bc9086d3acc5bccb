use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Feed,
    SocialUser,
    SocialList,
}

/// A normalized post produced by the feed and social readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source_label: String,
    pub source_kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Item {
    /// Published timestamp as RFC 3339, or "Unknown"
    pub fn published_display(&self) -> String {
        self.published_at
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Parsed entry with every field optional, as the feed exposes it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl ParsedEntry {
    /// Title, or the given placeholder when missing or blank
    pub fn resolved_title(&self, placeholder: &str) -> String {
        non_blank(&self.title)
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| placeholder.to_string())
    }

    pub fn resolved_link(&self) -> String {
        self.link.clone().unwrap_or_default()
    }

    /// Body for feed articles: summary, then description
    pub fn feed_body(&self) -> String {
        non_blank(&self.summary)
            .or_else(|| non_blank(&self.description))
            .unwrap_or("")
            .to_string()
    }

    /// Body for social posts: description, then summary
    pub fn post_body(&self) -> String {
        non_blank(&self.description)
            .or_else(|| non_blank(&self.summary))
            .unwrap_or("")
            .to_string()
    }

    /// Feed articles fall back to the updated timestamp
    pub fn feed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.published.or(self.updated)
    }

    pub fn post_timestamp(&self) -> Option<DateTime<Utc>> {
        self.published
    }

    /// Author attribution for list posts
    pub fn list_author(&self) -> String {
        non_blank(&self.author)
            .map(|a| a.trim().to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}
