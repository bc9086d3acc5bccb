use feed_rs::parser;

use super::models::ParsedEntry;
use crate::{Error, Result};

/// Parsed feed data from RSS/Atom content
#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

/// Parse RSS/Atom feed content into entries, in document order
pub fn parse_feed(content: &[u8]) -> Result<ParsedFeed> {
    let feed = parser::parse(content)
        .map_err(|e| Error::FeedParse(e.to_string()))?;

    let title = feed.title.map(|t| t.content);

    let entries = feed.entries.into_iter().map(|entry| {
        ParsedEntry {
            title: entry.title.map(|t| t.content),
            link: entry.links.first().map(|l| l.href.clone()),
            summary: entry.summary.map(|s| s.content),
            description: entry.content.and_then(|c| c.body),
            published: entry.published,
            updated: entry.updated,
            author: entry.authors.first().map(|a| a.name.clone()),
        }
    }).collect();

    Ok(ParsedFeed { title, entries })
}

/// Convert HTML content to plain text
pub fn html_to_text(html: &str) -> String {
    if !html.contains('<') {
        return html.to_string();
    }
    html2text::from_read(html.as_bytes(), 100)
        .map(|text| text.trim_end().to_string())
        .unwrap_or_else(|_| html.to_string())
}
