mod fetcher;
mod models;
mod parser;
mod reader;

pub use fetcher::FeedFetcher;
pub use models::{Item, ParsedEntry, SourceKind};
pub use parser::{html_to_text, parse_feed, ParsedFeed};
pub use reader::{feed_item, FeedReader, MAX_RECENCY_WINDOW_HOURS};

#[cfg(test)]
pub(crate) use reader::test_support;
