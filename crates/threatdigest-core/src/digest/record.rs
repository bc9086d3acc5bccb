use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::feed::Item;

/// A persisted digest: run metadata, the collected items, and the summary
/// object produced by the language model.
///
/// The summary keys are not fixed, so they are kept as an open JSON object
/// flattened into the top level of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub sources_count: usize,
    #[serde(default)]
    pub article_count: usize,
    #[serde(default)]
    pub articles: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub summary: Map<String, Value>,
}

impl DigestRecord {
    pub fn new(items: Vec<Item>, summary: Map<String, Value>, sources_count: usize) -> Self {
        Self {
            timestamp: Utc::now(),
            sources_count,
            article_count: items.len(),
            articles: items,
            error: None,
            summary,
        }
    }

    /// A record for a run that produced nothing to summarize
    pub fn failed(message: impl Into<String>, sources_count: usize) -> Self {
        Self {
            timestamp: Utc::now(),
            sources_count,
            article_count: 0,
            articles: Vec::new(),
            error: Some(message.into()),
            summary: Map::new(),
        }
    }

    pub fn executive_summary(&self) -> Option<&str> {
        self.summary.get("executive_summary").and_then(Value::as_str)
    }
}

/// Listing entry for one stored digest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub filename: String,
    pub timestamp: DateTime<Utc>,
    pub article_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_is_flattened() {
        let mut summary = Map::new();
        summary.insert("executive_summary".to_string(), json!("Quiet day"));
        summary.insert("trending_topics".to_string(), json!(["ransomware"]));

        let record = DigestRecord::new(Vec::new(), summary, 7);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["executive_summary"], "Quiet day");
        assert_eq!(value["trending_topics"][0], "ransomware");
        assert_eq!(value["sources_count"], 7);
        assert!(value.get("error").is_none());
        assert!(value.get("summary").is_none());

        let back: DigestRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back.executive_summary(), Some("Quiet day"));
        assert_eq!(back.summary.len(), 2);
    }

    #[test]
    fn test_failed_record() {
        let record = DigestRecord::failed("No articles fetched", 3);
        assert_eq!(record.article_count, 0);
        assert_eq!(record.error.as_deref(), Some("No articles fetched"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["error"], "No articles fetched");
    }
}
