use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde_json::{json, Map, Value};

use super::providers::{AiProvider, ClaudeApiProvider, OpenAiProvider};
use crate::config::AppConfig;
use crate::digest::render;
use crate::feed::Item;
use crate::{Error, Result};

const NO_ARTICLES: &str = "No new threat intelligence articles found today.";

const PROMPT_HEADER: &str = "You are a cybersecurity analyst creating a daily threat intelligence digest.
Analyze the following threat intelligence articles and create a comprehensive summary.
";

const PROMPT_FOOTER: &str = r#"
Please provide a structured summary in the following JSON format:
{
    "executive_summary": "A 2-3 paragraph executive summary of the most important security threats and trends",
    "critical_threats": [
        {
            "title": "Threat name",
            "severity": "Critical/High/Medium",
            "description": "Brief description",
            "affected_systems": "Systems or software affected",
            "recommendation": "Key action items"
        }
    ],
    "trending_topics": ["Topic 1", "Topic 2", "Topic 3"],
    "categories": {
        "Malware & Ransomware": "Summary of malware-related news",
        "Vulnerabilities & Exploits": "Summary of vulnerability disclosures",
        "Data Breaches": "Summary of data breach incidents",
        "Threat Actors": "Summary of threat actor activity",
        "Security Tools & Defenses": "Summary of defensive security news"
    },
    "key_recommendations": [
        "Action item 1",
        "Action item 2"
    ]
}

Focus on actionable intelligence and prioritize information that security teams need to know.
Respond with the JSON object only."#;

/// Turns collected items into the structured digest summary via the configured provider
pub struct Summarizer {
    provider: Arc<dyn AiProvider>,
    max_tokens: u32,
}

impl Summarizer {
    /// Create a new summarizer based on configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let ai = &config.ai;
        let timeout = Duration::from_secs(ai.request_timeout_secs);

        let provider: Arc<dyn AiProvider> = match ai.provider.as_str() {
            "claude_api" => {
                let api_key = ai.claude_api_key.as_ref()
                    .ok_or_else(|| Error::Config("Claude API key not configured".to_string()))?;
                Arc::new(ClaudeApiProvider::new(api_key, &ai.claude_model, &ai.claude_api_base, timeout)?)
            }
            "openai" => {
                let api_key = ai.openai_api_key.as_ref()
                    .ok_or_else(|| Error::Config("OpenAI API key not configured".to_string()))?;
                Arc::new(OpenAiProvider::new("openai", api_key, &ai.openai_model, None))
            }
            "openrouter" => {
                let api_key = ai.openrouter_api_key.as_ref()
                    .ok_or_else(|| Error::Config("OpenRouter API key not configured".to_string()))?;
                Arc::new(OpenAiProvider::new(
                    "openrouter",
                    api_key,
                    &ai.openrouter_model,
                    Some(&ai.openrouter_api_base),
                ))
            }
            other => {
                return Err(Error::Config(format!("Unknown AI provider: {}", other)));
            }
        };

        Ok(Self::with_provider(provider, ai.max_tokens))
    }

    pub fn with_provider(provider: Arc<dyn AiProvider>, max_tokens: u32) -> Self {
        Self {
            provider,
            max_tokens: max_tokens.max(1),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Summarize items into a JSON object. Never fails: provider or parse
    /// errors become an error summary.
    pub async fn summarize(&self, items: &[Item]) -> Map<String, Value> {
        if items.is_empty() {
            return empty_summary();
        }

        match self.try_summarize(items).await {
            Ok(summary) => {
                tracing::info!("Generated threat intelligence digest via {}", self.provider.name());
                summary
            }
            Err(e) => {
                tracing::error!("Error generating summary: {}", e);
                error_summary(&e.to_string())
            }
        }
    }

    async fn try_summarize(&self, items: &[Item]) -> Result<Map<String, Value>> {
        let prompt = build_prompt(items);
        tracing::debug!(
            "Sending {} articles ({} chars) to {}",
            items.len(),
            prompt.len(),
            self.provider.name()
        );

        let response = self.provider.complete(&prompt, self.max_tokens).await?;
        parse_summary(&response)
    }
}

/// Full analyst prompt around the rendered items
pub fn build_prompt(items: &[Item]) -> String {
    format!("{}\n{}\n{}", PROMPT_HEADER, render(items), PROMPT_FOOTER)
}

/// Summary used when there is nothing to summarize
pub fn empty_summary() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("executive_summary".to_string(), json!(NO_ARTICLES));
    map.insert("critical_threats".to_string(), json!([]));
    map.insert("trending_topics".to_string(), json!([]));
    map.insert("categories".to_string(), json!({}));
    map
}

/// Summary carrying an error message in place of the analysis
pub fn error_summary(message: &str) -> Map<String, Value> {
    let mut map = empty_summary();
    map.insert(
        "executive_summary".to_string(),
        json!(format!("Error generating summary: {}", message)),
    );
    map
}

fn parse_summary(response: &str) -> Result<Map<String, Value>> {
    let cleaned = extract_json(response);
    match serde_json::from_str::<Value>(cleaned)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::AiProvider(format!(
            "Expected a JSON object from the model, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Extract the JSON object from a model reply that may wrap it in prose or
/// markdown code fences
pub fn extract_json(response: &str) -> &str {
    static FENCED: OnceLock<Regex> = OnceLock::new();
    static OBJECT: OnceLock<Regex> = OnceLock::new();

    let fenced = FENCED
        .get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid fence pattern"));
    let object = OBJECT.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid object pattern"));

    let trimmed = response.trim();
    let inner = fenced
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    object.find(inner).map(|m| m.as_str()).unwrap_or(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::SourceKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        reply: Result<String>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(Error::AiProvider(message.to_string())),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl AiProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(prompt.contains("ARTICLE 1"));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(Error::AiProvider(e.to_string())),
            }
        }
    }

    fn items() -> Vec<Item> {
        vec![Item {
            title: "CVE-2024-0001 exploited".to_string(),
            link: "https://example.com/cve".to_string(),
            body: "Patch now".to_string(),
            published_at: None,
            source_label: "Example".to_string(),
            source_kind: SourceKind::Feed,
            author: None,
        }]
    }

    #[tokio::test]
    async fn test_empty_input_skips_provider() {
        let stub = StubProvider::replying("{}");
        let summarizer = Summarizer::with_provider(stub.clone(), 100);

        let summary = summarizer.summarize(&[]).await;
        assert_eq!(summary["executive_summary"], NO_ARTICLES);
        assert_eq!(summary["critical_threats"], json!([]));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fenced_reply_is_parsed() {
        let reply = "Here you go:\n```json\n{\"executive_summary\": \"Busy day\", \"trending_topics\": [\"ransomware\"]}\n```";
        let stub = StubProvider::replying(reply);
        let summarizer = Summarizer::with_provider(stub.clone(), 100);

        let summary = summarizer.summarize(&items()).await;
        assert_eq!(summary["executive_summary"], "Busy day");
        assert_eq!(summary["trending_topics"][0], "ransomware");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_error_summary() {
        let summarizer = Summarizer::with_provider(StubProvider::failing("rate limited"), 100);

        let summary = summarizer.summarize(&items()).await;
        let text = summary["executive_summary"].as_str().unwrap();
        assert!(text.starts_with("Error generating summary: "));
        assert!(text.contains("rate limited"));
        assert_eq!(summary["categories"], json!({}));
    }

    #[tokio::test]
    async fn test_non_json_reply_becomes_error_summary() {
        let summarizer = Summarizer::with_provider(StubProvider::replying("I cannot help"), 100);
        let summary = summarizer.summarize(&items()).await;
        assert!(summary["executive_summary"]
            .as_str()
            .unwrap()
            .starts_with("Error generating summary"));
    }

    #[test]
    fn test_extract_json_variants() {
        assert_eq!(extract_json("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(extract_json("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json("Sure! {\"a\":{\"b\":2}} done"), "{\"a\":{\"b\":2}}");
        assert_eq!(extract_json("  no braces  "), "no braces");
        assert_eq!(
            extract_json("Here you go:\n```json\n{\"k\": [1, 2]}\n```\nThanks"),
            "{\"k\": [1, 2]}"
        );
    }

    #[test]
    fn test_prompt_wraps_rendered_items() {
        let prompt = build_prompt(&items());
        assert!(prompt.starts_with("You are a cybersecurity analyst"));
        assert!(prompt.contains("Title: CVE-2024-0001 exploited"));
        assert!(prompt.contains("\"key_recommendations\""));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let mut config = AppConfig::default();
        config.ai.provider = "openrouter".to_string();
        config.ai.openrouter_api_key = None;
        assert!(matches!(Summarizer::new(&config), Err(Error::Config(_))));

        config.ai.provider = "nope".to_string();
        assert!(matches!(Summarizer::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_claude_provider_selected() {
        let mut config = AppConfig::default();
        config.ai.claude_api_key = Some("k".to_string());
        let summarizer = Summarizer::new(&config).unwrap();
        assert_eq!(summarizer.provider_name(), "claude_api");
    }
}
