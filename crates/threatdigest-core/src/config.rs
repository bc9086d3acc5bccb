use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub social: SocialConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (digests are stored in `<data_dir>/digests`)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Kind of a configured feed source. Only syndication feeds are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    #[default]
    #[serde(alias = "rss", alias = "atom")]
    Feed,
}

/// A syndication feed to collect articles from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub kind: FeedKind,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind: FeedKind::Feed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Feeds in collection order
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedSource>,
    /// Social account names (without the leading @)
    #[serde(default)]
    pub social_accounts: Vec<String>,
    /// Social lists as "owner/listname"
    #[serde(default)]
    pub social_lists: Vec<String>,
    /// Maximum articles taken from each feed
    #[serde(default = "default_max_articles")]
    pub max_articles_per_source: usize,
    /// Maximum posts taken per social account (lists take three times this)
    #[serde(default = "default_max_posts")]
    pub max_posts_per_user: usize,
    /// Collect social accounts and lists at all
    #[serde(default = "default_true")]
    pub social_enabled: bool,
    /// Drop feed entries older than this many hours (entries without a date are kept)
    #[serde(default)]
    pub recency_window_hours: Option<u64>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            social_accounts: Vec::new(),
            social_lists: Vec::new(),
            max_articles_per_source: default_max_articles(),
            max_posts_per_user: default_max_posts(),
            social_enabled: default_true(),
            recency_window_hours: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    /// Mirror base URLs, tried in order until one returns posts
    #[serde(default = "default_mirrors")]
    pub mirrors: Vec<String>,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            mirrors: default_mirrors(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Number of feeds fetched at the same time
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    /// HTTP proxy URL for fetching (e.g., "http://127.0.0.1:7890" or "socks5://127.0.0.1:1080")
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
            fetch_concurrency: default_fetch_concurrency(),
            proxy_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Run the daily digest automatically
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Local hour of day (0-23)
    #[serde(default = "default_schedule_hour")]
    pub hour: u32,
    /// Minute of hour (0-59)
    #[serde(default)]
    pub minute: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            hour: default_schedule_hour(),
            minute: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Enable AI summarization
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// AI provider: "claude_api", "openai", "openrouter"
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    /// Claude/Anthropic API key (for claude_api provider)
    #[serde(default)]
    pub claude_api_key: Option<String>,
    /// Claude model name
    #[serde(default = "default_claude_model")]
    pub claude_model: String,
    /// Anthropic API base URL
    #[serde(default = "default_claude_api_base")]
    pub claude_api_base: String,
    /// OpenAI API key (for openai provider)
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// OpenAI model name
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// OpenRouter API key (for openrouter provider)
    #[serde(default)]
    pub openrouter_api_key: Option<String>,
    /// OpenRouter model name
    #[serde(default = "default_openrouter_model")]
    pub openrouter_model: String,
    /// OpenRouter API base URL
    #[serde(default = "default_openrouter_api_base")]
    pub openrouter_api_base: String,
    /// Max tokens for the digest response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout for model calls in seconds
    #[serde(default = "default_ai_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            provider: default_ai_provider(),
            claude_api_key: None,
            claude_model: default_claude_model(),
            claude_api_base: default_claude_api_base(),
            openai_api_key: None,
            openai_model: default_openai_model(),
            openrouter_api_key: None,
            openrouter_model: default_openrouter_model(),
            openrouter_api_base: default_openrouter_api_base(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_ai_timeout(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("threatdigest")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_feeds() -> Vec<FeedSource> {
    vec![
        FeedSource::new("Krebs on Security", "https://krebsonsecurity.com/feed/"),
        FeedSource::new("Schneier on Security", "https://www.schneier.com/feed/atom/"),
        FeedSource::new("The Hacker News", "https://feeds.feedburner.com/TheHackersNews"),
        FeedSource::new("Bleeping Computer", "https://www.bleepingcomputer.com/feed/"),
        FeedSource::new("Dark Reading", "https://www.darkreading.com/rss.xml"),
        FeedSource::new("Threatpost", "https://threatpost.com/feed/"),
        FeedSource::new("CISA Alerts", "https://www.cisa.gov/cybersecurity-advisories/all.xml"),
    ]
}

fn default_max_articles() -> usize {
    5
}

fn default_max_posts() -> usize {
    5
}

fn default_mirrors() -> Vec<String> {
    vec![
        "https://nitter.net".to_string(),
        "https://nitter.poast.org".to_string(),
        "https://nitter.privacydev.net".to_string(),
        "https://nitter.1d4.us".to_string(),
    ]
}

fn default_timeout() -> u64 {
    10
}

fn default_fetch_concurrency() -> usize {
    4
}

fn default_schedule_hour() -> u32 {
    8
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_ai_provider() -> String {
    "claude_api".to_string()
}

fn default_claude_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_claude_api_base() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openrouter_model() -> String {
    "anthropic/claude-3.5-sonnet".to_string()
}

fn default_openrouter_api_base() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_ai_timeout() -> u64 {
    120
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default location or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, falling back to defaults if it doesn't exist.
    /// Environment overrides are applied on top.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Apply environment overrides. `lookup` returns the value of a variable if set.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("ANTHROPIC_API_KEY") {
            self.ai.claude_api_key = Some(key);
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.ai.openai_api_key = Some(key);
        }
        if let Some(key) = non_empty("OPENROUTER_API_KEY") {
            self.ai.openrouter_api_key = Some(key);
        }
        if let Some(model) = non_empty("OPENROUTER_MODEL") {
            self.ai.openrouter_model = model;
        }
        if let Some(hour) = non_empty("DIGEST_SCHEDULE_HOUR").and_then(|v| v.parse().ok()) {
            self.schedule.hour = hour;
        }
        if let Some(minute) = non_empty("DIGEST_SCHEDULE_MINUTE").and_then(|v| v.parse().ok()) {
            self.schedule.minute = minute;
        }
        if let Some(port) = non_empty("THREATDIGEST_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Check values that serde defaults can't guard
    pub fn validate(&self) -> crate::Result<()> {
        if self.schedule.hour > 23 || self.schedule.minute > 59 {
            return Err(crate::Error::Config(format!(
                "Invalid schedule time {:02}:{:02}",
                self.schedule.hour, self.schedule.minute
            )));
        }
        if let Some(hours) = self.sources.recency_window_hours {
            if hours > crate::feed::MAX_RECENCY_WINDOW_HOURS {
                return Err(crate::Error::Config(format!(
                    "recency_window_hours {} exceeds the maximum of {}",
                    hours,
                    crate::feed::MAX_RECENCY_WINDOW_HOURS
                )));
            }
        }
        if let Some(feed) = self.sources.feeds.iter().find(|f| f.name.trim().is_empty()) {
            return Err(crate::Error::Config(format!(
                "Feed source with URL {} has an empty name",
                feed.url
            )));
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/threatdigest/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("threatdigest")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Directory holding the stored digest records
    pub fn digest_dir(&self) -> PathBuf {
        self.data_dir().join("digests")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.sources.feeds.len(), 7);
        assert_eq!(config.sources.max_articles_per_source, 5);
        assert!(config.sources.social_enabled);
        assert_eq!(config.social.mirrors[0], "https://nitter.net");
        assert_eq!(config.sync.request_timeout_secs, 10);
        assert_eq!((config.schedule.hour, config.schedule.minute), (8, 0));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
[sources]
social_accounts = ["alice", "bob"]
social_lists = ["carol/infosec"]
social_enabled = false

[[sources.feeds]]
name = "Example"
url = "https://example.com/feed.xml"
kind = "rss"
"#,
        )
        .unwrap();

        assert_eq!(config.sources.feeds, vec![FeedSource::new("Example", "https://example.com/feed.xml")]);
        assert_eq!(config.sources.social_accounts, vec!["alice", "bob"]);
        assert!(!config.sources.social_enabled);
        assert_eq!(config.sources.max_posts_per_user, 5);
        assert_eq!(config.schedule.hour, 8);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| match key {
            "ANTHROPIC_API_KEY" => Some("sk-test".to_string()),
            "OPENROUTER_API_KEY" => Some("  ".to_string()),
            "DIGEST_SCHEDULE_HOUR" => Some("6".to_string()),
            "DIGEST_SCHEDULE_MINUTE" => Some("not-a-number".to_string()),
            _ => None,
        });

        assert_eq!(config.ai.claude_api_key.as_deref(), Some("sk-test"));
        assert!(config.ai.openrouter_api_key.is_none());
        assert_eq!(config.schedule.hour, 6);
        assert_eq!(config.schedule.minute, 0);
    }

    #[test]
    fn test_validate_rejects_bad_schedule() {
        let mut config = AppConfig::default();
        config.schedule.hour = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_recency_window() {
        let mut config = AppConfig::default();
        config.sources.recency_window_hours = Some(24 * 7);
        assert!(config.validate().is_ok());

        config.sources.recency_window_hours = Some(1_000_000_000_000);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("recency_window_hours"));
    }

    #[test]
    fn test_digest_dir() {
        let mut config = AppConfig::default();
        config.general.data_dir = PathBuf::from("/var/lib/threatdigest");
        assert_eq!(config.digest_dir(), PathBuf::from("/var/lib/threatdigest/digests"));
    }
}
