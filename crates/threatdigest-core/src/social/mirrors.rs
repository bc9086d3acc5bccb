use super::ListSpec;

/// Ordered pool of mirror base URLs that serve social timelines as RSS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPool {
    bases: Vec<String>,
}

impl MirrorPool {
    pub fn new<I, S>(bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bases = bases
            .into_iter()
            .map(|b| b.as_ref().trim().trim_end_matches('/').to_string())
            .filter(|b| !b.is_empty())
            .collect();
        Self { bases }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.bases.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// `{base}/{username}/rss`
    pub fn user_feed_url(base: &str, username: &str) -> String {
        format!("{}/{}/rss", base, username)
    }

    /// `{base}/{owner}/lists/{list}/rss`
    pub fn list_feed_url(base: &str, list: &ListSpec) -> String {
        format!("{}/{}/lists/{}/rss", base, list.owner, list.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_normalizes_bases() {
        let pool = MirrorPool::new(["https://a.example/", " https://b.example ", ""]);
        let bases: Vec<_> = pool.iter().collect();
        assert_eq!(bases, vec!["https://a.example", "https://b.example"]);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_feed_urls() {
        assert_eq!(
            MirrorPool::user_feed_url("https://nitter.net", "alice"),
            "https://nitter.net/alice/rss"
        );
        let list = ListSpec::parse("alice/infosec").unwrap();
        assert_eq!(
            MirrorPool::list_feed_url("https://nitter.net", &list),
            "https://nitter.net/alice/lists/infosec/rss"
        );
    }
}
