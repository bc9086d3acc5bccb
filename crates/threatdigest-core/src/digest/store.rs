use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;

use super::record::{DigestEntry, DigestRecord};
use crate::{Error, Result};

const PREFIX: &str = "digest_";
const EXTENSION: &str = ".json";

/// Directory-backed storage for digests, one JSON file per run
#[derive(Debug, Clone)]
pub struct DigestStore {
    dir: PathBuf,
}

impl DigestStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a digest generated at `timestamp`
    pub fn filename_for(timestamp: DateTime<Utc>) -> String {
        format!("{}{}{}", PREFIX, timestamp.format("%Y%m%d_%H%M%S"), EXTENSION)
    }

    /// Write the record and return the file name it was stored under
    pub async fn save(&self, record: &DigestRecord) -> Result<String> {
        fs::create_dir_all(&self.dir).await?;

        let filename = Self::filename_for(record.timestamp);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.dir.join(&filename), json).await?;

        tracing::info!("Digest saved to {}", filename);
        Ok(filename)
    }

    /// All stored digests, newest first
    pub async fn list(&self) -> Result<Vec<DigestEntry>> {
        let mut names = match self.digest_filenames().await {
            Ok(names) => names,
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        names.sort_unstable_by(|a, b| b.cmp(a));

        let mut entries = Vec::with_capacity(names.len());
        for filename in names {
            match self.read(&filename).await {
                Ok(record) => entries.push(DigestEntry {
                    filename,
                    timestamp: record.timestamp,
                    article_count: record.article_count,
                }),
                Err(e) => tracing::warn!("Skipping unreadable digest {}: {}", filename, e),
            }
        }
        Ok(entries)
    }

    /// The most recent digest, if any
    pub async fn latest(&self) -> Result<Option<DigestRecord>> {
        match self.list().await?.first() {
            Some(entry) => self.get(&entry.filename).await,
            None => Ok(None),
        }
    }

    /// Load one digest by file name
    pub async fn get(&self, filename: &str) -> Result<Option<DigestRecord>> {
        validate_filename(filename)?;
        match self.read(filename).await {
            Ok(record) => Ok(Some(record)),
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn read(&self, filename: &str) -> Result<DigestRecord> {
        let content = fs::read_to_string(self.dir.join(filename)).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn digest_filenames(&self) -> Result<Vec<String>> {
        let mut dir = fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if validate_filename(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

fn validate_filename(filename: &str) -> Result<()> {
    let valid = filename.starts_with(PREFIX)
        && filename.ends_with(EXTENSION)
        && filename.len() > PREFIX.len() + EXTENSION.len()
        && !filename.contains(['/', '\\'])
        && !filename.contains("..");

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidDigestName(filename.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::{json, Map};
    use tempfile::TempDir;

    fn record_at(timestamp: DateTime<Utc>, summary: &str) -> DigestRecord {
        let mut map = Map::new();
        map.insert("executive_summary".to_string(), json!(summary));
        let mut record = DigestRecord::new(Vec::new(), map, 2);
        record.timestamp = timestamp;
        record
    }

    #[test]
    fn test_filename_format() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 14, 8, 0, 3).unwrap();
        assert_eq!(DigestStore::filename_for(ts), "digest_20240514_080003.json");
    }

    #[tokio::test]
    async fn test_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = DigestStore::new(tmp.path().join("digests"));

        assert!(store.list().await.unwrap().is_empty());
        assert!(store.latest().await.unwrap().is_none());
        assert!(store.get("digest_20240101_000000.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_list_latest_get() {
        let tmp = TempDir::new().unwrap();
        let store = DigestStore::new(tmp.path().join("digests"));
        let base = Utc.with_ymd_and_hms(2024, 5, 14, 8, 0, 0).unwrap();

        let older = store.save(&record_at(base, "older")).await.unwrap();
        let newer = store
            .save(&record_at(base + Duration::days(1), "newer"))
            .await
            .unwrap();
        fs::write(store.dir().join("notes.txt"), "ignored").await.unwrap();

        let entries = store.list().await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec![newer.as_str(), older.as_str()]);

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.executive_summary(), Some("newer"));

        let fetched = store.get(&older).await.unwrap().unwrap();
        assert_eq!(fetched.executive_summary(), Some("older"));
        assert_eq!(fetched.sources_count, 2);
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let tmp = TempDir::new().unwrap();
        let store = DigestStore::new(tmp.path());

        for bad in ["../digest_x.json", "digest_/x.json", "config.toml", "digest_.json"] {
            assert!(matches!(
                store.get(bad).await,
                Err(Error::InvalidDigestName(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_skipped_in_listing() {
        let tmp = TempDir::new().unwrap();
        let store = DigestStore::new(tmp.path());
        let ts = Utc.with_ymd_and_hms(2024, 5, 14, 8, 0, 0).unwrap();
        store.save(&record_at(ts, "ok")).await.unwrap();
        fs::write(tmp.path().join("digest_20990101_000000.json"), "{not json")
            .await
            .unwrap();

        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "digest_20240514_080000.json");
    }
}
