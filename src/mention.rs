// src/mention.rs
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// One detected reference to the monitored brand at an external URL.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Mention {
    pub source: String, // e.g. "blog:naver", "news:rss"
    pub title: String,
    pub url: String,
    pub author: String,
    /// Source-reported publish time, not collection time.
    pub posted_at: DateTime<Utc>,
    pub content_preview: Option<String>,
    /// Keyword(s) that surfaced this mention. Same-URL merges append here,
    /// comma-separated, instead of overwriting.
    pub keyword_matched: String,
}

impl Mention {
    /// Dedup key: stable digest of `(source, url)`. Recomputed on every call,
    /// never persisted independently of its inputs.
    pub fn unique_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.url.as_bytes());
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Title plus preview, the haystack for confirm/exclude keyword matching.
    pub fn searchable_text(&self) -> String {
        match &self.content_preview {
            Some(p) => format!("{} {}", self.title, p),
            None => self.title.clone(),
        }
    }
}

/// What a single collector contributed to one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorOutcome {
    Collected(usize),
    /// Total collector failure (bad credentials, endpoint down). The run
    /// continues with the other collectors.
    Failed(String),
}

/// Ephemeral result of one monitor run; lives only for logging and the
/// summary notification.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub brand: String,
    pub scanned_at: DateTime<Utc>,
    pub per_collector: Vec<(String, CollectorOutcome)>,
    /// Raw mentions across all collectors, before any merging.
    pub collected: usize,
    /// After same-URL merge.
    pub merged: usize,
    /// After the same-day filter.
    pub fresh: usize,
    /// Not previously seen; these were offered to the notifier.
    pub new: usize,
    pub notify_attempted: usize,
    pub notify_delivered: usize,
    pub elapsed_ms: u128,
}
