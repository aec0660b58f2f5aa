// src/dedup.rs
//! Cross-run duplicate suppression. The seen-set maps `unique_id` to a
//! first-seen timestamp; it grows monotonically and is never rewritten for an
//! existing id. Retention/expiry is an external concern.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::mention::Mention;

pub trait SeenStore: Send + Sync {
    fn is_seen(&self, id: &str) -> Result<bool>;
    /// Write-once marker. Marking an already-seen id is a no-op.
    fn mark_seen(&self, id: &str, first_seen_unix: i64) -> Result<()>;
}

/// Returns the mentions not previously seen and marks each returned id as
/// seen, atomically with the check: an immediate re-invocation with the same
/// input yields nothing.
///
/// A store error propagates as `Err`. It is never treated as "nothing is a
/// duplicate" — proceeding on a store outage would re-notify the entire
/// day's mentions on every transient failure.
pub fn filter_new(store: &dyn SeenStore, mentions: Vec<Mention>) -> Result<Vec<Mention>> {
    let now = chrono::Utc::now().timestamp();
    let mut fresh = Vec::with_capacity(mentions.len());
    for m in mentions {
        let id = m.unique_id();
        if store.is_seen(&id)? {
            metrics::counter!("dedup_suppressed_total").increment(1);
            continue;
        }
        store.mark_seen(&id, now)?;
        fresh.push(m);
    }
    Ok(fresh)
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemorySeenStore {
    inner: Mutex<HashMap<String, i64>>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeenStore for MemorySeenStore {
    fn is_seen(&self, id: &str) -> Result<bool> {
        let map = self.inner.lock().expect("seen-set mutex poisoned");
        Ok(map.contains_key(id))
    }

    fn mark_seen(&self, id: &str, first_seen_unix: i64) -> Result<()> {
        let mut map = self.inner.lock().expect("seen-set mutex poisoned");
        map.entry(id.to_string()).or_insert(first_seen_unix);
        Ok(())
    }
}

/// JSON-file-backed store: the whole map is loaded at open and rewritten on
/// each new marker. Suits the volumes a brand monitor sees (tens of new ids
/// per day).
pub struct JsonSeenStore {
    path: PathBuf,
    inner: Mutex<HashMap<String, i64>>,
}

impl JsonSeenStore {
    /// Opening fails if the file exists but cannot be read or parsed; a
    /// missing file starts an empty set.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let map = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading seen-set from {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("parsing seen-set {}", path.display()))?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            inner: Mutex::new(map),
        })
    }

    fn persist(&self, map: &HashMap<String, i64>) -> Result<()> {
        let json = serde_json::to_string(map).context("serializing seen-set")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing seen-set to {}", self.path.display()))?;
        Ok(())
    }
}

impl SeenStore for JsonSeenStore {
    fn is_seen(&self, id: &str) -> Result<bool> {
        let map = self.inner.lock().expect("seen-set mutex poisoned");
        Ok(map.contains_key(id))
    }

    fn mark_seen(&self, id: &str, first_seen_unix: i64) -> Result<()> {
        let mut map = self.inner.lock().expect("seen-set mutex poisoned");
        if map.contains_key(id) {
            return Ok(());
        }
        map.insert(id.to_string(), first_seen_unix);
        self.persist(&map)
    }
}
