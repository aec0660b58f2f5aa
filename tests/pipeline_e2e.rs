// tests/pipeline_e2e.rs
// Two collectors find the same post via different keywords plus one stale
// post: the merged mention survives the day filter, is new on the first run,
// suppressed on the second, and every run ends with exactly one summary.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};

use mentionwatch::collect::MentionCollector;
use mentionwatch::dedup::{MemorySeenStore, SeenStore};
use mentionwatch::mention::Mention;
use mentionwatch::monitor::BrandMonitor;
use mentionwatch::notify::{MentionNotifier, NotifyTransport};

struct StaticCollector {
    name: &'static str,
    mentions: Vec<Mention>,
}

#[async_trait]
impl MentionCollector for StaticCollector {
    async fn collect(&self) -> Result<Vec<Mention>> {
        Ok(self.mentions.clone())
    }
    fn name(&self) -> &str {
        self.name
    }
}

#[derive(Default)]
struct RecordingTransport {
    messages: Mutex<Vec<String>>,
}

struct SharedTransport(Arc<RecordingTransport>);

#[async_trait]
impl NotifyTransport for SharedTransport {
    async fn post(&self, text: &str) -> Result<()> {
        self.0.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
    fn name(&self) -> &str {
        "recording"
    }
}

struct SharedStore(Arc<MemorySeenStore>);

impl SeenStore for SharedStore {
    fn is_seen(&self, id: &str) -> Result<bool> {
        self.0.is_seen(id)
    }
    fn mark_seen(&self, id: &str, first_seen_unix: i64) -> Result<()> {
        self.0.mark_seen(id, first_seen_unix)
    }
}

fn utc() -> chrono::FixedOffset {
    chrono::FixedOffset::east_opt(0).unwrap()
}

fn mention(url: &str, kw: &str, posted_at: chrono::DateTime<Utc>) -> Mention {
    Mention {
        source: "blog:test".into(),
        title: format!("post at {url}"),
        url: url.to_string(),
        author: "a".into(),
        posted_at,
        content_preview: None,
        keyword_matched: kw.to_string(),
    }
}

fn monitor(store: Arc<MemorySeenStore>, transport: Arc<RecordingTransport>) -> BrandMonitor {
    let now = Utc.with_ymd_and_hms(2026, 8, 23, 10, 0, 0).unwrap();
    let yesterday = Utc.with_ymd_and_hms(2026, 8, 22, 10, 0, 0).unwrap();

    let c1 = StaticCollector {
        name: "blog:one",
        mentions: vec![mention("https://x.test/u1", "x", now)],
    };
    let c2 = StaticCollector {
        name: "blog:two",
        mentions: vec![
            mention("https://x.test/u1", "y", now),
            mention("https://x.test/u2", "z", yesterday),
        ],
    };

    BrandMonitor::new(
        "Frog",
        vec![Box::new(c1), Box::new(c2)],
        Box::new(SharedStore(store)),
        MentionNotifier::new(vec![Box::new(SharedTransport(transport))]),
    )
}

#[tokio::test]
async fn merged_filtered_deduped_and_summarized() {
    let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
    let store = Arc::new(MemorySeenStore::new());
    let transport = Arc::new(RecordingTransport::default());

    let report = monitor(store.clone(), transport.clone())
        .run_on(today, utc())
        .await
        .unwrap();
    assert_eq!(report.collected, 3);
    assert_eq!(report.merged, 2); // u1 merged, u2 separate
    assert_eq!(report.fresh, 1); // u2 is yesterday's post
    assert_eq!(report.new, 1);
    assert_eq!(report.notify_attempted, 1);
    assert_eq!(report.notify_delivered, 1);

    {
        let messages = transport.messages.lock().unwrap();
        assert_eq!(messages.len(), 2); // one mention alert + one summary
        assert!(messages[0].contains("keywords: x, y"));
        assert!(messages[0].contains("https://x.test/u1"));
        assert!(messages[1].contains("1 new mention(s), 1/1 notifications delivered"));
    }

    // Same inputs, same store: u1 is now a duplicate, yet the run still ends
    // with a "nothing new" summary.
    let report = monitor(store, transport.clone())
        .run_on(today, utc())
        .await
        .unwrap();
    assert_eq!(report.fresh, 1);
    assert_eq!(report.new, 0);
    assert_eq!(report.notify_attempted, 0);

    let messages = transport.messages.lock().unwrap();
    assert_eq!(messages.len(), 3); // only the second summary was added
    assert!(messages[2].contains("nothing new today"));
}
