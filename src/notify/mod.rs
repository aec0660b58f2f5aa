// src/notify/mod.rs
pub mod discord;
pub mod slack;

use anyhow::Result;

use crate::mention::{CollectorOutcome, Mention, RunReport};

/// Fire-and-forget outbound channel. Non-2xx or network error is `Err`; the
/// caller logs it and moves on.
#[async_trait::async_trait]
pub trait NotifyTransport: Send + Sync {
    async fn post(&self, text: &str) -> Result<()>;
    fn name(&self) -> &str;
}

/// Fans one message out to every configured transport. Per-transport failure
/// is isolated; delivery counts as success when at least one transport took
/// the message.
pub struct MentionNotifier {
    transports: Vec<Box<dyn NotifyTransport>>,
}

impl MentionNotifier {
    pub fn new(transports: Vec<Box<dyn NotifyTransport>>) -> Self {
        Self { transports }
    }

    async fn post_all(&self, text: &str) -> bool {
        let mut delivered = false;
        for t in &self.transports {
            match t.post(text).await {
                Ok(()) => delivered = true,
                Err(e) => {
                    tracing::warn!(error = ?e, transport = t.name(), "notification delivery failed");
                    metrics::counter!("notify_errors_total").increment(1);
                }
            }
        }
        delivered
    }

    /// One alert per mention. A failed send never stops the remaining
    /// mentions; the caller tallies the returned flags.
    pub async fn send_mention(&self, mention: &Mention) -> bool {
        self.post_all(&format_mention(mention)).await
    }

    /// The run summary. Attempted exactly once per run, including zero-new
    /// and partial-failure runs; a delivery failure is logged, never raised.
    pub async fn send_summary(&self, report: &RunReport) {
        if !self.post_all(&format_summary(report)).await {
            tracing::warn!(brand = %report.brand, "summary delivery failed on all transports");
        }
    }
}

pub fn format_mention(m: &Mention) -> String {
    let mut text = format!(
        "[{}] new mention: {}\nby {} @ {}\nkeywords: {}\n{}",
        m.source,
        m.title,
        if m.author.is_empty() {
            "unknown"
        } else {
            m.author.as_str()
        },
        m.posted_at.format("%Y-%m-%d"),
        m.keyword_matched,
        m.url
    );
    if let Some(p) = &m.content_preview {
        text.push('\n');
        text.push_str(p);
    }
    text
}

pub fn format_summary(r: &RunReport) -> String {
    let mut lines = vec![format!(
        "{} mention scan @ {}",
        r.brand,
        r.scanned_at.format("%Y-%m-%d %H:%M UTC")
    )];
    for (name, outcome) in &r.per_collector {
        match outcome {
            CollectorOutcome::Collected(n) => lines.push(format!("  {name}: {n} collected")),
            CollectorOutcome::Failed(e) => lines.push(format!("  {name}: FAILED ({e})")),
        }
    }
    if r.new == 0 {
        lines.push("nothing new today".to_string());
    } else {
        lines.push(format!(
            "{} new mention(s), {}/{} notifications delivered",
            r.new, r.notify_delivered, r.notify_attempted
        ));
    }
    lines.push(format!(
        "totals: {} collected, {} after merge, {} fresh ({} ms)",
        r.collected, r.merged, r.fresh, r.elapsed_ms
    ));
    lines.join("\n")
}
