// src/monitor.rs
//! One run per invocation: Collecting → Filtering → Deduping → Notifying →
//! Done, linear, terminal exactly once. Partial failures in a stage never
//! halt the run; only a seen-store error aborts it.

use anyhow::{Context, Result};
use chrono::{FixedOffset, Local, NaiveDate, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::aggregate::{merge_by_url, retain_posted_on};
use crate::collect::MentionCollector;
use crate::dedup::{filter_new, SeenStore};
use crate::mention::{CollectorOutcome, RunReport};
use crate::notify::MentionNotifier;

/// One-time metrics registration (so series show up with help text).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("collect_items_total", "Mentions parsed from collectors.");
        describe_counter!(
            "collect_keyword_errors_total",
            "Per-keyword fetch/parse errors recovered inside collectors."
        );
        describe_counter!(
            "collector_failures_total",
            "Collectors that failed as a whole during a run."
        );
        describe_counter!(
            "mentions_stale_total",
            "Mentions dropped by the same-day filter."
        );
        describe_counter!(
            "dedup_suppressed_total",
            "Mentions suppressed by the cross-run seen-set."
        );
        describe_counter!("mentions_new_total", "Mentions surfaced as new.");
        describe_counter!("notify_errors_total", "Failed notification deliveries.");
        describe_counter!("monitor_runs_total", "Completed monitor runs.");
        describe_histogram!("collect_parse_ms", "Collector parse time in milliseconds.");
        describe_gauge!("monitor_last_run_ts", "Unix ts of the last completed run.");
    });
}

pub struct BrandMonitor {
    brand: String,
    collectors: Vec<Box<dyn MentionCollector>>,
    seen: Box<dyn SeenStore>,
    notifier: MentionNotifier,
}

impl BrandMonitor {
    pub fn new(
        brand: impl Into<String>,
        collectors: Vec<Box<dyn MentionCollector>>,
        seen: Box<dyn SeenStore>,
        notifier: MentionNotifier,
    ) -> Self {
        Self {
            brand: brand.into(),
            collectors,
            seen,
            notifier,
        }
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    /// Run against today's local date, in the local zone.
    pub async fn run(&self) -> Result<RunReport> {
        let now = Local::now();
        self.run_on(now.date_naive(), *now.offset()).await
    }

    /// `day` and `offset` travel together: posted timestamps are stored in
    /// UTC and must be viewed in the run's zone before the same-day
    /// comparison, or posts near midnight get misclassified.
    ///
    /// The only error that escapes is a seen-store failure: proceeding on a
    /// store outage would treat everything as new and storm the channels.
    pub async fn run_on(&self, day: NaiveDate, offset: FixedOffset) -> Result<RunReport> {
        ensure_metrics_described();
        let started = std::time::Instant::now();
        let scanned_at = Utc::now();

        // Collecting: sequential; a collector's total failure is recorded and
        // the run continues with the others.
        let mut raw = Vec::new();
        let mut per_collector = Vec::with_capacity(self.collectors.len());
        for c in &self.collectors {
            match c.collect().await {
                Ok(mut v) => {
                    per_collector.push((c.name().to_string(), CollectorOutcome::Collected(v.len())));
                    raw.append(&mut v);
                }
                Err(e) => {
                    tracing::error!(error = ?e, collector = c.name(), brand = %self.brand, "collector failed");
                    counter!("collector_failures_total").increment(1);
                    per_collector.push((c.name().to_string(), CollectorOutcome::Failed(e.to_string())));
                }
            }
        }
        let collected = raw.len();

        // Filtering: same-URL keyword merge, then the strict same-day policy.
        let merged = merge_by_url(raw);
        let merged_count = merged.len();
        let fresh = retain_posted_on(merged, day, offset);
        let fresh_count = fresh.len();
        counter!("mentions_stale_total").increment((merged_count - fresh_count) as u64);

        // Deduping: store errors abort the run.
        let new = filter_new(self.seen.as_ref(), fresh).context("seen-store unavailable")?;
        counter!("mentions_new_total").increment(new.len() as u64);

        // Notifying: per-mention isolation, then the summary, always.
        let mut delivered = 0usize;
        for m in &new {
            if self.notifier.send_mention(m).await {
                delivered += 1;
            }
        }

        let report = RunReport {
            brand: self.brand.clone(),
            scanned_at,
            per_collector,
            collected,
            merged: merged_count,
            fresh: fresh_count,
            new: new.len(),
            notify_attempted: new.len(),
            notify_delivered: delivered,
            elapsed_ms: started.elapsed().as_millis(),
        };
        self.notifier.send_summary(&report).await;

        counter!("monitor_runs_total").increment(1);
        gauge!("monitor_last_run_ts").set(scanned_at.timestamp() as f64);
        tracing::info!(
            brand = %report.brand,
            collected = report.collected,
            merged = report.merged,
            fresh = report.fresh,
            new = report.new,
            delivered = report.notify_delivered,
            "monitor run done"
        );
        Ok(report)
    }
}
