// src/collect/providers/news_rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::collect::{normalize_text, KeywordCollector, MentionCollector};
use crate::mention::Mention;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "creator")]
    creator: Option<String>,
}

fn parse_rfc2822_to_unix(ts: &str) -> i64 {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .unwrap_or(0)
}

/// Keyword-templated RSS search feed (e.g. a news search endpoint that takes
/// the query as a URL parameter). One feed fetch per keyword.
pub struct NewsRssCollector {
    inner: KeywordCollector,
    feed_url: String,
    query_param: String,
    client: reqwest::Client,
}

impl NewsRssCollector {
    pub fn new(inner: KeywordCollector, feed_url: String, query_param: String) -> Self {
        Self {
            inner,
            feed_url,
            query_param,
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_keyword(&self, keyword: &str) -> Result<Vec<Mention>> {
        let body = self
            .client
            .get(&self.feed_url)
            .timeout(Duration::from_secs(10))
            .query(&[(self.query_param.as_str(), keyword)])
            .send()
            .await
            .context("news rss get")?
            .error_for_status()
            .context("news rss non-2xx")?
            .text()
            .await
            .context("news rss body")?;
        self.parse_feed(&body, keyword)
    }

    fn parse_feed(&self, xml: &str, keyword: &str) -> Result<Vec<Mention>> {
        let t0 = std::time::Instant::now();
        let rss: Rss = from_str(xml).context("parsing news rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let Some(link) = it.link.filter(|l| !l.is_empty()) else {
                continue;
            };
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            let unix = it
                .pub_date
                .as_deref()
                .map(parse_rfc2822_to_unix)
                .unwrap_or(0);
            let preview = it
                .description
                .as_deref()
                .map(normalize_text)
                .filter(|p| !p.is_empty());

            out.push(Mention {
                source: self.inner.source.clone(),
                title,
                url: link,
                author: it.creator.unwrap_or_default(),
                posted_at: Utc.timestamp_opt(unix, 0).single().unwrap_or_default(),
                content_preview: preview,
                keyword_matched: keyword.to_string(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("collect_parse_ms").record(ms);
        counter!("collect_items_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl MentionCollector for NewsRssCollector {
    async fn collect(&self) -> Result<Vec<Mention>> {
        let mut out = Vec::new();
        for kw in &self.inner.search_keywords {
            match self.fetch_keyword(kw).await {
                Ok(mut v) => out.append(&mut v),
                Err(e) => {
                    tracing::warn!(error = ?e, collector = %self.inner.source, keyword = %kw, "keyword fetch failed");
                    counter!("collect_keyword_errors_total").increment(1);
                }
            }
        }
        Ok(self.inner.filter.apply(out))
    }

    fn name(&self) -> &str {
        &self.inner.source
    }
}
