// src/collect/providers/blog_search.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;
use std::time::Duration;

use crate::collect::{normalize_text, KeywordCollector, MentionCollector};
use crate::mention::Mention;

/// JSON blog-search API (one GET per keyword, single page, credential
/// headers). Items report their publish date as `yyyyMMdd`.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "bloggername")]
    blogger_name: Option<String>,
    #[serde(rename = "postdate")]
    post_date: Option<String>,
}

pub struct BlogSearchCollector {
    inner: KeywordCollector,
    endpoint: String,
    client_id: String,
    client_secret: String,
    display: u32,
    client: reqwest::Client,
}

impl BlogSearchCollector {
    pub fn new(
        inner: KeywordCollector,
        endpoint: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            inner,
            endpoint,
            client_id,
            client_secret,
            display: 30,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_page_size(mut self, display: u32) -> Self {
        self.display = display;
        self
    }

    async fn fetch_keyword(&self, keyword: &str) -> Result<Vec<Mention>> {
        let display = self.display.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .timeout(Duration::from_secs(10))
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .query(&[
                ("query", keyword),
                ("display", display.as_str()),
                ("sort", "date"),
            ])
            .send()
            .await
            .context("blog search get")?
            .error_for_status()
            .context("blog search non-2xx")?;

        let body: SearchResponse = resp.json().await.context("blog search json")?;
        Ok(self.parse_items(body, keyword))
    }

    fn parse_items(&self, body: SearchResponse, keyword: &str) -> Vec<Mention> {
        let t0 = std::time::Instant::now();
        let mut out = Vec::with_capacity(body.items.len());
        for it in body.items {
            let Some(link) = it.link.filter(|l| !l.is_empty()) else {
                continue;
            };
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            let preview = it
                .description
                .as_deref()
                .map(normalize_text)
                .filter(|p| !p.is_empty());

            out.push(Mention {
                source: self.inner.source.clone(),
                title,
                url: link,
                author: it.blogger_name.unwrap_or_default(),
                posted_at: parse_post_date(it.post_date.as_deref().unwrap_or_default()),
                content_preview: preview,
                keyword_matched: keyword.to_string(),
            });
        }
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("collect_parse_ms").record(ms);
        counter!("collect_items_total").increment(out.len() as u64);
        out
    }
}

/// `yyyyMMdd`, day resolution only. Unparseable dates map to the epoch so the
/// same-day filter drops them instead of a parse error aborting the keyword.
fn parse_post_date(s: &str) -> chrono::DateTime<Utc> {
    let date = NaiveDate::parse_from_str(s, "%Y%m%d").unwrap_or(NaiveDate::MIN);
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

#[async_trait]
impl MentionCollector for BlogSearchCollector {
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
