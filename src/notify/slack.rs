// src/notify/slack.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::NotifyTransport;

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    /// `None` when no SLACK_WEBHOOK_URL is set: an unconfigured channel must
    /// not exist in the transport list at all, or its no-op `post` would be
    /// tallied as a delivery.
    pub fn from_env() -> Option<Self> {
        std::env::var("SLACK_WEBHOOK_URL").ok().map(Self::new)
    }

    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait::async_trait]
impl NotifyTransport for SlackNotifier {
    async fn post(&self, text: &str) -> Result<()> {
        let body = serde_json::json!({ "text": text });

        self.client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &str {
        "slack"
    }
}
