//! Brand mention monitor — binary entrypoint.
//! Loads the brand config, wires collectors, the seen-set store and the
//! notification transports, then runs the interval scheduler.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mentionwatch::collect::providers::blog_search::BlogSearchCollector;
use mentionwatch::collect::providers::news_rss::NewsRssCollector;
use mentionwatch::collect::{KeywordCollector, KeywordFilter, MentionCollector};
use mentionwatch::config::{self, BrandConfig};
use mentionwatch::dedup::JsonSeenStore;
use mentionwatch::monitor::BrandMonitor;
use mentionwatch::notify::{discord::DiscordNotifier, slack::SlackNotifier};
use mentionwatch::notify::{MentionNotifier, NotifyTransport};
use mentionwatch::scheduler::spawn_monitor_loop;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn build_collectors(cfg: &BrandConfig) -> Result<Vec<Box<dyn MentionCollector>>> {
    let filter = KeywordFilter::new(cfg.keywords.confirm.clone(), cfg.keywords.exclude.clone());
    let mut collectors: Vec<Box<dyn MentionCollector>> = Vec::new();

    if let Some(blog) = &cfg.blog {
        let client_id = std::env::var("BLOG_API_CLIENT_ID").context("BLOG_API_CLIENT_ID missing")?;
        let client_secret =
            std::env::var("BLOG_API_CLIENT_SECRET").context("BLOG_API_CLIENT_SECRET missing")?;
        collectors.push(Box::new(BlogSearchCollector::new(
            KeywordCollector {
                source: blog.source.clone(),
                search_keywords: cfg.keywords.search.clone(),
                filter: filter.clone(),
            },
            blog.endpoint.clone(),
            client_id,
            client_secret,
        )));
    }

    if let Some(news) = &cfg.news {
        collectors.push(Box::new(NewsRssCollector::new(
            KeywordCollector {
                source: news.source.clone(),
                search_keywords: cfg.keywords.search.clone(),
                filter: filter.clone(),
            },
            news.feed_url.clone(),
            news.query_param.clone(),
        )));
    }

    Ok(collectors)
}

fn build_notifier() -> MentionNotifier {
    let mut transports: Vec<Box<dyn NotifyTransport>> = Vec::new();
    if let Some(slack) = SlackNotifier::from_env() {
        transports.push(Box::new(slack));
    }
    if let Ok(webhook) = std::env::var("DISCORD_WEBHOOK_URL") {
        transports.push(Box::new(DiscordNotifier::new(webhook)));
    }
    if transports.is_empty() {
        tracing::warn!("no notification transports configured; alerts will be dropped");
    }
    MentionNotifier::new(transports)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_default()?;
    tracing::info!(brand = %cfg.brand, interval_secs = cfg.interval_secs, "starting monitor");

    if let Some(parent) = cfg.seen_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let seen = JsonSeenStore::open(&cfg.seen_path)?;

    let monitor = BrandMonitor::new(
        cfg.brand.clone(),
        build_collectors(&cfg)?,
        Box::new(seen),
        build_notifier(),
    );

    spawn_monitor_loop(monitor, cfg.interval_secs)
        .await
        .context("monitor loop stopped")?;
    Ok(())
}
