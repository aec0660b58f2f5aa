// src/config.rs
//! Typed monitor configuration. Everything is validated at load time; secrets
//! (API credentials, webhook URLs) stay in the environment and are read by
//! the binary, not here.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "MENTIONWATCH_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct BrandConfig {
    pub brand: String,
    /// Seconds between monitor runs.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Seen-set JSON file location.
    #[serde(default = "default_seen_path")]
    pub seen_path: PathBuf,
    pub keywords: KeywordConfig,
    #[serde(default)]
    pub blog: Option<BlogSourceConfig>,
    #[serde(default)]
    pub news: Option<NewsSourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordConfig {
    /// One external query per keyword, in this order.
    pub search: Vec<String>,
    /// Post-hoc confirmation terms; empty = no confirmation stage.
    #[serde(default)]
    pub confirm: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogSourceConfig {
    pub endpoint: String,
    #[serde(default = "default_blog_source")]
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsSourceConfig {
    pub feed_url: String,
    #[serde(default = "default_query_param")]
    pub query_param: String,
    #[serde(default = "default_news_source")]
    pub source: String,
}

fn default_interval() -> u64 {
    3600
}
fn default_seen_path() -> PathBuf {
    PathBuf::from("data/seen.json")
}
fn default_blog_source() -> String {
    "blog".to_string()
}
fn default_news_source() -> String {
    "news".to_string()
}
fn default_query_param() -> String {
    "q".to_string()
}

/// Load from an explicit path. TOML or JSON, picked by extension.
pub fn load_from(path: &Path) -> Result<BrandConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg: BrandConfig = match ext.as_str() {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("parsing json config {}", path.display()))?,
        _ => toml::from_str(&content)
            .with_context(|| format!("parsing toml config {}", path.display()))?,
    };
    validate(cfg)
}

/// Load using env var + fallbacks:
/// 1) $MENTIONWATCH_CONFIG
/// 2) config/mentionwatch.toml
/// 3) config/mentionwatch.json
pub fn load_default() -> Result<BrandConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("MENTIONWATCH_CONFIG points to non-existent path"));
    }
    for candidate in ["config/mentionwatch.toml", "config/mentionwatch.json"] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return load_from(&pb);
        }
    }
    Err(anyhow!(
        "no config found (set MENTIONWATCH_CONFIG or add config/mentionwatch.toml)"
    ))
}

fn validate(mut cfg: BrandConfig) -> Result<BrandConfig> {
    cfg.brand = cfg.brand.trim().to_string();
    if cfg.brand.is_empty() {
        return Err(anyhow!("config: brand must not be empty"));
    }
    cfg.keywords.search = clean_list(cfg.keywords.search);
    cfg.keywords.confirm = clean_list(cfg.keywords.confirm);
    cfg.keywords.exclude = clean_list(cfg.keywords.exclude);
    if cfg.keywords.search.is_empty() {
        return Err(anyhow!("config: keywords.search must not be empty"));
    }
    if cfg.interval_secs == 0 {
        return Err(anyhow!("config: interval_secs must be positive"));
    }
    if cfg.blog.is_none() && cfg.news.is_none() {
        return Err(anyhow!("config: at least one of [blog]/[news] is required"));
    }
    Ok(cfg)
}

/// Trim, drop empties, keep first occurrence; search order is significant.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|x| x == t) {
            out.push(t.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    const TOML_OK: &str = r#"
brand = "Frog"
interval_secs = 600
seen_path = "data/frog.json"

[keywords]
search = [" frog pan ", "frog pan", "frog wok", ""]
confirm = ["Frog"]

[blog]
endpoint = "https://openapi.example.test/v1/search/blog.json"
source = "blog:naver"
"#;

    #[test]
    fn toml_config_parses_and_cleans_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("cfg.toml");
        std::fs::write(&p, TOML_OK).unwrap();
        let cfg = load_from(&p).unwrap();
        assert_eq!(cfg.brand, "Frog");
        assert_eq!(cfg.keywords.search, vec!["frog pan", "frog wok"]);
        assert_eq!(cfg.blog.unwrap().source, "blog:naver");
        assert!(cfg.news.is_none());
    }

    #[test]
    fn empty_search_keywords_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("cfg.toml");
        std::fs::write(
            &p,
            r#"
brand = "Frog"
[keywords]
search = ["  "]
[blog]
endpoint = "https://x.test"
"#,
        )
        .unwrap();
        assert!(load_from(&p).is_err());
    }

    #[test]
    fn a_source_section_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("cfg.toml");
        std::fs::write(&p, "brand = \"Frog\"\n[keywords]\nsearch = [\"x\"]\n").unwrap();
        assert!(load_from(&p).is_err());
    }

    #[serial_test::serial]
    #[test]
    fn env_path_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("cfg.toml");
        std::fs::write(&p, TOML_OK).unwrap();

        env::set_var(ENV_PATH, p.display().to_string());
        let cfg = load_default().unwrap();
        assert_eq!(cfg.brand, "Frog");
        env::remove_var(ENV_PATH);
    }

    #[serial_test::serial]
    #[test]
    fn dangling_env_path_is_an_error() {
        env::set_var(ENV_PATH, "/definitely/not/here.toml");
        assert!(load_default().is_err());
        env::remove_var(ENV_PATH);
    }
}
