// src/collect/mod.rs
pub mod providers;

use anyhow::Result;

use crate::mention::Mention;

#[async_trait::async_trait]
pub trait MentionCollector: Send + Sync {
    /// Fetch mentions for every search keyword this collector owns. One
    /// keyword's fetch error is handled inside the collector (logged, zero
    /// results); an `Err` here means the collector failed as a whole.
    async fn collect(&self) -> Result<Vec<Mention>>;
    fn name(&self) -> &str;
}

/// Keyword state shared by the concrete collectors: the source label, the
/// search keywords (one external query each), and the post-hoc filter.
#[derive(Debug, Clone)]
pub struct KeywordCollector {
    pub source: String,
    pub search_keywords: Vec<String>,
    pub filter: KeywordFilter,
}

/// Normalize text from external APIs: decode HTML entities, strip tags,
/// collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Post-hoc confirmation/exclusion over `title + content_preview`. Needed for
/// brand names ambiguous enough that the search keyword alone over-matches.
#[derive(Debug, Clone, Default)]
pub struct KeywordFilter {
    /// Keep only mentions containing at least one of these (case-sensitive
    /// substring). Empty set = keep everything.
    pub confirm: Vec<String>,
    /// Drop mentions containing any of these.
    pub exclude: Vec<String>,
}

impl KeywordFilter {
    pub fn new(confirm: Vec<String>, exclude: Vec<String>) -> Self {
        Self { confirm, exclude }
    }

    pub fn matches(&self, mention: &Mention) -> bool {
        let text = mention.searchable_text();
        if self.exclude.iter().any(|t| text.contains(t.as_str())) {
            return false;
        }
        if self.confirm.is_empty() {
            return true;
        }
        self.confirm.iter().any(|t| text.contains(t.as_str()))
    }

    pub fn apply(&self, mentions: Vec<Mention>) -> Vec<Mention> {
        mentions.into_iter().filter(|m| self.matches(m)).collect()
    }
}
