// src/collect/providers/mod.rs
pub mod blog_search;
pub mod news_rss;
