// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod collect;
pub mod config;
pub mod dedup;
pub mod mention;
pub mod monitor;
pub mod notify;
pub mod scheduler;

// ---- Re-exports for stable public API ----
pub use crate::dedup::{JsonSeenStore, MemorySeenStore, SeenStore};
pub use crate::mention::{CollectorOutcome, Mention, RunReport};
pub use crate::monitor::BrandMonitor;
pub use crate::notify::{MentionNotifier, NotifyTransport};
