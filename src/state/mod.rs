//! State module for tracking crawl progress
//!
//! Each detail page moves through a small lifecycle while it is fetched,
//! parsed and emitted. See [`TaskState`] for the allowed transitions.

mod task_state;

// Re-export main types
pub use task_state::{CrawlTask, TaskState};
