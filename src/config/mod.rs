//! Configuration module for Playbill
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so an absent file means "crawl the public catalog
//! with the built-in filter sets".
//!
//! # Example
//!
//! ```no_run
//! use playbill::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("playbill.toml")).unwrap();
//! println!("Fetching at most {} pages at once", config.crawler.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_filter_sets, CatalogConfig, Config, CrawlerConfig, ExtractorConfig, FilterSet,
    PreHeaderPolicy, SelectorConfig, UserAgentConfig, DEFAULT_RESULT_ROWS,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
