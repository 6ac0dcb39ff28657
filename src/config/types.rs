use serde::Deserialize;

/// Search page size requested from the catalog.
///
/// Deliberately larger than any realistic result count so every query is
/// answered in one response and no pagination is needed.
pub const DEFAULT_RESULT_ROWS: u64 = (1 << 31) - 1;

/// Main configuration structure for Playbill
///
/// Every section is optional; the defaults describe the public drama catalog
/// and the two filter sets of the solo-performance dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default = "default_filter_sets", rename = "filter-set")]
    pub filter_sets: Vec<FilterSet>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
            selectors: SelectorConfig::default(),
            extractor: ExtractorConfig::default(),
            filter_sets: default_filter_sets(),
        }
    }
}

/// Remote catalog endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL that search paths and relative detail links resolve against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the search endpoint
    #[serde(rename = "search-path")]
    pub search_path: String,

    /// Value of the `rows` query parameter
    #[serde(rename = "result-rows")]
    pub result_rows: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.dramaonlinelibrary.com/".to_string(),
            search_path: "/search".to_string(),
            result_rows: DEFAULT_RESULT_ROWS,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of detail pages fetched at once
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler (optional)
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// CSS selectors used against catalog markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Result anchors on the search page (text = title, href = detail URI)
    #[serde(rename = "search-result")]
    pub search_result: String,

    /// Related-metadata items on a detail page (headers and values)
    #[serde(rename = "related-item")]
    pub related_item: String,

    /// Author role link on a detail page
    pub author: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            search_result: "div.search-article-text a[href]".to_string(),
            related_item: "div.play-related-lists ul li".to_string(),
            author: "span.authorRole a".to_string(),
        }
    }
}

/// Detail page extraction options
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// What to do with values listed before any section header
    #[serde(rename = "pre-header-values")]
    pub pre_header_values: PreHeaderPolicy,
}

/// Handling of metadata values that precede every section header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreHeaderPolicy {
    /// Drop values that have no header to belong to
    #[default]
    Discard,

    /// Attribute them to the theme set, as the legacy export did
    Theme,
}

/// One independent search query
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterSet {
    /// Human-readable name used in logs
    pub name: String,

    /// Ordered `(key, value)` query constraints
    #[serde(default)]
    pub filters: Vec<(String, String)>,
}

impl FilterSet {
    /// Creates a filter set from borrowed pairs
    pub fn new(name: &str, filters: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            filters: filters
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Monologues of 800+ words with at least one male role, and solo plays of
/// 800+ words with exactly one (male) role.
pub fn default_filter_sets() -> Vec<FilterSet> {
    vec![
        FilterSet::new(
            "monologues",
            &[
                ("s2_type", "monologue"),
                ("filter", "and-wordcount-more-800"),
                ("filter", "and-roles_male-more-0"),
            ],
        ),
        FilterSet::new(
            "solo-plays",
            &[
                ("s2_type", "play"),
                ("filter", "and-wordcount-more-800"),
                ("filter", "and-roles_male-equal-1"),
                ("filter", "and-roles-equal-1"),
            ],
        ),
    ]
}
