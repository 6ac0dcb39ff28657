//! Catalog search client
//!
//! One call issues one filtered search and returns the `(title, detail URL)`
//! pairs of the result listing in document order. The `rows` parameter is set
//! far above any realistic result count so that a single response carries the
//! complete listing; there is no pagination logic.

use crate::config::{CatalogConfig, FilterSet, SelectorConfig};
use crate::crawler::extractor::{compile_selector, element_text};
use crate::crawler::fetcher::fetch_document;
use crate::HarvestError;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// One anchor from a search result listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Anchor text (trimmed)
    pub title: String,

    /// Anchor target resolved to an absolute URL
    pub url: Url,
}

/// Issues filtered searches against the catalog
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    endpoint: Url,
    result_rows: u64,
    result_anchor: Selector,
}

impl SearchClient {
    /// Creates a search client for the configured catalog
    pub fn new(
        client: Client,
        catalog: &CatalogConfig,
        selectors: &SelectorConfig,
    ) -> Result<Self, HarvestError> {
        let base = Url::parse(&catalog.base_url)?;
        let endpoint = base.join(&catalog.search_path)?;

        Ok(Self {
            client,
            endpoint,
            result_rows: catalog.result_rows,
            result_anchor: compile_selector(&selectors.search_result)?,
        })
    }

    /// Builds the search URL for a filter set
    ///
    /// Keys and values are form-urlencoded in order, followed by `rows`.
    pub fn search_url(&self, filter_set: &FilterSet) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in &filter_set.filters {
                query.append_pair(key, value);
            }
            query.append_pair("rows", &self.result_rows.to_string());
        }
        url
    }

    /// Runs one filtered search
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<SearchHit>)` - Result anchors in document order, possibly empty
    /// * `Err(HarvestError)` - Transport failure or non-success status
    pub async fn search(&self, filter_set: &FilterSet) -> Result<Vec<SearchHit>, HarvestError> {
        let url = self.search_url(filter_set);
        tracing::debug!("Searching '{}': {}", filter_set.name, url);

        let body = fetch_document(&self.client, &url).await?;
        let hits = parse_results(&body, &url, &self.result_anchor);

        tracing::info!("Filter set '{}' matched {} works", filter_set.name, hits.len());
        Ok(hits)
    }
}

/// Extracts result anchors from a search response
fn parse_results(html: &str, page_url: &Url, anchor: &Selector) -> Vec<SearchHit> {
    let document = Html::parse_document(html);

    document
        .select(anchor)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let title = element_text(&element);
            if title.is_empty() {
                tracing::debug!("Skipping untitled result link: {}", href);
                return None;
            }
            match resolve_link(href, page_url) {
                Some(url) => Some(SearchHit { title, url }),
                None => {
                    tracing::debug!("Skipping unusable result link: {}", href);
                    None
                }
            }
        })
        .collect()
}

/// Resolves a result href to an absolute http(s) URL
///
/// Returns None for empty, fragment-only, `javascript:`, `mailto:`, `tel:` and
/// `data:` links, and for anything that does not resolve to http(s).
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}
