//! Detail page extraction
//!
//! A detail page lists related metadata as one flat run of `<li>` items.
//! Some items are section headers (`Theme`, `Period`, `Place`, `Genre`) and
//! the items after a header, up to the next header, are that section's values:
//!
//! ```text
//! Theme | Love | War | Period | Renaissance
//! ```
//!
//! The extractor walks the items once with a section cursor.

use crate::config::{PreHeaderPolicy, SelectorConfig};
use crate::record::{PageDetails, Section};
use crate::HarvestError;
use scraper::{ElementRef, Html, Selector};

/// Compiled selectors and policy for reading detail pages
#[derive(Debug, Clone)]
pub struct PageExtractor {
    related_item: Selector,
    author: Selector,
    pre_header: PreHeaderPolicy,
}

impl PageExtractor {
    /// Compiles the detail page selectors
    ///
    /// # Returns
    ///
    /// * `Ok(PageExtractor)` - Ready to parse pages
    /// * `Err(HarvestError::InvalidSelector)` - A selector did not compile
    pub fn new(
        selectors: &SelectorConfig,
        pre_header: PreHeaderPolicy,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            related_item: compile_selector(&selectors.related_item)?,
            author: compile_selector(&selectors.author)?,
            pre_header,
        })
    }

    /// Extracts the author and tag sets from a detail page
    ///
    /// Missing structure is never an error: a page without an author link has
    /// an empty author, and a page without metadata items has empty tag sets.
    pub fn extract(&self, html: &str) -> PageDetails {
        let document = Html::parse_document(html);

        let author = document
            .select(&self.author)
            .next()
            .map(|element| element_text(&element))
            .unwrap_or_default();

        let mut details = PageDetails {
            author,
            ..Default::default()
        };

        let mut cursor = match self.pre_header {
            PreHeaderPolicy::Discard => None,
            PreHeaderPolicy::Theme => Some(Section::Theme),
        };

        for item in document.select(&self.related_item) {
            let text = element_text(&item);

            if let Some(section) = Section::from_label(&text) {
                tracing::trace!("Section header: {}", section);
                cursor = Some(section);
                continue;
            }

            if text.is_empty() {
                continue;
            }

            match cursor {
                Some(section) => {
                    details.tags.get_mut(section).insert(text);
                }
                None => tracing::trace!("Dropping value before any section header: {}", text),
            }
        }

        details
    }
}

/// Compiles a CSS selector, mapping failures into the crate error
pub(crate) fn compile_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Concatenated, trimmed text content of an element
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
