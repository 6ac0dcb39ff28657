//! Work records and their tag sets
//!
//! A [`WorkRecord`] is built once per successfully fetched detail page and
//! handed straight to the output sink.

use std::fmt;

/// Separator used when a tag set is flattened into one CSV field
pub const TAG_SEPARATOR: &str = ", ";

/// One of the four categorical sections listed on a detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Theme,
    Period,
    Place,
    Genre,
}

impl Section {
    /// All sections in output order
    pub const ALL: [Section; 4] = [
        Section::Theme,
        Section::Period,
        Section::Place,
        Section::Genre,
    ];

    /// Header label as it appears on the catalog page (lowercased)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::Period => "period",
            Self::Place => "place",
            Self::Genre => "genre",
        }
    }

    /// Recognizes a section header, ignoring case and surrounding whitespace
    pub fn from_label(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|section| section.label() == normalized)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Deduplicated collection of tags
///
/// Members keep insertion order so output is stable for a given page, but the
/// order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag; returns false if it was already present
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.iter().any(|t| t == tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Flattens the set into a single `", "`-joined field
    pub fn joined(&self) -> String {
        self.tags.join(TAG_SEPARATOR)
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

/// The four tag sets of a work
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSets {
    pub themes: TagSet,
    pub period: TagSet,
    pub places: TagSet,
    pub genres: TagSet,
}

impl TagSets {
    pub fn get(&self, section: Section) -> &TagSet {
        match section {
            Section::Theme => &self.themes,
            Section::Period => &self.period,
            Section::Place => &self.places,
            Section::Genre => &self.genres,
        }
    }

    pub fn get_mut(&mut self, section: Section) -> &mut TagSet {
        match section {
            Section::Theme => &mut self.themes,
            Section::Period => &mut self.period,
            Section::Place => &mut self.places,
            Section::Genre => &mut self.genres,
        }
    }

    /// True when no section holds any tag
    pub fn is_empty(&self) -> bool {
        Section::ALL.iter().all(|s| self.get(*s).is_empty())
    }
}

/// Everything the extractor reads from a detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDetails {
    /// Author byline, empty when the page has none
    pub author: String,
    pub tags: TagSets,
}

/// A fully retrieved dramatic work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRecord {
    pub title: String,
    pub author: String,
    pub tags: TagSets,
}

impl WorkRecord {
    /// CSV header, in field order
    pub const HEADER: [&'static str; 6] =
        ["title", "author", "themes", "periods", "places", "genres"];

    /// Combines a search-result title with the details of its page
    pub fn new(title: impl Into<String>, details: PageDetails) -> Self {
        Self {
            title: title.into(),
            author: details.author,
            tags: details.tags,
        }
    }

    /// Fields in `HEADER` order, tag sets flattened
    pub fn fields(&self) -> [String; 6] {
        [
            self.title.clone(),
            self.author.clone(),
            self.tags.themes.joined(),
            self.tags.period.joined(),
            self.tags.places.joined(),
            self.tags.genres.joined(),
        ]
    }
}
