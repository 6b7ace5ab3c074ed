//! Site adapter trait and common types for novels and chapters.
//!
//! Everything that depends on a site's markup lives behind [`Scraper`], so
//! the pipeline only ever sees the types defined here.

mod madara;

pub use madara::MadaraScraper;

use crate::error::ScraperError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Author name used when a novel page does not credit anyone.
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Group title used when a chapter list has no named volumes.
pub const DEFAULT_GROUP: &str = "Default";

/// Series-level metadata for one novel, rebuilt on every pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NovelMetadata {
    /// Canonical novel root URL.
    pub source: String,

    /// Display title of the novel.
    pub title: String,

    /// Series name; always equal to `title` once scraped.
    pub series: String,

    /// Author display name.
    pub author: String,

    /// Author sort key, surname first ("Doe, Jane").
    pub file_as: String,

    /// Genres joined for display.
    pub genre: String,

    /// Local path of the cached cover image, if one was resolved.
    pub cover: Option<PathBuf>,

    pub description: String,
    pub publisher: String,
    pub language: String,
}

impl NovelMetadata {
    /// Creates metadata with defaults for a novel that has not been scraped yet.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: String::new(),
            series: String::new(),
            author: DEFAULT_AUTHOR.to_string(),
            file_as: DEFAULT_AUTHOR.to_string(),
            genre: String::new(),
            cover: None,
            description: String::new(),
            publisher: String::new(),
            language: "en".to_string(),
        }
    }

    /// Sets the author and derives the sort key from it.
    pub fn set_author(&mut self, author: &str) {
        self.author = author.to_string();
        self.file_as = author_sort_key(author);
    }
}

/// Reverses the space-separated tokens of a name: "Jane Doe" becomes "Doe, Jane".
pub fn author_sort_key(author: &str) -> String {
    author.split(' ').rev().collect::<Vec<_>>().join(", ")
}

/// Information about a single chapter in a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterRef {
    /// Chapter title as displayed on the site.
    pub title: String,

    /// URL to download the chapter content.
    pub url: String,

    /// Number parsed from the title; 0 means prologue.
    pub number: u32,
}

/// A named volume or arc holding chapters in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterGroup {
    pub title: String,
    pub chapters: Vec<ChapterRef>,
}

/// Total number of chapters across all groups.
pub fn chapter_count(groups: &[ChapterGroup]) -> usize {
    groups.iter().map(|g| g.chapters.len()).sum()
}

/// A chapter's rendered body.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterContent {
    /// Heading found on the page, or "Chapter".
    pub title: String,

    /// Self-contained XHTML fragment: escaped `<h1>` followed by the body.
    pub html: String,
}

/// Trait for site adapters.
///
/// An adapter handles one site's page structure and turns it into
/// metadata, chapter lists and chapter bodies.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns the human-readable name of this adapter.
    fn name(&self) -> &'static str;

    /// Fetches series metadata for a canonical novel URL, resolving the cover.
    async fn fetch_metadata(&self, novel_url: &str) -> Result<NovelMetadata, ScraperError>;

    /// Fetches the grouped chapter list in ascending order.
    ///
    /// Fails with [`ScraperError::NoChaptersFound`] when nothing is listed.
    async fn fetch_chapter_list(&self, novel_url: &str) -> Result<Vec<ChapterGroup>, ScraperError>;

    /// Downloads and cleans the content of a single chapter.
    async fn fetch_chapter_content(&self, chapter_url: &str)
    -> Result<ChapterContent, ScraperError>;
}
