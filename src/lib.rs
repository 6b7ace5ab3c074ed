//! Novel crawler - scheduled web novel to per-chapter EPUB packager.
//!
//! This library provides functionality for:
//! - Validating and normalizing requested novel URLs
//! - Scraping metadata, chapter lists and chapter bodies from a Madara novel site
//! - Packaging every chapter as its own EPUB, skipping ones already on disk
//! - Running the whole crawl on a fixed schedule

pub mod config;
pub mod cover;
pub mod error;
pub mod http;
pub mod input;
pub mod package;
pub mod paths;
pub mod pipeline;
pub mod runner;
pub mod scrapers;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, InputError, PackageError, PassError, PipelineError, ScraperError};
pub use package::{PackageOutcome, Packager};
pub use paths::ArtifactPath;
pub use pipeline::{NovelReport, Pipeline};
pub use runner::{JobRunner, PassOutcome, PassReport};
pub use scrapers::{ChapterContent, ChapterGroup, ChapterRef, MadaraScraper, NovelMetadata, Scraper};
