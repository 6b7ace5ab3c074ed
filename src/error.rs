//! Error types for the novel crawler.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong and at which unit (input, novel,
//! chapter) it should be handled.

use thiserror::Error;

/// Errors raised while loading and validating the requested novel URLs.
#[derive(Error, Debug)]
pub enum InputError {
    /// The input could not be parsed as an absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The URL parsed but does not point at a novel root.
    #[error("URL must be a novel root like /novel/<slug>/ : {0}")]
    NotNovelRoot(String),

    /// An entry from one of the input sources was rejected.
    #[error("Bad URL \"{input}\": {source}")]
    BadEntry {
        input: String,
        #[source]
        source: Box<InputError>,
    },

    /// Neither input source produced a single URL.
    #[error("Provide novel URLs via NOVELS or NOVELS_FILE (e.g., novels.txt)")]
    NoInput,

    /// Failed to read the URL list file.
    #[error("Failed to read novel list: {0}")]
    Io(#[from] std::io::Error),
}

/// Main error type for scraping operations.
#[derive(Error, Debug)]
pub enum ScraperError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a status the caller cannot use
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Local file operation failed (e.g. writing a cover image)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing or joining failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Neither the AJAX endpoint nor the page fallback listed any chapter
    #[error("No chapters found via ajax or fallback parser for {0}")]
    NoChaptersFound(String),
}

impl ScraperError {
    /// Returns true for failures worth another attempt: transport errors,
    /// rate limiting and server-side statuses.
    pub fn is_transient(&self) -> bool {
        match self {
            ScraperError::HttpError(e) => !e.is_builder() && !e.is_redirect(),
            ScraperError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Error type for building and writing chapter EPUBs.
#[derive(Error, Debug)]
pub enum PackageError {
    /// Failed to create directories or write the archive
    #[error("Failed to write EPUB: {0}")]
    Io(#[from] std::io::Error),

    /// The EPUB container could not be generated
    #[error("Failed to build EPUB: {0}")]
    Epub(String),

    /// The finished archive could not be moved into place
    #[error("Failed to persist EPUB: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Failure that aborts one novel for the current pass.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error(transparent)]
    Package(#[from] PackageError),
}

/// Failure that prevents a whole pass from running.
#[derive(Error, Debug)]
pub enum PassError {
    #[error(transparent)]
    Input(#[from] InputError),

    /// The output directory could not be created
    #[error("Failed to prepare output directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
