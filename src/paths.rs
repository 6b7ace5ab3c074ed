//! Output locations of chapter EPUBs.
//!
//! The path of a chapter is a pure function of the series name and chapter
//! number. Whether that file exists is the only record of completed work.

use crate::utils::{pad_chapter, sanitize_name};
use std::path::{Path, PathBuf};

/// File extension of packaged chapters.
pub const ARTIFACT_EXTENSION: &str = "epub";

/// Where one chapter's EPUB lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPath {
    /// `<root>/<sanitized series>`
    pub series_dir: PathBuf,
    /// `<series> - c<NNN>`, without extension.
    pub file_base: String,
    /// `<series_dir>/<file_base>.epub`
    pub full_path: PathBuf,
}

impl ArtifactPath {
    /// Resolves the artifact location for `series` chapter `number` under `root`.
    ///
    /// Only the directory name is sanitized; the file name keeps the series
    /// display name as-is.
    pub fn resolve(root: &Path, series: &str, number: u32) -> Self {
        let series_dir = root.join(sanitize_name(series));
        let file_base = format!("{} - c{}", series, pad_chapter(number));
        let full_path = series_dir.join(format!("{}.{}", file_base, ARTIFACT_EXTENSION));

        Self {
            series_dir,
            file_base,
            full_path,
        }
    }

    /// Returns true if the chapter has already been packaged.
    pub fn exists(&self) -> bool {
        self.full_path.is_file()
    }
}
