//! Requested novel URLs: validation, canonicalization and deduplication.

use crate::config::InputConfig;
use crate::error::InputError;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use url::Url;

/// Path shape of a novel root page.
static NOVEL_ROOT_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/novel/[^/]+/?$").unwrap());

/// Validates a novel URL and returns its canonical root form.
///
/// The path must be `/novel/<slug>` with an optional trailing slash. The
/// result always ends in `/` and carries no query string or fragment.
pub fn normalize_novel_url(input: &str) -> Result<String, InputError> {
    let mut url = Url::parse(input).map_err(|_| InputError::InvalidUrl(input.to_string()))?;

    if !NOVEL_ROOT_PATH.is_match(url.path()) {
        return Err(InputError::NotNovelRoot(url.to_string()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url.to_string())
}

/// Splits a comma-separated inline list, dropping blanks.
pub fn parse_inline_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a one-URL-per-line list; blank lines and `#` comments are ignored.
pub fn parse_list_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Normalizes every entry and removes duplicates, keeping first-seen order.
///
/// Any invalid entry fails the whole set, naming the offending input.
pub fn normalize_all<I, S>(inputs: I) -> Result<Vec<String>, InputError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut urls: Vec<String> = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        let url = normalize_novel_url(input).map_err(|e| InputError::BadEntry {
            input: input.to_string(),
            source: Box::new(e),
        })?;
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    Ok(urls)
}

/// Collects requested novel URLs from the inline list and the list file.
///
/// The file is optional; a missing file contributes nothing. Fails with
/// [`InputError::NoInput`] when both sources are empty.
pub fn load_requested_urls(config: &InputConfig) -> Result<Vec<String>, InputError> {
    let mut raw = Vec::new();

    if let Some(list) = &config.novels {
        raw.extend(parse_inline_list(list));
    }

    raw.extend(read_list_file(&config.novels_file)?);

    let urls = normalize_all(raw)?;
    if urls.is_empty() {
        return Err(InputError::NoInput);
    }
    Ok(urls)
}

fn read_list_file(path: &Path) -> Result<Vec<String>, InputError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(parse_list_file(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_strips_query_and_fragment() {
        assert_eq!(
            normalize_novel_url("https://example.com/novel/test-series/?ref=x#frag").unwrap(),
            "https://example.com/novel/test-series/"
        );
    }

    #[test]
    fn test_normalize_adds_trailing_slash() {
        assert_eq!(
            normalize_novel_url("https://example.com/novel/abc").unwrap(),
            "https://example.com/novel/abc/"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "https://example.com/novel/abc",
            "https://example.com/novel/abc/?page=2",
            "http://sub.example.org:8080/novel/some-slug/#top",
        ];
        for input in inputs {
            let once = normalize_novel_url(input).unwrap();
            let twice = normalize_novel_url(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_normalize_rejects_non_urls() {
        let err = normalize_novel_url("not a url").unwrap_err();
        assert!(matches!(err, InputError::InvalidUrl(_)));
        assert!(err.to_string().contains("Invalid URL"));
        assert!(err.to_string().contains("not a url"));

        assert!(matches!(
            normalize_novel_url("/novel/abc/"),
            Err(InputError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_wrong_shapes() {
        let bad = [
            "https://example.com/",
            "https://example.com/novel/",
            "https://example.com/novel//",
            "https://example.com/novel/abc/chapter-1/",
            "https://example.com/manga/abc/",
            "https://example.com/prefix/novel/abc/",
        ];
        for input in bad {
            let err = normalize_novel_url(input).unwrap_err();
            assert!(matches!(err, InputError::NotNovelRoot(_)), "{input}");
            assert!(err.to_string().contains("/novel/<slug>/"));
        }
    }

    #[test]
    fn test_parse_inline_list() {
        assert_eq!(
            parse_inline_list(" https://a/novel/x/ ,, https://a/novel/y ,"),
            vec!["https://a/novel/x/", "https://a/novel/y"]
        );
        assert!(parse_inline_list("").is_empty());
    }

    #[test]
    fn test_parse_list_file_skips_comments() {
        let content = "# my novels\r\nhttps://a/novel/x/\r\n\r\n   \n  # disabled\nhttps://a/novel/y\n";
        assert_eq!(
            parse_list_file(content),
            vec!["https://a/novel/x/", "https://a/novel/y"]
        );
    }

    #[test]
    fn test_normalize_all_dedupes_in_order() {
        let urls = normalize_all([
            "https://a.com/novel/y",
            "https://a.com/novel/x/?utm=1",
            "https://a.com/novel/y/#c",
        ])
        .unwrap();
        assert_eq!(urls, vec!["https://a.com/novel/y/", "https://a.com/novel/x/"]);
    }

    #[test]
    fn test_normalize_all_names_bad_entry() {
        let err = normalize_all(["https://a.com/novel/x/", "ftp:nope"]).unwrap_err();
        assert!(matches!(err, InputError::BadEntry { .. }));
        assert!(err.to_string().contains("ftp:nope"));
    }

    #[test]
    fn test_load_combines_sources() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("novels.txt");
        std::fs::write(
            &file,
            "# list\nhttps://example.com/novel/test-series/?ref=x#frag\nhttps://example.com/novel/other\n",
        )
        .unwrap();

        let config = InputConfig {
            novels: Some("https://example.com/novel/other/,https://example.com/novel/inline".to_string()),
            novels_file: file,
        };
        let urls = load_requested_urls(&config).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://example.com/novel/other/",
                "https://example.com/novel/inline/",
                "https://example.com/novel/test-series/",
            ]
        );
    }

    #[test]
    fn test_load_without_input_fails() {
        let config = InputConfig {
            novels: None,
            novels_file: PathBuf::from("/definitely/not/here/novels.txt"),
        };
        assert!(matches!(
            load_requested_urls(&config),
            Err(InputError::NoInput)
        ));
    }
}
