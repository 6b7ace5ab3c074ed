//! Utility functions shared by the scraper, cover cache and packager.

use regex::Regex;
use std::sync::LazyLock;

/// Runs of characters that are not safe in a file or directory name.
static UNSAFE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]+").unwrap());

/// First standalone run of ASCII digits in a chapter title.
static CHAPTER_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([0-9]+)\b").unwrap());

/// Turns an arbitrary display string into a filesystem-safe name.
///
/// Every run of characters outside `[A-Za-z0-9_.-]` becomes a single `_`,
/// then leading and trailing underscores are trimmed.
pub fn sanitize_name(s: &str) -> String {
    UNSAFE_RUN.replace_all(s, "_").trim_matches('_').to_string()
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parses the chapter number out of a display title.
///
/// Takes the first bare integer token, so "Chapter 10: The 2nd Trial" gives 10
/// and a title with no digits gives 0 (the prologue convention). This is a
/// heuristic: titles that lead with an unrelated number will be misread.
/// Numbers too large for `u32` saturate so they never read as a prologue.
pub fn parse_chapter_number(title: &str) -> u32 {
    CHAPTER_NUMBER
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().parse().unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Formats a chapter number zero-padded to three digits.
pub fn pad_chapter(number: u32) -> String {
    format!("{:03}", number)
}

/// Panics unless `xml` parses as well-formed XML with only predefined or
/// numeric entity references.
#[cfg(test)]
pub(crate) fn assert_well_formed_xml(xml: &str) {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Text(text)) => {
                if let Err(e) = text.unescape() {
                    panic!("bad entity at {}: {}\n{}", reader.buffer_position(), e, xml);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("not well-formed at {}: {}\n{}", reader.buffer_position(), e, xml),
        }
    }
}
