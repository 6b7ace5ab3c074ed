//! Madara (WordPress novel theme) site adapter.
//!
//! Novel pages live at `/novel/<slug>/`, the chapter list is served by an
//! `ajax/chapters` endpoint below that root, and chapter bodies sit in
//! `#novel-chapter-container`.

use super::{
    ChapterContent, ChapterGroup, ChapterRef, DEFAULT_GROUP, NovelMetadata, Scraper, chapter_count,
};
use crate::cover::CoverCache;
use crate::error::ScraperError;
use crate::http::{RetryPolicy, Transport};
use crate::utils::{escape_html, parse_chapter_number};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use url::Url;

/// Title used when the page has no heading and nothing else is known.
const FALLBACK_TITLE: &str = "Series";

/// Heading used when a chapter page has none.
const FALLBACK_CHAPTER_TITLE: &str = "Chapter";

/// HTML elements that never have content and are written self-closed.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// CSS selectors used for parsing.
struct Selectors {
    /// Novel title heading.
    title: Selector,
    /// Author links.
    author: Selector,
    /// Genre links.
    genre: Selector,
    /// Cover image on the summary block.
    cover: Selector,
    /// One volume's chapter list.
    chapter_list: Selector,
    /// Chapter link inside a list.
    chapter_link: Selector,
    /// Chapter heading on a chapter page.
    chapter_heading: Selector,
    /// Chapter body container.
    chapter_body: Selector,
    /// Non-content nodes stripped from the body.
    chapter_noise: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            title: Selector::parse(".post-title").unwrap(),
            author: Selector::parse(".author-content a[rel='tag']").unwrap(),
            genre: Selector::parse(".genres-content a[rel='tag']").unwrap(),
            cover: Selector::parse(".summary_image img").unwrap(),
            chapter_list: Selector::parse("ul.list-chap").unwrap(),
            chapter_link: Selector::parse("li.wp-manga-chapter a").unwrap(),
            chapter_heading: Selector::parse("#chapter-heading").unwrap(),
            chapter_body: Selector::parse("#novel-chapter-container").unwrap(),
            chapter_noise: Selector::parse(
                r#"script, style, .chapter-nav, .share-buttons, .nav-links, div[data-format=""]"#,
            )
            .unwrap(),
        }
    }
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(Selectors::new);

/// Fields read off a novel landing page.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genres: Vec<String>,
    /// Absolute cover image URL.
    pub cover_url: Option<String>,
}

/// Madara scraper; generic over the transport so it can run on fixtures.
pub struct MadaraScraper<T: Transport> {
    transport: T,
    covers: CoverCache,
    retry: RetryPolicy,
}

impl<T: Transport> MadaraScraper<T> {
    /// Creates a scraper that caches covers in `covers`.
    pub fn new(transport: T, covers: CoverCache, retry: RetryPolicy) -> Self {
        Self {
            transport,
            covers,
            retry,
        }
    }

    /// Fetches a page's HTML text, retrying transient failures.
    async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        self.retry
            .run(url, || self.transport.get_text(url))
            .await
    }

    /// Fetches the chapter list markup from the AJAX endpoint, falling back
    /// to the full novel page when the endpoint is missing or unreachable.
    async fn fetch_chapter_markup(&self, novel_url: &str) -> Result<String, ScraperError> {
        let ajax_url = join_url(novel_url, "ajax/chapters")?;
        debug!("Chapter list endpoint: {}", ajax_url);

        let primary = self
            .retry
            .run(&ajax_url, || self.transport.post_ajax(&ajax_url, novel_url))
            .await;

        match primary {
            Ok(page) if page.status == 404 => {
                warn!("ajax/chapters 404 at {}, falling back to page parse", ajax_url);
            }
            Ok(page) if (200..500).contains(&page.status) => return Ok(page.body),
            Ok(page) => {
                warn!(
                    "ajax/chapters answered HTTP {} at {}, falling back to page parse",
                    page.status, ajax_url
                );
            }
            Err(e) => {
                warn!("ajax/chapters failed, falling back to page parse: {}", e);
            }
        }

        self.fetch_page(novel_url).await
    }
}

#[async_trait]
impl<T: Transport> Scraper for MadaraScraper<T> {
    fn name(&self) -> &'static str {
        "Madara"
    }

    async fn fetch_metadata(&self, novel_url: &str) -> Result<NovelMetadata, ScraperError> {
        let html = self.fetch_page(novel_url).await?;
        let parsed = parse_metadata(&html, novel_url);

        let mut meta = NovelMetadata::new(novel_url);
        meta.title = parsed
            .title
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        meta.series = meta.title.clone();
        if let Some(author) = &parsed.author {
            meta.set_author(author);
        }
        meta.genre = parsed.genres.join(", ");

        match parsed.cover_url {
            Some(cover_url) => {
                let key = format!("{}-cover", meta.title);
                match self
                    .covers
                    .resolve(&self.transport, self.retry, &cover_url, &key)
                    .await
                {
                    Ok(path) => {
                        info!("Cover ready: {}", path.display());
                        meta.cover = Some(path);
                    }
                    Err(e) => warn!("Failed to download cover {}: {}", cover_url, e),
                }
            }
            None => warn!("No cover URL found for {}", novel_url),
        }

        Ok(meta)
    }

    async fn fetch_chapter_list(&self, novel_url: &str) -> Result<Vec<ChapterGroup>, ScraperError> {
        info!("Fetching chapters...");
        let markup = self.fetch_chapter_markup(novel_url).await?;
        let groups = parse_chapter_list(&markup, novel_url);

        if chapter_count(&groups) == 0 {
            return Err(ScraperError::NoChaptersFound(novel_url.to_string()));
        }
        Ok(groups)
    }

    async fn fetch_chapter_content(
        &self,
        chapter_url: &str,
    ) -> Result<ChapterContent, ScraperError> {
        info!("Fetching chapter: {}", chapter_url);
        let html = self.fetch_page(chapter_url).await?;
        Ok(parse_chapter_content(&html))
    }
}

/// Joins a possibly relative reference onto a base URL.
fn join_url(base: &str, reference: &str) -> Result<String, ScraperError> {
    Url::parse(base)
        .and_then(|b| b.join(reference))
        .map(|u| u.to_string())
        .map_err(|_| ScraperError::InvalidUrl(format!("{} relative to {}", reference, base)))
}

/// Trimmed visible text of an element.
fn element_text(elem: ElementRef) -> String {
    elem.text().collect::<String>().trim().to_string()
}

/// Reads title, author, genres and cover reference from a novel page.
pub fn parse_metadata(html: &str, page_url: &str) -> ParsedMetadata {
    let doc = Html::parse_document(html);
    let sel = &*SELECTORS;

    let title = doc
        .select(&sel.title)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    let author = doc
        .select(&sel.author)
        .next()
        .map(element_text)
        .filter(|a| !a.is_empty());

    let genres = doc.select(&sel.genre).map(element_text).collect();

    let cover_url = doc.select(&sel.cover).next().and_then(|img| {
        let raw = img
            .value()
            .attr("data-src")
            .or_else(|| img.value().attr("src"))
            .map(str::trim)
            .filter(|s| !s.is_empty())?;
        join_url(page_url, raw).ok()
    });

    ParsedMetadata {
        title,
        author,
        genres,
        cover_url,
    }
}

/// Parses a chapter listing (AJAX fragment or full page) into groups.
///
/// Each `ul.list-chap` becomes a group named after the link right before
/// it. Without any such list, every chapter link on the page forms a single
/// default group. Chapters are listed newest-first by the site and are
/// reversed here.
pub fn parse_chapter_list(html: &str, base_url: &str) -> Vec<ChapterGroup> {
    let doc = Html::parse_document(html);
    let sel = &*SELECTORS;

    let mut groups: Vec<ChapterGroup> = doc
        .select(&sel.chapter_list)
        .map(|list| ChapterGroup {
            title: group_title(list),
            chapters: collect_chapters(list.select(&sel.chapter_link), base_url),
        })
        .collect();

    if groups.is_empty() {
        groups.push(ChapterGroup {
            title: DEFAULT_GROUP.to_string(),
            chapters: collect_chapters(doc.select(&sel.chapter_link), base_url),
        });
    }

    groups
}

/// Title of a chapter list: text of the immediately preceding sibling `<a>`.
fn group_title(list: ElementRef) -> String {
    list.prev_siblings()
        .find_map(ElementRef::wrap)
        .filter(|prev| prev.value().name() == "a")
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_GROUP.to_string())
}

fn collect_chapters<'a>(
    links: impl Iterator<Item = ElementRef<'a>>,
    base_url: &str,
) -> Vec<ChapterRef> {
    let mut chapters: Vec<ChapterRef> = links
        .filter_map(|link| {
            let title = element_text(link);
            if title.is_empty() {
                return None;
            }
            let href = link.value().attr("href")?;
            let url = join_url(base_url, href.trim()).ok()?;
            let number = parse_chapter_number(&title);
            Some(ChapterRef { title, url, number })
        })
        .collect();

    chapters.reverse();
    chapters
}

/// Extracts the heading and cleaned body of a chapter page.
pub fn parse_chapter_content(html: &str) -> ChapterContent {
    let mut doc = Html::parse_document(html);
    let sel = &*SELECTORS;

    let heading = doc
        .select(&sel.chapter_heading)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let container = doc.select(&sel.chapter_body).next().map(|c| c.id());
    let body = match container {
        Some(container_id) => {
            let noise: Vec<_> = doc
                .tree
                .get(container_id)
                .and_then(ElementRef::wrap)
                .map(|c| c.select(&sel.chapter_noise).map(|n| n.id()).collect())
                .unwrap_or_default();
            for id in noise {
                if let Some(mut node) = doc.tree.get_mut(id) {
                    node.detach();
                }
            }
            doc.tree
                .get(container_id)
                .and_then(ElementRef::wrap)
                .map(xhtml_inner)
                .unwrap_or_default()
        }
        None => String::new(),
    };

    let html = format!("<h1>{}</h1>\n{}", escape_html(&heading), body);
    let title = if heading.is_empty() {
        FALLBACK_CHAPTER_TITLE.to_string()
    } else {
        heading
    };

    ChapterContent { title, html }
}

/// Serializes the children of `elem` as well-formed XHTML.
///
/// Text is re-escaped from the parsed tree, so named entities such as
/// `&nbsp;` come out as plain characters, and void elements are closed.
/// Comments are dropped.
fn xhtml_inner(elem: ElementRef) -> String {
    let mut out = String::new();
    write_xhtml_children(elem, &mut out);
    out
}

fn write_xhtml_children(elem: ElementRef, out: &mut String) {
    for child in elem.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&escape_html(text)),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_xhtml_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn write_xhtml_element(elem: ElementRef, out: &mut String) {
    let name = elem.value().name();
    out.push('<');
    out.push_str(name);
    for (attr, value) in elem.value().attrs() {
        out.push_str(&format!(" {}=\"{}\"", attr, escape_html(value)));
    }

    if VOID_ELEMENTS.contains(&name) {
        out.push_str("/>");
        return;
    }

    out.push('>');
    write_xhtml_children(elem, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Page;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const NOVEL_URL: &str = "https://example.com/novel/test-series/";

    const NOVEL_PAGE: &str = r##"
        <html><body>
          <div class="post-title"><h1> The Test Series </h1></div>
          <div class="author-content"><a href="/a/jane" rel="tag">Jane Doe</a><a rel="tag">Ghost</a></div>
          <div class="genres-content">
            <a href="/g/action" rel="tag">Action</a>,
            <a href="/g/fantasy" rel="tag">Fantasy</a>
          </div>
          <div class="summary_image">
            <a href="#"><img data-src="/wp-content/covers/test.png" src="/placeholder.gif"></a>
          </div>
        </body></html>
    "##;

    const AJAX_FRAGMENT: &str = r#"
        <div class="listing-chapters_wrap">
          <a class="has-child" href="javascript:void(0)">Volume 2</a>
          <ul class="main version-chap list-chap">
            <li class="wp-manga-chapter"><a href="https://example.com/novel/test-series/chapter-4/">Chapter 4</a></li>
            <li class="wp-manga-chapter"><a href="https://example.com/novel/test-series/chapter-3/">Chapter 3</a></li>
          </ul>
          <ul class="main version-chap list-chap">
            <li class="wp-manga-chapter"><a href="chapter-2/">Chapter 2 - Return</a></li>
            <li class="wp-manga-chapter"><a href="chapter-1/"> </a></li>
            <li class="wp-manga-chapter"><a href="prologue/">Prologue</a></li>
          </ul>
        </div>
    "#;

    const FLAT_PAGE: &str = r#"
        <html><body>
          <div class="page-content-listing">
            <li class="wp-manga-chapter"><a href="/novel/test-series/chapter-2/">Chapter 2</a></li>
            <li class="wp-manga-chapter"><a href="/novel/test-series/chapter-1/">Chapter 1</a></li>
          </div>
        </body></html>
    "#;

    const CHAPTER_PAGE: &str = r#"
        <html><body>
          <h1 id="chapter-heading">Chapter 1 &amp; "Beginnings"</h1>
          <div id="novel-chapter-container">
            <script>track();</script>
            <style>p { color: red; }</style>
            <p>It was a dark night.</p>
            <div class="chapter-nav"><a href="next/">Next</a></div>
            <div data-format="">ad slot</div>
            <div data-format="block">kept</div>
            <div class="share-buttons">Share</div>
            <p>The end.</p>
            <nav class="nav-links">links</nav>
          </div>
        </body></html>
    "#;

    /// Canned responses keyed by URL; records every request.
    #[derive(Default)]
    struct FixtureTransport {
        pages: HashMap<String, String>,
        ajax: Option<Page>,
        log: Mutex<Vec<String>>,
    }

    impl FixtureTransport {
        fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        fn with_ajax(mut self, status: u16, body: &str) -> Self {
            self.ajax = Some(Page {
                status,
                body: body.to_string(),
            });
            self
        }

        fn requests(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FixtureTransport {
        async fn get_text(&self, url: &str) -> Result<String, ScraperError> {
            self.log.lock().unwrap().push(format!("GET {}", url));
            self.pages.get(url).cloned().ok_or(ScraperError::Status {
                url: url.to_string(),
                status: 404,
            })
        }

        async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
            self.log.lock().unwrap().push(format!("GET {}", url));
            Ok(b"image".to_vec())
        }

        async fn post_ajax(&self, url: &str, referer: &str) -> Result<Page, ScraperError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("POST {} from {}", url, referer));
            self.ajax.clone().ok_or(ScraperError::Status {
                url: url.to_string(),
                status: 502,
            })
        }
    }

    fn scraper(transport: FixtureTransport, dir: &TempDir) -> MadaraScraper<FixtureTransport> {
        MadaraScraper::new(
            transport,
            CoverCache::new(dir.path().join("assets")),
            RetryPolicy::none(),
        )
    }

    #[test]
    fn test_parse_metadata() {
        let parsed = parse_metadata(NOVEL_PAGE, NOVEL_URL);
        assert_eq!(parsed.title.as_deref(), Some("The Test Series"));
        assert_eq!(parsed.author.as_deref(), Some("Jane Doe"));
        assert_eq!(parsed.genres, vec!["Action", "Fantasy"]);
        assert_eq!(
            parsed.cover_url.as_deref(),
            Some("https://example.com/wp-content/covers/test.png")
        );
    }

    #[test]
    fn test_parse_metadata_empty_page() {
        let parsed = parse_metadata("<html><body><p>nothing</p></body></html>", NOVEL_URL);
        assert_eq!(parsed, ParsedMetadata::default());
    }

    #[test]
    fn test_parse_metadata_uses_src_without_data_src() {
        let html = r#"<div class="summary_image"><img src="cover.jpg"></div>"#;
        let parsed = parse_metadata(html, NOVEL_URL);
        assert_eq!(
            parsed.cover_url.as_deref(),
            Some("https://example.com/novel/test-series/cover.jpg")
        );
    }

    #[test]
    fn test_parse_chapter_list_groups() {
        let groups = parse_chapter_list(AJAX_FRAGMENT, NOVEL_URL);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].title, "Volume 2");
        let numbers: Vec<u32> = groups[0].chapters.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![3, 4]);

        // No link directly before the second list.
        assert_eq!(groups[1].title, DEFAULT_GROUP);
        let titles: Vec<&str> = groups[1].chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Prologue", "Chapter 2 - Return"]);
        assert_eq!(groups[1].chapters[0].number, 0);
        assert_eq!(
            groups[1].chapters[1].url,
            "https://example.com/novel/test-series/chapter-2/"
        );
    }

    #[test]
    fn test_parse_chapter_list_flat_fallback() {
        let groups = parse_chapter_list(FLAT_PAGE, NOVEL_URL);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].title, DEFAULT_GROUP);
        let numbers: Vec<u32> = groups[0].chapters.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(
            groups[0].chapters[0].url,
            "https://example.com/novel/test-series/chapter-1/"
        );
    }

    #[test]
    fn test_parse_chapter_list_nothing() {
        let groups = parse_chapter_list("<p>no chapters</p>", NOVEL_URL);
        assert_eq!(chapter_count(&groups), 0);
    }

    #[test]
    fn test_parse_chapter_content_strips_noise() {
        let content = parse_chapter_content(CHAPTER_PAGE);
        assert_eq!(content.title, r#"Chapter 1 & "Beginnings""#);
        assert!(
            content
                .html
                .starts_with("<h1>Chapter 1 &amp; &quot;Beginnings&quot;</h1>\n")
        );
        assert!(content.html.contains("It was a dark night."));
        assert!(content.html.contains("The end."));
        assert!(content.html.contains("kept"));
        for gone in ["track()", "color: red", "Next", "ad slot", "Share", "links"] {
            assert!(!content.html.contains(gone), "{gone} should be stripped");
        }
    }

    #[test]
    fn test_parse_chapter_content_without_heading() {
        let content = parse_chapter_content(
            r#"<div id="novel-chapter-container"><p>Body</p></div>"#,
        );
        assert_eq!(content.title, FALLBACK_CHAPTER_TITLE);
        assert_eq!(content.html, "<h1></h1>\n<p>Body</p>");
    }

    #[test]
    fn test_parse_chapter_content_is_xhtml() {
        let content = parse_chapter_content(
            r#"<h1 id="chapter-heading">C 1</h1>
            <div id="novel-chapter-container"><p>a<br>b&nbsp;c</p><img src="x.png"><!-- ad --><p title='say "hi"'>1 &lt; 2 &amp; Tom&#39;s</p></div>"#,
        );

        assert_eq!(
            content.html,
            "<h1>C 1</h1>\n<p>a<br/>b\u{a0}c</p><img src=\"x.png\"/><p title=\"say &quot;hi&quot;\">1 &lt; 2 &amp; Tom&#39;s</p>"
        );
        crate::utils::assert_well_formed_xml(&format!("<div>{}</div>", content.html));
    }

    #[tokio::test]
    async fn test_fetch_metadata_resolves_cover() {
        let dir = TempDir::new().unwrap();
        let transport = FixtureTransport::default().with_page(NOVEL_URL, NOVEL_PAGE);
        let scraper = scraper(transport, &dir);

        let meta = scraper.fetch_metadata(NOVEL_URL).await.unwrap();
        assert_eq!(meta.source, NOVEL_URL);
        assert_eq!(meta.title, "The Test Series");
        assert_eq!(meta.series, meta.title);
        assert_eq!(meta.author, "Jane Doe");
        assert_eq!(meta.file_as, "Doe, Jane");
        assert_eq!(meta.genre, "Action, Fantasy");
        assert_eq!(
            meta.cover,
            Some(dir.path().join("assets").join("The_Test_Series-cover.png"))
        );
    }

    #[tokio::test]
    async fn test_fetch_metadata_defaults() {
        let dir = TempDir::new().unwrap();
        let transport = FixtureTransport::default().with_page(NOVEL_URL, "<p>bare</p>");
        let scraper = scraper(transport, &dir);

        let meta = scraper.fetch_metadata(NOVEL_URL).await.unwrap();
        assert_eq!(meta.title, FALLBACK_TITLE);
        assert_eq!(meta.series, FALLBACK_TITLE);
        assert_eq!(meta.author, "Anonymous");
        assert!(meta.cover.is_none());
    }

    #[tokio::test]
    async fn test_fetch_metadata_propagates_transport_failure() {
        let dir = TempDir::new().unwrap();
        let scraper = scraper(FixtureTransport::default(), &dir);
        let result = scraper.fetch_metadata(NOVEL_URL).await;
        assert!(matches!(result, Err(ScraperError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_chapter_list_uses_ajax() {
        let dir = TempDir::new().unwrap();
        let transport = FixtureTransport::default().with_ajax(200, AJAX_FRAGMENT);
        let scraper = scraper(transport, &dir);

        let groups = scraper.fetch_chapter_list(NOVEL_URL).await.unwrap();
        assert_eq!(chapter_count(&groups), 4);
        assert_eq!(
            scraper.transport.requests(),
            vec![format!(
                "POST https://example.com/novel/test-series/ajax/chapters from {}",
                NOVEL_URL
            )]
        );
    }

    #[tokio::test]
    async fn test_chapter_list_falls_back_on_404() {
        let dir = TempDir::new().unwrap();
        let transport = FixtureTransport::default()
            .with_ajax(404, "not found")
            .with_page(NOVEL_URL, FLAT_PAGE);
        let scraper = scraper(transport, &dir);

        let groups = scraper.fetch_chapter_list(NOVEL_URL).await.unwrap();
        assert_eq!(chapter_count(&groups), 2);
        let requests = scraper.transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1], format!("GET {}", NOVEL_URL));
    }

    #[tokio::test]
    async fn test_chapter_list_falls_back_on_transport_error() {
        let dir = TempDir::new().unwrap();
        let transport = FixtureTransport::default().with_page(NOVEL_URL, AJAX_FRAGMENT);
        let scraper = scraper(transport, &dir);

        let groups = scraper.fetch_chapter_list(NOVEL_URL).await.unwrap();
        assert_eq!(groups.len(), 2);
    }

    #[tokio::test]
    async fn test_chapter_list_empty_is_error() {
        let dir = TempDir::new().unwrap();
        let transport = FixtureTransport::default()
            .with_ajax(404, "")
            .with_page(NOVEL_URL, "<p>nothing here</p>");
        let scraper = scraper(transport, &dir);

        let result = scraper.fetch_chapter_list(NOVEL_URL).await;
        assert!(matches!(result, Err(ScraperError::NoChaptersFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_chapter_content() {
        let dir = TempDir::new().unwrap();
        let url = "https://example.com/novel/test-series/chapter-1/";
        let transport = FixtureTransport::default().with_page(url, CHAPTER_PAGE);
        let scraper = scraper(transport, &dir);

        let content = scraper.fetch_chapter_content(url).await.unwrap();
        assert!(content.html.contains("It was a dark night."));
    }
}
