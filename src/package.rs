//! Packaging of single chapters into EPUB files.

use crate::error::PackageError;
use crate::paths::ArtifactPath;
use crate::scrapers::{ChapterRef, NovelMetadata};
use crate::utils::{escape_html, pad_chapter};
use chrono::{Datelike, Local, NaiveDate};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CSS: &str = r#"
body { font-family: serif; line-height: 1.6; }
h1, h2 { page-break-after: avoid; }
p { margin: 0 0 1em; }
img { max-width: 100%; height: auto; }
"#;

const GENERATOR: &str = "novel-crawler";

/// Series index used for chapter 0 so prologues sort before chapter 1.
const PROLOGUE_SEQUENCE: f32 = 0.5;

/// Per-chapter metadata derived from the series metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterMetadata {
    pub series: NovelMetadata,
    /// Series index written to the container.
    pub sequence: f32,
    /// Stable identifier, `<series-with-hyphens>-c<NNN>`.
    pub id: String,
    /// Book title, `<series> — Chapter <N>`.
    pub title: String,
    /// Chapter display title from the listing.
    pub description: String,
    /// Date the file was generated, not when the chapter was published.
    pub published: NaiveDate,
}

impl ChapterMetadata {
    pub fn derive(series: &NovelMetadata, chapter: &ChapterRef, published: NaiveDate) -> Self {
        let padded = pad_chapter(chapter.number);
        let sequence = if chapter.number == 0 {
            PROLOGUE_SEQUENCE
        } else {
            chapter.number as f32
        };

        Self {
            series: series.clone(),
            sequence,
            id: format!(
                "{}-c{}",
                series.series.split_whitespace().collect::<Vec<_>>().join("-"),
                padded
            ),
            title: format!("{} — Chapter {}", series.series, chapter.number),
            description: chapter.title.clone(),
            published,
        }
    }
}

/// What the packager did with a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    Written(PathBuf),
    AlreadyExists(PathBuf),
}

/// Writes chapter EPUBs below one output root.
#[derive(Debug, Clone)]
pub struct Packager {
    output_root: PathBuf,
}

impl Packager {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Where `chapter` of `series` is written.
    pub fn artifact(&self, series: &str, chapter: &ChapterRef) -> ArtifactPath {
        ArtifactPath::resolve(&self.output_root, series, chapter.number)
    }

    /// Packages one chapter, stamped with today's date.
    pub fn package(
        &self,
        series: &NovelMetadata,
        chapter: &ChapterRef,
        html: &str,
    ) -> Result<PackageOutcome, PackageError> {
        self.package_dated(series, chapter, html, Local::now().date_naive())
    }

    /// Packages one chapter unless its file already exists.
    ///
    /// The archive is built in memory and moved into place in one rename, so
    /// a failure never leaves a file at the final path.
    pub fn package_dated(
        &self,
        series: &NovelMetadata,
        chapter: &ChapterRef,
        html: &str,
        published: NaiveDate,
    ) -> Result<PackageOutcome, PackageError> {
        let target = self.artifact(&series.series, chapter);
        if target.exists() {
            info!(
                "Skipping c{} (already exists)",
                pad_chapter(chapter.number)
            );
            return Ok(PackageOutcome::AlreadyExists(target.full_path));
        }

        std::fs::create_dir_all(&target.series_dir)?;

        let meta = ChapterMetadata::derive(series, chapter, published);
        let bytes = build_epub(&meta, chapter, html)?;

        let mut staged = NamedTempFile::new_in(&target.series_dir)?;
        staged.write_all(&bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(&target.full_path)?;

        info!("Wrote {}", target.full_path.display());
        Ok(PackageOutcome::Written(target.full_path))
    }
}

/// Cover image as it is stored inside the archive.
struct CoverImage {
    href: String,
    media_type: &'static str,
    bytes: Vec<u8>,
}

impl CoverImage {
    fn load(path: &Path) -> Result<Self, PackageError> {
        let bytes = std::fs::read(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| String::from("jpg"));
        let media_type = match ext.as_str() {
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "image/jpeg",
        };
        Ok(Self {
            href: format!("cover.{}", ext),
            media_type,
            bytes,
        })
    }
}

/// Builds the EPUB archive for one chapter in memory.
///
/// The archive holds a non-linear copyright page followed by the chapter
/// page, which is the only navigation entry.
fn build_epub(
    meta: &ChapterMetadata,
    chapter: &ChapterRef,
    html: &str,
) -> Result<Vec<u8>, PackageError> {
    let series = &meta.series;
    let cover = series.cover.as_deref().map(CoverImage::load).transpose()?;
    let chapter_id = format!("chapter-{}", pad_chapter(chapter.number));
    let chapter_href = format!("{}.xhtml", chapter_id);

    let copyright = xhtml_page(
        "Copyright",
        &format!(
            "<p>© {} {}</p>\n<p>Generated {}</p>",
            meta.published.year(),
            escape_html(&series.author),
            meta.published
        ),
    );
    let body = xhtml_page(&chapter.title, html);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // `mimetype` must be the first entry and stored uncompressed.
    add_entry(&mut zip, "mimetype", b"application/epub+zip", stored)?;
    add_entry(&mut zip, "META-INF/container.xml", CONTAINER_XML.as_bytes(), deflated)?;
    add_entry(
        &mut zip,
        "OEBPS/content.opf",
        package_document(meta, &chapter_id, &chapter_href, cover.as_ref()).as_bytes(),
        deflated,
    )?;
    add_entry(
        &mut zip,
        "OEBPS/nav.xhtml",
        nav_document(&chapter.title, &chapter_href).as_bytes(),
        deflated,
    )?;
    add_entry(
        &mut zip,
        "OEBPS/toc.ncx",
        ncx_document(meta, &chapter.title, &chapter_href).as_bytes(),
        deflated,
    )?;
    add_entry(&mut zip, "OEBPS/stylesheet.css", CSS.as_bytes(), deflated)?;
    if let Some(cover) = &cover {
        add_entry(
            &mut zip,
            &format!("OEBPS/{}", cover.href),
            &cover.bytes,
            stored,
        )?;
    }
    add_entry(&mut zip, "OEBPS/copyright.xhtml", copyright.as_bytes(), deflated)?;
    add_entry(
        &mut zip,
        &format!("OEBPS/{}", chapter_href),
        body.as_bytes(),
        deflated,
    )?;

    let out = zip.finish().map_err(epub_error)?;
    Ok(out.into_inner())
}

fn add_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<(), PackageError> {
    zip.start_file(name, options).map_err(epub_error)?;
    zip.write_all(bytes)?;
    Ok(())
}

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
<rootfiles>
<rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
</rootfiles>
</container>"#;

/// Renders `content.opf`: metadata (calibre series fields included),
/// manifest and spine.
fn package_document(
    meta: &ChapterMetadata,
    chapter_id: &str,
    chapter_href: &str,
    cover: Option<&CoverImage>,
) -> String {
    let series = &meta.series;
    let mut metadata = vec![
        format!(r#"<dc:identifier id="book-id">{}</dc:identifier>"#, escape_html(&meta.id)),
        format!("<dc:title>{}</dc:title>", escape_html(&meta.title)),
        format!(r#"<dc:creator id="creator">{}</dc:creator>"#, escape_html(&series.author)),
        format!(
            r##"<meta refines="#creator" property="file-as">{}</meta>"##,
            escape_html(&series.file_as)
        ),
        format!("<dc:language>{}</dc:language>", escape_html(&series.language)),
        format!("<dc:description>{}</dc:description>", escape_html(&meta.description)),
        format!("<dc:date>{}</dc:date>", meta.published),
        format!("<dc:source>{}</dc:source>", escape_html(&series.source)),
        format!(
            r#"<meta property="dcterms:modified">{}T00:00:00Z</meta>"#,
            meta.published
        ),
        format!(
            r#"<meta property="belongs-to-collection" id="series">{}</meta>"#,
            escape_html(&series.series)
        ),
        r##"<meta refines="#series" property="collection-type">series</meta>"##.to_string(),
        format!(
            r##"<meta refines="#series" property="group-position">{}</meta>"##,
            meta.sequence
        ),
    ];
    if !series.genre.is_empty() {
        metadata.push(format!("<dc:subject>{}</dc:subject>", escape_html(&series.genre)));
    }
    if !series.publisher.is_empty() {
        metadata.push(format!(
            "<dc:publisher>{}</dc:publisher>",
            escape_html(&series.publisher)
        ));
    }
    for (name, content) in [
        ("calibre:series", series.series.clone()),
        ("calibre:series_index", meta.sequence.to_string()),
        ("calibre:author_sort", series.file_as.clone()),
        ("calibre:timestamp", meta.published.to_string()),
        ("generator", GENERATOR.to_string()),
    ] {
        metadata.push(format!(
            r#"<meta name="{}" content="{}"/>"#,
            name,
            escape_html(&content)
        ));
    }

    let mut manifest = vec![
        r#"<item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>"#
            .to_string(),
        r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#.to_string(),
        r#"<item id="stylesheet" href="stylesheet.css" media-type="text/css"/>"#.to_string(),
        r#"<item id="copyright" href="copyright.xhtml" media-type="application/xhtml+xml"/>"#
            .to_string(),
        format!(
            r#"<item id="{}" href="{}" media-type="application/xhtml+xml"/>"#,
            chapter_id, chapter_href
        ),
    ];
    if let Some(cover) = cover {
        metadata.push(r#"<meta name="cover" content="cover-image"/>"#.to_string());
        manifest.push(format!(
            r#"<item id="cover-image" href="{}" media-type="{}" properties="cover-image"/>"#,
            cover.href, cover.media_type
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="book-id">
<metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
{}
</metadata>
<manifest>
{}
</manifest>
<spine toc="ncx">
<itemref idref="copyright" linear="no"/>
<itemref idref="{}"/>
</spine>
</package>"#,
        metadata.join("\n"),
        manifest.join("\n"),
        chapter_id
    )
}

fn nav_document(chapter_title: &str, chapter_href: &str) -> String {
    xhtml_page(
        "Contents",
        &format!(
            r#"<nav epub:type="toc" id="toc">
<ol>
<li><a href="{}">{}</a></li>
</ol>
</nav>"#,
            chapter_href,
            escape_html(chapter_title)
        ),
    )
}

/// EPUB 2 table of contents, for readers that ignore `nav.xhtml`.
fn ncx_document(meta: &ChapterMetadata, chapter_title: &str, chapter_href: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
<head>
<meta name="dtb:uid" content="{}"/>
<meta name="dtb:depth" content="1"/>
</head>
<docTitle><text>{}</text></docTitle>
<navMap>
<navPoint id="navpoint-1" playOrder="1">
<navLabel><text>{}</text></navLabel>
<content src="{}"/>
</navPoint>
</navMap>
</ncx>"#,
        escape_html(&meta.id),
        escape_html(&meta.title),
        escape_html(chapter_title),
        chapter_href
    )
}

fn xhtml_page(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
<meta charset="utf-8"/>
<title>{}</title>
<link rel="stylesheet" type="text/css" href="stylesheet.css"/>
</head>
<body>
{}
</body>
</html>"#,
        escape_html(title),
        body
    )
}

fn epub_error(e: impl std::fmt::Display) -> PackageError {
    PackageError::Epub(e.to_string())
}
