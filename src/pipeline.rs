//! Drives one novel from metadata to packaged chapters.
//!
//! All state for a novel lives in a [`NovelContext`] created for that call,
//! so nothing leaks from one novel into the next.

use crate::error::PipelineError;
use crate::package::{PackageOutcome, Packager};
use crate::scrapers::{ChapterGroup, NovelMetadata, Scraper, chapter_count};
use crate::utils::pad_chapter;
use tracing::{Instrument, info, info_span, warn};

/// Chapter tallies for one novel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NovelReport {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Per-novel working state.
#[derive(Debug)]
pub struct NovelContext {
    pub metadata: NovelMetadata,
    pub groups: Vec<ChapterGroup>,
    pub report: NovelReport,
}

/// Runs novels through a site adapter and a packager.
pub struct Pipeline<'a> {
    scraper: &'a dyn Scraper,
    packager: &'a Packager,
}

impl<'a> Pipeline<'a> {
    pub fn new(scraper: &'a dyn Scraper, packager: &'a Packager) -> Self {
        Self { scraper, packager }
    }

    /// Processes one canonical novel URL.
    ///
    /// Metadata, chapter-list and packaging failures abort the novel. A
    /// chapter whose content cannot be fetched is logged and skipped.
    pub async fn process_novel(&self, novel_url: &str) -> Result<NovelReport, PipelineError> {
        let span = info_span!("novel", url = %novel_url);
        async move {
            info!("=== Processing novel: {} ===", novel_url);
            let ctx = self.prepare(novel_url).await?;
            let report = self.materialize(ctx).await?;
            info!(
                "Novel done: {} written, {} skipped, {} failed",
                report.written, report.skipped, report.failed
            );
            Ok::<_, PipelineError>(report)
        }
        .instrument(span)
        .await
    }

    /// Scrapes metadata and the chapter list into a fresh context.
    async fn prepare(&self, novel_url: &str) -> Result<NovelContext, PipelineError> {
        let metadata = self.scraper.fetch_metadata(novel_url).await?;
        info!("Series: {} by {}", metadata.series, metadata.author);

        let groups = self.scraper.fetch_chapter_list(novel_url).await?;
        info!(
            "Found {} chapters in {} group(s)",
            chapter_count(&groups),
            groups.len()
        );

        Ok(NovelContext {
            metadata,
            groups,
            report: NovelReport::default(),
        })
    }

    /// Fetches and packages every chapter not yet on disk, strictly in order.
    async fn materialize(&self, mut ctx: NovelContext) -> Result<NovelReport, PipelineError> {
        for group in &ctx.groups {
            info!("Group: {}", group.title);

            for chapter in &group.chapters {
                let artifact = self.packager.artifact(&ctx.metadata.series, chapter);
                if artifact.exists() {
                    info!("Already on disk: {}.epub", artifact.file_base);
                    ctx.report.skipped += 1;
                    continue;
                }

                let content = match self.scraper.fetch_chapter_content(&chapter.url).await {
                    Ok(content) => content,
                    Err(e) => {
                        warn!(
                            "Failed to fetch c{} ({}): {}",
                            pad_chapter(chapter.number),
                            chapter.url,
                            e
                        );
                        ctx.report.failed += 1;
                        continue;
                    }
                };

                match self.packager.package(&ctx.metadata, chapter, &content.html)? {
                    PackageOutcome::Written(_) => ctx.report.written += 1,
                    PackageOutcome::AlreadyExists(_) => ctx.report.skipped += 1,
                }
            }
        }

        Ok(ctx.report)
    }
}
