//! Pass execution and the resident schedule.
//!
//! A pass reads the requested URLs, then runs every novel in turn; one
//! novel failing never stops the rest. Passes repeat on a fixed interval
//! and never overlap.

use crate::config::Config;
use crate::cover::CoverCache;
use crate::error::{PassError, ScraperError};
use crate::http::{HttpClient, RetryPolicy};
use crate::input::load_requested_urls;
use crate::package::Packager;
use crate::pipeline::Pipeline;
use crate::scrapers::{MadaraScraper, Scraper};
use chrono::{Local, NaiveDateTime, TimeDelta, TimeZone, Timelike};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};

/// Novel tallies for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub succeeded: usize,
    pub failed: usize,
    pub chapters_written: usize,
}

/// Result of asking for a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(PassReport),
    /// Another pass was still running, so this one was not started.
    AlreadyRunning,
}

/// First top of the hour strictly after `now` whose hour is a multiple of
/// `every_hours`, like the cron expression `0 */N * * *`.
pub fn next_boundary(now: NaiveDateTime, every_hours: u32) -> NaiveDateTime {
    let every = every_hours.max(1);
    let top_of_hour = now
        - TimeDelta::minutes(i64::from(now.minute()))
        - TimeDelta::seconds(i64::from(now.second()))
        - TimeDelta::nanoseconds(i64::from(now.nanosecond()));

    let mut candidate = top_of_hour + TimeDelta::hours(1);
    while candidate.hour() % every != 0 {
        candidate += TimeDelta::hours(1);
    }
    candidate
}

/// Time left until the next local-time boundary for `every_hours`.
///
/// Boundaries that fall into a DST gap do not exist locally and are skipped.
pub fn delay_until_next_boundary(every_hours: u32) -> Duration {
    let now = Local::now();
    let mut candidate = next_boundary(now.naive_local(), every_hours);
    loop {
        match Local.from_local_datetime(&candidate).earliest() {
            Some(at) => return (at - now).to_std().unwrap_or(Duration::ZERO),
            None => candidate = next_boundary(candidate, every_hours),
        }
    }
}

/// Clears the in-flight flag when a pass ends, however it ends.
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns everything a pass needs and runs passes on demand or on schedule.
pub struct JobRunner {
    config: Config,
    scraper: Box<dyn Scraper>,
    packager: Packager,
    running: AtomicBool,
}

impl JobRunner {
    /// Builds a runner that crawls the live site.
    pub fn new(config: Config) -> Result<Self, ScraperError> {
        let transport = HttpClient::new(&config.scraping)?;
        let scraper = MadaraScraper::new(
            transport,
            CoverCache::new(&config.paths.assets_directory),
            RetryPolicy::from_config(&config.scraping),
        );
        Ok(Self::with_scraper(config, Box::new(scraper)))
    }

    /// Builds a runner around any site adapter.
    pub fn with_scraper(config: Config, scraper: Box<dyn Scraper>) -> Self {
        let packager = Packager::new(&config.paths.output_directory);
        Self {
            config,
            scraper,
            packager,
            running: AtomicBool::new(false),
        }
    }

    /// Runs one full pass over every requested novel.
    ///
    /// The URL list is re-read each time. Errors from individual novels are
    /// logged and counted; only a missing URL list or an unusable output
    /// directory fail the pass itself.
    pub async fn run_pass(&self) -> Result<PassOutcome, PassError> {
        if self.running.swap(true, Ordering::AcqRel) {
            warn!("Previous crawl run still in progress, skipping this one");
            return Ok(PassOutcome::AlreadyRunning);
        }
        let _guard = PassGuard(&self.running);

        let urls = load_requested_urls(&self.config.input)?;
        std::fs::create_dir_all(self.packager.output_root())?;
        info!(
            "Crawling {} novel(s) with the {} adapter",
            urls.len(),
            self.scraper.name()
        );

        let pipeline = Pipeline::new(self.scraper.as_ref(), &self.packager);
        let mut report = PassReport::default();
        for url in &urls {
            match pipeline.process_novel(url).await {
                Ok(novel) => {
                    report.succeeded += 1;
                    report.chapters_written += novel.written;
                }
                Err(e) => {
                    error!("Failed for {}: {}", url, e);
                    report.failed += 1;
                }
            }
        }

        Ok(PassOutcome::Completed(report))
    }

    /// Runs a pass and logs its outcome; never fails.
    pub async fn run_logged_pass(&self) {
        info!("Starting crawl run");
        match self.run_pass().await {
            Ok(PassOutcome::Completed(report)) => info!(
                "Crawl run completed: {} novel(s) ok, {} failed, {} chapter(s) written",
                report.succeeded, report.failed, report.chapters_written
            ),
            Ok(PassOutcome::AlreadyRunning) => {}
            Err(e) => error!("Crawl run failed: {}", e),
        }
    }

    /// Stays resident until Ctrl-C, running a pass at every local-time
    /// boundary of the configured interval (00:00, 06:00, 12:00, 18:00 by
    /// default).
    pub async fn run_forever(&self) {
        let schedule = &self.config.schedule;
        let every_hours = schedule.interval_hours;
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        info!(
            "Scheduled a crawl run at minute 0 of every {} hour(s), local time",
            every_hours
        );
        self.run_until(
            || delay_until_next_boundary(every_hours),
            schedule.run_on_start,
            shutdown,
        )
        .await;
    }

    /// Runs passes until `shutdown` resolves, sleeping `next_delay()` before
    /// each one.
    ///
    /// The delay is computed after the previous pass has finished, so
    /// boundaries missed during a long pass are skipped and passes never
    /// stack up. With `run_on_start` the first pass does not wait.
    pub async fn run_until<N, F>(&self, mut next_delay: N, run_on_start: bool, shutdown: F)
    where
        N: FnMut() -> Duration,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut wait = !run_on_start;
        loop {
            if wait {
                let delay = next_delay();
                info!("Next crawl run in {:?}", delay);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = &mut shutdown => break,
                }
            }
            wait = true;

            tokio::select! {
                _ = self.run_logged_pass() => {}
                _ = &mut shutdown => {
                    warn!("Shutdown requested during a crawl run");
                    break;
                }
            }
        }
        info!("Scheduler stopped");
    }
}
