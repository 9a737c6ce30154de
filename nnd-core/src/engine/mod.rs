//! The pagination loop shared by every site.
//!
//! For each page the [`Engine`] asks the adapter for raw entries, drops the ones that the
//! blacklist or the seen-id store reject, downloads the rest one after the other and decides
//! whether page N+1 is worth asking for.
//!
//! Stop conditions, checked in this order after each fetch:
//! 1. the adapter reports a hard limit: the job ends successfully with the limit as reason;
//! 2. the site returned nothing for the page (entries dropped by the adapter still count);
//! 3. after the page is processed, the adapter said it was the last one, or `max_pages` pages
//!    were fetched. The limit page itself is always downloaded.
use std::path::PathBuf;

use log::{debug, error, info, warn};
use nnd_common::{http::FetchClient, item::DownloadItem};
use nnd_extractors::{blacklist::Blacklist, Continuation, SiteAdapter};
use tokio::{fs, time::sleep};

use crate::{
    error::DownloaderError,
    progress::{no_op_progress_listener, SharedProgressListener},
    seen::SeenIdStore,
};

/// Name of the folder, inside the job folder, that holds the tag side-car files.
pub const META_DIR: &str = "meta";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// The job ran to its natural end, even if nothing new was found.
    Completed,
    /// The job was aborted by an error.
    Failed,
}

/// Outcome of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub status: JobStatus,
    pub downloaded: u64,
    /// Items dropped before any download attempt.
    pub skipped: u64,
    pub failed: u64,
    /// Why the job stopped early, or why it failed.
    pub reason: Option<String>,
}

impl JobReport {
    fn new() -> Self {
        Self {
            status: JobStatus::Completed,
            downloaded: 0,
            skipped: 0,
            failed: 0,
            reason: None,
        }
    }

    /// A job that could not even start.
    pub fn rejected(reason: impl ToString) -> Self {
        Self {
            status: JobStatus::Failed,
            reason: Some(reason.to_string()),
            ..Self::new()
        }
    }

    /// True when the job finished without a fatal error, regardless of how much it downloaded.
    #[inline]
    pub fn success(&self) -> bool {
        self.status == JobStatus::Completed
    }
}

pub struct Engine<'a> {
    client: &'a FetchClient,
    blacklist: &'a Blacklist,
    output_dir: PathBuf,
    max_pages: Option<u16>,
    ai_training: bool,
    progress: SharedProgressListener,
}

impl<'a> Engine<'a> {
    /// Files will be saved directly inside `output_dir`.
    pub fn new(client: &'a FetchClient, blacklist: &'a Blacklist, output_dir: PathBuf) -> Self {
        Self {
            client,
            blacklist,
            output_dir,
            max_pages: None,
            ai_training: false,
            progress: no_op_progress_listener(),
        }
    }

    #[must_use]
    pub fn max_pages(mut self, max_pages: Option<u16>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Write `meta/<id>.json` with the tags of every downloaded item.
    #[must_use]
    pub fn ai_training(mut self, enabled: bool) -> Self {
        self.ai_training = enabled;
        self
    }

    #[must_use]
    pub fn progress(mut self, progress: SharedProgressListener) -> Self {
        self.progress = progress;
        self
    }

    /// Drives `adapter` until one of the stop conditions is met.
    ///
    /// Only an error returned by the adapter fails the job. Failed downloads are counted and
    /// the job goes on.
    pub async fn run<A: SiteAdapter>(
        &self,
        adapter: &mut A,
        mut seen: Option<&mut SeenIdStore>,
    ) -> JobReport {
        let mut report = JobReport::new();
        let title = adapter.title();

        info!("Starting {} job for {}", adapter.site(), title);
        self.progress.notify(&format!(
            "Starting {} download: {}",
            adapter.site(),
            if title.is_empty() { "all" } else { &title }
        ));

        let mut page: u16 = 1;

        loop {
            self.progress.notify(&format!("Fetching page {page}..."));

            let outcome = match adapter.fetch_page(self.client, page).await {
                Ok(outcome) => outcome,
                Err(error) => return self.abort(report, &DownloaderError::from(error)),
            };

            if let Continuation::HardLimit(reason) = &outcome.signal {
                info!("{} stopped at page {}: {}", adapter.site(), page, reason);
                self.progress.notify(reason);
                report.reason = Some(reason.clone());
                break;
            }

            if outcome.is_empty() {
                debug!("Page {page} is empty");
                self.progress.notify(&format!("No more items on page {page}"));
                break;
            }

            self.progress.notify(&format!(
                "Found {} items on page {}",
                outcome.items.len(),
                page
            ));

            self.process_page(adapter, outcome.items, seen.as_deref_mut(), &mut report)
                .await;

            self.progress.notify(&format!("Page {page} completed"));

            if outcome.signal == Continuation::Stop {
                break;
            }

            if self.max_pages.is_some_and(|max| page >= max) {
                debug!("Reached the page limit of {page}");
                break;
            }

            let Some(next) = page.checked_add(1) else {
                break;
            };
            page = next;

            let delay = adapter.page_delay();
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }

        info!(
            "Finished {}: {} downloaded, {} skipped, {} failed",
            title, report.downloaded, report.skipped, report.failed
        );
        self.progress.notify(&format!(
            "Completed {}: {} downloaded, {} skipped, {} failed",
            if title.is_empty() { "all" } else { &title },
            report.downloaded,
            report.skipped,
            report.failed
        ));

        report
    }

    async fn process_page<A: SiteAdapter>(
        &self,
        adapter: &A,
        items: Vec<A::Raw>,
        mut seen: Option<&mut SeenIdStore>,
        report: &mut JobReport,
    ) {
        let total = items.len();

        for (idx, raw) in items.into_iter().enumerate() {
            let collected = adapter.collect_taggable_strings(&raw);

            let Some(item) = adapter.to_item(raw) else {
                report.skipped += 1;
                continue;
            };

            if self.blacklist.blocks(&collected, &item.format) {
                debug!("Item {} is blacklisted", item.id);
                report.skipped += 1;
                continue;
            }

            if seen.as_ref().is_some_and(|store| store.contains(&item.id)) {
                debug!("Item {} was already downloaded", item.id);
                report.skipped += 1;
                continue;
            }

            let target = self.output_dir.join(item.file_name());

            if fs::try_exists(&target).await.unwrap_or(false) {
                debug!("{} already exists", target.display());
                report.skipped += 1;
                continue;
            }

            if self
                .client
                .download_to_file(&item.source_address, &target)
                .await
            {
                report.downloaded += 1;

                if let Some(store) = seen.as_deref_mut() {
                    if let Err(error) = store.record(&item.id).await {
                        warn!("{error}");
                    }
                }

                if self.ai_training {
                    self.write_meta(&item).await;
                }
            } else {
                report.failed += 1;
            }

            let done = idx + 1;
            self.progress.notify(&format!(
                "Downloaded {}/{} images ({}%)",
                done,
                total,
                done * 100 / total
            ));

            if let Some(delay) = adapter.item_delay() {
                sleep(delay).await;
            }
        }
    }

    async fn write_meta(&self, item: &DownloadItem) {
        if item.tags.is_empty() {
            return;
        }

        let dir = self.output_dir.join(META_DIR);
        let path = dir.join(item.meta_file_name());

        let result = async {
            let json = serde_json::to_vec_pretty(&item.tags)?;
            fs::create_dir_all(&dir).await?;
            fs::write(&path, json).await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(error) = result {
            warn!("Failed to write {}: {}", path.display(), error);
        }
    }

    fn abort(&self, mut report: JobReport, error: &DownloaderError) -> JobReport {
        error!("Job aborted: {error}");
        self.progress.notify(&format!("Error: {error}"));

        report.status = JobStatus::Failed;
        report.reason = Some(error.to_string());
        report
    }
}
