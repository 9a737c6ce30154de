//! Production [`JobRunner`]: picks the adapter of a job and hands it to the [`Engine`].
use std::path::PathBuf;

use ahash::AHashMap;
use chrono::Local;
use log::{debug, error};
use nnd_common::{config::AppConfig, http::FetchClient, JobMode, Site};
use nnd_extractors::{
    blacklist::Blacklist,
    websites::{
        e621::E6Adapter, furbooru::FurbooruAdapter, luscious::LusciousAdapter,
        multporn::MultpornAdapter, rule34::Rule34Adapter, yiffer::YifferAdapter,
    },
    SiteAdapter,
};

use crate::{
    engine::{Engine, JobReport},
    error::DownloaderError,
    job::JobSpec,
    job_output_dir,
    progress::SharedProgressListener,
    queue::JobRunner,
    seen::SeenIdStore,
};

/// Points an adapter to the overridden server of its site, if any.
macro_rules! rebase {
    ($self:ident, $site:expr, $adapter:expr) => {{
        let adapter = $adapter;
        match $self.base_urls.get(&$site) {
            Some(url) => adapter.with_base_url(url.clone()),
            None => adapter,
        }
    }};
}

pub struct Downloader {
    config: AppConfig,
    client: FetchClient,
    blacklist: Blacklist,
    output_root: PathBuf,
    db_dir: PathBuf,
    dedup: bool,
    base_urls: AHashMap<Site, String>,
}

impl Downloader {
    /// Builds the shared client and blacklist out of `config`.
    ///
    /// `proxies` are only used when the config allows them.
    pub fn new(
        config: AppConfig,
        proxies: &[String],
        output_root: PathBuf,
        db_dir: PathBuf,
    ) -> Result<Self, DownloaderError> {
        let client = if config.proxies && !proxies.is_empty() {
            FetchClient::with_proxies(proxies)?
        } else {
            FetchClient::new()?
        };

        debug!("Fetch client ready with {} route(s)", client.routes());

        Ok(Self {
            blacklist: Blacklist::from_config(&config),
            dedup: config.one_time_download,
            config,
            client,
            output_root,
            db_dir,
            base_urls: AHashMap::new(),
        })
    }

    /// Turns the seen-id store off, whatever the config says.
    #[must_use]
    pub fn without_dedup(mut self) -> Self {
        self.dedup = false;
        self
    }

    /// Sends the requests of `site` to another server.
    #[must_use]
    pub fn with_base_url(mut self, site: Site, url: impl Into<String>) -> Self {
        self.base_urls.insert(site, url.into());
        self
    }

    /// Sets up and runs one job. Errors mean the job could not start.
    pub async fn run_job(
        &self,
        job: &JobSpec,
        progress: SharedProgressListener,
    ) -> Result<JobReport, DownloaderError> {
        job.validate()?;

        let credentials = match &job.credentials {
            Some(creds) => Some(creds.clone()),
            None => self.config.credentials(job.site)?,
        };

        let query = job.query.trim();

        match job.site {
            Site::E621 | Site::E6ai | Site::E926 => {
                let adapter = rebase!(self, job.site, E6Adapter::new(job.site, query, credentials)?);
                self.drive(adapter, job, progress).await
            }
            Site::Rule34 => {
                let adapter = rebase!(self, job.site, Rule34Adapter::new(query)?);
                self.drive(adapter, job, progress).await
            }
            Site::Furbooru => {
                let adapter = rebase!(self, job.site, FurbooruAdapter::new(query, credentials)?);
                self.drive(adapter, job, progress).await
            }
            Site::Luscious => {
                let adapter = rebase!(self, job.site, LusciousAdapter::new(query)?);
                self.drive(adapter, job, progress).await
            }
            Site::Yiffer => {
                let adapter = rebase!(self, job.site, YifferAdapter::new(query)?);
                self.drive(adapter, job, progress).await
            }
            Site::Multporn => {
                let adapter = rebase!(self, job.site, MultpornAdapter::new(query)?);
                self.drive(adapter, job, progress).await
            }
        }
    }

    async fn drive<A: SiteAdapter>(
        &self,
        mut adapter: A,
        job: &JobSpec,
        progress: SharedProgressListener,
    ) -> Result<JobReport, DownloaderError> {
        let output_dir = job_output_dir(&self.output_root, &adapter.title(), Local::now());
        debug!("Saving {} into {}", job, output_dir.display());

        let mut seen = if self.dedup && job.mode == JobMode::Tags {
            Some(SeenIdStore::for_site(&self.db_dir, job.site).await?)
        } else {
            None
        };

        let engine = Engine::new(&self.client, &self.blacklist, output_dir)
            .max_pages(job.max_pages)
            .ai_training(self.config.ai_training)
            .progress(progress);

        Ok(engine.run(&mut adapter, seen.as_mut()).await)
    }
}

impl JobRunner for Downloader {
    async fn run(&self, job: JobSpec, progress: SharedProgressListener) -> JobReport {
        match self.run_job(&job, progress.clone()).await {
            Ok(report) => report,
            Err(err) => {
                error!("{job}: {err}");
                progress.notify(&format!("Error: {err}"));
                JobReport::rejected(err)
            }
        }
    }
}
