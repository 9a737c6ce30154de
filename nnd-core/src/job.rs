//! Description of one user request and its identity inside the queue.
use std::fmt::Display;

use nnd_common::{config::Credentials, split_tags, JobMode, Site};

use crate::error::DownloaderError;

/// A download request, as submitted by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub site: Site,
    pub mode: JobMode,
    /// Tag query or album/comic link, depending on `mode`.
    pub query: String,
    /// Stop after this many pages.
    pub max_pages: Option<u16>,
    pub credentials: Option<Credentials>,
}

/// What makes two jobs the same job.
///
/// The query is lowercased and trimmed. Links also lose their trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    site: Site,
    mode: JobMode,
    query: String,
    max_pages: Option<u16>,
}

impl JobSpec {
    /// A tag search job. The mode always follows the site.
    pub fn new(site: Site, query: impl Into<String>) -> Self {
        Self {
            site,
            mode: site.mode(),
            query: query.into(),
            max_pages: None,
            credentials: None,
        }
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: Option<u16>) -> Self {
        self.max_pages = max_pages;
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn key(&self) -> JobKey {
        let mut query = self.query.trim().to_lowercase();

        if self.mode == JobMode::Url {
            while query.ends_with('/') {
                query.pop();
            }
        }

        JobKey {
            site: self.site,
            mode: self.mode,
            query,
            max_pages: self.max_pages,
        }
    }

    /// Rejects jobs that can't possibly run, before they reach the queue.
    pub fn validate(&self) -> Result<(), DownloaderError> {
        let invalid = |message: String| Err(DownloaderError::InvalidJob { message });

        if self.mode != self.site.mode() {
            return invalid(format!("{} jobs take a {}", self.site, self.site.mode()));
        }

        if self.max_pages == Some(0) {
            return invalid("max pages must be at least 1".to_string());
        }

        match self.mode {
            JobMode::Url => {
                let url = self.query.trim();
                if url.is_empty() {
                    return invalid("empty link".to_string());
                }
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return invalid(format!("{url} is not an http link"));
                }
            }
            JobMode::Tags => {
                if let Some(max) = self.site.max_tags() {
                    let count = split_tags!(self.query).len();
                    if count > max {
                        return invalid(format!(
                            "{} supports at most {max} tags, got {count}",
                            self.site
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

impl Display for JobSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let query = self.query.trim();
        if query.is_empty() {
            write!(f, "{} (all posts)", self.site)
        } else {
            write!(f, "{}: {}", self.site, query)
        }
    }
}
