//! Adapter for `https://e621.net` and its sister sites `https://e6ai.net` and `https://e926.net`
//!
//! The e6 adapter has the following features:
//! - Authentication (HTTP basic auth with the user name and API key)
//! - Up to 40 tags per search
//! - Hard stop when the API refuses to go past page 750
use std::time::Duration;

use log::debug;
use nnd_common::{
    config::Credentials,
    http::PageRequest,
    item::{extension_from_url, DownloadItem},
    join_tags, serde_json, Site,
};

use crate::{
    error::ExtractorError,
    extractor::{caps::ExtractorFeatures, split_query, PageOutcome, SiteAdapter},
};

use self::models::{E6Post, E6TopLevel};

mod models;

/// Max posts per page the API accepts.
pub const PAGE_SIZE: usize = 320;

const PAGE_LIMIT_MESSAGE: &str = "You cannot go beyond page";

/// Tag categories matched against the blacklist on e621 and e926.
const E621_BLACKLIST_CATEGORIES: [&str; 5] =
    ["general", "species", "character", "copyright", "artist"];

/// Tag categories matched against the blacklist on e6ai.
const E6AI_BLACKLIST_CATEGORIES: [&str; 5] =
    ["general", "species", "character", "director", "meta"];

/// API logic for the e6 family.
#[derive(Debug, Clone)]
pub struct E6Adapter {
    site: Site,
    query: String,
    tags: Vec<String>,
    credentials: Option<Credentials>,
    base_url: String,
}

impl E6Adapter {
    /// Sets up the adapter for one of the three e6 sites.
    pub fn new(
        site: Site,
        query: &str,
        credentials: Option<Credentials>,
    ) -> Result<Self, ExtractorError> {
        if !site.is_e6() {
            return Err(ExtractorError::InvalidSite {
                site: site.to_string(),
            });
        }

        let tags = split_query(site, query)?;

        Ok(Self {
            site,
            query: query.trim().to_string(),
            tags,
            credentials,
            base_url: site.base_url().to_string(),
        })
    }

    /// Points the adapter to another server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn map_post(&self, post: E6Post) -> Option<DownloadItem> {
        let Some(url) = post.file.url else {
            debug!("Skipping post {} due to missing file url", post.id);
            return None;
        };

        let format = post
            .file
            .ext
            .or_else(|| extension_from_url(&url))
            .unwrap_or_else(|| "jpg".to_string());

        Some(DownloadItem::new(post.id.to_string(), url, format, post.tags))
    }
}

impl SiteAdapter for E6Adapter {
    type Raw = E6Post;

    fn site(&self) -> Site {
        self.site
    }

    fn title(&self) -> String {
        self.query.clone()
    }

    fn build_request(&self, page: u16) -> Result<PageRequest, ExtractorError> {
        let mut request = PageRequest::get(format!("{}/posts.json", self.base_url))
            .query("tags", join_tags!(self.tags))
            .query("limit", PAGE_SIZE)
            .query("page", page);

        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.user, &creds.key);
        }

        Ok(request)
    }

    fn parse_response(&mut self, raw: &str) -> Result<PageOutcome<E6Post>, ExtractorError> {
        let response: E6TopLevel = serde_json::from_str(raw)?;

        if let Some(message) = response.message {
            if message.contains(PAGE_LIMIT_MESSAGE) {
                return Ok(PageOutcome::hard_limit(format!("{message} (API limit)")));
            }
            debug!("{} answered with message: {}", self.site, message);
        }

        if response.success == Some(false) && response.posts.is_empty() {
            return Err(ExtractorError::InvalidServerResponse);
        }

        Ok(PageOutcome::more(response.posts))
    }

    fn collect_taggable_strings(&self, raw: &E6Post) -> Vec<String> {
        match self.site {
            Site::E6ai => raw.tags.collect(&E6AI_BLACKLIST_CATEGORIES),
            _ => raw.tags.collect(&E621_BLACKLIST_CATEGORIES),
        }
    }

    fn to_item(&self, raw: E6Post) -> Option<DownloadItem> {
        self.map_post(raw)
    }

    fn page_delay(&self) -> Duration {
        Duration::from_secs(2)
    }

    fn features() -> ExtractorFeatures {
        ExtractorFeatures::TagSearch
            | ExtractorFeatures::Paginated
            | ExtractorFeatures::Auth
            | ExtractorFeatures::HardLimit
    }
}
