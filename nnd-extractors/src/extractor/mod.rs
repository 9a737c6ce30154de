//! Site adapters translate a generic "give me page N" into the protocol of one site.
//! # Adapters
//!
//! Every adapter implements [`SiteAdapter`], and the download engine drives all of them through
//! the same loop: [`fetch_page`](SiteAdapter::fetch_page) for page N, then for each raw entry
//! [`collect_taggable_strings`](SiteAdapter::collect_taggable_strings) for the blacklist and
//! [`to_item`](SiteAdapter::to_item) for the uniform [`DownloadItem`].
//!
//! Single-request sites only need to describe their request and parse its answer. Sites that
//! need more than one round trip for a page override `fetch_page` instead.
use std::{future::Future, time::Duration};

use nnd_common::{
    http::{FetchClient, PageRequest},
    item::DownloadItem,
    Site,
};

use crate::error::ExtractorError;
use crate::extractor::caps::ExtractorFeatures;

use log::warn;

pub mod caps;

/// Tells the engine what to do after the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Ask for the next page.
    Continue,
    /// This is the last page, process it and stop.
    Stop,
    /// The site refuses to go further. Carries the message to show the user.
    HardLimit(String),
}

/// Raw entries of a page together with the continuation signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome<R> {
    pub items: Vec<R>,
    pub signal: Continuation,
    /// Entries the site returned, before the adapter dropped any of them.
    pub fetched: usize,
}

impl<R> PageOutcome<R> {
    #[must_use]
    pub fn new(items: Vec<R>, signal: Continuation) -> Self {
        Self {
            fetched: items.len(),
            items,
            signal,
        }
    }

    /// Records how many entries the site sent when some were filtered out while parsing.
    #[must_use]
    pub fn with_fetched(mut self, fetched: usize) -> Self {
        self.fetched = fetched.max(self.items.len());
        self
    }

    /// A page with items and more to come.
    #[must_use]
    pub fn more(items: Vec<R>) -> Self {
        Self::new(items, Continuation::Continue)
    }

    /// A page with items after which nothing else will be requested.
    #[must_use]
    pub fn last(items: Vec<R>) -> Self {
        Self::new(items, Continuation::Stop)
    }

    /// End of pagination without any item.
    #[must_use]
    pub fn stop() -> Self {
        Self::last(Vec::new())
    }

    #[must_use]
    pub fn hard_limit(reason: impl Into<String>) -> Self {
        Self::new(Vec::new(), Continuation::HardLimit(reason.into()))
    }

    /// True when the site itself had nothing on this page.
    pub fn is_empty(&self) -> bool {
        self.fetched == 0
    }
}

/// This trait is the only common interface the download engine knows about a site.
pub trait SiteAdapter: Send + Sync {
    /// One entry of a page, as the site returns it.
    type Raw: Send;

    /// Returns the [`Site`] variant for this adapter
    fn site(&self) -> Site;

    /// Human readable name of what is being downloaded: the tag query or the album title.
    fn title(&self) -> String;

    /// Describes the request for page `page` (starting at 1), including auth if any.
    ///
    /// Errors here mean the job itself is invalid.
    fn build_request(&self, page: u16) -> Result<PageRequest, ExtractorError>;

    /// Turns a response body into raw entries and a continuation signal.
    fn parse_response(&mut self, raw: &str) -> Result<PageOutcome<Self::Raw>, ExtractorError>;

    /// The tags of one raw entry that are checked against the blacklist.
    fn collect_taggable_strings(&self, raw: &Self::Raw) -> Vec<String>;

    /// Converts a raw entry into a [`DownloadItem`]. Returns `None` when the entry has no
    /// downloadable address.
    fn to_item(&self, raw: Self::Raw) -> Option<DownloadItem>;

    /// Fetches and parses one page.
    ///
    /// A non-200 answer or a body that can't be parsed ends the pagination. Only errors that
    /// make the job itself invalid are returned.
    fn fetch_page(
        &mut self,
        client: &FetchClient,
        page: u16,
    ) -> impl Future<Output = Result<PageOutcome<Self::Raw>, ExtractorError>> + Send {
        async move {
            if page == 0 {
                return Err(ExtractorError::ZeroPage);
            }

            let request = self.build_request(page)?;

            let Some(body) = client.execute(&request).await else {
                return Ok(PageOutcome::stop());
            };

            match self.parse_response(&body) {
                Ok(outcome) => Ok(outcome),
                Err(error) => {
                    warn!("{}: failed to parse page {}: {}", self.site(), page, error);
                    Ok(PageOutcome::stop())
                }
            }
        }
    }

    /// Pause between two page requests.
    fn page_delay(&self) -> Duration;

    /// Pause between two file downloads, for sites that need one.
    fn item_delay(&self) -> Option<Duration> {
        None
    }

    /// Expose some bitflags to indicate the features this adapter supports
    fn features() -> ExtractorFeatures;
}

/// Splits a tag query into tags, rejecting queries longer than what `site` accepts.
pub fn split_query(site: Site, query: &str) -> Result<Vec<String>, ExtractorError> {
    let tags = nnd_common::split_tags!(query);

    if let Some(max) = site.max_tags() {
        if tags.len() > max {
            return Err(ExtractorError::TooManyTags {
                current: tags.len(),
                max,
            });
        }
    }

    Ok(tags)
}

#[cfg(test)]
mod test {
    use nnd_common::Site;

    use super::{split_query, Continuation, PageOutcome};
    use crate::error::ExtractorError;

    #[test]
    fn query_splitting() {
        assert_eq!(
            split_query(Site::E621, "  wolf   solo ").unwrap(),
            vec!["wolf", "solo"]
        );
        assert!(split_query(Site::Rule34, "").unwrap().is_empty());

        let long = (0..41).map(|i| format!("t{i}")).collect::<Vec<_>>().join(" ");
        assert!(matches!(
            split_query(Site::E926, &long),
            Err(ExtractorError::TooManyTags { current: 41, max: 40 })
        ));
        assert_eq!(split_query(Site::Furbooru, &long).unwrap().len(), 41);
    }

    #[test]
    fn outcome_helpers() {
        let stop: PageOutcome<u8> = PageOutcome::stop();
        assert!(stop.is_empty());
        assert_eq!(stop.signal, Continuation::Stop);

        let limit: PageOutcome<u8> = PageOutcome::hard_limit("page 750");
        assert_eq!(limit.signal, Continuation::HardLimit("page 750".into()));

        let filtered: PageOutcome<u8> = PageOutcome::more(Vec::new()).with_fetched(50);
        assert!(filtered.items.is_empty());
        assert!(!filtered.is_empty());
    }
}
