//! Adapter for `https://yiffer.xyz` comics
//!
//! The comic API only reports how many pages a comic has. The pages themselves are static files
//! named after their zero-padded number, so the whole comic comes out of a single request.
use std::time::Duration;

use nnd_common::{
    http::PageRequest,
    item::{tags::TagMap, DownloadItem},
    serde::{self, Deserialize},
    serde_json, Site,
};

use crate::{
    error::ExtractorError,
    extractor::{caps::ExtractorFeatures, PageOutcome, SiteAdapter},
};

const STATIC_URL: &str = "https://static.yiffer.xyz";

#[derive(Deserialize, Debug)]
#[serde(crate = "self::serde")]
struct ComicInfo {
    #[serde(rename = "numberOfPages", default)]
    number_of_pages: i64,
}

/// One page of a comic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComicPage(pub u32);

impl ComicPage {
    /// Pages are numbered `001`, `002`, ... on the static server.
    pub fn file_stem(self) -> String {
        format!("{:03}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct YifferAdapter {
    title: String,
    base_url: String,
    static_url: String,
}

impl YifferAdapter {
    /// Takes the comic title from the first path segment of `url`.
    pub fn new(url: &str) -> Result<Self, ExtractorError> {
        let decoded = urlencoding::decode(url.trim()).map_err(|e| ExtractorError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let title = decoded
            .split('/')
            .nth(3)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExtractorError::InvalidUrl {
                url: url.to_string(),
                reason: "missing comic name".to_string(),
            })?;

        Ok(Self {
            title: title.to_string(),
            base_url: Site::Yiffer.base_url().to_string(),
            static_url: STATIC_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_static_url(mut self, static_url: impl Into<String>) -> Self {
        self.static_url = static_url.into();
        self
    }
}

impl SiteAdapter for YifferAdapter {
    type Raw = ComicPage;

    fn site(&self) -> Site {
        Site::Yiffer
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn build_request(&self, _page: u16) -> Result<PageRequest, ExtractorError> {
        Ok(PageRequest::get(format!(
            "{}/api/comics/{}",
            self.base_url,
            urlencoding::encode(&self.title)
        )))
    }

    fn parse_response(&mut self, raw: &str) -> Result<PageOutcome<ComicPage>, ExtractorError> {
        let info: ComicInfo = serde_json::from_str(raw)?;

        let count = u32::try_from(info.number_of_pages).unwrap_or(0);

        Ok(PageOutcome::last((1..=count).map(ComicPage).collect()))
    }

    fn collect_taggable_strings(&self, _raw: &ComicPage) -> Vec<String> {
        Vec::new()
    }

    fn to_item(&self, raw: ComicPage) -> Option<DownloadItem> {
        let stem = raw.file_stem();
        let url = format!(
            "{}/comics/{}/{}.jpg",
            self.static_url,
            urlencoding::encode(&self.title),
            stem
        );

        Some(DownloadItem::new(stem, url, "jpg", TagMap::new()))
    }

    fn page_delay(&self) -> Duration {
        Duration::ZERO
    }

    fn item_delay(&self) -> Option<Duration> {
        Some(Duration::from_millis(500))
    }

    fn features() -> ExtractorFeatures {
        ExtractorFeatures::UrlDownload
    }
}

#[cfg(test)]
mod test {
    use nnd_common::http::FetchClient;

    use super::{ComicPage, YifferAdapter};
    use crate::extractor::{Continuation, SiteAdapter};

    #[test]
    fn title_from_link() {
        let adapter = YifferAdapter::new("https://yiffer.xyz/Some%20Comic%20Name").unwrap();
        assert_eq!(adapter.title(), "Some Comic Name");

        assert!(YifferAdapter::new("https://yiffer.xyz/").is_err());
    }

    #[test]
    fn pages_are_zero_padded() {
        assert_eq!(ComicPage(7).file_stem(), "007");
        assert_eq!(ComicPage(42).file_stem(), "042");
        assert_eq!(ComicPage(123).file_stem(), "123");

        let adapter = YifferAdapter::new("https://yiffer.xyz/Some Comic").unwrap();
        let item = adapter.to_item(ComicPage(3)).unwrap();
        assert_eq!(
            item.source_address,
            "https://static.yiffer.xyz/comics/Some%20Comic/003.jpg"
        );
        assert_eq!(item.file_name(), "003.jpg");
    }

    #[tokio::test]
    async fn one_request_for_the_whole_comic() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/comics/Some_Comic")
            .with_status(200)
            .with_body(r#"{"name": "Some_Comic", "numberOfPages": 12}"#)
            .create_async()
            .await;

        let mut adapter = YifferAdapter::new("https://yiffer.xyz/Some_Comic")
            .unwrap()
            .with_base_url(server.url());
        let client = FetchClient::new().unwrap();

        let outcome = adapter.fetch_page(&client, 1).await.unwrap();
        assert_eq!(outcome.items.len(), 12);
        assert_eq!(outcome.items[11], ComicPage(12));
        assert_eq!(outcome.signal, Continuation::Stop);
        mock.assert_async().await;
    }

    #[test]
    fn zero_pages_is_empty() {
        let mut adapter = YifferAdapter::new("https://yiffer.xyz/Empty").unwrap();
        assert!(adapter
            .parse_response(r#"{"numberOfPages": 0}"#)
            .unwrap()
            .is_empty());
    }
}
