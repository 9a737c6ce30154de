//! Adapter for `https://rule34.xxx`
//!
//! Uses the gelbooru style `dapi` with JSON output. `pid` is zero-based, so page 1 of a job is
//! `pid=0`. The API answers with an empty body instead of `[]` when a search has no results.
use std::time::Duration;

use log::debug;
use nnd_common::{
    http::PageRequest,
    item::{extension_from_url, tags::TagMap, DownloadItem},
    join_tags, serde_json, split_tags, Site,
};

use crate::{
    error::ExtractorError,
    extractor::{caps::ExtractorFeatures, split_query, PageOutcome, SiteAdapter},
};

use self::models::Rule34Post;

mod models;

/// Max posts per page the API accepts.
pub const PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone)]
pub struct Rule34Adapter {
    query: String,
    tags: Vec<String>,
    base_url: String,
}

impl Rule34Adapter {
    pub fn new(query: &str) -> Result<Self, ExtractorError> {
        Ok(Self {
            query: query.trim().to_string(),
            tags: split_query(Site::Rule34, query)?,
            base_url: Site::Rule34.base_url().to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl SiteAdapter for Rule34Adapter {
    type Raw = Rule34Post;

    fn site(&self) -> Site {
        Site::Rule34
    }

    fn title(&self) -> String {
        self.query.clone()
    }

    fn build_request(&self, page: u16) -> Result<PageRequest, ExtractorError> {
        let pid = page.checked_sub(1).ok_or(ExtractorError::ZeroPage)?;

        Ok(PageRequest::get(format!("{}/index.php", self.base_url))
            .query("page", "dapi")
            .query("s", "post")
            .query("q", "index")
            .query("pid", pid)
            .query("limit", PAGE_SIZE)
            .query("json", 1)
            .query("tags", join_tags!(self.tags)))
    }

    fn parse_response(&mut self, raw: &str) -> Result<PageOutcome<Rule34Post>, ExtractorError> {
        if raw.trim().is_empty() {
            debug!("Empty body, no more posts");
            return Ok(PageOutcome::stop());
        }

        let posts: Vec<Rule34Post> = serde_json::from_str(raw)?;

        if posts.len() < PAGE_SIZE {
            return Ok(PageOutcome::last(posts));
        }

        Ok(PageOutcome::more(posts))
    }

    fn collect_taggable_strings(&self, raw: &Rule34Post) -> Vec<String> {
        split_tags!(raw.tags)
    }

    fn to_item(&self, raw: Rule34Post) -> Option<DownloadItem> {
        let url = raw.file_url?;

        let format = raw
            .image
            .as_deref()
            .and_then(extension_from_url)
            .or_else(|| extension_from_url(&url))
            .unwrap_or_else(|| "jpg".to_string());

        let tags = TagMap::flat(split_tags!(raw.tags));

        Some(DownloadItem::new(raw.id.to_string(), url, format, tags))
    }

    fn page_delay(&self) -> Duration {
        Duration::from_millis(300)
    }

    fn features() -> ExtractorFeatures {
        ExtractorFeatures::TagSearch | ExtractorFeatures::Paginated
    }
}

#[cfg(test)]
mod test {
    use mockito::Matcher;
    use nnd_common::http::FetchClient;

    use super::Rule34Adapter;
    use crate::{
        error::ExtractorError,
        extractor::{Continuation, SiteAdapter},
    };

    const PAGE: &str = r#"[
        {"id": 5, "file_url": "https://api-cdn.rule34.xxx/images/1/abc.jpeg", "image": "abc.jpeg", "tags": " wolf  solo "},
        {"id": 6, "file_url": null, "image": "def.png", "tags": "fox"}
    ]"#;

    #[test]
    fn parses_posts() {
        let mut adapter = Rule34Adapter::new("wolf").unwrap();
        let outcome = adapter.parse_response(PAGE).unwrap();
        assert_eq!(outcome.signal, Continuation::Stop);

        let mut items = outcome.items.into_iter();
        let first = items.next().unwrap();
        assert_eq!(adapter.collect_taggable_strings(&first), vec!["wolf", "solo"]);

        let item = adapter.to_item(first).unwrap();
        assert_eq!(item.file_name(), "5.jpeg");

        assert!(adapter.to_item(items.next().unwrap()).is_none());
    }

    #[test]
    fn empty_body_is_an_empty_page() {
        let mut adapter = Rule34Adapter::new("nothing_here").unwrap();
        let outcome = adapter.parse_response("").unwrap();
        assert!(outcome.is_empty());
        assert!(adapter.parse_response("[]").unwrap().is_empty());
    }

    #[test]
    fn pid_is_zero_based() {
        let adapter = Rule34Adapter::new("wolf").unwrap();
        let request = adapter.build_request(1).unwrap();
        assert!(request.query.contains(&("pid".to_string(), "0".to_string())));
        assert!(matches!(
            adapter.build_request(0),
            Err(ExtractorError::ZeroPage)
        ));
    }

    #[tokio::test]
    async fn fetches_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/index.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pid".into(), "1".into()),
                Matcher::UrlEncoded("json".into(), "1".into()),
                Matcher::UrlEncoded("tags".into(), "wolf".into()),
            ]))
            .with_status(200)
            .with_body(PAGE)
            .create_async()
            .await;

        let mut adapter = Rule34Adapter::new("wolf")
            .unwrap()
            .with_base_url(server.url());
        let client = FetchClient::new().unwrap();

        let outcome = adapter.fetch_page(&client, 2).await.unwrap();
        assert_eq!(outcome.items.len(), 2);
        mock.assert_async().await;
    }
}
