//! Adapter for `https://furbooru.org`
//!
//! Philomena based search API. Tags are sent comma separated and the optional API key travels as
//! the `key` query parameter. Images hidden from users are dropped while parsing.
use std::time::Duration;

use log::debug;
use nnd_common::{
    config::Credentials,
    http::PageRequest,
    item::{extension_from_url, tags::TagMap, DownloadItem},
    join_tags, serde_json, Site,
};

use crate::{
    error::ExtractorError,
    extractor::{caps::ExtractorFeatures, split_query, PageOutcome, SiteAdapter},
};

use self::models::{FurbooruImage, FurbooruTopLevel};

mod models;

/// Images per page requested from the API.
pub const PAGE_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct FurbooruAdapter {
    query: String,
    tags: Vec<String>,
    api_key: Option<String>,
    base_url: String,
}

impl FurbooruAdapter {
    pub fn new(query: &str, credentials: Option<Credentials>) -> Result<Self, ExtractorError> {
        Ok(Self {
            query: query.trim().to_string(),
            tags: split_query(Site::Furbooru, query)?,
            api_key: credentials.map(|c| c.key).filter(|k| !k.is_empty()),
            base_url: Site::Furbooru.base_url().to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl SiteAdapter for FurbooruAdapter {
    type Raw = FurbooruImage;

    fn site(&self) -> Site {
        Site::Furbooru
    }

    fn title(&self) -> String {
        self.query.clone()
    }

    fn build_request(&self, page: u16) -> Result<PageRequest, ExtractorError> {
        let mut request = PageRequest::get(format!("{}/api/v1/json/search/images", self.base_url))
            .query("q", join_tags!(self.tags, ", "))
            .query("page", page)
            .query("per_page", PAGE_SIZE);

        if let Some(key) = &self.api_key {
            request = request.query("key", key);
        }

        Ok(request)
    }

    fn parse_response(
        &mut self,
        raw: &str,
    ) -> Result<PageOutcome<FurbooruImage>, ExtractorError> {
        let response: FurbooruTopLevel = serde_json::from_str(raw)?;

        if response.total == 0 {
            return Ok(PageOutcome::stop());
        }

        let fetched = response.images.len();
        let images: Vec<FurbooruImage> = response
            .images
            .into_iter()
            .filter(|img| !img.hidden_from_users)
            .collect();

        if images.len() < fetched {
            debug!("Dropped {} hidden images", fetched - images.len());
        }

        let outcome = if fetched < PAGE_SIZE {
            PageOutcome::last(images)
        } else {
            PageOutcome::more(images)
        };

        Ok(outcome.with_fetched(fetched))
    }

    fn collect_taggable_strings(&self, raw: &FurbooruImage) -> Vec<String> {
        raw.tags.clone()
    }

    fn to_item(&self, raw: FurbooruImage) -> Option<DownloadItem> {
        let url = raw.representations.full?;

        let format = raw
            .format
            .or_else(|| extension_from_url(&url))
            .unwrap_or_else(|| "png".to_string());

        Some(DownloadItem::new(
            raw.id.to_string(),
            url,
            format,
            TagMap::flat(raw.tags),
        ))
    }

    fn page_delay(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn features() -> ExtractorFeatures {
        ExtractorFeatures::TagSearch | ExtractorFeatures::Paginated | ExtractorFeatures::Auth
    }
}

#[cfg(test)]
mod test {
    use mockito::Matcher;
    use nnd_common::{config::Credentials, http::FetchClient};

    use super::{FurbooruAdapter, PAGE_SIZE};
    use crate::extractor::{Continuation, SiteAdapter};

    const PAGE: &str = r#"{"total": 3, "images": [
        {"id": 1, "format": "png", "hidden_from_users": false,
         "representations": {"full": "https://furbooru.org/img/view/1.png", "thumb": "t"},
         "tags": ["safe", "wolf"]},
        {"id": 2, "format": "jpg", "hidden_from_users": true,
         "representations": {"full": "https://furbooru.org/img/view/2.jpg"}, "tags": []},
        {"id": 3, "format": "gif", "hidden_from_users": false, "representations": {}, "tags": ["fox"]}
    ]}"#;

    #[test]
    fn drops_hidden_images() {
        let mut adapter = FurbooruAdapter::new("wolf", None).unwrap();
        let outcome = adapter.parse_response(PAGE).unwrap();

        assert_eq!(outcome.signal, Continuation::Stop);
        assert_eq!(outcome.items.len(), 2);
        assert_eq!(outcome.fetched, 3);
        assert_eq!(
            adapter.collect_taggable_strings(&outcome.items[0]),
            vec!["safe", "wolf"]
        );

        let mut items = outcome.items.into_iter();
        assert_eq!(adapter.to_item(items.next().unwrap()).unwrap().file_name(), "1.png");
        assert!(adapter.to_item(items.next().unwrap()).is_none());
    }

    #[test]
    fn hidden_only_page_is_not_empty() {
        let images: Vec<String> = (0..PAGE_SIZE)
            .map(|i| format!(r#"{{"id": {i}, "format": "png", "hidden_from_users": true, "tags": []}}"#))
            .collect();
        let body = format!(r#"{{"total": 51, "images": [{}]}}"#, images.join(","));

        let mut adapter = FurbooruAdapter::new("wolf", None).unwrap();
        let outcome = adapter.parse_response(&body).unwrap();

        assert!(outcome.items.is_empty());
        assert!(!outcome.is_empty());
        assert_eq!(outcome.signal, Continuation::Continue);
    }

    #[test]
    fn zero_total_is_an_empty_page() {
        let mut adapter = FurbooruAdapter::new("nothing", None).unwrap();
        let outcome = adapter
            .parse_response(r#"{"total": 0, "images": []}"#)
            .unwrap();
        assert!(outcome.is_empty());
    }

    #[tokio::test]
    async fn fetches_with_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/json/search/images")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "wolf, solo".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("per_page".into(), "50".into()),
                Matcher::UrlEncoded("key".into(), "abc".into()),
            ]))
            .with_status(200)
            .with_body(PAGE)
            .create_async()
            .await;

        let creds = Credentials {
            user: String::new(),
            key: "abc".into(),
        };
        let mut adapter = FurbooruAdapter::new("wolf solo", Some(creds))
            .unwrap()
            .with_base_url(server.url());
        let client = FetchClient::new().unwrap();

        let outcome = adapter.fetch_page(&client, 1).await.unwrap();
        assert_eq!(outcome.items.len(), 2);
        mock.assert_async().await;
    }
}
