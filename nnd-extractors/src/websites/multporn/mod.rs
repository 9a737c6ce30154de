//! Adapter for `https://multporn.net` comics, galleries and games
//!
//! Links look like `https://multporn.net/<category>/<title>`. The page itself only gives away
//! the drupal node id of the content, through its shortlink. The image list comes from the
//! juicebox gallery XML of that node, which needs a second request.
use std::time::Duration;

use log::{debug, warn};
use nnd_common::{
    http::{FetchClient, PageRequest},
    item::{extension_from_url, tags::TagMap, DownloadItem},
    reqwest::header::{HeaderMap, LINK},
    Site,
};
use once_cell::sync::Lazy;
use quick_xml::{events::Event, Reader};
use regex::Regex;

use crate::{
    error::ExtractorError,
    extractor::{caps::ExtractorFeatures, PageOutcome, SiteAdapter},
};

static SHORTLINK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<link\s+rel="shortlink"\s+href="([^"]+)"\s*/?>"#).unwrap());

static SHORTLINK_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<([^>]+)>\s*;\s*rel="shortlink""#).unwrap());

/// One image of the gallery, numbered from 1 in gallery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub position: usize,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct MultpornAdapter {
    url: String,
    title: String,
    field: &'static str,
    base_url: String,
}

impl MultpornAdapter {
    pub fn new(url: &str) -> Result<Self, ExtractorError> {
        let url = url.trim();
        let parts: Vec<&str> = url.split('/').collect();

        let (Some(category), Some(title)) = (parts.get(3), parts.get(4).filter(|t| !t.is_empty()))
        else {
            return Err(ExtractorError::InvalidUrl {
                url: url.to_string(),
                reason: "expected <category>/<title> after the host".to_string(),
            });
        };

        Ok(Self {
            url: url.to_string(),
            title: (*title).to_string(),
            field: gallery_field(category)?,
            base_url: Site::Multporn.base_url().to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn gallery_url(&self, node: &str) -> String {
        format!(
            "{}/juicebox/xml/field/node/{}/{}/full",
            self.base_url, node, self.field
        )
    }
}

/// Maps the category segment of a link to the node field that holds its images.
fn gallery_field(category: &str) -> Result<&'static str, ExtractorError> {
    match category {
        "comics" | "hentai_manga" | "gay_porn_comics" | "gif" | "humor" => Ok("field_com_pages"),
        "pictures" | "hentai" => Ok("field_img"),
        "rule_63" => Ok("field_rule_63_img"),
        "games" => Ok("field_screenshots"),
        "video" => Err(ExtractorError::UnsupportedCategory {
            category: "video (videos are not supported)".to_string(),
        }),
        other => Err(ExtractorError::UnsupportedCategory {
            category: other.to_string(),
        }),
    }
}

/// Finds the node id, first in the `Link` header and then in the page markup.
fn find_node_id(headers: &HeaderMap, html: &str) -> Option<String> {
    let from_header = headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| SHORTLINK_HEADER.captures(value))
        .map(|caps| caps[1].to_string());

    let link = from_header.or_else(|| SHORTLINK_TAG.captures(html).map(|caps| caps[1].to_string()))?;

    node_from_link(&link)
}

/// `https://multporn.net/node/1234` → `1234`
fn node_from_link(link: &str) -> Option<String> {
    link.split(['?', '#'])
        .next()?
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// Reads the `linkURL` attribute of every `image` element of a juicebox document.
fn parse_gallery(xml: &str) -> Result<Vec<String>, ExtractorError> {
    let mut reader = Reader::from_str(xml.trim());
    let mut links = Vec::new();

    loop {
        match reader.read_event() {
            Err(e) => {
                return Err(ExtractorError::XmlDecodeFail {
                    message: format!("at position {}: {e}", reader.buffer_position()),
                })
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == b"image" => {
                for attr in e.attributes().filter_map(Result::ok) {
                    if attr.key.as_ref() != b"linkURL" {
                        continue;
                    }
                    let value = attr
                        .unescape_value()
                        .map_err(|e| ExtractorError::XmlDecodeFail {
                            message: e.to_string(),
                        })?;
                    if !value.trim().is_empty() {
                        links.push(value.trim().to_string());
                    }
                }
            }
            _ => (),
        }
    }

    Ok(links)
}

impl SiteAdapter for MultpornAdapter {
    type Raw = GalleryImage;

    fn site(&self) -> Site {
        Site::Multporn
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    /// The first of the two requests, the content page.
    fn build_request(&self, _page: u16) -> Result<PageRequest, ExtractorError> {
        Ok(PageRequest::get(&self.url))
    }

    fn parse_response(&mut self, raw: &str) -> Result<PageOutcome<GalleryImage>, ExtractorError> {
        let images = parse_gallery(raw)?
            .into_iter()
            .enumerate()
            .map(|(idx, url)| GalleryImage {
                position: idx + 1,
                url,
            })
            .collect();

        Ok(PageOutcome::last(images))
    }

    fn collect_taggable_strings(&self, _raw: &GalleryImage) -> Vec<String> {
        Vec::new()
    }

    fn to_item(&self, raw: GalleryImage) -> Option<DownloadItem> {
        let url = if raw.url.starts_with('/') {
            format!("{}{}", self.base_url, raw.url)
        } else {
            raw.url
        };

        let format = extension_from_url(&url).unwrap_or_else(|| "jpg".to_string());

        Some(DownloadItem::new(
            raw.position.to_string(),
            url,
            format,
            TagMap::new(),
        ))
    }

    fn fetch_page(
        &mut self,
        client: &FetchClient,
        page: u16,
    ) -> impl std::future::Future<Output = Result<PageOutcome<GalleryImage>, ExtractorError>> + Send
    {
        async move {
            if page == 0 {
                return Err(ExtractorError::ZeroPage);
            }

            // Everything is listed at once
            if page > 1 {
                return Ok(PageOutcome::stop());
            }

            let Some((html, headers)) = client.fetch_text_with_headers(&self.url).await else {
                return Ok(PageOutcome::stop());
            };

            let Some(node) = find_node_id(&headers, &html) else {
                warn!("Node link not found on {}", self.url);
                return Ok(PageOutcome::stop());
            };
            debug!("{} is node {}", self.title, node);

            let Some(xml) = client.fetch_text(&self.gallery_url(&node)).await else {
                return Ok(PageOutcome::stop());
            };

            match self.parse_response(&xml) {
                Ok(outcome) => Ok(outcome),
                Err(error) => {
                    warn!("Failed to read gallery of node {}: {}", node, error);
                    Ok(PageOutcome::stop())
                }
            }
        }
    }

    fn page_delay(&self) -> Duration {
        Duration::ZERO
    }

    fn item_delay(&self) -> Option<Duration> {
        Some(Duration::from_secs(1))
    }

    fn features() -> ExtractorFeatures {
        ExtractorFeatures::UrlDownload
    }
}

#[cfg(test)]
mod test {
    use nnd_common::{
        http::FetchClient,
        reqwest::header::{HeaderMap, HeaderValue, LINK},
    };

    use super::{find_node_id, gallery_field, node_from_link, parse_gallery, MultpornAdapter};
    use crate::{
        error::ExtractorError,
        extractor::{Continuation, SiteAdapter},
    };

    const GALLERY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<juiceboxgallery galleryTitle="Some comic">
  <image imageURL="https://multporn.net/sites/default/files/1_thumb.jpg" linkURL="https://multporn.net/sites/default/files/comics/some/01.jpg">
    <title>1</title>
  </image>
  <image linkURL="https://multporn.net/sites/default/files/comics/some/02.PNG?itok=x"/>
  <image imageURL="no_link.jpg"/>
  <image linkURL="/sites/default/files/comics/some/03.gif"></image>
</juiceboxgallery>"#;

    #[test]
    fn categories() {
        assert_eq!(gallery_field("comics").unwrap(), "field_com_pages");
        assert_eq!(gallery_field("humor").unwrap(), "field_com_pages");
        assert_eq!(gallery_field("hentai").unwrap(), "field_img");
        assert_eq!(gallery_field("rule_63").unwrap(), "field_rule_63_img");
        assert_eq!(gallery_field("games").unwrap(), "field_screenshots");
        assert!(matches!(
            gallery_field("video"),
            Err(ExtractorError::UnsupportedCategory { .. })
        ));
        assert!(matches!(
            MultpornAdapter::new("https://multporn.net/blogs/something"),
            Err(ExtractorError::UnsupportedCategory { .. })
        ));
        assert!(matches!(
            MultpornAdapter::new("https://multporn.net/comics"),
            Err(ExtractorError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn node_ids() {
        assert_eq!(node_from_link("https://multporn.net/node/4321").unwrap(), "4321");
        assert_eq!(node_from_link("https://multporn.net/node/4321/").unwrap(), "4321");
        assert!(node_from_link("https://multporn.net/comics/abc").is_none());

        let html = r#"<head><link rel="shortlink" href="https://multporn.net/node/77" />"#;
        assert_eq!(find_node_id(&HeaderMap::new(), html).unwrap(), "77");

        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                r#"<https://multporn.net/comics/x>; rel="canonical", <https://multporn.net/node/99>; rel="shortlink""#,
            ),
        );
        assert_eq!(find_node_id(&headers, html).unwrap(), "99");

        assert!(find_node_id(&HeaderMap::new(), "<html></html>").is_none());
    }

    #[test]
    fn reads_gallery() {
        let links = parse_gallery(GALLERY).unwrap();
        assert_eq!(links.len(), 3);

        let mut adapter = MultpornAdapter::new("https://multporn.net/comics/some_comic").unwrap();
        let outcome = adapter.parse_response(GALLERY).unwrap();
        assert_eq!(outcome.signal, Continuation::Stop);

        let items: Vec<_> = outcome
            .items
            .into_iter()
            .filter_map(|raw| adapter.to_item(raw))
            .collect();

        assert_eq!(items[0].file_name(), "1.jpg");
        assert_eq!(items[1].file_name(), "2.png");
        assert_eq!(
            items[2].source_address,
            "https://multporn.net/sites/default/files/comics/some/03.gif"
        );

        assert!(parse_gallery("<juiceboxgallery><image></juiceboxgallery>").is_err());
    }

    #[tokio::test]
    async fn page_then_gallery() {
        let mut server = mockito::Server::new_async().await;
        let page = server
            .mock("GET", "/comics/some_comic")
            .with_status(200)
            .with_body(r#"<html><head><link rel="shortlink" href="https://multporn.net/node/1234" /></head></html>"#)
            .create_async()
            .await;
        let gallery = server
            .mock("GET", "/juicebox/xml/field/node/1234/field_com_pages/full")
            .with_status(200)
            .with_body(GALLERY)
            .create_async()
            .await;

        let mut adapter = MultpornAdapter::new(&format!("{}/comics/some_comic", server.url()))
            .unwrap()
            .with_base_url(server.url());
        let client = FetchClient::new().unwrap();

        let outcome = adapter.fetch_page(&client, 1).await.unwrap();
        assert_eq!(outcome.items.len(), 3);
        assert_eq!(outcome.signal, Continuation::Stop);

        assert!(adapter.fetch_page(&client, 2).await.unwrap().is_empty());

        page.assert_async().await;
        gallery.assert_async().await;
    }

    #[tokio::test]
    async fn missing_node_ends_the_job() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/pictures/nothing")
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let mut adapter = MultpornAdapter::new(&format!("{}/pictures/nothing", server.url()))
            .unwrap()
            .with_base_url(server.url());
        let client = FetchClient::new().unwrap();

        let outcome = adapter.fetch_page(&client, 1).await.unwrap();
        assert!(outcome.is_empty());
    }
}
