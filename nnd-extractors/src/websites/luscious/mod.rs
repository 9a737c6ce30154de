//! Adapter for `https://luscious.net` albums
//!
//! Albums are listed through the `PictureListInsideAlbum` GraphQL operation, 50 pictures at a
//! time. Accepted links look like `https://www.luscious.net/albums/<title>_<id>/` or
//! `https://www.luscious.net/pictures/album/<title>_<id>/...`.
use std::time::Duration;

use nnd_common::{
    http::PageRequest,
    item::{extension_from_url, tags::TagMap, DownloadItem},
    sanitize::sanitize_file_name,
    serde_json::{self, json},
    Site,
};

use crate::{
    error::ExtractorError,
    extractor::{caps::ExtractorFeatures, PageOutcome, SiteAdapter},
};

use self::models::{LusciousPicture, LusciousTopLevel};

mod models;

const OPERATION: &str = "PictureListInsideAlbum";

const PICTURE_LIST_QUERY: &str = r"
query PictureListInsideAlbum($input: PictureListInput!) {
  picture {
    list(input: $input) {
      info {
        page
        has_next_page
        has_previous_page
        total_items
        total_pages
        items_per_page
      }
      items {
        id
        title
        url_to_original
        position
      }
    }
  }
}
";

/// Pictures per page requested from the API.
pub const PAGE_SIZE: u16 = 50;

#[derive(Debug, Clone)]
pub struct LusciousAdapter {
    title: String,
    album_id: String,
    base_url: String,
}

impl LusciousAdapter {
    pub fn new(url: &str) -> Result<Self, ExtractorError> {
        let (title, album_id) = parse_album_url(url)?;

        Ok(Self {
            title,
            album_id,
            base_url: Site::Luscious.base_url().to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Extracts `(title, album id)` from an album or picture link.
fn parse_album_url(url: &str) -> Result<(String, String), ExtractorError> {
    let invalid = |reason: &str| ExtractorError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = url.trim().split('/').collect();

    let slug = match parts.get(3).copied() {
        Some("pictures") => parts.get(5),
        Some("album" | "albums") => parts.get(4),
        _ => return Err(invalid("not an album link")),
    }
    .copied()
    .filter(|s| !s.is_empty())
    .ok_or_else(|| invalid("missing album name"))?;

    let (title, id) = slug.rsplit_once('_').unwrap_or(("", slug));

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("could not find the album id"));
    }

    let title = if title.is_empty() { id } else { title };

    Ok((title.to_string(), id.to_string()))
}

impl SiteAdapter for LusciousAdapter {
    type Raw = LusciousPicture;

    fn site(&self) -> Site {
        Site::Luscious
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn build_request(&self, page: u16) -> Result<PageRequest, ExtractorError> {
        let body = json!({
            "id": "6",
            "operationName": OPERATION,
            "query": PICTURE_LIST_QUERY,
            "variables": {
                "input": {
                    "filters": [{"name": "album_id", "value": self.album_id}],
                    "display": "position",
                    "items_per_page": PAGE_SIZE,
                    "page": page
                }
            }
        });

        Ok(
            PageRequest::post_json(format!("{}/graphql/nobatch/", self.base_url), body)
                .query("operationName", OPERATION)
                .header("Accept", "application/json"),
        )
    }

    fn parse_response(
        &mut self,
        raw: &str,
    ) -> Result<PageOutcome<LusciousPicture>, ExtractorError> {
        let response: LusciousTopLevel = serde_json::from_str(raw)?;
        let list = response.data.picture.list;

        if list.info.page.unwrap_or(1) > list.info.total_pages.max(1) || list.items.is_empty() {
            return Ok(PageOutcome::stop());
        }

        if list.info.has_next_page {
            Ok(PageOutcome::more(list.items))
        } else {
            Ok(PageOutcome::last(list.items))
        }
    }

    fn collect_taggable_strings(&self, _raw: &LusciousPicture) -> Vec<String> {
        Vec::new()
    }

    fn to_item(&self, raw: LusciousPicture) -> Option<DownloadItem> {
        let id = raw.id();
        let url = raw.url_to_original?;

        let name = raw
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("image_{id}"));

        let format = extension_from_url(&url).unwrap_or_else(|| "jpg".to_string());

        Some(DownloadItem::new(
            format!("{}_{}", sanitize_file_name(&name), id),
            url,
            format,
            TagMap::new(),
        ))
    }

    fn page_delay(&self) -> Duration {
        Duration::from_millis(500)
    }

    fn item_delay(&self) -> Option<Duration> {
        Some(Duration::from_millis(500))
    }

    fn features() -> ExtractorFeatures {
        ExtractorFeatures::UrlDownload | ExtractorFeatures::Paginated
    }
}
