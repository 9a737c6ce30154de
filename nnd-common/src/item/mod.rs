//! Main representation of a downloadable file
//!
//! # DownloadItem
//! A [`DownloadItem` struct](DownloadItem) is the uniform record every site adapter produces from
//! one entry of a page of results, no matter if the site speaks JSON, GraphQL or plain HTML.
//!
//! Items are immutable once created; the engine consumes them and drops them after the file
//! write attempt.
use serde::{Deserialize, Serialize};

use std::fmt::Debug;

use crate::sanitize::sanitize_file_name;

use self::tags::TagMap;

pub mod tags;

/// Extension used when neither the site nor the URL gives a usable one.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Catchall model for the necessary parts of a remote file to properly identify, download and save it.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadItem {
    /// Identifier given by the site. Used as file name and as the key inside the seen-id store.
    pub id: String,
    /// Direct URL of the original file.
    pub source_address: String,
    /// File extension, without the leading dot.
    pub format: String,
    /// Tags of the item grouped by category.
    ///
    /// Exported as-is into the AI-training side-car file.
    pub tags: TagMap,
}

impl Debug for DownloadItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadItem")
            .field("ID", &self.id)
            .field("Download URL", &self.source_address)
            .field("File Extension", &self.format)
            .field("Tag Categories", &self.tags.len())
            .finish()
    }
}

impl DownloadItem {
    pub fn new<I, A, F>(id: I, source_address: A, format: F, tags: TagMap) -> Self
    where
        I: Into<String>,
        A: Into<String>,
        F: Into<String>,
    {
        Self {
            id: id.into(),
            source_address: source_address.into(),
            format: format.into(),
            tags,
        }
    }

    /// Get the final file name of the item for saving.
    ///
    /// Both parts come from the site, so the result never holds a path separator.
    pub fn file_name(&self) -> String {
        format!("{}.{}", sanitize_file_name(&self.id), self.safe_extension())
    }

    /// Name of the AI-training side-car file of this item.
    #[inline]
    pub fn meta_file_name(&self) -> String {
        format!("{}.json", sanitize_file_name(&self.id))
    }

    fn safe_extension(&self) -> String {
        let valid = |ext: &str| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric());

        if valid(&self.format) {
            return self.format.clone();
        }

        extension_from_url(&self.source_address)
            .filter(|ext| valid(ext))
            .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
    }
}

/// Extracts the extension from the last path segment of an URL, ignoring query strings.
///
/// Returns `None` when the last segment carries no dot.
pub fn extension_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = segment.rsplit_once('.')?;

    if ext.is_empty() {
        return None;
    }

    Some(ext.to_lowercase())
}
