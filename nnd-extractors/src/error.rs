use thiserror::Error;

/// Enumerates the possible errors that can arise while building or parsing a page of results.
///
/// Errors raised by [`build_request`](crate::extractor::SiteAdapter::build_request) reject the
/// job before any network activity. Errors raised while parsing are turned into an end of
/// pagination by the default [`fetch_page`](crate::extractor::SiteAdapter::fetch_page).
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// An attempt was made to fetch page zero. Pages start at one.
    #[error("Page number cannot be zero.")]
    ZeroPage,

    /// The number of tags exceeds the limit supported by the site.
    #[error("Too many tags, got: {current} while this site only supports a max of {max}")]
    TooManyTags { current: usize, max: usize },

    /// An attempt was made to use an adapter with a site it does not support.
    #[error("Invalid site selected for this adapter: {site}")]
    InvalidSite { site: String },

    /// The user supplied link doesn't have the shape the site uses.
    #[error("Invalid link {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The link points to a kind of content the site adapter can't download.
    #[error("Unsupported content type: {category}")]
    UnsupportedCategory { category: String },

    /// The server answered with something that could not be understood.
    #[error("Site returned an invalid response")]
    InvalidServerResponse,

    /// Error while deserializing a JSON response.
    #[error("Error while deserializing JSON: {0}")]
    JsonSerializeFail(#[from] serde_json::Error),

    /// Error while reading an XML document.
    #[error("Error while reading XML: {message}")]
    XmlDecodeFail { message: String },

    /// A response is missing a field that is required to continue.
    #[error("Response is missing an essential field {field}")]
    MissingField { field: String },
}
