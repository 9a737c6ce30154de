use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {source}")]
    ClientBuild { source: reqwest::Error },

    #[error("Invalid proxy address {address}: {source}")]
    InvalidProxy {
        address: String,
        source: reqwest::Error,
    },

    #[error("Failed to connect to {url}: {source}")]
    ConnectionFail { url: String, source: reqwest::Error },

    #[error("{url} returned status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    Decode { url: String, source: reqwest::Error },

    #[error("Error while fetching chunk: {message}")]
    ChunkDownloadFail { message: String },

    #[error("Failed to access file: {source}")]
    FileIOError {
        #[from]
        source: io::Error,
    },
}
