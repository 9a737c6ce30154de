use std::io;

use nnd_common::{config::ConfigError, http::error::FetchError};
use nnd_extractors::error::ExtractorError;
use thiserror::Error;

#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum DownloaderError {
    #[error("{source}")]
    ExtractorError {
        #[from]
        source: ExtractorError,
    },

    #[error("{source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to set up the HTTP client: {source}")]
    ClientError {
        #[from]
        source: FetchError,
    },

    #[error("Failed to access seen-id store {path}: {source}")]
    SeenStoreError { path: String, source: io::Error },

    #[error("Invalid job: {message}")]
    InvalidJob { message: String },
}

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Job queue worker is not running")]
    WorkerGone,

    #[error("Job rejected: {source}")]
    InvalidJob {
        #[from]
        source: DownloaderError,
    },
}
