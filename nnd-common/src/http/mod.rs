//! HTTP fetch client shared by every site adapter and the download engine.
//!
//! All public methods follow the same contract: any transport error or any status other than
//! `200 OK` is logged and turned into `None` (or `false`), never raised to the caller. The
//! `Result` returning variants stay private to this module.
//!
//! When proxies are configured, one [`Client`] is built for each of them and every request picks
//! the next one in round-robin order.
use std::{
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use futures::StreamExt;
use log::{debug, warn};
use reqwest::{header::HeaderMap, Client, Proxy, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::{
    fs::{create_dir_all, remove_file, OpenOptions},
    io::{AsyncWriteExt, BufWriter},
};

use crate::Site;

use self::error::FetchError;

pub mod error;

/// Whole-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Connection establishment timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Description of a single page-listing call, built by a site adapter and run by
/// [`FetchClient::execute`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub basic_auth: Option<(String, String)>,
}

impl PageRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            basic_auth: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            body: Some(body),
            ..Self::get(url)
        }
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn header(mut self, key: &str, value: impl ToString) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn basic_auth(mut self, user: &str, key: &str) -> Self {
        self.basic_auth = Some((user.to_string(), key.to_string()));
        self
    }
}

/// Rotating set of HTTP clients.
#[derive(Debug)]
pub struct FetchClient {
    clients: Vec<Client>,
    cursor: AtomicUsize,
}

impl FetchClient {
    /// Builds a client that talks directly to the sites.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_proxies(&[])
    }

    /// Builds one client per proxy address. An empty list means direct connections.
    pub fn with_proxies(proxies: &[String]) -> Result<Self, FetchError> {
        let user_agent = Site::user_agent();

        let base = || {
            Client::builder()
                .user_agent(user_agent.clone())
                .timeout(REQUEST_TIMEOUT)
                .connect_timeout(CONNECT_TIMEOUT)
        };

        let clients = if proxies.is_empty() {
            vec![base()
                .build()
                .map_err(|source| FetchError::ClientBuild { source })?]
        } else {
            proxies
                .iter()
                .map(|address| {
                    let proxy =
                        Proxy::all(address.as_str()).map_err(|source| FetchError::InvalidProxy {
                            address: address.clone(),
                            source,
                        })?;
                    base()
                        .proxy(proxy)
                        .build()
                        .map_err(|source| FetchError::ClientBuild { source })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        debug!("Fetch client ready with {} route(s)", clients.len());

        Ok(Self {
            clients,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Number of proxies (or 1 for a direct client) the requests rotate over.
    #[inline]
    pub fn routes(&self) -> usize {
        self.clients.len()
    }

    fn next_client(&self) -> &Client {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        &self.clients[idx]
    }

    async fn send(url: &str, request: RequestBuilder) -> Result<Response, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|source| FetchError::ConnectionFail {
                url: url.to_string(),
                source,
            })?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }

    async fn try_text(url: &str, response: Response) -> Result<String, FetchError> {
        response.text().await.map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn try_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, FetchError> {
        response.json::<T>().await.map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Logs a failure and turns the result into an [`Option`].
    fn report<T>(what: &str, result: Result<T, FetchError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(error) => {
                warn!("{what} failed: {error}");
                None
            }
        }
    }

    /// GET a page and return its body as text.
    pub async fn fetch_text(&self, url: &str) -> Option<String> {
        let result = async {
            let response = Self::send(url, self.next_client().get(url)).await?;
            Self::try_text(url, response).await
        }
        .await;

        Self::report("Page fetch", result)
    }

    /// GET a page and return its body together with the response headers.
    pub async fn fetch_text_with_headers(&self, url: &str) -> Option<(String, HeaderMap)> {
        let result = async {
            let response = Self::send(url, self.next_client().get(url)).await?;
            let headers = response.headers().clone();
            Ok::<_, FetchError>((Self::try_text(url, response).await?, headers))
        }
        .await;

        Self::report("Page fetch", result)
    }

    /// GET a JSON document.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        let result = async {
            let response = Self::send(url, self.next_client().get(url)).await?;
            Self::try_json(url, response).await
        }
        .await;

        Self::report("JSON fetch", result)
    }

    /// POST a JSON body and decode the JSON answer.
    pub async fn post_json<T: DeserializeOwned>(&self, url: &str, body: &Value) -> Option<T> {
        let result = async {
            let response = Self::send(url, self.next_client().post(url).json(body)).await?;
            Self::try_json(url, response).await
        }
        .await;

        Self::report("JSON post", result)
    }

    /// Runs a [`PageRequest`] and returns the raw body text.
    pub async fn execute(&self, request: &PageRequest) -> Option<String> {
        let client = self.next_client();

        let mut builder = match request.method {
            Method::Get => client.get(&request.url),
            Method::Post => client.post(&request.url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        if let Some((user, key)) = &request.basic_auth {
            builder = builder.basic_auth(user, Some(key));
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!("{:?} {}", request.method, request.url);

        let result = async {
            let response = Self::send(&request.url, builder).await?;
            Self::try_text(&request.url, response).await
        }
        .await;

        Self::report("Page request", result)
    }

    /// Streams `url` into `path`, creating missing parent directories.
    ///
    /// Returns `false` on any failure, after removing whatever part of the file was written.
    /// Existing files are overwritten; skipping them is up to the caller.
    pub async fn download_to_file(&self, url: &str, path: &Path) -> bool {
        match self.try_download(url, path).await {
            Ok(size) => {
                debug!("Saved {} ({} bytes) to {}", url, size, path.display());
                true
            }
            Err(error) => {
                warn!("Download of {url} failed: {error}");
                if path.exists() {
                    if let Err(error) = remove_file(path).await {
                        debug!("Failed to remove partial file {}: {}", path.display(), error);
                    }
                }
                false
            }
        }
    }

    async fn try_download(&self, url: &str, path: &Path) -> Result<u64, FetchError> {
        let response = Self::send(url, self.next_client().get(url)).await?;

        if let Some(parent) = path.parent() {
            create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .await?;

        let mut bw = BufWriter::new(file);
        let mut stream = response.bytes_stream();
        let mut written = 0;

        while let Some(item) = stream.next().await {
            let mut chunk = item.map_err(|e| FetchError::ChunkDownloadFail {
                message: e.to_string(),
            })?;
            written += chunk.len() as u64;
            bw.write_all_buf(&mut chunk).await?;
        }

        bw.flush().await?;

        Ok(written)
    }
}
