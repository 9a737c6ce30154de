//! Adapters for every supported website.
//! # Websites
//!
//! There are two kinds of jobs:
//!
//! * **Tag searches** page through the results of a tag query: [`e621`] (also e6ai and e926),
//!   [`rule34`] and [`furbooru`].
//! * **Link downloads** fetch one album or comic: [`luscious`], [`yiffer`] and [`multporn`].
//!
//! ## Example with the e621 adapter
//! ```rust,no_run
//! use nnd_common::{http::FetchClient, Site};
//! use nnd_extractors::prelude::*;
//!
//! async fn first_page() -> Result<(), ExtractorError> {
//!     let client = FetchClient::new().expect("client");
//!
//!     let mut adapter = E6Adapter::new(Site::E621, "wolf solo", None)?;
//!
//!     let outcome = adapter.fetch_page(&client, 1).await?;
//!
//!     for raw in outcome.items {
//!         if let Some(item) = adapter.to_item(raw) {
//!             println!("{} -> {}", item.file_name(), item.source_address);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
pub mod e621;

pub mod furbooru;

pub mod luscious;

pub mod multporn;

pub mod rule34;

pub mod yiffer;
