//! All site-specific logic for paging through the supported websites.
//!
//! Each site lives in its own module under [`websites`] and implements
//! [`SiteAdapter`](extractor::SiteAdapter). The download engine in `nnd-core` only talks to that
//! trait.

extern crate nnd_common;

pub mod blacklist;
pub mod error;
pub mod extractor;
pub mod prelude;
pub mod websites;

pub use crate::extractor::caps::ExtractorFeatures;
pub use crate::extractor::{Continuation, PageOutcome, SiteAdapter};
