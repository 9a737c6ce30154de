pub use crate::blacklist::Blacklist;
pub use crate::error::ExtractorError;
pub use crate::extractor::caps::ExtractorFeatures;
pub use crate::extractor::{Continuation, PageOutcome, SiteAdapter};

pub use crate::websites::e621::E6Adapter;
pub use crate::websites::furbooru::FurbooruAdapter;
pub use crate::websites::luscious::LusciousAdapter;
pub use crate::websites::multporn::MultpornAdapter;
pub use crate::websites::rule34::Rule34Adapter;
pub use crate::websites::yiffer::YifferAdapter;
