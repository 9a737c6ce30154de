use std::{fmt::Display, str::FromStr};

// Public Exports
pub use log;
pub use reqwest;
pub use serde;
pub use serde_json;
pub use tokio;

use log::debug;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod http;
pub mod item;
pub mod macros;
pub mod sanitize;

/// All currently supported websites and their underlying attributes
#[derive(Debug, Copy, Clone, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Site {
    /// Represents the website ```https://e621.net```.
    E621,
    /// Represents the website ```https://e6ai.net```, which shares e621's API.
    E6ai,
    /// Represents ```https://e926.net```, the safe variant of e621.
    E926,
    /// Represents the website ```https://rule34.xxx```
    Rule34,
    /// Represents the website ```https://furbooru.org```
    Furbooru,
    /// Represents the album website ```https://luscious.net```
    Luscious,
    /// Represents the comic website ```https://yiffer.xyz```
    Yiffer,
    /// Represents the comic website ```https://multporn.net```
    Multporn,
}

/// How a job for a given site is described by the user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobMode {
    /// A space separated tag query.
    Tags,
    /// A direct link to an album or comic.
    Url,
}

impl Display for JobMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tags => write!(f, "tags"),
            Self::Url => write!(f, "url"),
        }
    }
}

impl Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|site| site.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown site: {s}"))
    }
}

impl Site {
    pub const ALL: [Self; 8] = [
        Self::E621,
        Self::E6ai,
        Self::E926,
        Self::Rule34,
        Self::Furbooru,
        Self::Luscious,
        Self::Yiffer,
        Self::Multporn,
    ];

    /// Lowercase identifier used in the config file, the seen-id database name and the CLI.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::E621 => "e621",
            Self::E6ai => "e6ai",
            Self::E926 => "e926",
            Self::Rule34 => "rule34",
            Self::Furbooru => "furbooru",
            Self::Luscious => "luscious",
            Self::Yiffer => "yiffer",
            Self::Multporn => "multporn",
        }
    }

    /// Whether jobs for this site take a tag query or a direct URL.
    #[inline]
    pub const fn mode(&self) -> JobMode {
        match self {
            Self::E621 | Self::E6ai | Self::E926 | Self::Rule34 | Self::Furbooru => JobMode::Tags,
            Self::Luscious | Self::Yiffer | Self::Multporn => JobMode::Url,
        }
    }

    /// Returns true for the sites that speak e621's API.
    #[inline]
    pub const fn is_e6(&self) -> bool {
        matches!(self, Self::E621 | Self::E6ai | Self::E926)
    }

    /// Returns the base URL for the website's API.
    #[inline]
    pub const fn base_url(&self) -> &'static str {
        match self {
            Self::E621 => "https://e621.net",
            Self::E6ai => "https://e6ai.net",
            Self::E926 => "https://e926.net",
            Self::Rule34 => "https://api.rule34.xxx",
            Self::Furbooru => "https://furbooru.org",
            Self::Luscious => "https://members.luscious.net",
            Self::Yiffer => "https://yiffer.xyz",
            Self::Multporn => "https://multporn.net",
        }
    }

    /// Host fragment a user supplied URL should contain for this site.
    #[inline]
    pub const fn host(&self) -> &'static str {
        match self {
            Self::E621 => "e621.net",
            Self::E6ai => "e6ai.net",
            Self::E926 => "e926.net",
            Self::Rule34 => "rule34.xxx",
            Self::Furbooru => "furbooru.org",
            Self::Luscious => "luscious.net",
            Self::Yiffer => "yiffer.xyz",
            Self::Multporn => "multporn.net",
        }
    }

    /// Guess the site of an album or comic link by its host.
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.to_lowercase();
        Self::ALL
            .iter()
            .filter(|site| site.mode() == JobMode::Url)
            .find(|site| lower.contains(site.host()))
            .copied()
    }

    /// Max number of tags a single search accepts, when the site enforces one.
    #[inline]
    pub const fn max_tags(&self) -> Option<usize> {
        match self {
            Self::E621 | Self::E6ai | Self::E926 => Some(40),
            _ => None,
        }
    }

    /// Name of the file, inside the database directory, that records downloaded ids.
    #[inline]
    pub fn db_file_name(&self) -> String {
        format!("{}.db", self.name())
    }

    /// User agent sent with every request.
    ///
    /// It will always follow the version declared inside ```Cargo.toml```
    #[inline]
    pub fn user_agent() -> String {
        let ua = format!("nn-downloader/{}", env!("CARGO_PKG_VERSION"));
        debug!("Using user-agent: {}", ua);
        ua
    }
}
