//! Item filter
//!
//! # The Blacklist
//! Sites tag their files in order to make them searchable, the blacklist uses these tags to
//! exclude unwanted items from a job before they ever reach the fetch client.
//!
//! ## Config file
//! The blacklist is read from the `blacklisted_tags` and `blacklisted_formats` arrays of
//! `config.json`:
//! ```json
//! "blacklisted_tags": ["tag_1", "tag_2"],
//! "blacklisted_formats": ["webm", "gif"]
//! ```
//!
//! Which tag categories of an item are compared against the list is decided by each site
//! adapter (see [`collect_taggable_strings`](crate::extractor::SiteAdapter::collect_taggable_strings)).
//! The list itself is static for the whole duration of a job.
use ahash::AHashSet;
use log::debug;
use nnd_common::config::AppConfig;

/// A filter for candidate items, matching their collected tags and their file format.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    /// Tags that exclude an item. Matched exactly.
    tags: AHashSet<String>,
    /// File formats that exclude an item. Stored lowercase.
    formats: AHashSet<String>,
}

impl Blacklist {
    /// Creates a new `Blacklist`, ignoring empty entries.
    #[must_use]
    pub fn new<S: AsRef<str>>(tags: &[S], formats: &[S]) -> Self {
        let tags: AHashSet<String> = tags
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let formats: AHashSet<String> = formats
            .iter()
            .map(|f| f.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|f| !f.is_empty())
            .collect();

        debug!(
            "Blacklist setup with {} tags and {} formats",
            tags.len(),
            formats.len()
        );

        Self { tags, formats }
    }

    /// Builds the blacklist from the user configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.blacklisted_tags.as_slice(),
            config.blacklisted_formats.as_slice(),
        )
    }

    /// Returns the first collected tag that is blacklisted, if any.
    pub fn blocked_tag<'a>(&self, collected: &'a [String]) -> Option<&'a str> {
        if self.tags.is_empty() {
            return None;
        }

        collected
            .iter()
            .find(|t| self.tags.contains(t.as_str()))
            .map(String::as_str)
    }

    /// True when the file format is blacklisted.
    pub fn blocks_format(&self, format: &str) -> bool {
        !self.formats.is_empty() && self.formats.contains(&format.to_lowercase())
    }

    /// True when the item must be dropped, either by one of its tags or by its format.
    pub fn blocks(&self, collected: &[String], format: &str) -> bool {
        if let Some(tag) = self.blocked_tag(collected) {
            debug!("Item blocked by tag {tag}");
            return true;
        }

        if self.blocks_format(format) {
            debug!("Item blocked by format {format}");
            return true;
        }

        false
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.formats.is_empty()
    }
}

#[cfg(test)]
mod test {
    use nnd_common::config::AppConfig;

    use super::Blacklist;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn tag_matching() {
        let bl = Blacklist::new(&["gore", "", " scat "], &[]);

        assert_eq!(bl.blocked_tag(&tags(&["wolf", "gore"])), Some("gore"));
        assert_eq!(bl.blocked_tag(&tags(&["scat"])), Some("scat"));
        assert_eq!(bl.blocked_tag(&tags(&["wolf", "Gore"])), None);
        assert!(!bl.blocks(&[], "png"));
    }

    #[test]
    fn format_matching() {
        let bl = Blacklist::new(&[], &[".WEBM", "gif"]);

        assert!(bl.blocks(&tags(&["wolf"]), "webm"));
        assert!(bl.blocks(&[], "GIF"));
        assert!(!bl.blocks(&[], "png"));
    }

    #[test]
    fn default_config_only_holds_placeholders() {
        let bl = Blacklist::from_config(&AppConfig::default());

        assert!(!bl.is_empty());
        assert!(bl.blocks(&tags(&["example1"]), "png"));
        assert!(bl.blocks(&[], "example2"));
        assert!(!bl.blocks(&tags(&["wolf"]), "jpg"));
    }
}
