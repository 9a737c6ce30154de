//! # Item Tags Module
//!
//! Tags are how the supported sites organize and allow searching of content, and they are the
//! only thing the blacklist looks at.
//!
//! Every site groups its tags differently (e621 has `general`, `species`, `artist`...; rule34
//! only has one flat string), so [`TagMap`] keeps them as an ordered mapping of
//! `category -> tags`. Which categories are consulted for blacklist matching is decided by each
//! site adapter, never here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category used by sites that don't group their tags.
pub const GENERAL: &str = "general";

/// Tags of a single item, grouped by category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TagMap(BTreeMap<String, Vec<String>>);

impl TagMap {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builds a map with every tag under the [`GENERAL`] category.
    pub fn flat<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::new();
        map.insert(GENERAL, tags.into_iter().map(Into::into).collect());
        map
    }

    /// Inserts (or replaces) a whole category. Empty categories are still kept so the exported
    /// metadata mirrors what the site returned.
    pub fn insert(&mut self, category: &str, tags: Vec<String>) {
        self.0.insert(category.to_string(), tags);
    }

    /// Returns the tags of one category, or an empty slice if the site didn't send it.
    pub fn get(&self, category: &str) -> &[String] {
        self.0.get(category).map_or(&[], Vec::as_slice)
    }

    /// Concatenates the requested categories, in the order given.
    pub fn collect(&self, categories: &[&str]) -> Vec<String> {
        categories
            .iter()
            .flat_map(|category| self.get(category).iter().cloned())
            .collect()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the map holds no tag at all, in any category.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}
