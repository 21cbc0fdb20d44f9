//! Tag query parsing and matching.

use std::collections::HashSet;

/// A normalized set of tags to search for.
///
/// Built from a `;` separated query string. Tags are trimmed, lowercased and
/// deduplicated; empty pieces are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    tags: Vec<String>,
    lookup: HashSet<String>,
}

impl TagQuery {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let mut tags = Vec::new();
        let mut lookup = HashSet::new();
        for piece in raw.unwrap_or_default().split(';') {
            let tag = piece.trim().to_lowercase();
            if !tag.is_empty() && lookup.insert(tag.clone()) {
                tags.push(tag);
            }
        }
        Self { tags, lookup }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// True if any of `recipe_tags` is in the query, ignoring case.
    #[must_use]
    pub fn matches(&self, recipe_tags: &[String]) -> bool {
        recipe_tags
            .iter()
            .any(|tag| self.lookup.contains(&tag.to_lowercase()))
    }
}
