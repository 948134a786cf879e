//! Tag filters and tag edits for annotations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Exact match when exclusive; otherwise every filter tag must be present.
pub fn tag_filter(input: &BTreeSet<String>, filter: &[String], exclusive: bool) -> bool {
    if exclusive && input.len() != filter.len() {
        return false;
    }
    filter.iter().all(|tag| input.contains(tag))
}

/// Like [`tag_filter`], but the inclusive case only needs one shared tag.
pub fn tag_cloud_filter(input: &BTreeSet<String>, filter: &[String], exclusive: bool) -> bool {
    if exclusive {
        return tag_filter(input, filter, true);
    }
    input.iter().any(|tag| filter.contains(tag))
}

/// A tag requirement attached to tool configurations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    #[serde(default)]
    pub tags: Vec<String>,
    /// Require the exact tag set instead of any shared tag.
    #[serde(default)]
    pub exclusive: bool,
}

impl TagFilter {
    /// An empty filter accepts everything.
    pub fn matches(&self, tags: &BTreeSet<String>) -> bool {
        self.tags.is_empty() || tag_cloud_filter(tags, &self.tags, self.exclusive)
    }
}

/// How a tagging action changes an annotation's tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagEdit {
    /// Merge the tags into the existing set.
    Add(Vec<String>),
    /// Drop every existing tag, then add these.
    Replace(Vec<String>),
    /// Remove these tags, keep the rest.
    Remove(Vec<String>),
}

impl TagEdit {
    pub fn apply(&self, tags: &mut BTreeSet<String>) {
        match self {
            TagEdit::Add(new) => tags.extend(new.iter().cloned()),
            TagEdit::Replace(new) => *tags = new.iter().cloned().collect(),
            TagEdit::Remove(old) => tags.retain(|tag| !old.contains(tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    fn list(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tag_filter_inclusive_needs_all_filter_tags() {
        assert!(tag_filter(&set(&["a", "b", "c"]), &list(&["a", "b"]), false));
        assert!(!tag_filter(&set(&["a"]), &list(&["a", "b"]), false));
    }

    #[test]
    fn test_tag_filter_exclusive_needs_exact_set() {
        assert!(tag_filter(&set(&["a", "b"]), &list(&["b", "a"]), true));
        assert!(!tag_filter(&set(&["a", "b", "c"]), &list(&["a", "b"]), true));
    }

    #[test]
    fn test_tag_cloud_filter_inclusive_needs_one_tag() {
        assert!(tag_cloud_filter(&set(&["a", "x"]), &list(&["a", "b"]), false));
        assert!(!tag_cloud_filter(&set(&["x"]), &list(&["a", "b"]), false));
        assert!(!tag_cloud_filter(&set(&["a", "x"]), &list(&["a", "b"]), true));
    }

    #[test]
    fn test_tag_edits() {
        let mut tags = set(&["existingTag"]);
        TagEdit::Add(list(&["newTag"])).apply(&mut tags);
        assert_eq!(tags, set(&["existingTag", "newTag"]));

        let mut tags = set(&["oldTag"]);
        TagEdit::Replace(list(&["newTag"])).apply(&mut tags);
        assert_eq!(tags, set(&["newTag"]));

        let mut tags = set(&["tagToRemove", "keepMe"]);
        TagEdit::Remove(list(&["tagToRemove"])).apply(&mut tags);
        assert_eq!(tags, set(&["keepMe"]));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(TagFilter::default().matches(&set(&[])));
        assert!(TagFilter::default().matches(&set(&["a"])));
    }
}
