//! Tag normalization.

use serde::{Deserialize, Serialize};

/// Limits applied when cleaning user-supplied tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagRules {
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
    #[serde(default = "default_max_tag_length")]
    pub max_tag_length: usize,
}

fn default_max_tags() -> usize {
    10
}
fn default_max_tag_length() -> usize {
    30
}

impl Default for TagRules {
    fn default() -> Self {
        Self {
            max_tags: default_max_tags(),
            max_tag_length: default_max_tag_length(),
        }
    }
}

impl TagRules {
    /// Trim and lowercase each tag, drop empty or over-long ones, keep the
    /// first `max_tags`.
    pub fn clean<S: AsRef<str>>(&self, tags: &[S]) -> Vec<String> {
        tags.iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty() && t.chars().count() <= self.max_tag_length)
            .take(self.max_tags)
            .collect()
    }
}

/// Split a comma-separated tag list.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.to_string()).collect()
}
