use std::fmt;

use serde::{Deserialize, Serialize};

pub const GROUP_TITLE_MAX_LEN: usize = 200;
pub const GROUP_SLUG_MAX_LEN: usize = 50;

/// A named topic posts may belong to. Identified by its slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub slug: String,
    pub title: String,
    pub description: String,
}

impl Group {
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// Slugs are ASCII letters, digits, hyphens and underscores.
    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && slug.len() <= GROUP_SLUG_MAX_LEN
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
