use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of characters of the text shown when a post is displayed inline.
const PREVIEW_CHARS: usize = 15;

/// Post entity - a single authored text, optionally filed under a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    /// Slug of the group, if any.
    pub group: Option<String>,
}

/// The user a post belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

/// The part of a post its author may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    pub text: String,
    pub group: Option<String>,
}

/// A post that has not been stored yet; id and timestamp are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author: Author,
    pub content: PostContent,
}

/// Which posts a listing selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(String),
    Author(Uuid),
}

impl Post {
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author.id == user_id
    }

    pub fn content(&self) -> PostContent {
        PostContent {
            text: self.text.clone(),
            group: self.group.clone(),
        }
    }

    /// Whether this post is selected by `filter`.
    pub fn matches(&self, filter: &PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(slug) => self.group.as_deref() == Some(slug.as_str()),
            PostFilter::Author(user_id) => self.author.id == *user_id,
        }
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.text.chars().take(PREVIEW_CHARS).collect();
        f.write_str(&preview)
    }
}
