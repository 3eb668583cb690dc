//! Validation of submitted post data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Group, Post, PostContent};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Raw `text`/`group` pair as submitted by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    pub text: Option<String>,
    pub group: Option<String>,
}

/// Field name to error messages, iterated in field name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl PostForm {
    pub fn new(text: impl Into<String>, group: Option<&str>) -> Self {
        Self {
            text: Some(text.into()),
            group: group.map(str::to_string),
        }
    }

    /// Prefilled from an existing post, as shown on the edit page.
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: Some(post.text.clone()),
            group: post.group.clone(),
        }
    }

    /// Check the submission against the available `groups`.
    pub fn validate(&self, groups: &[Group]) -> Result<PostContent, FormErrors> {
        let mut errors = FormErrors::default();

        let text = self.text.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }

        let group = match self.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(slug) if groups.iter().any(|g| g.slug == slug) => Some(slug.to_string()),
            Some(_) => {
                errors.add("group", INVALID_CHOICE);
                None
            }
        };

        if errors.is_empty() {
            Ok(PostContent {
                text: text.to_string(),
                group,
            })
        } else {
            Err(errors)
        }
    }
}
