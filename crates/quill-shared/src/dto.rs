//! Data Transfer Objects - request bodies and the view-models each page renders.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
}

/// Login form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Request to create a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupResponse {
    pub slug: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub group: Option<String>,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
}

/// `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub page_obj: PageResponse<PostResponse>,
}

/// `GET /group/{slug}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPostsResponse {
    pub group: GroupResponse,
    pub page_obj: PageResponse<PostResponse>,
}

/// `GET /profile/{username}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub author: UserResponse,
    pub page_obj: PageResponse<PostResponse>,
}

/// `GET /posts/{id}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    /// Total posts by the post's author.
    pub count_post: u64,
}

/// Bound values and errors of the post form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFormFields {
    pub text: Option<String>,
    pub group: Option<String>,
    pub errors: BTreeMap<String, Vec<String>>,
}

/// `GET|POST /create/` and `GET|POST /posts/{id}/edit/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormResponse {
    pub form: PostFormFields,
    pub is_edit: bool,
    pub post_id: Option<i64>,
    pub groups: Vec<GroupResponse>,
}

/// `GET|POST /auth/login/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginFormResponse {
    pub next: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
