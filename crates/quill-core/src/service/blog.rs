//! Listing, detail and authoring of posts, plus group administration.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::paths;
use crate::domain::{
    Author, GROUP_TITLE_MAX_LEN, Group, NewPost, Post, PostFilter, Principal,
};
use crate::error::{DomainError, DomainResult};
use crate::forms::{FormErrors, PostForm};
use crate::pagination::{Page, PageNumber, Paginator};
use crate::ports::{GroupRepository, PostRepository, UserRepository};

/// A group and one page of its posts.
#[derive(Debug, Clone)]
pub struct GroupPosts {
    pub group: Group,
    pub page: Page<Post>,
}

/// An author and one page of their posts.
#[derive(Debug, Clone)]
pub struct ProfilePosts {
    pub author: Author,
    pub page: Page<Post>,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    /// Total number of posts by the same author.
    pub author_post_count: u64,
}

/// Where a request is sent instead of being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Login { next: String },
    PostDetail(i64),
    Profile(String),
}

impl Redirect {
    pub fn location(&self) -> String {
        match self {
            Redirect::Login { next } => paths::login(next),
            Redirect::PostDetail(id) => paths::post_detail(*id),
            Redirect::Profile(username) => paths::profile(username),
        }
    }
}

/// The post form as it should be shown to the user.
#[derive(Debug, Clone)]
pub struct FormView {
    pub form: PostForm,
    pub errors: FormErrors,
    pub is_edit: bool,
    pub post_id: Option<i64>,
    /// Choices for the group field.
    pub groups: Vec<Group>,
}

/// Result of a create or edit request.
#[derive(Debug, Clone)]
pub enum Outcome {
    Render(FormView),
    Redirect(Redirect),
}

/// Input for creating a group.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub slug: String,
    pub title: String,
    pub description: String,
}

pub struct BlogService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    paginator: Paginator,
}

impl BlogService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        paginator: Paginator,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            paginator,
        }
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    /// All posts, newest first.
    pub async fn index(&self, page: PageNumber) -> DomainResult<Page<Post>> {
        self.listing(&PostFilter::All, page).await
    }

    pub async fn group_posts(&self, slug: &str, page: PageNumber) -> DomainResult<GroupPosts> {
        let group = self
            .groups
            .find_by_id(slug.to_string())
            .await?
            .ok_or_else(|| DomainError::not_found("Group", slug))?;

        let page = self
            .listing(&PostFilter::Group(group.slug.clone()), page)
            .await?;

        Ok(GroupPosts { group, page })
    }

    pub async fn profile(&self, username: &str, page: PageNumber) -> DomainResult<ProfilePosts> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", username))?;

        let page = self.listing(&PostFilter::Author(user.id), page).await?;

        Ok(ProfilePosts {
            author: user.as_author(),
            page,
        })
    }

    pub async fn post_detail(&self, post_id: i64) -> DomainResult<PostDetail> {
        let post = self.find_post(post_id).await?;
        let author_post_count = self
            .posts
            .count(&PostFilter::Author(post.author.id))
            .await?;

        Ok(PostDetail {
            post,
            author_post_count,
        })
    }

    /// Show the empty form (`submission` is `None`) or create a post from it.
    pub async fn create(
        &self,
        identity: Option<&Principal>,
        submission: Option<PostForm>,
    ) -> DomainResult<Outcome> {
        let Some(principal) = self.existing(identity).await? else {
            return Ok(Outcome::Redirect(Redirect::Login {
                next: paths::CREATE.to_string(),
            }));
        };

        let groups = self.groups.list_all().await?;
        let Some(form) = submission else {
            return Ok(Outcome::Render(FormView {
                form: PostForm::default(),
                errors: FormErrors::default(),
                is_edit: false,
                post_id: None,
                groups,
            }));
        };

        match form.validate(&groups) {
            Ok(content) => {
                let post = self
                    .posts
                    .create(NewPost {
                        author: principal.as_author(),
                        content,
                    })
                    .await?;
                info!(post_id = post.id, author = %principal.username, "Post created");

                Ok(Outcome::Redirect(Redirect::Profile(
                    principal.username.clone(),
                )))
            }
            Err(errors) => {
                debug!(author = %principal.username, "Rejected post form");
                Ok(Outcome::Render(FormView {
                    form,
                    errors,
                    is_edit: false,
                    post_id: None,
                    groups,
                }))
            }
        }
    }

    /// Show the prefilled form or apply an edit. Only the author gets past
    /// the redirect, whatever was submitted.
    pub async fn edit(
        &self,
        identity: Option<&Principal>,
        post_id: i64,
        submission: Option<PostForm>,
    ) -> DomainResult<Outcome> {
        let Some(principal) = identity else {
            return Ok(Outcome::Redirect(Redirect::Login {
                next: paths::post_edit(post_id),
            }));
        };

        let post = self.find_post(post_id).await?;
        if !post.is_authored_by(principal.user_id) {
            warn!(post_id, user = %principal.username, "Edit attempted by non-author");
            return Ok(Outcome::Redirect(Redirect::PostDetail(post_id)));
        }

        let groups = self.groups.list_all().await?;
        let Some(form) = submission else {
            return Ok(Outcome::Render(FormView {
                form: PostForm::from_post(&post),
                errors: FormErrors::default(),
                is_edit: true,
                post_id: Some(post_id),
                groups,
            }));
        };

        match form.validate(&groups) {
            Ok(content) => {
                self.posts.update_content(post_id, content).await?;
                info!(post_id, author = %principal.username, "Post edited");

                Ok(Outcome::Redirect(Redirect::PostDetail(post_id)))
            }
            Err(errors) => Ok(Outcome::Render(FormView {
                form,
                errors,
                is_edit: true,
                post_id: Some(post_id),
                groups,
            })),
        }
    }

    /// All groups, ordered by title.
    pub async fn groups(&self) -> DomainResult<Vec<Group>> {
        Ok(self.groups.list_all().await?)
    }

    /// Administrative creation of a group. Staff only.
    pub async fn create_group(
        &self,
        identity: Option<&Principal>,
        input: NewGroup,
    ) -> DomainResult<Group> {
        let principal = identity.ok_or(DomainError::Unauthorized)?;
        if !principal.is_staff {
            return Err(DomainError::Forbidden);
        }

        let title = input.title.trim();
        if title.is_empty() || title.chars().count() > GROUP_TITLE_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "Title must be between 1 and {GROUP_TITLE_MAX_LEN} characters"
            )));
        }
        if !Group::is_valid_slug(&input.slug) {
            return Err(DomainError::Validation(
                "Slug may only contain letters, numbers, hyphens and underscores".to_string(),
            ));
        }
        if self.groups.find_by_id(input.slug.clone()).await?.is_some() {
            return Err(DomainError::Duplicate(format!(
                "Group with slug {} already exists",
                input.slug
            )));
        }

        let group = self
            .groups
            .insert(Group::new(input.slug, title, input.description))
            .await?;
        info!(slug = %group.slug, admin = %principal.username, "Group created");

        Ok(group)
    }

    /// The principal, unless its account no longer exists (a token that
    /// outlived the store counts as anonymous).
    async fn existing<'a>(
        &self,
        identity: Option<&'a Principal>,
    ) -> DomainResult<Option<&'a Principal>> {
        let Some(principal) = identity else {
            return Ok(None);
        };

        let user = self.users.find_by_username(&principal.username).await?;
        if user.is_some_and(|user| user.id == principal.user_id) {
            Ok(Some(principal))
        } else {
            warn!(username = %principal.username, "Token names an unknown account");
            Ok(None)
        }
    }

    async fn find_post(&self, post_id: i64) -> DomainResult<Post> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))
    }

    /// Count, then fetch only the rows of the resolved page.
    async fn listing(&self, filter: &PostFilter, page: PageNumber) -> DomainResult<Page<Post>> {
        let count = self.posts.count(filter).await?;
        let window = self.paginator.locate(count, page);

        let items = if window.limit() == 0 {
            Vec::new()
        } else {
            self.posts.list(filter, window).await?
        };
        debug!(?filter, page = window.number, of = window.num_pages, "Listing posts");

        Ok(window.fill(items))
    }
}
