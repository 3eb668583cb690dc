//! In-memory store - used when no database is configured, and in tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Author, Group, NewPost, Post, PostContent, PostFilter, User};
use quill_core::error::RepoError;
use quill_core::pagination::PageWindow;
use quill_core::ports::{BaseRepository, GroupRepository, PostRepository, UserRepository};

struct PostRow {
    id: i64,
    text: String,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    group: Option<String>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    groups: BTreeMap<String, Group>,
    posts: Vec<PostRow>,
    next_post_id: i64,
    last_created_at: Option<DateTime<Utc>>,
}

impl Tables {
    fn to_post(&self, row: &PostRow) -> Result<Post, RepoError> {
        let author = self
            .users
            .get(&row.author_id)
            .ok_or_else(|| RepoError::MissingReference(format!("post {} has no author", row.id)))?;

        Ok(Post {
            id: row.id,
            text: row.text.clone(),
            created_at: row.created_at,
            author: Author {
                id: author.id,
                username: author.username.clone(),
            },
            group: row.group.clone(),
        })
    }

    fn matching(&self, filter: &PostFilter) -> impl Iterator<Item = &PostRow> {
        self.posts.iter().filter(move |row| match filter {
            PostFilter::All => true,
            PostFilter::Group(slug) => row.group.as_deref() == Some(slug.as_str()),
            PostFilter::Author(user_id) => row.author_id == *user_id,
        })
    }

    /// Creation time for the next post, never earlier than the previous one
    /// even if the wall clock steps back.
    fn stamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let created_at = self.last_created_at.map_or(now, |last| last.max(now));
        self.last_created_at = Some(created_at);
        created_at
    }

    fn check_group(&self, group: Option<&str>) -> Result<(), RepoError> {
        match group {
            Some(slug) if !self.groups.contains_key(slug) => {
                Err(RepoError::MissingReference(format!("unknown group {slug}")))
            }
            _ => Ok(()),
        }
    }
}

/// Users, groups and posts behind a single async `RwLock`.
///
/// Every write takes the lock once, so a create or edit is never seen half done.
/// Data is lost on process restart.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_post_id: 1,
                ..Tables::default()
            }),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id)
            || tables.users.values().any(|u| u.username == user.username)
        {
            return Err(RepoError::Constraint("User already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Group, String> for InMemoryStore {
    async fn find_by_id(&self, slug: String) -> Result<Option<Group>, RepoError> {
        Ok(self.tables.read().await.groups.get(&slug).cloned())
    }

    async fn insert(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.contains_key(&group.slug) {
            return Err(RepoError::Constraint("Group already exists".to_string()));
        }
        tables.groups.insert(group.slug.clone(), group.clone());
        Ok(group)
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let mut groups: Vec<Group> = self.tables.read().await.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.slug.cmp(&b.slug)));
        Ok(groups)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        tables
            .posts
            .iter()
            .find(|row| row.id == id)
            .map(|row| tables.to_post(row))
            .transpose()
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.author.id) {
            return Err(RepoError::MissingReference(format!(
                "unknown author {}",
                post.author.id
            )));
        }
        tables.check_group(post.content.group.as_deref())?;

        let row = PostRow {
            id: tables.next_post_id,
            text: post.content.text,
            created_at: tables.stamp(Utc::now()),
            author_id: post.author.id,
            group: post.content.group,
        };
        tables.next_post_id += 1;

        let created = tables.to_post(&row)?;
        tables.posts.push(row);
        Ok(created)
    }

    async fn update_content(&self, id: i64, content: PostContent) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_group(content.group.as_deref())?;

        let row = tables
            .posts
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RepoError::NotFound)?;
        row.text = content.text;
        row.group = content.group;

        let tables = &*tables;
        let row = tables
            .posts
            .iter()
            .find(|row| row.id == id)
            .ok_or(RepoError::NotFound)?;
        tables.to_post(row)
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.matching(filter).count() as u64)
    }

    async fn list(&self, filter: &PostFilter, window: PageWindow) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&PostRow> = tables.matching(filter).collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        rows.into_iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .map(|row| tables.to_post(row))
            .collect()
    }
}
