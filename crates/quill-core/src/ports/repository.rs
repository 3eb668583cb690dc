use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Group, NewPost, Post, PostContent, PostFilter, User};
use crate::error::RepoError;
use crate::pagination::PageWindow;

/// Generic repository trait for entities with a natural key.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Fails with [`RepoError::Constraint`] on a duplicate key.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Group repository, keyed by slug.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, String> {
    /// All groups, ordered by title.
    async fn list_all(&self) -> Result<Vec<Group>, RepoError>;
}

/// Post repository.
///
/// Listings are ordered newest first (creation time, then id, descending).
/// Each write touches a single row.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;

    /// Store a new post, assigning its id and creation time.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Replace text and group of an existing post, leaving everything else intact.
    async fn update_content(&self, id: i64, content: PostContent) -> Result<Post, RepoError>;

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// Fetch only the rows of `window`.
    async fn list(&self, filter: &PostFilter, window: PageWindow) -> Result<Vec<Post>, RepoError>;
}
