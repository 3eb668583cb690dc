//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use quill_core::domain::{Author, Group, NewPost, Post, PostContent, PostFilter, User};
use quill_core::error::RepoError;
use quill_core::pagination::PageWindow;
use quill_core::ports::{GroupRepository, PostRepository, UserRepository};

use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .order_by_asc(group::Column::Slug)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

fn condition(filter: &PostFilter) -> Condition {
    match filter {
        PostFilter::All => Condition::all(),
        PostFilter::Group(slug) => Condition::all().add(post::Column::GroupSlug.eq(slug.as_str())),
        PostFilter::Author(user_id) => Condition::all().add(post::Column::AuthorId.eq(*user_id)),
    }
}

fn joined_post((post, author): (post::Model, Option<user::Model>)) -> Result<Post, RepoError> {
    let author = author
        .ok_or_else(|| RepoError::MissingReference(format!("post {} has no author", post.id)))?;
    Ok(post.into_post(author.into()))
}

impl PostgresPostRepository {
    async fn author(&self, user_id: uuid::Uuid) -> Result<Author, RepoError> {
        UserEntity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(query_error)?
            .map(Into::into)
            .ok_or_else(|| RepoError::MissingReference(format!("unknown author {user_id}")))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(query_error)?
            .map(joined_post)
            .transpose()
    }

    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            id: NotSet,
            text: Set(new_post.content.text),
            created_at: Set(Utc::now().into()),
            author_id: Set(new_post.author.id),
            group_slug: Set(new_post.content.group),
        }
        .insert(&self.db)
        .await
        .map_err(write_error)?;

        Ok(model.into_post(new_post.author))
    }

    async fn update_content(&self, id: i64, content: PostContent) -> Result<Post, RepoError> {
        let active_model = post::ActiveModel {
            id: Unchanged(id),
            text: Set(content.text),
            group_slug: Set(content.group),
            ..Default::default()
        };

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => RepoError::NotFound,
            other => write_error(other),
        })?;

        let author = self.author(model.author_id).await?;
        Ok(model.into_post(author))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(condition(filter))
            .count(&self.db)
            .await
            .map_err(query_error)
    }

    async fn list(&self, filter: &PostFilter, window: PageWindow) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .filter(condition(filter))
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(window.offset())
            .limit(window.limit())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        rows.into_iter().map(joined_post).collect()
    }
}
