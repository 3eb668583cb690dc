//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::Paginator;
use quill_core::ports::{GroupRepository, PostRepository, TokenService, UserRepository};
use quill_core::service::{AccountService, BlogService};
use quill_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use quill_infra::database::{
    DatabaseConnections, PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// The three repositories the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Repositories {
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store,
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(db: &DatabaseConnections) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(db.main.clone())),
            groups: Arc::new(PostgresGroupRepository::new(db.main.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.main.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<BlogService>,
    pub accounts: Arc<AccountService>,
    pub tokens: Arc<dyn TokenService>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state, on PostgreSQL when `DATABASE_URL` is
    /// configured and reachable, otherwise on the in-memory store.
    pub async fn new(config: &AppConfig) -> Self {
        let paginator = Paginator::new(config.posts_per_page);
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => {
                        let repos = Repositories::postgres(&connections);
                        let mut state = Self::with_repositories(repos, paginator, tokens);
                        state.db = Some(Arc::new(connections));
                        tracing::info!("Application state initialized (postgres)");
                        return state;
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory store");

        let repos = Repositories::in_memory(Arc::new(InMemoryStore::new()));
        tracing::info!("Application state initialized (in-memory)");
        Self::with_repositories(repos, paginator, tokens)
    }

    pub fn with_repositories(
        repos: Repositories,
        paginator: Paginator,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        let blog = BlogService::new(repos.posts, repos.groups, repos.users.clone(), paginator);
        let accounts = AccountService::new(repos.users, Arc::new(Argon2PasswordService::new()));

        Self {
            blog: Arc::new(blog),
            accounts: Arc::new(accounts),
            tokens,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }
}
