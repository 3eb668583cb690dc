//! Storage: PostgreSQL via SeaORM, or an in-memory store.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;
#[cfg(feature = "postgres")]
pub use connections::DatabaseConnections;
pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use postgres_repo::{PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository};
