//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use quill_core::DEFAULT_PAGE_SIZE;
use quill_infra::JwtConfig;
use quill_infra::auth::DEFAULT_JWT_SECRET;
use quill_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the blog on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub posts_per_page: u64,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let database = var("DATABASE_URL").map(|url| {
            let mut config = DatabaseConfig::new(url);
            config.max_connections = parse_or(&var, "DB_MAX_CONNECTIONS", config.max_connections);
            config.min_connections = parse_or(&var, "DB_MIN_CONNECTIONS", config.min_connections);
            config
        });

        let defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: var("JWT_SECRET").unwrap_or_else(|| {
                tracing::warn!("JWT_SECRET not set, using insecure default!");
                DEFAULT_JWT_SECRET.to_string()
            }),
            expiration_hours: parse_or(&var, "JWT_EXPIRATION_HOURS", defaults.expiration_hours),
            issuer: var("JWT_ISSUER").unwrap_or(defaults.issuer),
        };

        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&var, "PORT", 8080),
            database,
            posts_per_page: Some(parse_or(&var, "POSTS_PER_PAGE", DEFAULT_PAGE_SIZE))
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            jwt,
        }
    }
}

fn parse_or<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    var(key).and_then(|s| s.parse().ok()).unwrap_or(default)
}
