//! Domain entities - the core business objects.

mod group;
mod post;
mod user;

pub use group::{GROUP_SLUG_MAX_LEN, GROUP_TITLE_MAX_LEN, Group};
pub use post::{Author, NewPost, Post, PostContent, PostFilter};
pub use user::{Principal, ROLE_ADMIN, ROLE_USER, USERNAME_MAX_LEN, User};
