//! Services - the operations behind each page of the site.
//!
//! Every operation takes the requesting identity as an explicit
//! `Option<&Principal>`; nothing here reads ambient request state.

mod accounts;
mod blog;
pub mod paths;

pub use accounts::{AccountService, PASSWORD_MIN_LEN};
pub use blog::{
    BlogService, FormView, GroupPosts, NewGroup, Outcome, PostDetail, ProfilePosts, Redirect,
};
