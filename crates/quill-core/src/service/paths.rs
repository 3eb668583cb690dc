//! URL paths of the site's pages, shared by redirects and the router.

pub const INDEX: &str = "/";
pub const CREATE: &str = "/create/";
pub const LOGIN: &str = "/auth/login/";

pub fn post_detail(id: i64) -> String {
    format!("/posts/{id}/")
}

pub fn post_edit(id: i64) -> String {
    format!("/posts/{id}/edit/")
}

pub fn profile(username: &str) -> String {
    format!("/profile/{username}/")
}

pub fn group(slug: &str) -> String {
    format!("/group/{slug}/")
}

/// Login page that returns to `next` afterwards.
pub fn login(next: &str) -> String {
    format!("{LOGIN}?next={next}")
}

/// Only same-site absolute paths are followed after login.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
}
