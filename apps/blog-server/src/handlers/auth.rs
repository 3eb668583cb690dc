//! Authentication handlers.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_core::domain::User;
use quill_core::error::DomainError;
use quill_core::service::paths;
use quill_shared::dto::{AuthResponse, LoginFormResponse, LoginRequest, RegisterUserRequest, UserResponse};

use super::views;
use crate::middleware::auth::{ACCESS_TOKEN_COOKIE, Identity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const BAD_CREDENTIALS: &str = "Please enter a correct username and password.";

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

/// Where to go after login. Anything off-site falls back to the index.
fn safe_next(next: Option<&str>) -> String {
    next.filter(|n| paths::is_safe_next(n))
        .unwrap_or(paths::INDEX)
        .to_string()
}

fn issue_token(state: &AppState, user: &User) -> AppResult<String> {
    state
        .tokens
        .generate_token(user.id, &user.username, user.principal().roles())
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// GET /auth/login/
pub async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    HttpResponse::Ok().json(LoginFormResponse {
        next: safe_next(query.next.as_deref()),
        error: None,
    })
}

/// POST /auth/login/
///
/// On success sets the session cookie and redirects to `next`.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Form<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let next = safe_next(req.next.as_deref());

    let user = match state.accounts.authenticate(&req.username, &req.password).await {
        Ok(user) => user,
        Err(DomainError::Unauthorized) => {
            return Ok(HttpResponse::Ok().json(LoginFormResponse {
                next,
                error: Some(BAD_CREDENTIALS.to_string()),
            }));
        }
        Err(e) => return Err(e.into()),
    };

    let token = issue_token(&state, &user)?;
    let cookie = Cookie::build(ACCESS_TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(state.tokens.expiration_seconds()))
        .finish();

    tracing::info!(username = %user.username, "User logged in");

    let mut response = views::redirect(&next);
    response
        .add_cookie(&cookie)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

/// POST /auth/logout/
pub async fn logout() -> AppResult<HttpResponse> {
    let mut response = views::redirect(paths::INDEX);
    response
        .add_removal_cookie(&Cookie::build(ACCESS_TOKEN_COOKIE, "").path("/").finish())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state.accounts.register(&req.username, &req.password).await?;
    let token = issue_token(&state, &user)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    }))
}

/// GET /auth/me/ - Protected route
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse {
        id: identity.principal.user_id,
        username: identity.principal.username,
    }))
}
