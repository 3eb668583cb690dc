//! Identity extractors.
//!
//! The access token is read from `Authorization: Bearer <token>` or, for
//! browser sessions, from the [`ACCESS_TOKEN_COOKIE`] set at login.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};

use quill_core::domain::Principal;
use quill_core::ports::{AuthError, TokenClaims};

use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.principal.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub principal: Principal,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            principal: Principal::from(claims),
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::TokenExpired | AuthError::InvalidToken(_) | AuthError::MissingAuth => {
                actix_web::http::StatusCode::UNAUTHORIZED
            }
            _ => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use quill_shared::ErrorResponse;

        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Provide a Bearer token or log in first."),
            _ => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

/// Raw token from the Authorization header, falling back to the cookie.
fn request_token(req: &HttpRequest) -> Result<String, AuthError> {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

        return auth_str
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()));
    }

    req.cookie(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AuthError::MissingAuth)
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        ));
    };

    let token = request_token(req)?;
    let claims = state.tokens.validate_token(&token)?;
    Ok(Identity::from(claims))
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(AuthenticationError))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
///
/// A missing, malformed or expired token all mean "anonymous".
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref().map(|identity| &identity.principal)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match authenticate(req) {
            Ok(identity) => ready(Ok(OptionalIdentity(Some(identity)))),
            Err(AuthError::MissingAuth) => ready(Ok(OptionalIdentity(None))),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable credentials");
                ready(Ok(OptionalIdentity(None)))
            }
        }
    }
}
