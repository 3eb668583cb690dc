//! Staff-only administration.

use actix_web::{HttpResponse, web};

use quill_core::service::NewGroup;
use quill_shared::dto::CreateGroupRequest;

use super::views;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /admin/groups/
pub async fn create_group(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<CreateGroupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let group = state
        .blog
        .create_group(
            identity.principal(),
            NewGroup {
                slug: req.slug,
                title: req.title,
                description: req.description,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(views::group(group)))
}
