//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod health;
mod posts;
mod views;

use actix_web::web;

use crate::middleware::error::{self, AppError};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

    cfg.app_data(json_config)
        .route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit_submit)),
        )
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::create_form))
                .route(web::post().to(posts::create_submit)),
        )
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .route("/logout/", web::post().to(auth::logout))
                .route("/signup/", web::post().to(auth::signup))
                .route("/me/", web::get().to(auth::me)),
        )
        .service(web::scope("/admin").route("/groups/", web::post().to(admin::create_group)))
        .route("/health/", web::get().to(health::health_check))
        .default_service(web::to(error::not_found));
}
