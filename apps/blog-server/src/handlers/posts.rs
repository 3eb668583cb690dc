//! Post pages: listings, detail, and the create/edit form.

use actix_web::{HttpResponse, web};

use quill_core::PageNumber;
use quill_core::forms::PostForm;
use quill_shared::dto::{GroupPostsResponse, IndexResponse, PostDetailResponse, ProfileResponse};

use super::views;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Raw query pairs. Decoding into these never fails, whatever the user typed.
type QueryPairs = web::Query<Vec<(String, String)>>;

/// `?page=` as typed by the user; the last one wins when repeated.
fn page_number(query: &[(String, String)]) -> PageNumber {
    let raw = query
        .iter()
        .rev()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.as_str());
    PageNumber::parse(raw)
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: QueryPairs,
) -> AppResult<HttpResponse> {
    let page = state.blog.index(page_number(&query)).await?;

    Ok(HttpResponse::Ok().json(IndexResponse {
        page_obj: views::page(page),
    }))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: QueryPairs,
) -> AppResult<HttpResponse> {
    let listing = state.blog.group_posts(&slug, page_number(&query)).await?;

    Ok(HttpResponse::Ok().json(GroupPostsResponse {
        group: views::group(listing.group),
        page_obj: views::page(listing.page),
    }))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    username: web::Path<String>,
    query: QueryPairs,
) -> AppResult<HttpResponse> {
    let listing = state.blog.profile(&username, page_number(&query)).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        author: views::author(listing.author),
        page_obj: views::page(listing.page),
    }))
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let detail = state.blog.post_detail(post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: views::post(detail.post),
        count_post: detail.author_post_count,
    }))
}

/// GET /create/
pub async fn create_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let outcome = state.blog.create(identity.principal(), None).await?;
    Ok(views::outcome(outcome))
}

/// POST /create/
///
/// A body that is not a valid form counts as an empty submission.
pub async fn create_submit(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: Option<web::Form<PostForm>>,
) -> AppResult<HttpResponse> {
    let submission = form.map(web::Form::into_inner).unwrap_or_default();
    let outcome = state
        .blog
        .create(identity.principal(), Some(submission))
        .await?;
    Ok(views::outcome(outcome))
}

/// GET /posts/{post_id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .edit(identity.principal(), post_id.into_inner(), None)
        .await?;
    Ok(views::outcome(outcome))
}

/// POST /posts/{post_id}/edit/
pub async fn edit_submit(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<i64>,
    form: Option<web::Form<PostForm>>,
) -> AppResult<HttpResponse> {
    let submission = form.map(web::Form::into_inner).unwrap_or_default();
    let outcome = state
        .blog
        .edit(identity.principal(), post_id.into_inner(), Some(submission))
        .await?;
    Ok(views::outcome(outcome))
}

#[cfg(test)]
mod tests {
    use actix_web::http::{StatusCode, header};
    use actix_web::test;
    use serde_json::Value;

    use quill_core::PageNumber;
    use quill_core::domain::PostFilter;
    use quill_core::forms::{INVALID_CHOICE, REQUIRED};
    use quill_core::ports::{PostRepository, TokenService};
    use uuid::Uuid;

    use super::page_number;
    use crate::handlers::testing::{TestApp, location, service};

    #[actix_web::test]
    async fn test_index_pages_hold_ten_then_three() {
        let fixture = TestApp::new().await;
        let (author, _) = fixture.user("leo").await;
        fixture.posts(&author, 13, None).await;
        let app = service!(fixture);

        let first: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(first["page_obj"]["object_list"].as_array().unwrap().len(), 10);
        assert_eq!(first["page_obj"]["num_pages"], 2);
        assert_eq!(first["page_obj"]["count"], 13);
        assert_eq!(first["page_obj"]["object_list"][0]["text"], "Test post 13");

        let second: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/?page=2").to_request(),
        )
        .await;
        assert_eq!(second["page_obj"]["object_list"].as_array().unwrap().len(), 3);
        assert_eq!(second["page_obj"]["has_next"], false);
        assert_eq!(second["page_obj"]["previous_page_number"], 1);
    }

    #[actix_web::test]
    async fn test_out_of_range_pages_are_clamped() {
        let fixture = TestApp::new().await;
        let (author, _) = fixture.user("leo").await;
        fixture.posts(&author, 13, None).await;
        let app = service!(fixture);

        for (query, number, len) in [
            ("?page=3", 2, 3),
            ("?page=999999999999999999999999", 2, 3),
            ("?page=0", 1, 10),
            ("?page=-4", 1, 10),
            ("?page=abc", 1, 10),
            ("?page=", 1, 10),
        ] {
            let req = test::TestRequest::get().uri(&format!("/{query}")).to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["page_obj"]["number"], number, "query {query}");
            assert_eq!(
                body["page_obj"]["object_list"].as_array().unwrap().len(),
                len,
                "query {query}"
            );
        }
    }

    #[actix_web::test]
    async fn test_repeated_page_takes_the_last() {
        let fixture = TestApp::new().await;
        fixture.group("cats", "Cats").await;
        let (author, _) = fixture.user("leo").await;
        fixture.posts(&author, 13, Some("cats")).await;
        let app = service!(fixture);

        for uri in [
            "/?page=2&page=1",
            "/group/cats/?page=2&page=1",
            "/profile/leo/?page=2&page=1",
        ] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["page_obj"]["number"], 1, "{uri}");
            assert_eq!(
                body["page_obj"]["object_list"].as_array().unwrap().len(),
                10,
                "{uri}"
            );
        }

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/group/missing/?page=1&page=2")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_page_number_reads_last_value() {
        let pairs = |raw: &[(&str, &str)]| -> Vec<(String, String)> {
            raw.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };

        assert_eq!(page_number(&pairs(&[])), PageNumber::First);
        assert_eq!(
            page_number(&pairs(&[("page", "2"), ("q", "x"), ("page", "3")])),
            PageNumber::Exact(3)
        );
        assert_eq!(page_number(&pairs(&[("page", "2"), ("page", "nope")])), PageNumber::First);
    }

    #[actix_web::test]
    async fn test_empty_index_has_one_empty_page() {
        let app = service!(TestApp::new().await);

        let body: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(body["page_obj"]["number"], 1);
        assert_eq!(body["page_obj"]["num_pages"], 1);
        assert!(body["page_obj"]["object_list"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_group_page_lists_only_its_posts() {
        let fixture = TestApp::new().await;
        fixture.group("cats", "Cats").await;
        fixture.group("dogs", "Dogs").await;
        let (author, _) = fixture.user("leo").await;
        fixture.posts(&author, 2, Some("cats")).await;
        fixture.posts(&author, 1, None).await;
        let app = service!(fixture);

        let cats: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/group/cats/").to_request(),
        )
        .await;
        assert_eq!(cats["group"]["title"], "Cats");
        assert_eq!(cats["page_obj"]["count"], 2);
        for post in cats["page_obj"]["object_list"].as_array().unwrap() {
            assert_eq!(post["group"], "cats");
        }

        let dogs: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/group/dogs/").to_request(),
        )
        .await;
        assert!(dogs["page_obj"]["object_list"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_unknown_targets_are_404() {
        let app = service!(TestApp::new().await);

        for uri in [
            "/group/missing/",
            "/profile/nobody/",
            "/posts/42/",
            "/posts/abc/",
            "/unexisting_page/",
        ] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[actix_web::test]
    async fn test_profile_and_detail() {
        let fixture = TestApp::new().await;
        let (leo, _) = fixture.user("leo").await;
        let (mia, _) = fixture.user("mia").await;
        let ids = fixture.posts(&leo, 3, None).await;
        fixture.posts(&mia, 1, None).await;
        let app = service!(fixture);

        let profile: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/profile/leo/").to_request(),
        )
        .await;
        assert_eq!(profile["author"]["username"], "leo");
        assert_eq!(profile["page_obj"]["count"], 3);

        let detail: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/posts/{}/", ids[0]))
                .to_request(),
        )
        .await;
        assert_eq!(detail["post"]["id"], ids[0]);
        assert_eq!(detail["post"]["author"], "leo");
        assert_eq!(detail["count_post"], 3);
    }

    #[actix_web::test]
    async fn test_anonymous_create_redirects_to_login() {
        let fixture = TestApp::new().await;
        let app = service!(fixture);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/create/").to_request())
            .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/auth/login/?next=/create/");

        let req = test::TestRequest::post()
            .uri("/create/")
            .set_form([("text", "sneaky")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), "/auth/login/?next=/create/");
        assert_eq!(fixture.store.count(&PostFilter::All).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_create_form_lists_groups() {
        let fixture = TestApp::new().await;
        fixture.group("cats", "Cats").await;
        let (_, token) = fixture.user("leo").await;
        let app = service!(fixture);

        let req = test::TestRequest::get()
            .uri("/create/")
            .insert_header(TestApp::bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["is_edit"], false);
        assert_eq!(body["groups"][0]["slug"], "cats");
        assert!(body["form"]["errors"].as_object().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_create_post_redirects_to_profile() {
        let fixture = TestApp::new().await;
        fixture.group("cats", "Cats").await;
        let (_, token) = fixture.user("leo").await;
        let app = service!(fixture);

        let req = test::TestRequest::post()
            .uri("/create/")
            .insert_header(TestApp::bearer(&token))
            .set_form([("text", "Fresh post"), ("group", "cats")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/profile/leo/");
        assert_eq!(fixture.store.count(&PostFilter::All).await.unwrap(), 1);
        assert_eq!(
            fixture
                .store
                .count(&PostFilter::Group("cats".into()))
                .await
                .unwrap(),
            1
        );
    }

    #[actix_web::test]
    async fn test_invalid_create_rerenders_form() {
        let fixture = TestApp::new().await;
        let (_, token) = fixture.user("leo").await;
        let app = service!(fixture);

        let req = test::TestRequest::post()
            .uri("/create/")
            .insert_header(TestApp::bearer(&token))
            .set_form([("text", "   "), ("group", "ghosts")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["form"]["errors"]["text"][0], REQUIRED);
        assert_eq!(body["form"]["errors"]["group"][0], INVALID_CHOICE);
        assert_eq!(body["form"]["group"], "ghosts");
        assert_eq!(fixture.store.count(&PostFilter::All).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_author_edit_keeps_identity() {
        let fixture = TestApp::new().await;
        let (leo, token) = fixture.user("leo").await;
        let ids = fixture.posts(&leo, 1, None).await;
        let before = fixture.store.find_by_id(ids[0]).await.unwrap().unwrap();
        let app = service!(fixture);

        let edit_uri = format!("/posts/{}/edit/", ids[0]);
        let req = test::TestRequest::get()
            .uri(&edit_uri)
            .insert_header(TestApp::bearer(&token))
            .to_request();
        let form: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(form["is_edit"], true);
        assert_eq!(form["form"]["text"], before.text);

        let req = test::TestRequest::post()
            .uri(&edit_uri)
            .insert_header(TestApp::bearer(&token))
            .set_form([("text", "Edited text")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), format!("/posts/{}/", ids[0]));

        let after = fixture.store.find_by_id(ids[0]).await.unwrap().unwrap();
        assert_eq!(after.text, "Edited text");
        assert_eq!(after.id, before.id);
        assert_eq!(after.author, before.author);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(fixture.store.count(&PostFilter::All).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_non_author_edit_redirects_to_detail() {
        let fixture = TestApp::new().await;
        let (leo, _) = fixture.user("leo").await;
        let (_, mia_token) = fixture.user("mia").await;
        let ids = fixture.posts(&leo, 1, None).await;
        let app = service!(fixture);

        let edit_uri = format!("/posts/{}/edit/", ids[0]);
        for req in [
            test::TestRequest::get()
                .uri(&edit_uri)
                .insert_header(TestApp::bearer(&mia_token))
                .to_request(),
            test::TestRequest::post()
                .uri(&edit_uri)
                .insert_header(TestApp::bearer(&mia_token))
                .set_form([("text", "")])
                .to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::FOUND);
            assert_eq!(location(&resp), format!("/posts/{}/", ids[0]));
        }

        let post = fixture.store.find_by_id(ids[0]).await.unwrap().unwrap();
        assert_eq!(post.text, "Test post 1");
    }

    #[actix_web::test]
    async fn test_anonymous_edit_redirects_to_login() {
        let fixture = TestApp::new().await;
        let app = service!(fixture);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/posts/5/edit/").to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/auth/login/?next=/posts/5/edit/");
    }

    #[actix_web::test]
    async fn test_edit_of_missing_post_is_404() {
        let fixture = TestApp::new().await;
        let (_, token) = fixture.user("leo").await;
        let app = service!(fixture);

        let req = test::TestRequest::get()
            .uri("/posts/77/edit/")
            .insert_header(TestApp::bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_token_for_unknown_account_is_anonymous() {
        let fixture = TestApp::new().await;
        let token = fixture
            .state
            .tokens
            .generate_token(Uuid::new_v4(), "ghost", Vec::new())
            .unwrap();
        let app = service!(fixture);

        let req = test::TestRequest::post()
            .uri("/create/")
            .insert_header(TestApp::bearer(&token))
            .set_form([("text", "from a stale session")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/auth/login/?next=/create/");
        assert_eq!(fixture.store.count(&PostFilter::All).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_invalid_token_is_anonymous() {
        let app = service!(TestApp::new().await);

        let req = test::TestRequest::get()
            .uri("/create/")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/auth/login/?next=/create/");
    }
}
