//! Conversions from domain results into response bodies.

use actix_web::{HttpResponse, http::header};

use quill_core::Page;
use quill_core::domain::{Author, Group, Post};
use quill_core::service::{FormView, Outcome};
use quill_shared::dto::{
    GroupResponse, PageResponse, PostFormFields, PostFormResponse, PostResponse, UserResponse,
};

pub fn post(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        text: post.text,
        pub_date: post.created_at,
        author: post.author.username,
        group: post.group,
    }
}

pub fn group(group: Group) -> GroupResponse {
    GroupResponse {
        slug: group.slug,
        title: group.title,
        description: group.description,
    }
}

pub fn author(author: Author) -> UserResponse {
    UserResponse {
        id: author.id,
        username: author.username,
    }
}

pub fn page(page: Page<Post>) -> PageResponse<PostResponse> {
    PageResponse {
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        next_page_number: page.next_page_number(),
        previous_page_number: page.previous_page_number(),
        number: page.number,
        num_pages: page.num_pages,
        count: page.count,
        object_list: page.items.into_iter().map(post).collect(),
    }
}

pub fn form(view: FormView) -> PostFormResponse {
    let errors = view
        .errors
        .iter()
        .map(|(field, messages)| (field.to_string(), messages.to_vec()))
        .collect();

    PostFormResponse {
        form: PostFormFields {
            text: view.form.text,
            group: view.form.group,
            errors,
        },
        is_edit: view.is_edit,
        post_id: view.post_id,
        groups: view.groups.into_iter().map(group).collect(),
    }
}

/// `302 Found` pointing at `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Render the form, or follow the redirect the service decided on.
pub fn outcome(outcome: Outcome) -> HttpResponse {
    match outcome {
        Outcome::Render(view) => HttpResponse::Ok().json(form(view)),
        Outcome::Redirect(to) => redirect(&to.location()),
    }
}
