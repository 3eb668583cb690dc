//! Blog and account services running on the in-memory store.

use std::sync::Arc;

use uuid::Uuid;

use quill_core::domain::{Author, Group, NewPost, Post, PostContent, PostFilter, Principal, User};
use quill_core::error::DomainError;
use quill_core::forms::{PostForm, REQUIRED};
use quill_core::ports::{BaseRepository, PostRepository};
use quill_core::service::{AccountService, BlogService, NewGroup, Outcome, Redirect};
use quill_core::{PageNumber, Paginator};
use quill_infra::{Argon2PasswordService, InMemoryStore};

struct Blog {
    store: Arc<InMemoryStore>,
    service: BlogService,
    accounts: AccountService,
}

impl Blog {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let service = BlogService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Paginator::default(),
        );
        let accounts = AccountService::new(store.clone(), Arc::new(Argon2PasswordService::new()));
        Self {
            store,
            service,
            accounts,
        }
    }

    async fn user(&self, username: &str, is_staff: bool) -> Principal {
        let mut user = User::new(username.to_string(), "unused-hash".to_string());
        user.is_staff = is_staff;
        BaseRepository::<User, Uuid>::insert(&*self.store, user)
            .await
            .unwrap()
            .principal()
    }

    async fn group(&self, slug: &str) {
        BaseRepository::<Group, String>::insert(&*self.store, Group::new(slug, slug, ""))
            .await
            .unwrap();
    }

    async fn post(&self, author: &Author, text: &str, group: Option<&str>) -> i64 {
        self.store
            .create(NewPost {
                author: author.clone(),
                content: PostContent {
                    text: text.to_string(),
                    group: group.map(str::to_string),
                },
            })
            .await
            .unwrap()
            .id
    }

    async fn find(&self, id: i64) -> Post {
        PostRepository::find_by_id(&*self.store, id)
            .await
            .unwrap()
            .unwrap()
    }

    async fn count(&self) -> u64 {
        self.store.count(&PostFilter::All).await.unwrap()
    }
}

#[tokio::test]
async fn test_listings_page_by_ten() {
    let blog = Blog::new();
    let leo = blog.user("leo", false).await;
    blog.group("cats").await;
    for i in 0..13 {
        blog.post(&leo.as_author(), &format!("post {i}"), Some("cats")).await;
    }

    let first = blog.service.index(PageNumber::First).await.unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(first.num_pages, 2);

    let second = blog.service.index(PageNumber::Exact(2)).await.unwrap();
    assert_eq!(second.len(), 3);

    let clamped = blog.service.index(PageNumber::Exact(3)).await.unwrap();
    assert_eq!(clamped, second);

    let last = blog.service.index(PageNumber::Last).await.unwrap();
    assert_eq!(last.number, 2);

    let group = blog
        .service
        .group_posts("cats", PageNumber::Exact(2))
        .await
        .unwrap();
    assert_eq!(group.page.len(), 3);

    let profile = blog.service.profile("leo", PageNumber::First).await.unwrap();
    assert_eq!(profile.page.count, 13);
    assert_eq!(profile.author.username, "leo");
}

#[tokio::test]
async fn test_empty_group_has_no_posts() {
    let blog = Blog::new();
    let leo = blog.user("leo", false).await;
    blog.group("cats").await;
    blog.group("dogs").await;
    blog.post(&leo.as_author(), "meow", Some("cats")).await;

    let dogs = blog
        .service
        .group_posts("dogs", PageNumber::First)
        .await
        .unwrap();
    assert!(dogs.page.is_empty());
    assert_eq!(dogs.page.num_pages, 1);

    let missing = blog.service.group_posts("birds", PageNumber::First).await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_detail_counts_author_posts() {
    let blog = Blog::new();
    let leo = blog.user("leo", false).await;
    let mia = blog.user("mia", false).await;
    let id = blog.post(&leo.as_author(), "first", None).await;
    blog.post(&leo.as_author(), "second", None).await;
    blog.post(&mia.as_author(), "other", None).await;

    let detail = blog.service.post_detail(id).await.unwrap();
    assert_eq!(detail.post.text, "first");
    assert_eq!(detail.author_post_count, 2);

    assert!(matches!(
        blog.service.post_detail(999).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_create_adds_exactly_one_post() {
    let blog = Blog::new();
    let leo = blog.user("leo", false).await;
    blog.group("cats").await;

    let outcome = blog
        .service
        .create(Some(&leo), Some(PostForm::new("Hello", Some("cats"))))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        Outcome::Redirect(Redirect::Profile(ref name)) if name == "leo"
    ));
    assert_eq!(blog.count().await, 1);

    let latest = blog.service.index(PageNumber::First).await.unwrap();
    let post = &latest.items[0];
    assert_eq!(post.text, "Hello");
    assert_eq!(post.author, leo.as_author());
    assert_eq!(post.group.as_deref(), Some("cats"));
}

#[tokio::test]
async fn test_invalid_create_changes_nothing() {
    let blog = Blog::new();
    let leo = blog.user("leo", false).await;

    let outcome = blog
        .service
        .create(Some(&leo), Some(PostForm::default()))
        .await
        .unwrap();

    let Outcome::Render(view) = outcome else {
        panic!("expected the form to be shown again");
    };
    assert_eq!(view.errors.field("text").to_vec(), vec![REQUIRED.to_string()]);
    assert!(!view.is_edit);
    assert_eq!(blog.count().await, 0);
}

#[tokio::test]
async fn test_anonymous_create_goes_to_login() {
    let blog = Blog::new();

    let outcome = blog
        .service
        .create(None, Some(PostForm::new("text", None)))
        .await
        .unwrap();

    let Outcome::Redirect(redirect) = outcome else {
        panic!("expected a redirect");
    };
    assert_eq!(redirect.location(), "/auth/login/?next=/create/");
    assert_eq!(blog.count().await, 0);
}

#[tokio::test]
async fn test_create_by_unknown_account_goes_to_login() {
    let blog = Blog::new();
    let ghost = User::new("ghost".to_string(), "unused-hash".to_string()).principal();

    let outcome = blog
        .service
        .create(Some(&ghost), Some(PostForm::new("text", None)))
        .await
        .unwrap();

    let Outcome::Redirect(redirect) = outcome else {
        panic!("expected a redirect");
    };
    assert_eq!(redirect.location(), "/auth/login/?next=/create/");
    assert_eq!(blog.count().await, 0);
}

#[tokio::test]
async fn test_edit_by_author_keeps_identity() {
    let blog = Blog::new();
    let leo = blog.user("leo", false).await;
    blog.group("cats").await;
    let id = blog.post(&leo.as_author(), "before", None).await;
    let before = blog.find(id).await;

    let outcome = blog
        .service
        .edit(Some(&leo), id, Some(PostForm::new("after", Some("cats"))))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Redirect(Redirect::PostDetail(pid)) if pid == id));

    let after = blog.find(id).await;
    assert_eq!(after.text, "after");
    assert_eq!(after.group.as_deref(), Some("cats"));
    assert_eq!(after.id, before.id);
    assert_eq!(after.author, before.author);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(blog.count().await, 1);
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let blog = Blog::new();
    let leo = blog.user("leo", false).await;
    let id = blog.post(&leo.as_author(), "draft", None).await;

    let Outcome::Render(view) = blog.service.edit(Some(&leo), id, None).await.unwrap() else {
        panic!("expected the edit form");
    };
    assert!(view.is_edit);
    assert_eq!(view.post_id, Some(id));
    assert_eq!(view.form.text.as_deref(), Some("draft"));
}

#[tokio::test]
async fn test_edit_by_stranger_changes_nothing() {
    let blog = Blog::new();
    let leo = blog.user("leo", false).await;
    let mia = blog.user("mia", false).await;
    let id = blog.post(&leo.as_author(), "mine", None).await;

    let outcome = blog
        .service
        .edit(Some(&mia), id, Some(PostForm::new("hijacked", None)))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Redirect(Redirect::PostDetail(pid)) if pid == id));
    let post = blog.find(id).await;
    assert_eq!(post.text, "mine");
}

#[tokio::test]
async fn test_anonymous_edit_checks_login_first() {
    let blog = Blog::new();

    let outcome = blog.service.edit(None, 404, None).await.unwrap();
    let Outcome::Redirect(redirect) = outcome else {
        panic!("expected a redirect");
    };
    assert_eq!(redirect.location(), "/auth/login/?next=/posts/404/edit/");
}

#[tokio::test]
async fn test_group_creation_is_staff_only() {
    let blog = Blog::new();
    let admin = blog.user("root", true).await;
    let leo = blog.user("leo", false).await;
    let input = || NewGroup {
        slug: "cats".to_string(),
        title: "  Cats  ".to_string(),
        description: "Feline matters".to_string(),
    };

    assert!(matches!(
        blog.service.create_group(None, input()).await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        blog.service.create_group(Some(&leo), input()).await,
        Err(DomainError::Forbidden)
    ));

    let group = blog.service.create_group(Some(&admin), input()).await.unwrap();
    assert_eq!(group.title, "Cats");
    assert_eq!(blog.service.groups().await.unwrap(), vec![group]);

    assert!(matches!(
        blog.service.create_group(Some(&admin), input()).await,
        Err(DomainError::Duplicate(_))
    ));
}

#[tokio::test]
async fn test_register_and_authenticate() {
    let blog = Blog::new();

    let user = blog.accounts.register("leo", "long-enough").await.unwrap();
    assert!(!user.is_staff);

    let found = blog
        .accounts
        .authenticate("leo", "long-enough")
        .await
        .unwrap();
    assert_eq!(found.id, user.id);

    assert!(matches!(
        blog.accounts.authenticate("leo", "wrong-password").await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        blog.accounts.authenticate("ghost", "long-enough").await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        blog.accounts.register("leo", "long-enough").await,
        Err(DomainError::Duplicate(_))
    ));
    assert!(matches!(
        blog.accounts.register("mia", "short").await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        blog.accounts.register("bad name", "long-enough").await,
        Err(DomainError::Validation(_))
    ));
}
