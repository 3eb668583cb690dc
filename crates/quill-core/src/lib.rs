//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! Entities, pagination, form validation and the services that orchestrate
//! them. Storage and authentication are reached only through the traits in
//! [`ports`].

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use pagination::{DEFAULT_PAGE_SIZE, Page, PageNumber, PageWindow, Paginator};
