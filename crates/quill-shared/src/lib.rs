//! # Quill Shared
//!
//! Request and response bodies exchanged with clients.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
