//! HTTP client for the article API.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiClient, ApiClientConfig, ArticleFilter, CredentialSink};
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use types::{Article, ArticleList, Profile, User};
