//! Wire types for the article API.
//!
//! Field names follow the server's camelCase JSON. Articles are treated as
//! opaque records by the state layer: only `slug` (stable key) and
//! `favorited` are inspected, and mutation is whole-record replacement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user record, including the API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    /// JWT attached to authenticated requests.
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Public profile of an article author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub following: bool,
}

/// A single article as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub favorited: bool,
    pub favorites_count: u64,
    pub author: Profile,
}

/// A page of articles plus the unpaginated total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleList {
    pub articles: Vec<Article>,
    pub articles_count: u64,
}

/// Envelope for single-article responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ArticleEnvelope {
    pub article: Article,
}
