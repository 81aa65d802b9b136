//! Article API client.
//!
//! One `ApiClient` is shared by the whole data layer. It owns the credential
//! slot: the session layer pushes the current token through
//! [`CredentialSink::set_credential`] and every subsequent request carries it
//! as `Authorization: Token <jwt>`.

use std::cell::RefCell;
use std::time::Duration;

use anyhow::Result;
use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiResult};
use super::types::{Article, ArticleEnvelope, ArticleList};
use crate::config::{Config, DEFAULT_API_BASE_URL};

/// Registration point for the session's auth token.
///
/// Implemented by [`ApiClient`]; the session layer only sees this trait.
pub trait CredentialSink {
    /// Attaches (or with `None`, clears) the token used for subsequent
    /// authenticated requests.
    fn set_credential(&self, token: Option<&str>);
}

/// Optional filter for article list requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleFilter {
    None,
    Tag(String),
    Author(String),
    FavoritedBy(String),
}

/// Configuration for the article API client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl ApiClientConfig {
    /// Builds a client config from the loaded app config.
    ///
    /// # Errors
    /// Returns an error if the base URL fails to resolve (see
    /// [`Config::resolve_api_base_url`]).
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            base_url: config.resolve_api_base_url()?,
            timeout: config.request_timeout(),
        })
    }
}

/// Article API client.
pub struct ApiClient {
    config: ApiClientConfig,
    http: reqwest::Client,
    token: RefCell<Option<String>>,
}

impl ApiClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Panics
    /// - In test builds (`#[cfg(test)]`), panics if `base_url` is the production API.
    /// - At runtime, panics if `BYLINE_BLOCK_REAL_API=1` and `base_url` is the production API.
    ///
    /// This prevents tests from accidentally making real network requests.
    /// Use `BYLINE_API_BASE_URL` or the config file to point to a mock server.
    pub fn new(config: ApiClientConfig) -> Self {
        #[cfg(test)]
        if config.base_url == DEFAULT_API_BASE_URL {
            panic!(
                "Tests must not use the production article API!\n\
                 Set BYLINE_API_BASE_URL to a mock server (e.g., wiremock).\n\
                 Found base_url: {}",
                config.base_url
            );
        }

        #[cfg(not(test))]
        if std::env::var("BYLINE_BLOCK_REAL_API").is_ok_and(|v| v == "1")
            && config.base_url == DEFAULT_API_BASE_URL
        {
            panic!(
                "BYLINE_BLOCK_REAL_API=1 but trying to use the production article API!\n\
                 Set BYLINE_API_BASE_URL to a mock server.\n\
                 Found base_url: {}",
                config.base_url
            );
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().expect("Failed to build HTTP client");

        Self {
            config,
            http,
            token: RefCell::new(None),
        }
    }

    /// Replaces the stored auth token.
    pub fn set_token(&self, token: Option<&str>) {
        *self.token.borrow_mut() = token.map(str::to_string);
    }

    /// Returns whether a token is currently attached (for diagnostics).
    pub fn has_token(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Lists articles, newest first, with an optional filter.
    pub async fn list_articles(
        &self,
        filter: &ArticleFilter,
        offset: u64,
        limit: u64,
    ) -> ApiResult<ArticleList> {
        let mut query: Vec<(&str, String)> = Vec::new();
        match filter {
            ArticleFilter::None => {}
            ArticleFilter::Tag(tag) => query.push(("tag", tag.clone())),
            ArticleFilter::Author(username) => query.push(("author", username.clone())),
            ArticleFilter::FavoritedBy(username) => query.push(("favorited", username.clone())),
        }
        query.push(("offset", offset.to_string()));
        query.push(("limit", limit.to_string()));

        let url = format!("{}/articles", self.config.base_url);
        let request = self.authorized(self.http.get(&url)).query(&query);
        self.send(request).await
    }

    /// Lists the personal feed (articles from followed authors).
    ///
    /// Requires an attached token; the server answers 401 otherwise.
    pub async fn personal_feed(&self, offset: u64, limit: u64) -> ApiResult<ArticleList> {
        let url = format!("{}/articles/feed", self.config.base_url);
        let request = self
            .authorized(self.http.get(&url))
            .query(&[("offset", offset.to_string()), ("limit", limit.to_string())]);
        self.send(request).await
    }

    /// Marks an article as favorited and returns the updated record.
    pub async fn favorite_article(&self, slug: &str) -> ApiResult<Article> {
        let url = format!("{}/articles/{slug}/favorite", self.config.base_url);
        let request = self.authorized(self.http.post(&url));
        let envelope: ArticleEnvelope = self.send(request).await?;
        Ok(envelope.article)
    }

    /// Removes an article from favorites and returns the updated record.
    pub async fn unfavorite_article(&self, slug: &str) -> ApiResult<Article> {
        let url = format!("{}/articles/{slug}/favorite", self.config.base_url);
        let request = self.authorized(self.http.delete(&url));
        let envelope: ArticleEnvelope = self.send(request).await?;
        Ok(envelope.article)
    }

    /// Attaches the stored token, if any, to a request.
    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.borrow().as_deref() {
            Some(token) => builder.header("Authorization", format!("Token {token}")),
            None => builder,
        }
    }

    /// Sends a request and decodes a JSON response.
    ///
    /// Non-2xx responses become [`ApiError::http_status`] with the body
    /// preserved; undecodable bodies become parse errors.
    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status.as_u16(), &body));
        }

        let body = response.text().await.map_err(ApiError::from)?;
        serde_json::from_str(&body)
            .map_err(|err| ApiError::parse(format!("Failed to decode response: {err}")))
    }
}

impl CredentialSink for ApiClient {
    fn set_credential(&self, token: Option<&str>) {
        self.set_token(token);
    }
}
