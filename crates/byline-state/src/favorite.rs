//! Favorite toggling for a single article.

use std::rc::Rc;

use byline_core::api::{ApiClient, ApiResult, Article};

use crate::policy::ErrorPolicy;
use crate::signal::Signal;
use crate::task::AsyncGuard;

/// Toggles one article's favorited state, with its own in-flight flag.
pub struct FavoriteToggle {
    api: Rc<ApiClient>,
    guard: AsyncGuard,
}

impl FavoriteToggle {
    pub fn new(api: Rc<ApiClient>, policy: Rc<ErrorPolicy>) -> Self {
        Self {
            api,
            guard: AsyncGuard::new(policy),
        }
    }

    /// Observable in-flight flag for this toggle.
    pub fn busy(&self) -> &Signal<bool> {
        self.guard.active()
    }

    /// Favorites the article — or unfavorites it when `favorited` says it
    /// already is — and returns the server's refreshed record, to be written
    /// back with `FeedController::update_article_at`. Session expiry is
    /// absorbed and yields `Ok(None)`.
    pub async fn toggle(&self, slug: &str, favorited: bool) -> ApiResult<Option<Article>> {
        self.guard
            .run(async {
                if favorited {
                    self.api.unfavorite_article(slug).await
                } else {
                    self.api.favorite_article(slug).await
                }
            })
            .await
    }
}
