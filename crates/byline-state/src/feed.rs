//! Feed fetch and pagination orchestration.
//!
//! A `FeedController` owns the article list for the descriptor produced by
//! its resolver. Two watchers drive it:
//!
//! - **descriptor identity** (the resolver's meta token): a change while on
//!   page 1 refetches directly; on a later page it resets to page 1 instead
//!   and lets the page watcher issue the fetch,
//! - **current page**: any change refetches.
//!
//! The split collapses "filter changed while on page 3" into a single fetch
//! rather than one for the old page under the new filter plus one for page 1.
//!
//! Watcher-triggered fetches are spawned with `spawn_local`, so the
//! controller must live on a tokio `LocalSet`. The embedding shell issues
//! the first `refetch` once composition is done.

use std::rc::Rc;

use byline_core::api::{ApiClient, ApiResult, Article, ArticleFilter};

use crate::policy::ErrorPolicy;
use crate::resolver::{FeedKind, FeedResolver};
use crate::signal::Signal;
use crate::task::{AsyncGuard, FetchSeq};

/// Articles per page; mirrors the server's page length.
pub const PAGE_SIZE: u64 = 10;

/// Converts a 1-based page number to the API's offset parameter.
pub fn page_to_offset(page: u64) -> u64 {
    page.saturating_sub(1) * PAGE_SIZE
}

/// The two request shapes a descriptor can map to.
enum FeedRequest {
    /// `GET /articles/feed` for the current session.
    Personal,
    /// `GET /articles` with an optional filter.
    List(ArticleFilter),
}

pub struct FeedController {
    api: Rc<ApiClient>,
    resolver: Rc<FeedResolver>,
    articles: Signal<Vec<Article>>,
    articles_count: Signal<u64>,
    page: Signal<u64>,
    guard: AsyncGuard,
    seq: FetchSeq,
}

impl FeedController {
    pub fn new(
        api: Rc<ApiClient>,
        resolver: Rc<FeedResolver>,
        policy: Rc<ErrorPolicy>,
    ) -> Rc<Self> {
        let controller = Rc::new(Self {
            api,
            resolver,
            articles: Signal::new(Vec::new()),
            articles_count: Signal::new(0),
            page: Signal::new(1),
            guard: AsyncGuard::new(policy),
            seq: FetchSeq::default(),
        });

        // Watcher A: descriptor identity.
        let weak = Rc::downgrade(&controller);
        controller.resolver.meta().watch(move |_| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            if controller.page.get() == 1 {
                controller.spawn_refetch();
            } else {
                // Triggers watcher B, which issues the single fetch for
                // page 1 under the new descriptor.
                controller.set_page(1);
            }
        });

        // Watcher B: current page.
        let weak = Rc::downgrade(&controller);
        controller.page.watch(move |_| {
            if let Some(controller) = weak.upgrade() {
                controller.spawn_refetch();
            }
        });

        controller
    }

    /// The article list, in server order. Cleared at the start of every
    /// fetch to signal loading.
    pub fn articles(&self) -> &Signal<Vec<Article>> {
        &self.articles
    }

    /// Unpaginated total reported by the server.
    pub fn articles_count(&self) -> &Signal<u64> {
        &self.articles_count
    }

    pub fn current_page(&self) -> u64 {
        self.page.get()
    }

    /// Observable fetch-in-flight flag.
    pub fn fetching(&self) -> &Signal<bool> {
        self.guard.active()
    }

    pub fn is_fetching(&self) -> bool {
        self.guard.in_flight()
    }

    /// Sets the current page. Setting the current value again is a no-op;
    /// a new value triggers exactly one fetch at the recomputed offset.
    pub fn set_page(&self, page: u64) {
        self.page.set(page);
    }

    /// Replaces one article in place (e.g. after a favorite toggle) without
    /// re-fetching. Out-of-range indexes are ignored with a warning.
    pub fn update_article_at(&self, index: usize, article: Article) {
        let len = self.articles.with(Vec::len);
        if index >= len {
            tracing::warn!(index, len, "ignoring article update outside list bounds");
            return;
        }
        self.articles.update(|items| items[index] = article);
    }

    /// Re-issues the fetch for the current descriptor and page.
    ///
    /// Session-expiry failures are absorbed by the error policy; any other
    /// failure is returned to the caller. A response that lost the race to
    /// a newer fetch is discarded without touching list state.
    pub async fn refetch(&self) -> ApiResult<()> {
        self.guard.run(self.fetch_articles()).await.map(|_| ())
    }

    /// Spawns a watcher-triggered fetch onto the local task set. With no
    /// caller to re-raise to, non-absorbed failures are logged.
    fn spawn_refetch(self: &Rc<Self>) {
        let controller = Rc::clone(self);
        tokio::task::spawn_local(async move {
            if let Err(err) = controller.refetch().await {
                tracing::warn!(error = %err, "feed fetch failed");
            }
        });
    }

    async fn fetch_articles(&self) -> ApiResult<()> {
        // Clear first so observers see a loading state.
        self.articles.set(Vec::new());

        let kind = self.resolver.kind().get();
        let offset = page_to_offset(self.page.get());

        let Some(request) = self.request_for(kind) else {
            // A descriptor whose filter has not caught up with its kind is
            // not actionable; leave the list empty.
            tracing::error!(kind = kind.as_str(), "feed kind has no actionable request");
            return Ok(());
        };

        let id = self.seq.issue();
        let list = match request {
            FeedRequest::Personal => self.api.personal_feed(offset, PAGE_SIZE).await?,
            FeedRequest::List(filter) => self.api.list_articles(&filter, offset, PAGE_SIZE).await?,
        };

        if !self.seq.is_latest(id) {
            tracing::debug!("discarding response from superseded fetch");
            return Ok(());
        }

        self.articles.set(list.articles);
        self.articles_count.set(list.articles_count);
        Ok(())
    }

    /// Exhaustive kind → request-shape dispatch. Filtered kinds with an
    /// empty filter value are not actionable.
    fn request_for(&self, kind: FeedKind) -> Option<FeedRequest> {
        match kind {
            FeedKind::Personal => Some(FeedRequest::Personal),
            FeedKind::Global => Some(FeedRequest::List(ArticleFilter::None)),
            FeedKind::Tag => {
                let tag = self.resolver.tag().get();
                (!tag.is_empty()).then(|| FeedRequest::List(ArticleFilter::Tag(tag)))
            }
            FeedKind::Author => {
                let username = self.resolver.username().get();
                (!username.is_empty()).then(|| FeedRequest::List(ArticleFilter::Author(username)))
            }
            FeedKind::Favorited => {
                let username = self.resolver.username().get();
                (!username.is_empty())
                    .then(|| FeedRequest::List(ArticleFilter::FavoritedBy(username)))
            }
        }
    }
}
