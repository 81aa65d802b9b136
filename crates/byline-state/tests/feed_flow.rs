//! End-to-end feed behavior: navigation-driven fetches, pagination, and
//! response application, against a mock article API.

use std::rc::Rc;
use std::time::Duration;

use byline_core::api::Article;
use byline_core::config::Config;
use byline_core::session::SessionStore;
use byline_state::context::AppContext;
use byline_state::nav::{RouteName, RouteParams};
use serde_json::json;
use tempfile::TempDir;
use tokio::task::LocalSet;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article_json(slug: &str) -> serde_json::Value {
    json!({
        "slug": slug,
        "title": "Title",
        "description": "desc",
        "body": "body",
        "tagList": [],
        "createdAt": "2024-03-01T12:00:00.000Z",
        "updatedAt": "2024-03-01T12:00:00.000Z",
        "favorited": false,
        "favoritesCount": 0,
        "author": {"username": "alice", "bio": null, "image": null, "following": false}
    })
}

fn list_json(slugs: &[&str]) -> serde_json::Value {
    json!({
        "articles": slugs.iter().map(|s| article_json(s)).collect::<Vec<_>>(),
        "articlesCount": slugs.len(),
    })
}

async fn setup() -> (MockServer, TempDir, Rc<AppContext>) {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        api_base_url: server.uri(),
        request_timeout_secs: 0,
    };
    let ctx = AppContext::with_store(&config, SessionStore::at(dir.path().join("session.json")))
        .unwrap();
    (server, dir, ctx)
}

/// Polls a condition; the runtime keeps driving spawned fetches in between.
async fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for: {what}");
}

/// Waits until the mock server has seen at least `count` requests.
async fn wait_for_requests(server: &MockServer, count: usize) {
    for _ in 0..400 {
        if server.received_requests().await.unwrap().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {count} requests");
}

#[tokio::test]
async fn test_tag_feed_issues_one_filtered_fetch() {
    let (server, _dir, ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("tag", "rust"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["a", "b"])))
        .expect(1)
        .mount(&server)
        .await;

    let local = LocalSet::new();
    local
        .run_until(async {
            let feed = ctx.feed();
            ctx.nav.push_with(RouteName::Tag, RouteParams::tag("rust"));

            wait_until("tag feed applied", || feed.articles_count().get() == 2).await;
            assert_eq!(feed.articles().with(Vec::len), 2);
            assert_eq!(feed.articles().with(|a| a[0].slug.clone()), "a");
            assert_eq!(feed.current_page(), 1);
            assert!(!feed.is_fetching());
        })
        .await;
}

#[tokio::test]
async fn test_personal_feed_uses_feed_endpoint() {
    let (server, _dir, ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path("/articles/feed"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["followed"])))
        .expect(1)
        .mount(&server)
        .await;

    let local = LocalSet::new();
    local
        .run_until(async {
            let feed = ctx.feed();
            ctx.nav.push(RouteName::MyFeed);
            wait_until("personal feed applied", || feed.articles_count().get() == 1).await;
        })
        .await;
}

#[tokio::test]
async fn test_author_and_favorited_feeds_filter_by_username() {
    let (server, _dir, ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("author", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["by-alice"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("favorited", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["liked-1", "liked-2"])))
        .expect(1)
        .mount(&server)
        .await;

    let local = LocalSet::new();
    local
        .run_until(async {
            let feed = ctx.feed();
            ctx.nav
                .push_with(RouteName::Profile, RouteParams::username("alice"));
            wait_until("author feed applied", || feed.articles_count().get() == 1).await;

            ctx.nav
                .push_with(RouteName::ProfileFavorites, RouteParams::username("alice"));
            wait_until("favorited feed applied", || feed.articles_count().get() == 2).await;
        })
        .await;
}

#[tokio::test]
async fn test_set_page_same_value_is_no_op() {
    let (server, _dir, ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["a"])))
        .expect(1)
        .mount(&server)
        .await;

    let local = LocalSet::new();
    local
        .run_until(async {
            let feed = ctx.feed();
            feed.refetch().await.unwrap();
            assert_eq!(feed.articles_count().get(), 1);

            // Same page again: no watcher fires, no request goes out.
            feed.set_page(1);
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert_eq!(server.received_requests().await.unwrap().len(), 1);
        })
        .await;
}

#[tokio::test]
async fn test_set_page_fetches_at_new_offset() {
    let (server, _dir, ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["page-two"])))
        .expect(1)
        .mount(&server)
        .await;

    let local = LocalSet::new();
    local
        .run_until(async {
            let feed = ctx.feed();
            feed.set_page(2);
            wait_until("page 2 applied", || {
                feed.articles().with(|a| a.first().map(|x| x.slug.clone())) == Some("page-two".into())
            })
            .await;
            assert_eq!(feed.current_page(), 2);
        })
        .await;
}

#[tokio::test]
async fn test_kind_change_on_deep_page_collapses_to_one_fetch() {
    let (server, _dir, ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("offset", "0"))
        .and(query_param("tag", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["tagged"])))
        .expect(1)
        .named("tag fetch at page 1")
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["global"])))
        .mount(&server)
        .await;

    let local = LocalSet::new();
    local
        .run_until(async {
            let feed = ctx.feed();
            feed.refetch().await.unwrap();

            feed.set_page(3);
            wait_for_requests(&server, 2).await;
            let before = server.received_requests().await.unwrap().len();

            // Descriptor changes while on page 3: one fetch, for page 1
            // under the new kind.
            ctx.nav.push_with(RouteName::Tag, RouteParams::tag("rust"));
            wait_until("tag feed applied", || {
                feed.articles().with(|a| a.first().map(|x| x.slug.clone())) == Some("tagged".into())
            })
            .await;

            assert_eq!(feed.current_page(), 1);
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert_eq!(server.received_requests().await.unwrap().len(), before + 1);
        })
        .await;
}

#[tokio::test]
async fn test_username_change_resets_to_page_one_with_single_fetch() {
    let (server, _dir, ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("favorited", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["a1"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("favorited", "bob"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["b1", "b2"])))
        .expect(1)
        .named("bob favorites at page 1")
        .mount(&server)
        .await;

    let local = LocalSet::new();
    local
        .run_until(async {
            let feed = ctx.feed();
            ctx.nav
                .push_with(RouteName::ProfileFavorites, RouteParams::username("alice"));
            wait_until("alice favorites applied", || feed.articles_count().get() == 1).await;

            feed.set_page(3);
            wait_for_requests(&server, 2).await;
            let before = server.received_requests().await.unwrap().len();

            ctx.nav
                .push_with(RouteName::ProfileFavorites, RouteParams::username("bob"));
            wait_until("bob favorites applied", || feed.articles_count().get() == 2).await;

            assert_eq!(feed.current_page(), 1);
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert_eq!(server.received_requests().await.unwrap().len(), before + 1);
        })
        .await;
}

#[tokio::test]
async fn test_filtered_kind_without_value_issues_no_request() {
    let (server, _dir, ctx) = setup().await;

    let local = LocalSet::new();
    local
        .run_until(async {
            let feed = ctx.feed();
            // Tag route with no tag param: descriptor is not actionable.
            ctx.nav.push_with(RouteName::Tag, RouteParams::default());
            tokio::time::sleep(Duration::from_millis(50)).await;

            assert!(server.received_requests().await.unwrap().is_empty());
            assert_eq!(feed.articles().with(Vec::len), 0);
            assert!(!feed.is_fetching());
        })
        .await;
}

#[tokio::test]
async fn test_superseded_response_does_not_overwrite_newer_state() {
    let (server, _dir, ctx) = setup().await;
    // The page-2 fetch answers slowly; by the time it lands, page 1 owns
    // the list.
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("offset", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_json(&["slow-1", "slow-2", "slow-3"]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["fresh"])))
        .mount(&server)
        .await;

    let local = LocalSet::new();
    local
        .run_until(async {
            let feed = ctx.feed();
            feed.set_page(2);
            wait_until("slow fetch started", || feed.is_fetching()).await;

            feed.set_page(1);
            wait_until("fresh response applied", || feed.articles_count().get() == 1).await;

            // Give the slow response time to land; it must be discarded.
            tokio::time::sleep(Duration::from_millis(300)).await;
            assert_eq!(feed.articles_count().get(), 1);
            assert_eq!(feed.articles().with(|a| a[0].slug.clone()), "fresh");
        })
        .await;
}

#[tokio::test]
async fn test_update_article_at_replaces_in_bounds_only() {
    let (server, _dir, ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(&["a", "b"])))
        .mount(&server)
        .await;

    let local = LocalSet::new();
    local
        .run_until(async {
            let feed = ctx.feed();
            feed.refetch().await.unwrap();

            let mut replacement: Article = serde_json::from_value(article_json("a")).unwrap();
            replacement.favorited = true;
            replacement.favorites_count = 1;
            feed.update_article_at(0, replacement.clone());
            assert!(feed.articles().with(|a| a[0].favorited));

            // Out of range: ignored, list untouched.
            feed.update_article_at(99, replacement);
            assert_eq!(feed.articles().with(Vec::len), 2);
        })
        .await;
}
