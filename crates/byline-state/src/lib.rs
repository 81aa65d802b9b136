//! Reactive data layer for the byline client.
//!
//! Control flow: navigation changes flow through the feed resolver into the
//! feed controller, which fetches through the async execution guard; an
//! HTTP 401 surfacing anywhere clears the session and redirects to login.
//!
//! Everything here is single-threaded and cooperative: components are shared
//! via `Rc`, and watcher-triggered fetches run on a tokio `LocalSet` via
//! `spawn_local`.

pub mod context;
pub mod favorite;
pub mod feed;
pub mod nav;
pub mod policy;
pub mod resolver;
pub mod session;
pub mod signal;
pub mod task;
