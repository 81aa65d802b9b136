//! App composition root.
//!
//! The session used to be reachable as an ambient singleton from any call
//! site; here the context is constructed once at startup and every component
//! receives its dependencies explicitly.

use std::rc::Rc;

use anyhow::Result;
use byline_core::api::{ApiClient, ApiClientConfig, CredentialSink};
use byline_core::config::Config;
use byline_core::session::SessionStore;

use crate::favorite::FavoriteToggle;
use crate::feed::FeedController;
use crate::nav::{Navigation, Route, RouteName};
use crate::policy::ErrorPolicy;
use crate::resolver::FeedResolver;
use crate::session::SessionManager;

/// Process-wide context: one API client, one navigation source, one session,
/// one error policy.
pub struct AppContext {
    pub api: Rc<ApiClient>,
    pub nav: Rc<Navigation>,
    pub session: Rc<SessionManager>,
    pub policy: Rc<ErrorPolicy>,
}

impl AppContext {
    /// Builds the context from configuration, restoring any persisted
    /// session from the default store location.
    ///
    /// # Errors
    /// Returns an error if the API base URL fails to resolve.
    pub fn new(config: &Config) -> Result<Rc<Self>> {
        Self::with_store(config, SessionStore::open_default())
    }

    /// Builds the context against an explicit session store (tests point
    /// this at a temp directory).
    ///
    /// # Errors
    /// Returns an error if the API base URL fails to resolve.
    pub fn with_store(config: &Config, store: SessionStore) -> Result<Rc<Self>> {
        let api = Rc::new(ApiClient::new(ApiClientConfig::from_config(config)?));
        let nav = Navigation::new(Route::new(RouteName::GlobalFeed));
        let sink: Rc<dyn CredentialSink> = Rc::clone(&api) as Rc<dyn CredentialSink>;
        let session = SessionManager::restore(store, sink);
        let policy = ErrorPolicy::new(Rc::clone(&session), Rc::clone(&nav));

        Ok(Rc::new(Self {
            api,
            nav,
            session,
            policy,
        }))
    }

    /// Builds a feed controller tracking the current navigation state.
    pub fn feed(&self) -> Rc<FeedController> {
        let resolver = FeedResolver::new(&self.nav);
        FeedController::new(Rc::clone(&self.api), resolver, Rc::clone(&self.policy))
    }

    /// Builds a favorite toggle sharing the client and error policy.
    pub fn favorite_toggle(&self) -> FavoriteToggle {
        FavoriteToggle::new(Rc::clone(&self.api), Rc::clone(&self.policy))
    }
}
