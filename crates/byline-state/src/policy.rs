//! Global error policy.
//!
//! One rule: an HTTP 401 anywhere means the session has expired — clear it
//! and send the user to the login screen. Every other failure belongs to
//! the call site that started the operation.

use std::rc::Rc;

use byline_core::api::ApiError;

use crate::nav::{Navigation, RouteName};
use crate::session::SessionManager;

pub struct ErrorPolicy {
    session: Rc<SessionManager>,
    nav: Rc<Navigation>,
}

impl ErrorPolicy {
    pub fn new(session: Rc<SessionManager>, nav: Rc<Navigation>) -> Rc<Self> {
        Rc::new(Self { session, nav })
    }

    /// Applies the policy to a failed operation.
    ///
    /// Returns `None` when the error was handled here (absorbed) and
    /// `Some(err)` when the call site must deal with it. No retries.
    pub fn absorb(&self, err: ApiError) -> Option<ApiError> {
        if !err.is_unauthorized() {
            return Some(err);
        }

        tracing::info!("session expired (HTTP 401): clearing session, redirecting to login");
        if let Err(store_err) = self.session.update_user(None) {
            // The redirect still has to happen even if the persisted record
            // could not be removed.
            tracing::warn!(error = %store_err, "failed to clear persisted session");
        }
        self.nav.push(RouteName::Login);
        None
    }
}
