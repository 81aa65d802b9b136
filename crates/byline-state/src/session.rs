//! Authenticated-session state.
//!
//! Holds the in-memory, observable user record and keeps it in lockstep
//! with the persisted store and the API client's credential slot. This is
//! the only place session state is mutated; everything else reads the
//! in-memory mirror, never the store.

use std::rc::Rc;

use anyhow::Result;
use byline_core::api::{CredentialSink, User};
use byline_core::session::SessionStore;

use crate::signal::Signal;

pub struct SessionManager {
    store: SessionStore,
    sink: Rc<dyn CredentialSink>,
    user: Signal<Option<User>>,
}

impl SessionManager {
    /// Restores the session from the persisted store.
    ///
    /// This is the sole direct storage read. If a record exists, its token
    /// is attached to the credential sink immediately so the first
    /// authenticated request works without a fresh login.
    pub fn restore(store: SessionStore, sink: Rc<dyn CredentialSink>) -> Rc<Self> {
        let user = store.get();
        if let Some(user) = &user {
            sink.set_credential(Some(user.token.as_str()));
        }
        Rc::new(Self {
            store,
            sink,
            user: Signal::new(user),
        })
    }

    /// Observable user record.
    pub fn user(&self) -> &Signal<Option<User>> {
        &self.user
    }

    /// Derived authentication state, computed from the in-memory mirror.
    pub fn is_authenticated(&self) -> bool {
        self.user.with(Option::is_some)
    }

    /// Sole mutation path for session state.
    ///
    /// `Some(user)` persists the record, attaches its token to the
    /// credential sink, and updates the mirror — also the overwrite path
    /// for an already-authenticated session. `None` reverses all three.
    ///
    /// # Errors
    /// Returns an error if the persisted store cannot be written; the
    /// in-memory mirror and credential sink are left unchanged in that case.
    pub fn update_user(&self, user: Option<User>) -> Result<()> {
        match user {
            Some(user) => {
                self.store.set(&user)?;
                self.sink.set_credential(Some(user.token.as_str()));
                self.user.set(Some(user));
            }
            None => {
                self.store.remove()?;
                self.sink.set_credential(None);
                self.user.set(None);
            }
        }
        Ok(())
    }
}
