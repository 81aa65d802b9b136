//! Navigation state consumed by the data layer.
//!
//! The app's router is an external collaborator; this module models the
//! narrow interface the data layer needs: the current route (name + params)
//! as one atomically-updated observable record, with `push` doubling as the
//! navigation command. Route-level access rules (auth-required, guest-only)
//! live here too.

use std::rc::Rc;

use crate::session::SessionManager;
use crate::signal::Signal;

/// Named routes of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteName {
    GlobalFeed,
    MyFeed,
    Tag,
    Article,
    CreateArticle,
    EditArticle,
    Login,
    Register,
    Profile,
    ProfileFavorites,
    Settings,
}

impl RouteName {
    /// Routes that require an authenticated session.
    pub fn requires_auth(self) -> bool {
        matches!(
            self,
            RouteName::CreateArticle | RouteName::EditArticle | RouteName::Settings
        )
    }

    /// Routes an authenticated user should not see (login/register).
    pub fn guest_only(self) -> bool {
        matches!(self, RouteName::Login | RouteName::Register)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteName::GlobalFeed => "global-feed",
            RouteName::MyFeed => "my-feed",
            RouteName::Tag => "tag",
            RouteName::Article => "article",
            RouteName::CreateArticle => "create-article",
            RouteName::EditArticle => "edit-article",
            RouteName::Login => "login",
            RouteName::Register => "register",
            RouteName::Profile => "profile",
            RouteName::ProfileFavorites => "profile-favorites",
            RouteName::Settings => "settings",
        }
    }
}

/// Route parameters relevant to the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteParams {
    pub username: Option<String>,
    pub tag: Option<String>,
}

impl RouteParams {
    pub fn username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            tag: None,
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            username: None,
            tag: Some(tag.into()),
        }
    }
}

/// The current navigation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: RouteName,
    pub params: RouteParams,
}

impl Route {
    pub fn new(name: RouteName) -> Self {
        Self {
            name,
            params: RouteParams::default(),
        }
    }
}

/// Observable navigation source and command.
pub struct Navigation {
    current: Signal<Route>,
}

impl Navigation {
    pub fn new(initial: Route) -> Rc<Self> {
        Rc::new(Self {
            current: Signal::new(initial),
        })
    }

    /// The current route; name and params update atomically.
    pub fn current(&self) -> &Signal<Route> {
        &self.current
    }

    /// Navigates to a route without parameters.
    pub fn push(&self, name: RouteName) {
        self.push_with(name, RouteParams::default());
    }

    /// Navigates to a route with parameters.
    pub fn push_with(&self, name: RouteName, params: RouteParams) {
        self.current.set(Route { name, params });
    }
}

/// Redirect rules applied before entering a route.
///
/// Auth-required routes bounce anonymous users to login; guest-only routes
/// bounce authenticated users to the global feed.
pub fn resolve_target(session: &SessionManager, to: RouteName) -> RouteName {
    if to.requires_auth() && !session.is_authenticated() {
        RouteName::Login
    } else if to.guest_only() && session.is_authenticated() {
        RouteName::GlobalFeed
    } else {
        to
    }
}
