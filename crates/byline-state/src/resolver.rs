//! Maps navigation state to the active feed descriptor.
//!
//! The descriptor is three cells (kind, tag, username) plus a composite
//! "meta" token. The token changes exactly when the descriptor's effective
//! identity changes, and is recomputed once per navigation event — after all
//! three constituents have been updated — so consumers never observe a
//! half-updated descriptor.

use std::rc::Rc;

use crate::nav::{Navigation, Route, RouteName};
use crate::signal::Signal;

/// The five feed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// All articles, newest first.
    Global,
    /// Articles from followed authors (requires a session).
    Personal,
    /// Articles carrying a tag.
    Tag,
    /// Articles written by a user.
    Author,
    /// Articles favorited by a user.
    Favorited,
}

impl FeedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::Global => "global",
            FeedKind::Personal => "personal",
            FeedKind::Tag => "tag",
            FeedKind::Author => "author",
            FeedKind::Favorited => "favorited",
        }
    }
}

/// Static route → feed kind table. Routes that don't show a feed return
/// `None`, leaving the previously resolved kind in place.
fn feed_kind_for_route(name: RouteName) -> Option<FeedKind> {
    match name {
        RouteName::GlobalFeed => Some(FeedKind::Global),
        RouteName::MyFeed => Some(FeedKind::Personal),
        RouteName::Tag => Some(FeedKind::Tag),
        RouteName::Profile => Some(FeedKind::Author),
        RouteName::ProfileFavorites => Some(FeedKind::Favorited),
        _ => None,
    }
}

/// Reactive feed descriptor derived from navigation state.
pub struct FeedResolver {
    kind: Signal<FeedKind>,
    tag: Signal<String>,
    username: Signal<String>,
    meta: Signal<String>,
}

impl FeedResolver {
    /// Builds a resolver tracking `nav`. Evaluation happens immediately, so
    /// the descriptor reflects the current route from the start.
    pub fn new(nav: &Navigation) -> Rc<Self> {
        let resolver = Rc::new(Self {
            kind: Signal::new(FeedKind::Global),
            tag: Signal::new(String::new()),
            username: Signal::new(String::new()),
            meta: Signal::new(String::new()),
        });

        let weak = Rc::downgrade(&resolver);
        nav.current().watch_immediate(move |route| {
            if let Some(resolver) = weak.upgrade() {
                resolver.apply_route(route);
            }
        });

        resolver
    }

    /// Resolved feed kind.
    pub fn kind(&self) -> &Signal<FeedKind> {
        &self.kind
    }

    /// Tag filter value ("" when the route has no tag).
    pub fn tag(&self) -> &Signal<String> {
        &self.tag
    }

    /// Username filter value ("" when the route has no username).
    pub fn username(&self) -> &Signal<String> {
        &self.username
    }

    /// Composite change token: `kind-username-tag`. Fires once per
    /// navigation event that changed the descriptor's effective identity.
    pub fn meta(&self) -> &Signal<String> {
        &self.meta
    }

    fn apply_route(&self, route: &Route) {
        if let Some(kind) = feed_kind_for_route(route.name) {
            self.kind.set(kind);
        }
        self.username
            .set(route.params.username.clone().unwrap_or_default());
        self.tag.set(route.params.tag.clone().unwrap_or_default());

        // Single recompute per navigation event; the individual cells above
        // already deduplicate unchanged values.
        self.meta.set(format!(
            "{}-{}-{}",
            self.kind.get().as_str(),
            self.username.get(),
            self.tag.get()
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::nav::RouteParams;

    fn nav_at(name: RouteName, params: RouteParams) -> Rc<Navigation> {
        Navigation::new(Route { name, params })
    }

    #[test]
    fn test_resolves_initial_route_immediately() {
        let nav = nav_at(RouteName::Tag, RouteParams::tag("rust"));
        let resolver = FeedResolver::new(&nav);

        assert_eq!(resolver.kind().get(), FeedKind::Tag);
        assert_eq!(resolver.tag().get(), "rust");
        assert_eq!(resolver.meta().get(), "tag--rust");
    }

    #[test]
    fn test_route_table_covers_all_feed_routes() {
        let cases = [
            (RouteName::GlobalFeed, FeedKind::Global),
            (RouteName::MyFeed, FeedKind::Personal),
            (RouteName::Tag, FeedKind::Tag),
            (RouteName::Profile, FeedKind::Author),
            (RouteName::ProfileFavorites, FeedKind::Favorited),
        ];
        let nav = nav_at(RouteName::GlobalFeed, RouteParams::default());
        let resolver = FeedResolver::new(&nav);

        for (route, kind) in cases {
            nav.push(route);
            assert_eq!(resolver.kind().get(), kind, "route {}", route.as_str());
        }
    }

    #[test]
    fn test_unrecognized_route_keeps_previous_kind() {
        let nav = nav_at(RouteName::Tag, RouteParams::tag("rust"));
        let resolver = FeedResolver::new(&nav);

        nav.push(RouteName::Login);
        assert_eq!(resolver.kind().get(), FeedKind::Tag);
    }

    #[test]
    fn test_absent_params_normalize_to_empty() {
        let nav = nav_at(RouteName::Profile, RouteParams::username("alice"));
        let resolver = FeedResolver::new(&nav);
        assert_eq!(resolver.username().get(), "alice");

        nav.push(RouteName::GlobalFeed);
        assert_eq!(resolver.username().get(), "");
        assert_eq!(resolver.tag().get(), "");
    }

    #[test]
    fn test_meta_fires_once_per_navigation_event() {
        let nav = nav_at(RouteName::GlobalFeed, RouteParams::default());
        let resolver = FeedResolver::new(&nav);

        let fired: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&fired);
        resolver.meta().watch(move |token| sink.borrow_mut().push(token.clone()));

        // Both kind and tag change here, but the token updates once.
        nav.push_with(RouteName::Tag, RouteParams::tag("rust"));
        assert_eq!(*fired.borrow(), vec!["tag--rust".to_string()]);
    }

    #[test]
    fn test_meta_unchanged_when_identity_unchanged() {
        let nav = nav_at(RouteName::Profile, RouteParams::username("alice"));
        let resolver = FeedResolver::new(&nav);

        let fired: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&fired);
        resolver.meta().watch(move |token| sink.borrow_mut().push(token.clone()));

        // Re-pushing the same route and params changes nothing.
        nav.push_with(RouteName::Profile, RouteParams::username("alice"));
        assert!(fired.borrow().is_empty());

        nav.push_with(RouteName::Profile, RouteParams::username("bob"));
        assert_eq!(*fired.borrow(), vec!["author-bob-".to_string()]);
    }
}
