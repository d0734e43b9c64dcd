// services/infra-dash/src/router.rs
//
// Screen routes and the guard that keeps protected screens behind a session

use tokio::sync::watch;
use tracing::debug;

use crate::session::{Session, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Orders,
    Monitoring,
    Analytics,
    Reconciliation,
}

/// Order of the protected screens in the navigation bar (keys 1-5).
pub const NAVIGATION: [Route; 5] = [
    Route::Dashboard,
    Route::Orders,
    Route::Monitoring,
    Route::Analytics,
    Route::Reconciliation,
];

impl Route {
    /// `/` redirects to the dashboard; unknown paths resolve to nothing.
    pub fn resolve(path: &str) -> Option<Route> {
        match path.trim_end_matches('/') {
            "" => Some(Route::Dashboard),
            "/login" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            "/orders" => Some(Route::Orders),
            "/monitoring" => Some(Route::Monitoring),
            "/analytics" => Some(Route::Analytics),
            "/reconciliation" => Some(Route::Reconciliation),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Orders => "/orders",
            Route::Monitoring => "/monitoring",
            Route::Analytics => "/analytics",
            Route::Reconciliation => "/reconciliation",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Sign in",
            Route::Dashboard => "Dashboard",
            Route::Orders => "Service Orders",
            Route::Monitoring => "Monitoring",
            Route::Analytics => "AI Analytics",
            Route::Reconciliation => "Reconciliation",
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Navigation shortcut: '1' is the dashboard, '5' reconciliation.
    pub fn from_shortcut(c: char) -> Option<Route> {
        let idx = c.to_digit(10)? as usize;
        NAVIGATION.get(idx.checked_sub(1)?).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Navigation {
    pub fn target(&self) -> Route {
        match self {
            Navigation::Render(r) | Navigation::Redirect(r) => *r,
        }
    }
}

pub struct RouteGuard {
    session: SessionStore,
    updates: watch::Receiver<Session>,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        let updates = session.subscribe();
        Self { session, updates }
    }

    pub fn decide(&self, route: Route) -> Navigation {
        if route.is_protected() && !self.session.is_logged_in() {
            debug!("Guard redirecting {} to login", route.path());
            Navigation::Redirect(Route::Login)
        } else {
            Navigation::Render(route)
        }
    }

    /// Called on every mount. Re-reads durable storage first so a token
    /// cleared out-of-band is noticed; nothing is cached between mounts.
    pub fn on_mount(&mut self, route: Route) -> Navigation {
        self.session.check_auth_status();
        self.updates.borrow_and_update();
        self.decide(route)
    }

    /// True once per batch of session changes since the last call.
    pub fn poll_changed(&mut self) -> bool {
        match self.updates.has_changed() {
            Ok(true) => {
                self.updates.borrow_and_update();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use svckit::config::AuthConfig;
    use svckit::{KeyValueStore, MemoryStore, AUTH_TOKEN_KEY};

    fn guard() -> (RouteGuard, SessionStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let session = SessionStore::new(storage.clone(), &AuthConfig::default());
        (RouteGuard::new(session.clone()), session, storage)
    }

    #[test]
    fn test_root_redirects_to_dashboard() {
        assert_eq!(Route::resolve("/"), Some(Route::Dashboard));
        assert_eq!(Route::resolve("/orders/"), Some(Route::Orders));
        assert_eq!(Route::resolve("/nope"), None);
        for route in NAVIGATION {
            assert_eq!(Route::resolve(route.path()), Some(route));
        }
    }

    #[test]
    fn test_shortcuts_follow_navigation_order() {
        assert_eq!(Route::from_shortcut('1'), Some(Route::Dashboard));
        assert_eq!(Route::from_shortcut('5'), Some(Route::Reconciliation));
        assert_eq!(Route::from_shortcut('0'), None);
        assert_eq!(Route::from_shortcut('6'), None);
        assert_eq!(Route::from_shortcut('x'), None);
    }

    #[test]
    fn test_unauthenticated_protected_route_redirects() {
        let (mut guard, _, _) = guard();
        assert_eq!(guard.on_mount(Route::Orders), Navigation::Redirect(Route::Login));
        assert_eq!(guard.on_mount(Route::Login), Navigation::Render(Route::Login));
    }

    #[test]
    fn test_stored_token_admits_on_mount() {
        let (mut guard, _, storage) = guard();
        storage.set(AUTH_TOKEN_KEY, "session-1").unwrap();
        assert_eq!(guard.on_mount(Route::Monitoring), Navigation::Render(Route::Monitoring));
    }

    #[test]
    fn test_mount_rechecks_after_out_of_band_logout() {
        let (mut guard, session, storage) = guard();
        storage.set(AUTH_TOKEN_KEY, "session-1").unwrap();
        assert_eq!(guard.on_mount(Route::Analytics), Navigation::Render(Route::Analytics));
        assert!(session.is_logged_in());

        storage.remove(AUTH_TOKEN_KEY).unwrap();
        assert_eq!(guard.on_mount(Route::Analytics), Navigation::Redirect(Route::Login));
    }

    #[test]
    fn test_guard_observes_session_changes() {
        let (mut guard, session, storage) = guard();
        storage.set(AUTH_TOKEN_KEY, "session-1").unwrap();
        guard.on_mount(Route::Dashboard);
        assert!(!guard.poll_changed());

        session.logout();
        assert!(guard.poll_changed());
        assert!(!guard.poll_changed());
        assert_eq!(guard.decide(Route::Dashboard), Navigation::Redirect(Route::Login));
    }
}
