// services/infra-dash/src/views/mod.rs
//
// Screen view models. Each screen owns its fixtures, its filter state and the
// timers it started; `unmount` releases all of them.

use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::config::RefreshConfig;
use crate::router::Route;
use crate::session::SessionStore;

pub mod analytics;
pub mod dashboard;
pub mod input;
pub mod login;
pub mod monitoring;
pub mod orders;
pub mod reconciliation;

/// What the shell should do after a screen handled a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    None,
    Navigate(Route),
    Quit,
}

/// Dependencies handed to every screen.
#[derive(Clone)]
pub struct ViewContext {
    pub refresh: RefreshConfig,
    pub session: SessionStore,
}

pub trait View {
    fn route(&self) -> Route;

    /// Starts the screen's timers.
    fn mount(&mut self) {}

    /// Stops every timer the screen started. Safe to call twice.
    fn unmount(&mut self) {}

    fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

    /// True while a text field has focus, so global shortcuts stay quiet.
    fn captures_input(&self) -> bool {
        false
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    fn draw(&self, frame: &mut Frame, area: Rect);
}

pub fn build(route: Route, ctx: &ViewContext) -> Box<dyn View> {
    match route {
        Route::Login => Box::new(login::LoginView::new(ctx.session.clone())),
        Route::Dashboard => Box::new(dashboard::DashboardView::new()),
        Route::Orders => Box::new(orders::OrdersView::new(ctx.refresh.clone())),
        Route::Monitoring => Box::new(monitoring::MonitoringView::new(ctx.refresh.clone())),
        Route::Analytics => Box::new(analytics::AnalyticsView::new(ctx.refresh.clone())),
        Route::Reconciliation => Box::new(reconciliation::ReconciliationView::new(ctx.refresh.clone())),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    pub fn typed(text: &str) -> Vec<KeyEvent> {
        text.chars().map(ch).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use svckit::config::AuthConfig;
    use svckit::MemoryStore;

    #[tokio::test(start_paused = true)]
    async fn test_build_matches_requested_route() {
        let ctx = ViewContext {
            refresh: RefreshConfig::default(),
            session: SessionStore::new(Arc::new(MemoryStore::new()), &AuthConfig::default()),
        };
        for route in [
            Route::Login,
            Route::Dashboard,
            Route::Orders,
            Route::Monitoring,
            Route::Analytics,
            Route::Reconciliation,
        ] {
            let mut view = build(route, &ctx);
            view.mount();
            assert_eq!(view.route(), route);
            view.unmount();
            view.unmount();
        }
    }
}
