// services/infra-dash/src/app.rs
//
// Application shell: session, route guard, notification drawer, clock and
// the currently mounted screen.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use parking_lot::RwLock;
use ratatui::{prelude::*, widgets::*};
use std::sync::Arc;
use svckit::KeyValueStore;
use tracing::info;

use crate::config::{DashboardConfig, RefreshConfig};
use crate::mock;
use crate::notifications::NotificationCenter;
use crate::refresh::{spawn_ticker, Refresher};
use crate::router::{Navigation, Route, RouteGuard};
use crate::session::SessionStore;
use crate::ui::{self, chrome, colors};
use crate::views::{self, View, ViewAction, ViewContext};

pub struct App {
    ctx: ViewContext,
    session: SessionStore,
    guard: RouteGuard,
    notifications: NotificationCenter,
    clock: Arc<RwLock<DateTime<Local>>>,
    clock_task: Option<Refresher>,
    route: Route,
    view: Box<dyn View>,
    /// Cursor of the notification drawer while it is open.
    inbox: Option<usize>,
    quit: bool,
}

impl App {
    /// Must run inside a tokio runtime: the clock and the first screen start
    /// their timers here.
    pub fn new(config: &DashboardConfig, storage: Arc<dyn KeyValueStore>) -> Self {
        let session = SessionStore::new(storage, &config.auth);
        session.check_auth_status();

        let ctx = ViewContext {
            refresh: config.refresh.clone(),
            session: session.clone(),
        };
        let mut guard = RouteGuard::new(session.clone());
        let route = guard.on_mount(Route::Dashboard).target();
        let mut view = views::build(route, &ctx);
        view.mount();
        info!("Starting on {}", route.path());

        let clock = Arc::new(RwLock::new(Local::now()));
        let clock_task = {
            let clock = clock.clone();
            spawn_ticker("clock", RefreshConfig::every(config.refresh.clock_ms), move |_| {
                *clock.write() = Local::now();
            })
        };

        Self {
            ctx,
            session,
            guard,
            notifications: NotificationCenter::new(mock::notifications()),
            clock,
            clock_task: Some(clock_task),
            route,
            view,
            inbox: None,
            quit: false,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn is_running(&self) -> bool {
        !self.quit
    }

    /// Mounting always re-checks the stored token, so a protected route
    /// may land on the login screen instead.
    pub fn navigate(&mut self, requested: Route) {
        let decision = self.guard.on_mount(requested);
        if let Navigation::Redirect(to) = decision {
            info!("Redirecting {} to {}", requested.path(), to.path());
        }
        let target = decision.target();
        if target == self.route {
            return;
        }

        self.view.unmount();
        self.view = views::build(target, &self.ctx);
        self.view.mount();
        self.route = target;
        info!("Navigated to {}", target.path());
    }

    /// Follows session changes made since the last tick: a finished login
    /// leaves the login screen, a lost session leaves protected screens.
    pub fn on_tick(&mut self) {
        if !self.guard.poll_changed() {
            return;
        }
        let logged_in = self.session.is_logged_in();
        if logged_in && self.route == Route::Login {
            self.navigate(Route::Dashboard);
        } else if !logged_in && self.route.is_protected() {
            self.inbox = None;
            self.navigate(Route::Login);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }
        if let Some(cursor) = self.inbox {
            self.on_inbox_key(key, cursor);
            return;
        }

        if !self.view.captures_input() && self.on_global_key(key) {
            return;
        }

        match self.view.handle_key(key) {
            ViewAction::None => {}
            ViewAction::Navigate(route) => self.navigate(route),
            ViewAction::Quit => self.quit = true,
        }
    }

    fn on_global_key(&mut self, key: KeyEvent) -> bool {
        let KeyCode::Char(c) = key.code else {
            return false;
        };
        if c == 'q' {
            self.quit = true;
            return true;
        }
        if !self.session.is_logged_in() {
            return false;
        }
        if let Some(route) = Route::from_shortcut(c) {
            self.navigate(route);
            return true;
        }
        match c {
            'n' => {
                self.inbox = Some(0);
                true
            }
            'o' => {
                self.session.logout();
                self.on_tick();
                true
            }
            _ => false,
        }
    }

    fn on_inbox_key(&mut self, key: KeyEvent, cursor: usize) {
        let items = self.notifications.snapshot();
        match key.code {
            KeyCode::Esc | KeyCode::Char('n') => self.inbox = None,
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Up => self.inbox = Some(cursor.saturating_sub(1)),
            KeyCode::Down => self.inbox = Some(ui::clamp_cursor(cursor + 1, items.len())),
            KeyCode::Enter => {
                if let Some(n) = items.get(cursor) {
                    self.notifications.mark_as_read(n.id);
                }
            }
            KeyCode::Char('a') => self.notifications.mark_all_read(),
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(colors::BG_DARK)), area);

        let session = self.session.snapshot();
        let logged_in = session.is_logged_in();
        let nav_height = if logged_in { 1 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(nav_height),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        let clock = self.clock.read().format("%a %d %b %Y  %H:%M:%S").to_string();
        chrome::draw_header(
            frame,
            chunks[0],
            &chrome::HeaderInfo {
                clock: &clock,
                user: session.user.as_ref().map(|u| u.username.as_str()),
                unread: self.notifications.unread_count(),
            },
        );
        if logged_in {
            chrome::draw_nav(frame, chunks[1], self.route);
        }

        self.view.draw(frame, chunks[2]);

        let hints = self.view.key_hints();
        chrome::draw_footer(frame, chunks[3], &hints, logged_in);

        if let Some(cursor) = self.inbox {
            chrome::draw_notifications(frame, &self.notifications.snapshot(), cursor);
        }
    }

    /// Stops the clock and the mounted screen's timers.
    pub fn shutdown(&mut self) {
        self.view.unmount();
        self.clock_task = None;
        info!("Dashboard shut down on {}", self.route.path());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::buffer_text;
    use crate::views::testing::{ch, key, typed};
    use ratatui::backend::TestBackend;
    use std::time::Duration;
    use svckit::{MemoryStore, AUTH_TOKEN_KEY};

    fn app_with(storage: Arc<MemoryStore>) -> App {
        App::new(&DashboardConfig::default(), storage)
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    async fn logged_in_app() -> (App, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        storage.set(AUTH_TOKEN_KEY, "session-1-restored").unwrap();
        (app_with(storage.clone()), storage)
    }

    #[tokio::test(start_paused = true)]
    async fn test_boot_without_token_lands_on_login() {
        let app = app_with(Arc::new(MemoryStore::new()));
        assert_eq!(app.route(), Route::Login);
        assert!(!app.session().is_logged_in());
    }

    #[tokio::test(start_paused = true)]
    async fn test_boot_with_token_restores_session() {
        let (app, _) = logged_in_app().await;
        assert_eq!(app.route(), Route::Dashboard);
        let user = app.session().snapshot().user.unwrap();
        assert_eq!(user.username, "Telkom User");
        assert!(render(&app).contains("[Telkom User]"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_flow_reaches_dashboard() {
        let mut app = app_with(Arc::new(MemoryStore::new()));
        for k in typed("telkom_admin") {
            app.on_key(k);
        }
        app.on_key(key(KeyCode::Enter));
        for k in typed("123") {
            app.on_key(k);
        }
        app.on_key(key(KeyCode::Enter));
        app.on_tick();
        assert_eq!(app.route(), Route::Login);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        app.on_tick();
        assert_eq!(app.route(), Route::Dashboard);
        assert_eq!(app.session().snapshot().user.unwrap().username, "telkom_admin");
    }

    #[tokio::test(start_paused = true)]
    async fn test_q_is_typed_on_login_screen() {
        let mut app = app_with(Arc::new(MemoryStore::new()));
        app.on_key(ch('q'));
        assert!(app.is_running());
        app.on_key(ch('1'));
        assert_eq!(app.route(), Route::Login);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shortcuts_navigate_between_screens() {
        let (mut app, _) = logged_in_app().await;
        app.on_key(ch('5'));
        assert_eq!(app.route(), Route::Reconciliation);
        app.on_key(ch('9'));
        assert_eq!(app.route(), Route::Reconciliation);
        app.on_key(ch('2'));
        assert_eq!(app.route(), Route::Orders);
        assert!(render(&app).contains("Service Orders"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_input_swallows_global_keys() {
        let (mut app, _) = logged_in_app().await;
        app.on_key(ch('2'));
        app.on_key(ch('/'));
        app.on_key(ch('q'));
        app.on_key(ch('3'));
        assert!(app.is_running());
        assert_eq!(app.route(), Route::Orders);

        app.on_key(key(KeyCode::Esc));
        app.on_key(ch('q'));
        assert!(!app.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_returns_to_login() {
        let (mut app, storage) = logged_in_app().await;
        app.on_key(ch('3'));
        app.on_key(ch('o'));
        assert_eq!(app.route(), Route::Login);
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_cleared_out_of_band_redirects_on_next_mount() {
        let (mut app, storage) = logged_in_app().await;
        storage.remove(AUTH_TOKEN_KEY).unwrap();
        app.on_key(ch('4'));
        assert_eq!(app.route(), Route::Login);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_drawer_marks_read() {
        let (mut app, _) = logged_in_app().await;
        assert_eq!(app.notifications().unread_count(), 2);

        app.on_key(ch('n'));
        assert!(render(&app).contains("NOTIFICATIONS"));
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.notifications().unread_count(), 1);

        // Drawer keeps focus: shortcuts do not navigate.
        app.on_key(ch('2'));
        assert_eq!(app.route(), Route::Dashboard);

        app.on_key(ch('a'));
        assert_eq!(app.notifications().unread_count(), 0);
        app.on_key(key(KeyCode::Esc));
        app.on_key(ch('2'));
        assert_eq!(app.route(), Route::Orders);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_ticks_and_shutdown_stops_it() {
        let (mut app, _) = logged_in_app().await;
        let before = *app.clock.read();
        tokio::time::sleep(Duration::from_millis(1_050)).await;
        assert_eq!(app.clock_task.as_ref().map(|t| t.applied()), Some(1));
        assert!(*app.clock.read() >= before);

        app.shutdown();
        assert!(app.clock_task.is_none());
    }
}
