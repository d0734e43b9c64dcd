// services/infra-dash/src/views/login.rs
//
// Sign-in form

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tracing::debug;

use super::input::TextInput;
use super::{View, ViewAction};
use crate::router::Route;
use crate::session::{SessionPhase, SessionStore};
use crate::ui::{centered_rect, colors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

pub struct LoginView {
    session: SessionStore,
    username: TextInput,
    password: TextInput,
    focus: Field,
}

impl LoginView {
    pub fn new(session: SessionStore) -> Self {
        let mut username = TextInput::default();
        username.activate();
        Self {
            session,
            username,
            password: TextInput::default(),
            focus: Field::Username,
        }
    }

    fn switch_focus(&mut self) {
        self.focus = match self.focus {
            Field::Username => Field::Password,
            Field::Password => Field::Username,
        };
        let (on, off) = match self.focus {
            Field::Username => (&mut self.username, &mut self.password),
            Field::Password => (&mut self.password, &mut self.username),
        };
        on.activate();
        off.deactivate();
    }

    /// Spawns the login call. The outcome lands in the session store, which
    /// the shell watches.
    fn submit(&mut self) {
        if self.session.snapshot().pending {
            return;
        }
        let session = self.session.clone();
        let username = self.username.value().to_string();
        let password = self.password.value().to_string();
        debug!("Submitting login form for '{}'", username);
        tokio::spawn(async move {
            session.login(&username, &password).await;
        });
    }
}

impl View for LoginView {
    fn route(&self) -> Route {
        Route::Login
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        match key.code {
            KeyCode::Esc => return ViewAction::Quit,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.switch_focus(),
            KeyCode::Enter => match self.focus {
                Field::Username => self.switch_focus(),
                Field::Password => self.submit(),
            },
            _ => {
                let field = match self.focus {
                    Field::Username => &mut self.username,
                    Field::Password => &mut self.password,
                };
                field.handle(key);
            }
        }
        ViewAction::None
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("TAB", "Switch field"), ("ENTER", "Sign in"), ("ESC", "Quit")]
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let session = self.session.snapshot();
        let area = centered_rect(50, 60, area);

        let block = Block::default()
            .title(Span::styled(
                " TELKOM INFRA MANAGEMENT SYSTEM ",
                Style::default().fg(colors::WHITE).bg(colors::DARK_RED).bold(),
            ))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors::DARK_RED))
            .style(Style::default().bg(colors::BG_PANEL));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Sign in to continue",
                Style::default().fg(colors::SILVER),
            )))
            .alignment(Alignment::Center),
            chunks[0],
        );

        let field_block = |title: &'static str, focused: bool| {
            Block::default()
                .title(Span::styled(title, Style::default().fg(colors::SILVER)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if focused { colors::GOLD } else { colors::SILVER }))
        };
        frame.render_widget(
            Paragraph::new(self.username.display())
                .style(Style::default().fg(colors::WHITE))
                .block(field_block(" Username ", self.focus == Field::Username)),
            chunks[1],
        );
        frame.render_widget(
            Paragraph::new(self.password.masked())
                .style(Style::default().fg(colors::WHITE))
                .block(field_block(" Password ", self.focus == Field::Password)),
            chunks[2],
        );

        let status = match (session.phase(), session.error.as_deref()) {
            (SessionPhase::LoggingIn, _) => {
                Span::styled("Signing in...", Style::default().fg(colors::GOLD).bold())
            }
            (_, Some(error)) => Span::styled(error.to_string(), Style::default().fg(colors::ERROR)),
            _ => Span::raw(""),
        };
        frame.render_widget(
            Paragraph::new(Line::from(status))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[3],
        );
    }
}
