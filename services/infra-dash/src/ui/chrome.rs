// services/infra-dash/src/ui/chrome.rs
//
// Header, navigation bar, footer and the notification drawer

use ratatui::{prelude::*, widgets::*};
use svckit::types::Notification;

use super::{colors, modal_area, panel};
use crate::router::{Route, NAVIGATION};

pub struct HeaderInfo<'a> {
    pub clock: &'a str,
    pub user: Option<&'a str>,
    pub unread: usize,
}

pub fn draw_header(frame: &mut Frame, area: Rect, info: &HeaderInfo<'_>) {
    let mut spans = vec![
        Span::styled(
            " TELKOM INFRA ",
            Style::default().fg(colors::WHITE).bg(colors::DARK_RED).bold(),
        ),
        Span::raw("  "),
        Span::styled("MANAGEMENT SYSTEM", Style::default().fg(colors::GOLD).bold()),
        Span::raw("  "),
        Span::styled(info.clock.to_string(), Style::default().fg(colors::SILVER)),
    ];

    if let Some(user) = info.user {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("[{}]", user), Style::default().fg(colors::WHITE).bold()));
    }

    let (badge, badge_color) = if info.unread > 0 {
        (format!(" {} unread ", info.unread), colors::RED)
    } else {
        (" inbox clear ".to_string(), colors::SILVER)
    };
    spans.push(Span::raw("  "));
    spans.push(Span::styled(badge, Style::default().fg(colors::BG_DARK).bg(badge_color)));

    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(colors::DARK_RED))
                .style(Style::default().bg(colors::BG_DARK)),
        );

    frame.render_widget(header, area);
}

pub fn draw_nav(frame: &mut Frame, area: Rect, current: Route) {
    let mut spans = Vec::with_capacity(NAVIGATION.len() * 2);
    for (i, route) in NAVIGATION.iter().enumerate() {
        let style = if *route == current {
            Style::default().fg(colors::BG_DARK).bg(colors::GOLD).bold()
        } else {
            Style::default().fg(colors::SILVER)
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, route.title()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .style(Style::default().bg(colors::BG_DARK)),
        area,
    );
}

/// `hints` are (key, action) pairs, rendered after the global ones.
pub fn draw_footer(frame: &mut Frame, area: Rect, hints: &[(&str, &str)], logged_in: bool) {
    let mut all: Vec<(&str, &str)> = vec![("Q", "Quit")];
    if logged_in {
        all.extend([("1-5", "Navigate"), ("N", "Notifications"), ("O", "Logout")]);
    }
    all.extend_from_slice(hints);

    let mut spans = Vec::with_capacity(all.len() * 3);
    for (i, (key, action)) in all.iter().enumerate() {
        let key_bg = if i == 0 { colors::RED } else { colors::SILVER };
        spans.push(Span::styled(
            format!(" [{}] ", key),
            Style::default().fg(colors::BG_DARK).bg(key_bg),
        ));
        spans.push(Span::styled(format!(" {} ", action), Style::default().fg(colors::SILVER)));
        spans.push(Span::raw(" "));
    }

    let footer = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors::DARK_RED))
                .style(Style::default().bg(colors::BG_DARK)),
        );

    frame.render_widget(footer, area);
}

pub fn draw_notifications(frame: &mut Frame, notifications: &[Notification], cursor: usize) {
    let area = modal_area(frame, 60, 50);
    let block = panel("Notifications").title_bottom(Line::from(Span::styled(
        " [ENTER] mark read  [A] mark all  [ESC] close ",
        Style::default().fg(colors::SILVER),
    )));

    if notifications.is_empty() {
        super::draw_empty(frame, area, block, "No notifications");
        return;
    }

    let items: Vec<ListItem> = notifications
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let (dot, color) = if n.read { ("  ", colors::SILVER) } else { ("● ", colors::GOLD) };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(dot, Style::default().fg(colors::RED)),
                    Span::styled(n.message.clone(), Style::default().fg(color)),
                ]),
                Line::from(Span::styled(
                    format!("  {}", n.time_label),
                    Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
                )),
            ])
            .style(super::cursor_style(i == cursor))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
