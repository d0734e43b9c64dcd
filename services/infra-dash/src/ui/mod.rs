// services/infra-dash/src/ui/mod.rs
//
// Shared rendering pieces: palette, panels, stat boxes, empty states

use ratatui::{prelude::*, widgets::*};

pub mod chrome;

// Telkom palette: Red, White, Silver, Gold
pub mod colors {
    use ratatui::style::Color;

    pub const RED: Color = Color::Rgb(227, 6, 19);
    pub const DARK_RED: Color = Color::Rgb(139, 0, 0);
    pub const WHITE: Color = Color::Rgb(253, 246, 227);
    pub const SILVER: Color = Color::Rgb(147, 161, 161);
    pub const GOLD: Color = Color::Rgb(255, 193, 37);
    pub const DARK_GOLD: Color = Color::Rgb(184, 134, 11);
    pub const BLUE: Color = Color::Rgb(38, 139, 210);
    pub const BG_DARK: Color = Color::Rgb(0, 20, 30);
    pub const BG_PANEL: Color = Color::Rgb(7, 30, 41);
    pub const BG_HIGHLIGHT: Color = Color::Rgb(20, 55, 70);
    pub const SUCCESS: Color = Color::Rgb(133, 153, 0);
    pub const ERROR: Color = Color::Rgb(220, 50, 47);
}

pub fn panel(title: &str) -> Block<'static> {
    Block::default()
        .title(Span::styled(
            format!(" {} ", title.to_uppercase()),
            Style::default().fg(colors::WHITE).bold(),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL))
}

pub fn modal_panel(title: &str) -> Block<'static> {
    panel(title)
        .border_style(Style::default().fg(colors::GOLD))
        .title_bottom(Line::from(Span::styled(
            " [ESC] close ",
            Style::default().fg(colors::SILVER),
        )))
}

pub fn draw_stat_box(frame: &mut Frame, area: Rect, label: &str, value: &str, value_color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(value_color).add_modifier(Modifier::BOLD),
        )),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

/// Row of equally sized stat boxes.
pub fn draw_stat_row(frame: &mut Frame, area: Rect, stats: &[(&str, String, Color)]) {
    if stats.is_empty() {
        return;
    }
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, stats.len() as u32); stats.len()])
        .split(area);
    for ((label, value, color), chunk) in stats.iter().zip(chunks.iter()) {
        draw_stat_box(frame, *chunk, label, value, *color);
    }
}

/// Renders `block` with a centred message in place of an empty list.
pub fn draw_empty(frame: &mut Frame, area: Rect, block: Block<'_>, message: &str) {
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let text = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(colors::SILVER).add_modifier(Modifier::ITALIC),
    )))
    .alignment(Alignment::Center);
    let line = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(text, line[1]);
}

pub fn header_row(titles: &[&str]) -> Row<'static> {
    Row::new(
        titles
            .iter()
            .map(|t| Cell::from(Span::styled(t.to_string(), Style::default().fg(colors::GOLD).bold())))
            .collect::<Vec<_>>(),
    )
    .bottom_margin(1)
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Clears a centred area for a modal and returns it.
pub fn modal_area(frame: &mut Frame, percent_x: u16, percent_y: u16) -> Rect {
    let area = centered_rect(percent_x, percent_y, frame.area());
    frame.render_widget(Clear, area);
    area
}

/// Label/value pair for detail modals.
pub fn field(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<18}", label), Style::default().fg(colors::SILVER)),
        Span::styled(value.into(), Style::default().fg(colors::WHITE)),
    ])
}

pub fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}

/// `Rp 21.500.000`
pub fn format_rupiah(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("Rp {}", grouped)
}

/// Text bar scaled so that `max` fills `width` cells.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || width == 0 {
        return String::new();
    }
    let filled = ((value / max).clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Green under 60, gold under 85, red above.
pub fn load_color(percent: f64) -> Color {
    if percent >= 85.0 {
        colors::RED
    } else if percent >= 60.0 {
        colors::GOLD
    } else {
        colors::SUCCESS
    }
}

pub fn gauge(percent: f64, label: String) -> Gauge<'static> {
    Gauge::default()
        .gauge_style(Style::default().fg(load_color(percent)).bg(colors::BG_DARK))
        .percent(percent.clamp(0.0, 100.0).round() as u16)
        .label(label)
}

/// Row highlight for the cursor position.
pub fn cursor_style(selected: bool) -> Style {
    if selected {
        Style::default().bg(colors::BG_HIGHLIGHT).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// Keeps a list cursor inside `0..len`.
pub fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

#[cfg(test)]
pub(crate) fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(15_420), "15.42K");
        assert_eq!(format_number(2_500_000), "2.50M");
    }

    #[test]
    fn test_format_rupiah_groups_thousands() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(850), "Rp 850");
        assert_eq!(format_rupiah(21_500_000), "Rp 21.500.000");
        assert_eq!(format_rupiah(1_200_000), "Rp 1.200.000");
    }

    #[test]
    fn test_bar_is_scaled_and_bounded() {
        assert_eq!(bar(50.0, 100.0, 10).chars().filter(|c| *c == '█').count(), 5);
        assert_eq!(bar(250.0, 100.0, 4), "████");
        assert_eq!(bar(-3.0, 100.0, 4), "░░░░");
        assert_eq!(bar(1.0, 0.0, 4), "");
    }

    #[test]
    fn test_clamp_cursor() {
        assert_eq!(clamp_cursor(5, 3), 2);
        assert_eq!(clamp_cursor(0, 0), 0);
        assert_eq!(clamp_cursor(1, 4), 1);
    }

    #[test]
    fn test_empty_state_renders_message() {
        let mut terminal = Terminal::new(TestBackend::new(40, 7)).unwrap();
        terminal
            .draw(|frame| draw_empty(frame, frame.area(), panel("orders"), "No orders match"))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("No orders match"));
        assert!(text.contains("ORDERS"));
    }
}
