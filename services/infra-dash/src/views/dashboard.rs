// services/infra-dash/src/views/dashboard.rs
//
// Landing screen: KPI cards, recent activity and regional network status

use crossterm::event::KeyEvent;
use ratatui::{prelude::*, widgets::*};
use svckit::types::{ActivityEntry, ActivityKind, DashboardKpis, RegionHealth, RegionStatus};

use super::{View, ViewAction};
use crate::mock;
use crate::router::Route;
use crate::ui::{self, colors};

pub struct DashboardView {
    kpis: DashboardKpis,
    activity: Vec<ActivityEntry>,
    regions: Vec<RegionStatus>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self {
            kpis: mock::dashboard_kpis(),
            activity: mock::recent_activity(),
            regions: mock::network_regions(),
        }
    }

    fn draw_kpis(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Length(4)])
            .split(area);
        let k = &self.kpis;
        ui::draw_stat_row(
            frame,
            rows[0],
            &[
                ("ACTIVE ORDERS", ui::format_number(k.total_active_orders as u64), colors::WHITE),
                ("NETWORK UTILIZATION", format!("{:.0}%", k.network_utilization), ui::load_color(k.network_utilization)),
                ("FIBER AVAILABILITY", k.fiber_availability.clone(), colors::SUCCESS),
                ("PENDING RECONCILIATIONS", k.pending_reconciliations.to_string(), colors::GOLD),
            ],
        );
        ui::draw_stat_row(
            frame,
            rows[1],
            &[
                ("REVENUE", k.total_revenue.clone(), colors::GOLD),
                ("ACTIVE USERS", ui::format_number(k.active_users as u64), colors::WHITE),
                ("SYSTEM UPTIME", k.system_uptime.clone(), colors::SUCCESS),
                ("PENDING TICKETS", k.pending_tickets.to_string(), if k.pending_tickets > 0 { colors::RED } else { colors::SILVER }),
            ],
        );
    }

    fn draw_activity(&self, frame: &mut Frame, area: Rect) {
        let block = ui::panel("Recent activity");
        if self.activity.is_empty() {
            ui::draw_empty(frame, area, block, "No recent activity");
            return;
        }
        let lines: Vec<Line> = self
            .activity
            .iter()
            .map(|entry| {
                let (prefix, color) = match entry.kind {
                    ActivityKind::Success => ("[OK ]", colors::SUCCESS),
                    ActivityKind::Info => ("[INF]", colors::BLUE),
                    ActivityKind::Warning => ("[WRN]", colors::GOLD),
                };
                Line::from(vec![
                    Span::styled(
                        format!("{:>11} ", entry.time_label),
                        Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
                    ),
                    Span::styled(format!("{} ", prefix), Style::default().fg(color)),
                    Span::styled(format!("{} ", entry.user), Style::default().fg(colors::WHITE).bold()),
                    Span::styled(entry.message.clone(), Style::default().fg(colors::WHITE)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
    }

    fn draw_regions(&self, frame: &mut Frame, area: Rect) {
        let block = ui::panel("Network status");
        if self.regions.is_empty() {
            ui::draw_empty(frame, area, block, "No regions reporting");
            return;
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(2); self.regions.len()])
            .split(inner);
        for (region, row) in self.regions.iter().zip(rows.iter()) {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Length(1)])
                .split(*row);
            let health_color = match region.health {
                RegionHealth::Optimal => colors::SUCCESS,
                RegionHealth::Good => colors::BLUE,
                RegionHealth::Warning => colors::GOLD,
                RegionHealth::Critical => colors::RED,
            };
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(format!("{:<10}", region.region), Style::default().fg(colors::WHITE).bold()),
                    Span::styled(format!("{:<9}", region.health), Style::default().fg(health_color)),
                    Span::styled(
                        format!("uptime {}  {} devices", region.uptime, region.devices),
                        Style::default().fg(colors::SILVER),
                    ),
                ])),
                parts[0],
            );
            frame.render_widget(ui::gauge(region.load, format!("{:.0}% load", region.load)), parts[1]);
        }
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for DashboardView {
    fn route(&self) -> Route {
        Route::Dashboard
    }

    fn handle_key(&mut self, _key: KeyEvent) -> ViewAction {
        ViewAction::None
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Length(3), Constraint::Min(6)])
            .split(area);

        self.draw_kpis(frame, chunks[0]);

        let alert = Paragraph::new(Line::from(vec![
            Span::styled(" AI ALERT ", Style::default().fg(colors::BG_DARK).bg(colors::GOLD).bold()),
            Span::raw("  "),
            Span::styled(self.kpis.ai_prediction_alert.clone(), Style::default().fg(colors::GOLD)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(colors::DARK_GOLD))
                .style(Style::default().bg(colors::BG_PANEL)),
        );
        frame.render_widget(alert, chunks[1]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[2]);
        self.draw_activity(frame, bottom[0]);
        self.draw_regions(frame, bottom[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::buffer_text;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_dashboard_renders_feed_and_regions() {
        let view = DashboardView::new();
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| view.draw(frame, frame.area())).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Ahmad Pratama"));
        assert!(text.contains("Jakarta"));
        assert!(text.contains("ACTIVE ORDERS"));
    }

    #[test]
    fn test_empty_feed_shows_message() {
        let mut view = DashboardView::new();
        view.activity.clear();
        view.regions.clear();
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| view.draw(frame, frame.area())).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("No recent activity"));
        assert!(text.contains("No regions reporting"));
    }
}
