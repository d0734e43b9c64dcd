// services/infra-dash/src/views/analytics.rs
//
// AI analytics: traffic trend, regional usage, predictions and capacity
// forecast, with a full-report modal and an apply-recommendations action.

use crossterm::event::{KeyCode, KeyEvent};
use parking_lot::RwLock;
use rand::Rng;
use ratatui::{prelude::*, widgets::*};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use svckit::types::{
    CapacityForecast, GrowthMetric, InsightKind, Prediction, RegionalUsage, RiskLevel, TimeRange,
    TrafficSample,
};

use super::{View, ViewAction};
use crate::config::RefreshConfig;
use crate::mock;
use crate::progress::{spawn_stepper, Counter};
use crate::refresh::{spawn_refresh, Jitter, Perturb, Refresher, TaskHandle};
use crate::router::Route;
use crate::ui::{self, colors};
use tracing::info;

const BANDWIDTH: Jitter = Jitter::new(5.0, 20.0, 95.0);
const LATENCY: Jitter = Jitter::new(2.5, 5.0, 50.0);
const PACKETS: Jitter = Jitter::new(100.0, 400.0, 2_000.0);

impl Perturb for TrafficSample {
    fn perturb<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.bandwidth = BANDWIDTH.apply(self.bandwidth, rng);
        self.latency = LATENCY.apply(self.latency, rng);
        self.packets = PACKETS.apply(self.packets, rng);
    }
}

/// Headline figures that count up when the screen opens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Headline {
    pub bandwidth: Counter,
    pub capacity: Counter,
    pub growth: Counter,
}

impl Headline {
    pub fn new() -> Self {
        Self {
            bandwidth: Counter::new(78.0, 2.0),
            capacity: Counter::new(85.0, 3.0),
            growth: Counter::new(23.0, 1.0),
        }
    }

    /// Returns true once every counter has arrived.
    pub fn advance(&mut self) -> bool {
        for counter in [&mut self.bandwidth, &mut self.capacity, &mut self.growth] {
            counter.advance();
        }
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.bandwidth.is_done() && self.capacity.is_done() && self.growth.is_done()
    }
}

impl Default for Headline {
    fn default() -> Self {
        Self::new()
    }
}

fn risk_color(risk: RiskLevel) -> Color {
    match risk {
        RiskLevel::High => colors::RED,
        RiskLevel::Medium => colors::GOLD,
        RiskLevel::Low => colors::SUCCESS,
    }
}

pub struct AnalyticsView {
    refresh: RefreshConfig,
    range: TimeRange,
    traffic: Arc<RwLock<Vec<TrafficSample>>>,
    headline: Arc<RwLock<Headline>>,
    refresher: Option<Refresher>,
    counters: Option<TaskHandle>,
    regional: Vec<RegionalUsage>,
    predictions: Vec<Prediction>,
    capacity: Vec<CapacityForecast>,
    growth: Vec<GrowthMetric>,
    report_open: bool,
    applying: Arc<AtomicBool>,
    apply_task: Option<TaskHandle>,
}

impl AnalyticsView {
    pub fn new(refresh: RefreshConfig) -> Self {
        Self {
            refresh,
            range: TimeRange::Day,
            traffic: Arc::new(RwLock::new(mock::traffic_series())),
            headline: Arc::new(RwLock::new(Headline::new())),
            refresher: None,
            counters: None,
            regional: mock::regional_usage(),
            predictions: mock::predictions(),
            capacity: mock::capacity_forecast(),
            growth: mock::growth_metrics(),
            report_open: false,
            applying: Arc::new(AtomicBool::new(false)),
            apply_task: None,
        }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn headline(&self) -> Headline {
        *self.headline.read()
    }

    pub fn traffic(&self) -> Vec<TrafficSample> {
        self.traffic.read().clone()
    }

    pub fn is_applying(&self) -> bool {
        self.applying.load(Ordering::SeqCst)
    }

    /// Opens the applying modal; it closes itself after `apply_ms`.
    pub fn apply_recommendations(&mut self) -> bool {
        if self.applying.swap(true, Ordering::SeqCst) {
            return false;
        }
        info!("Applying {} AI recommendations", self.predictions.len());
        let applying = self.applying.clone();
        let delay = RefreshConfig::every(self.refresh.apply_ms);
        self.apply_task = Some(TaskHandle::spawn("analytics-apply", async move {
            tokio::time::sleep(delay).await;
            applying.store(false, Ordering::SeqCst);
            info!("AI recommendations applied");
        }));
        true
    }

    fn draw_headline(&self, frame: &mut Frame, area: Rect) {
        let h = self.headline();
        let accuracy = self
            .predictions
            .iter()
            .map(|p| p.confidence as f64)
            .sum::<f64>()
            / self.predictions.len().max(1) as f64;
        ui::draw_stat_row(
            frame,
            area,
            &[
                ("BANDWIDTH USAGE", format!("{:.0}%", h.bandwidth.value), ui::load_color(h.bandwidth.value)),
                ("CAPACITY", format!("{:.0}%", h.capacity.value), ui::load_color(h.capacity.value)),
                ("GROWTH", format!("+{:.0}%", h.growth.value), colors::SUCCESS),
                ("PREDICTION CONFIDENCE", format!("{:.1}%", accuracy), colors::GOLD),
            ],
        );
    }

    fn draw_traffic(&self, frame: &mut Frame, area: Rect) {
        let block = ui::panel(&format!("Traffic trend ({})", self.range.label()));
        let traffic = self.traffic.read();
        if traffic.is_empty() {
            ui::draw_empty(frame, area, block, "No traffic samples");
            return;
        }
        let rows: Vec<Row> = traffic
            .iter()
            .map(|s| {
                Row::new(vec![
                    Cell::from(Span::styled(s.time_label.clone(), Style::default().fg(colors::SILVER))),
                    Cell::from(Span::styled(
                        ui::bar(s.bandwidth, 100.0, 20),
                        Style::default().fg(ui::load_color(s.bandwidth)),
                    )),
                    Cell::from(format!("{:>5.1}%", s.bandwidth)),
                    Cell::from(format!("{:>5.1}ms", s.latency)),
                    Cell::from(format!("{:>6.0}", s.packets)),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Length(21),
                Constraint::Length(7),
                Constraint::Length(8),
                Constraint::Length(7),
            ],
        )
        .header(ui::header_row(&["TIME", "BANDWIDTH", "", "LATENCY", "PKT/S"]))
        .style(Style::default().fg(colors::WHITE))
        .block(block);
        frame.render_widget(table, area);
    }

    fn draw_regional(&self, frame: &mut Frame, area: Rect) {
        let block = ui::panel("Regional usage");
        if self.regional.is_empty() {
            ui::draw_empty(frame, area, block, "No regional data");
            return;
        }
        let lines: Vec<Line> = self
            .regional
            .iter()
            .map(|r| {
                Line::from(vec![
                    Span::styled(format!("{:<10}", r.region), Style::default().fg(colors::WHITE).bold()),
                    Span::styled(ui::bar(r.usage as f64, 100.0, 12), Style::default().fg(ui::load_color(r.usage as f64))),
                    Span::styled(format!(" {:>3}%", r.usage), Style::default().fg(colors::WHITE)),
                    Span::styled(format!("  +{}%", r.growth), Style::default().fg(colors::SUCCESS)),
                    Span::styled(
                        format!("  {} customers", ui::format_number(r.customers as u64)),
                        Style::default().fg(colors::SILVER),
                    ),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_predictions(&self, frame: &mut Frame, area: Rect) {
        let block = ui::panel("AI predictions");
        if self.predictions.is_empty() {
            ui::draw_empty(frame, area, block, "No predictions");
            return;
        }
        let mut lines = Vec::with_capacity(self.predictions.len() * 3);
        for p in &self.predictions {
            let (tag, color) = match p.kind {
                InsightKind::Warning => ("[WRN]", colors::GOLD),
                InsightKind::Success => ("[OK ]", colors::SUCCESS),
                InsightKind::Info => ("[INF]", colors::BLUE),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", tag), Style::default().fg(color)),
                Span::styled(p.title.clone(), Style::default().fg(colors::WHITE).bold()),
                Span::styled(
                    format!("  {}% confidence, {} impact, {}", p.confidence, p.impact, p.timeframe),
                    Style::default().fg(colors::SILVER),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!("      {}", p.description),
                Style::default().fg(colors::WHITE),
            )));
            lines.push(Line::from(Span::styled(
                format!("      -> {}", p.suggested_action),
                Style::default().fg(risk_color(p.impact)),
            )));
        }
        frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
    }

    fn draw_capacity(&self, frame: &mut Frame, area: Rect) {
        let block = ui::panel("Capacity forecast");
        if self.capacity.is_empty() {
            ui::draw_empty(frame, area, block, "No capacity forecast");
            return;
        }
        let rows: Vec<Row> = self
            .capacity
            .iter()
            .map(|c| {
                Row::new(vec![
                    Cell::from(Span::styled(c.node.clone(), Style::default().fg(colors::WHITE).bold())),
                    Cell::from(c.location.clone()),
                    Cell::from(format!("{}%", c.current)),
                    Cell::from(format!("{}%", c.predicted_7d)),
                    Cell::from(Span::styled(
                        format!("{}%", c.predicted_30d),
                        Style::default().fg(ui::load_color(c.predicted_30d as f64)),
                    )),
                    Cell::from(Span::styled(c.risk.to_string(), Style::default().fg(risk_color(c.risk)))),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(11),
                Constraint::Length(10),
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Length(7),
            ],
        )
        .header(ui::header_row(&["NODE", "LOCATION", "NOW", "7D", "30D", "RISK"]))
        .style(Style::default().fg(colors::WHITE))
        .block(block);
        frame.render_widget(table, area);
    }

    fn draw_applying(&self, frame: &mut Frame) {
        let area = ui::modal_area(frame, 50, 30);
        let block = ui::modal_panel("Applying AI recommendations");
        let mut lines = vec![
            Line::from(Span::styled(
                "Applying recommendations...",
                Style::default().fg(colors::GOLD).bold(),
            )),
            Line::from(""),
        ];
        lines.extend(self.predictions.iter().map(|p| {
            Line::from(Span::styled(
                format!("-> {}", p.suggested_action),
                Style::default().fg(colors::WHITE),
            ))
        }));
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }

    fn draw_report(&self, frame: &mut Frame) {
        let area = ui::modal_area(frame, 70, 70);
        let block = ui::modal_panel(&format!("Full report ({})", self.range.label()));

        let mut lines = vec![Line::from(Span::styled(
            "Growth",
            Style::default().fg(colors::GOLD).bold(),
        ))];
        lines.extend(self.growth.iter().map(|g| ui::field(&g.label, g.value.clone())));

        let at_risk: Vec<&CapacityForecast> =
            self.capacity.iter().filter(|c| c.risk == RiskLevel::High).collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Nodes at high risk",
            Style::default().fg(colors::GOLD).bold(),
        )));
        if at_risk.is_empty() {
            lines.push(Line::from(Span::styled("none", Style::default().fg(colors::SILVER))));
        }
        for c in at_risk {
            lines.push(ui::field(
                &c.node,
                format!("{} at {}% now, {}% in 30 days", c.location, c.current, c.predicted_30d),
            ));
        }

        let mut urgent: Vec<&Prediction> = self.predictions.iter().collect();
        urgent.sort_by(|a, b| b.priority.cmp(&a.priority));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Recommended actions",
            Style::default().fg(colors::GOLD).bold(),
        )));
        for p in urgent {
            lines.push(ui::field(p.priority.as_str(), p.suggested_action.clone()));
        }

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}

impl View for AnalyticsView {
    fn route(&self) -> Route {
        Route::Analytics
    }

    fn mount(&mut self) {
        self.refresher = Some(spawn_refresh(
            "analytics-feed",
            RefreshConfig::every(self.refresh.analytics_ms),
            self.traffic.clone(),
        ));
        let headline = self.headline.clone();
        self.counters = Some(spawn_stepper(
            "analytics-counters",
            RefreshConfig::every(self.refresh.counter_ms),
            move || headline.write().advance(),
        ));
    }

    fn unmount(&mut self) {
        self.refresher = None;
        self.counters = None;
        self.apply_task = None;
        self.applying.store(false, Ordering::SeqCst);
    }

    fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        if self.is_applying() {
            return ViewAction::None;
        }
        match key.code {
            KeyCode::Esc if self.report_open => self.report_open = false,
            KeyCode::Char('r') => self.report_open = !self.report_open,
            KeyCode::Char('t') if !self.report_open => self.range = self.range.next(),
            KeyCode::Char('a') if !self.report_open => {
                self.apply_recommendations();
            }
            _ => {}
        }
        ViewAction::None
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("T", "Time range"), ("R", "Full report"), ("A", "Apply AI recommendations")]
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Length(12), Constraint::Min(8)])
            .split(area);

        self.draw_headline(frame, chunks[0]);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        self.draw_traffic(frame, middle[0]);
        self.draw_regional(frame, middle[1]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);
        self.draw_predictions(frame, bottom[0]);
        self.draw_capacity(frame, bottom[1]);

        if self.report_open {
            self.draw_report(frame);
        }
        if self.is_applying() {
            self.draw_applying(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::buffer_text;
    use crate::views::testing::{ch, key};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn render(view: &AnalyticsView) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 45)).unwrap();
        terminal.draw(|frame| view.draw(frame, frame.area())).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_traffic_stays_in_chart_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut series = mock::traffic_series();
        for _ in 0..1_000 {
            series.perturb(&mut rng);
            for s in &series {
                assert!((20.0..=95.0).contains(&s.bandwidth));
                assert!((5.0..=50.0).contains(&s.latency));
                assert!((400.0..=2_000.0).contains(&s.packets));
            }
        }
    }

    #[test]
    fn test_headline_counters_land_on_targets() {
        let mut headline = Headline::new();
        let mut steps = 0;
        while !headline.advance() {
            steps += 1;
        }
        assert_eq!(steps + 1, 39);
        assert_eq!(headline.bandwidth.value, 78.0);
        assert_eq!(headline.capacity.value, 85.0);
        assert_eq!(headline.growth.value, 23.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_counters_animate_then_stop() {
        let mut view = AnalyticsView::new(RefreshConfig::default());
        view.mount();

        tokio::time::sleep(Duration::from_millis(520)).await;
        let midway = view.headline();
        assert!(midway.bandwidth.value > 0.0 && !midway.is_done());

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert!(view.headline().is_done());
        assert!(view.counters.as_ref().unwrap().is_finished());
        view.unmount();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_stops_traffic_feed() {
        let mut view = AnalyticsView::new(RefreshConfig::default());
        view.mount();
        tokio::time::sleep(Duration::from_millis(5_100)).await;
        view.unmount();
        let snapshot = view.traffic();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(view.traffic(), snapshot);
    }

    #[test]
    fn test_time_range_cycles_and_labels_chart() {
        let mut view = AnalyticsView::new(RefreshConfig::default());
        assert!(render(&view).contains("TRAFFIC TREND (24 HOURS)"));
        view.handle_key(ch('t'));
        assert_eq!(view.range(), TimeRange::Week);
        assert!(render(&view).contains("TRAFFIC TREND (7 DAYS)"));
    }

    #[test]
    fn test_full_report_modal() {
        let mut view = AnalyticsView::new(RefreshConfig::default());
        view.handle_key(ch('r'));
        let text = render(&view);
        assert!(text.contains("+156%"));
        assert!(text.contains("TBS-DPS-05"));

        // Range is locked while the report is open.
        view.handle_key(ch('t'));
        assert_eq!(view.range(), TimeRange::Day);
        view.handle_key(key(KeyCode::Esc));
        assert!(!view.report_open);
    }

    #[test]
    fn test_empty_predictions_render_message() {
        let mut view = AnalyticsView::new(RefreshConfig::default());
        view.predictions.clear();
        assert!(render(&view).contains("No predictions"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_modal_closes_itself() {
        let mut view = AnalyticsView::new(RefreshConfig::default());
        view.handle_key(ch('a'));
        assert!(view.is_applying());
        assert!(!view.apply_recommendations());
        assert!(render(&view).contains("APPLYING AI RECOMMENDATIONS"));

        // Other shortcuts wait for the modal.
        view.handle_key(ch('t'));
        assert_eq!(view.range(), TimeRange::Day);

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert!(view.is_applying());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!view.is_applying());
        assert!(!render(&view).contains("APPLYING AI RECOMMENDATIONS"));
        assert!(view.apply_task.as_ref().unwrap().is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_cancels_apply() {
        let mut view = AnalyticsView::new(RefreshConfig::default());
        view.mount();
        view.handle_key(ch('a'));
        tokio::time::sleep(Duration::from_secs(1)).await;

        view.unmount();
        assert!(!view.is_applying());
        assert!(view.apply_task.is_none());

        view.handle_key(ch('a'));
        view.unmount();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!view.is_applying());
        assert!(!render(&view).contains("APPLYING AI RECOMMENDATIONS"));
    }
}
