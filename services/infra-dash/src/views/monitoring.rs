// services/infra-dash/src/views/monitoring.rs
//
// Network monitoring: live device metrics, route tables and data flows

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use parking_lot::RwLock;
use rand::Rng;
use ratatui::{prelude::*, widgets::*};
use std::sync::Arc;
use svckit::types::{
    DataFlow, DeviceStatus, FlowStatus, MonitoredDevice, RouteStatus, SyncStatus, SystemMetrics,
};
use uuid::Uuid;

use super::{View, ViewAction};
use crate::config::RefreshConfig;
use crate::filter::{Choice, Filter};
use crate::mock;
use crate::refresh::{spawn_refresh, Jitter, Perturb, Refresher};
use crate::router::Route;
use crate::selection::DetailModal;
use crate::ui::{self, colors};

pub const MAX_FLOWS: usize = 10;

const CPU: Jitter = Jitter::percent(5.0);
const MEMORY: Jitter = Jitter::percent(4.0);
const BANDWIDTH: Jitter = Jitter::percent(7.5);
const LATENCY: Jitter = Jitter::non_negative(2.5);

const FLOW_DESTINATIONS: [&str; 3] = ["SurrealDB Cluster", "Inventory System", "Mapping Library"];
const FLOW_PROTOCOLS: [&str; 3] = ["HTTPS", "SNMP", "TCP"];

impl Perturb for MonitoredDevice {
    fn perturb<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let m = &mut self.metrics;
        m.cpu = CPU.apply(m.cpu, rng);
        m.memory = MEMORY.apply(m.memory, rng);
        m.bandwidth = BANDWIDTH.apply(m.bandwidth, rng);
        m.latency = LATENCY.apply(m.latency, rng);
        if rng.gen_bool(0.1) {
            self.last_seen = Utc::now();
        }
    }
}

/// Everything the monitoring feed mutates.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringFeed {
    pub devices: Vec<MonitoredDevice>,
    pub flows: Vec<DataFlow>,
    pub system: SystemMetrics,
}

impl MonitoringFeed {
    pub fn generate() -> Self {
        let devices = mock::monitored_devices();
        let flows = mock::data_flows();
        let system = mock::system_metrics(&devices, &flows);
        Self {
            devices,
            flows,
            system,
        }
    }

    fn new_flow<R: Rng + ?Sized>(&self, rng: &mut R) -> DataFlow {
        let source = if self.devices.is_empty() {
            "NMS Primary".to_string()
        } else {
            self.devices[rng.gen_range(0..self.devices.len())].name.clone()
        };
        let simple = Uuid::new_v4().simple().to_string();
        DataFlow {
            id: format!("flow-{}", &simple[..8]),
            source,
            destination: FLOW_DESTINATIONS[rng.gen_range(0..FLOW_DESTINATIONS.len())].to_string(),
            protocol: FLOW_PROTOCOLS[rng.gen_range(0..FLOW_PROTOCOLS.len())].to_string(),
            data_size_mb: (rng.gen_range(0.1..5.0_f64) * 10.0).round() / 10.0,
            status: FlowStatus::Processing,
            timestamp: Utc::now(),
        }
    }
}

impl Perturb for MonitoringFeed {
    fn perturb<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.devices.perturb(rng);

        let system = &mut self.system;
        if rng.gen_bool(0.2) {
            system.route_changes += 1;
        }
        if rng.gen_bool(0.3) {
            system.data_flows += 1;
        }
        system.sync_status = if rng.gen_bool(0.05) {
            SyncStatus::Syncing
        } else {
            SyncStatus::Synced
        };
        system.last_sync = Utc::now();

        if rng.gen_bool(0.15) {
            let flow = self.new_flow(rng);
            self.flows.insert(0, flow);
            self.flows.truncate(MAX_FLOWS);
        }
    }
}

fn device_status_color(status: DeviceStatus) -> Color {
    match status {
        DeviceStatus::Online => colors::SUCCESS,
        DeviceStatus::Offline => colors::SILVER,
        DeviceStatus::Warning => colors::GOLD,
        DeviceStatus::Error => colors::RED,
    }
}

pub struct MonitoringView {
    refresh: RefreshConfig,
    feed: Arc<RwLock<MonitoringFeed>>,
    refresher: Option<Refresher>,
    status: Choice<DeviceStatus>,
    cursor: usize,
    modal: DetailModal,
}

impl MonitoringView {
    pub fn new(refresh: RefreshConfig) -> Self {
        Self {
            refresh,
            feed: Arc::new(RwLock::new(MonitoringFeed::generate())),
            refresher: None,
            status: Choice::All,
            cursor: 0,
            modal: DetailModal::default(),
        }
    }

    pub fn feed(&self) -> MonitoringFeed {
        self.feed.read().clone()
    }

    pub fn is_paused(&self) -> bool {
        self.refresher.as_ref().is_some_and(|r| r.is_paused())
    }

    fn filter(&self) -> Filter<'static, MonitoredDevice> {
        Filter::new().choice(self.status, |d: &MonitoredDevice| d.status)
    }

    fn visible_ids(&self) -> Vec<String> {
        let feed = self.feed.read();
        self.filter()
            .apply(&feed.devices)
            .into_iter()
            .map(|d| d.id.clone())
            .collect()
    }

    fn draw_system(&self, frame: &mut Frame, area: Rect, system: &SystemMetrics) {
        let sync_color = match system.sync_status {
            SyncStatus::Synced => colors::SUCCESS,
            SyncStatus::Syncing => colors::GOLD,
            SyncStatus::Error => colors::RED,
        };
        ui::draw_stat_row(
            frame,
            area,
            &[
                ("DEVICES", system.total_devices.to_string(), colors::WHITE),
                ("ONLINE", format!("{}/{}", system.online_devices, system.total_devices), colors::SUCCESS),
                ("ROUTE CHANGES", system.route_changes.to_string(), colors::GOLD),
                ("DATA FLOWS", system.data_flows.to_string(), colors::BLUE),
                ("SYNC", format!("{} {}", system.sync_status, system.last_sync.format("%H:%M:%S")), sync_color),
            ],
        );
    }

    fn draw_devices(&self, frame: &mut Frame, area: Rect, devices: &[&MonitoredDevice]) {
        let live = if self.is_paused() {
            Span::styled(" PAUSED ", Style::default().fg(colors::BG_DARK).bg(colors::GOLD).bold())
        } else {
            Span::styled(" LIVE ", Style::default().fg(colors::BG_DARK).bg(colors::SUCCESS).bold())
        };
        let block = ui::panel(&format!("Devices (status: {})", self.status.label_with(|s| s.to_string())))
            .title_top(Line::from(live).right_aligned());

        if devices.is_empty() {
            ui::draw_empty(frame, area, block, "No devices match the current filter");
            return;
        }

        let cursor = ui::clamp_cursor(self.cursor, devices.len());
        let rows: Vec<Row> = devices
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let m = &d.metrics;
                Row::new(vec![
                    Cell::from(Span::styled(d.name.clone(), Style::default().fg(colors::WHITE).bold())),
                    Cell::from(d.kind.to_string()),
                    Cell::from(Span::styled(d.status.to_string(), Style::default().fg(device_status_color(d.status)))),
                    Cell::from(d.location.clone()),
                    Cell::from(Span::styled(format!("{:>5.1}%", m.cpu), Style::default().fg(ui::load_color(m.cpu)))),
                    Cell::from(Span::styled(format!("{:>5.1}%", m.memory), Style::default().fg(ui::load_color(m.memory)))),
                    Cell::from(Span::styled(format!("{:>5.1}%", m.bandwidth), Style::default().fg(ui::load_color(m.bandwidth)))),
                    Cell::from(format!("{:>5.1}ms", m.latency)),
                    Cell::from(d.last_seen.format("%H:%M:%S").to_string()),
                ])
                .style(ui::cursor_style(i == cursor))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(20),
                Constraint::Length(13),
                Constraint::Length(8),
                Constraint::Min(18),
                Constraint::Length(7),
                Constraint::Length(7),
                Constraint::Length(7),
                Constraint::Length(8),
                Constraint::Length(9),
            ],
        )
        .header(ui::header_row(&["DEVICE", "TYPE", "STATUS", "LOCATION", "CPU", "MEM", "BW", "LATENCY", "SEEN"]))
        .style(Style::default().fg(colors::WHITE))
        .block(block);
        frame.render_widget(table, area);
    }

    fn draw_flows(&self, frame: &mut Frame, area: Rect, flows: &[DataFlow]) {
        let block = ui::panel("Data flows");
        if flows.is_empty() {
            ui::draw_empty(frame, area, block, "No data flows");
            return;
        }
        let lines: Vec<Line> = flows
            .iter()
            .map(|f| {
                let color = match f.status {
                    FlowStatus::Processing => colors::GOLD,
                    FlowStatus::Completed => colors::SUCCESS,
                    FlowStatus::Failed => colors::RED,
                };
                Line::from(vec![
                    Span::styled(
                        format!("{} ", f.timestamp.format("%H:%M:%S")),
                        Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
                    ),
                    Span::styled(format!("{} -> {} ", f.source, f.destination), Style::default().fg(colors::WHITE)),
                    Span::styled(format!("{} {:.1}MB ", f.protocol, f.data_size_mb), Style::default().fg(colors::SILVER)),
                    Span::styled(f.status.to_string(), Style::default().fg(color)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_modal(&self, frame: &mut Frame, device: &MonitoredDevice) {
        let area = ui::modal_area(frame, 70, 60);
        let block = ui::modal_panel(&device.name);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Length(8), Constraint::Min(4)])
            .split(inner);

        let m = &device.metrics;
        let info = vec![
            ui::field("Id", device.id.clone()),
            ui::field("Type", device.kind.to_string()),
            ui::field("Status", device.status.to_string()),
            ui::field("Location", device.location.clone()),
            ui::field("Last seen", device.last_seen.format("%Y-%m-%d %H:%M:%S").to_string()),
            ui::field("CPU / Memory", format!("{:.1}% / {:.1}%", m.cpu, m.memory)),
            ui::field("Bandwidth", format!("{:.1}%", m.bandwidth)),
            ui::field("Latency", format!("{:.1} ms", m.latency)),
        ];
        frame.render_widget(Paragraph::new(info), chunks[0]);

        let block = ui::panel("Routing table");
        if device.routes.is_empty() {
            ui::draw_empty(frame, chunks[1], block, "No routes reported");
            return;
        }
        let rows: Vec<Row> = device
            .routes
            .iter()
            .map(|r| {
                let color = match r.status {
                    RouteStatus::Active => colors::SUCCESS,
                    RouteStatus::Inactive => colors::SILVER,
                    RouteStatus::Changed => colors::GOLD,
                };
                Row::new(vec![
                    Cell::from(r.destination.clone()),
                    Cell::from(r.gateway.clone()),
                    Cell::from(r.interface.clone()),
                    Cell::from(r.metric.to_string()),
                    Cell::from(Span::styled(r.status.to_string(), Style::default().fg(color))),
                    Cell::from(r.last_change.format("%H:%M:%S").to_string()),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(16),
                Constraint::Length(14),
                Constraint::Length(10),
                Constraint::Length(7),
                Constraint::Length(9),
                Constraint::Length(9),
            ],
        )
        .header(ui::header_row(&["DESTINATION", "GATEWAY", "INTERFACE", "METRIC", "STATUS", "CHANGED"]))
        .style(Style::default().fg(colors::WHITE))
        .block(block);
        frame.render_widget(table, chunks[1]);
    }
}

impl View for MonitoringView {
    fn route(&self) -> Route {
        Route::Monitoring
    }

    fn mount(&mut self) {
        self.refresher = Some(spawn_refresh(
            "monitoring-feed",
            RefreshConfig::every(self.refresh.monitoring_ms),
            self.feed.clone(),
        ));
    }

    fn unmount(&mut self) {
        self.refresher = None;
    }

    fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        if self.modal.is_open() {
            if key.code == KeyCode::Esc {
                self.modal.close();
            }
            return ViewAction::None;
        }

        match key.code {
            KeyCode::Char('s') => {
                self.status = self.status.cycle(&DeviceStatus::ALL);
                self.cursor = 0;
            }
            KeyCode::Char(' ') => {
                if let Some(refresher) = &self.refresher {
                    refresher.toggle_pause();
                }
            }
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => self.cursor = ui::clamp_cursor(self.cursor + 1, self.visible_ids().len()),
            KeyCode::Enter => {
                if let Some(id) = self.visible_ids().get(self.cursor) {
                    self.modal.open(id);
                }
            }
            _ => {}
        }
        ViewAction::None
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("S", "Status"), ("SPACE", "Pause/Resume"), ("ENTER", "Details")]
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let feed = self.feed.read();
        let filter = self.filter();
        let devices = filter.apply(&feed.devices);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(8), Constraint::Length(8)])
            .split(area);

        self.draw_system(frame, chunks[0], &feed.system);
        self.draw_devices(frame, chunks[1], &devices);
        self.draw_flows(frame, chunks[2], &feed.flows);

        if let Some(device) = self
            .modal
            .current()
            .and_then(|id| feed.devices.iter().find(|d| d.id == id))
        {
            self.draw_modal(frame, device);
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

    fn render(view: &MonitoringView) -> String {
        let mut terminal = Terminal::new(TestBackend::new(150, 45)).unwrap();
        terminal.draw(|frame| view.draw(frame, frame.area())).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_feed_stays_in_bounds_over_many_ticks() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut feed = MonitoringFeed::generate();
        for _ in 0..2_000 {
            feed.perturb(&mut rng);
            for d in &feed.devices {
                let m = d.metrics;
                for v in [m.cpu, m.memory, m.bandwidth] {
                    assert!((0.0..=100.0).contains(&v), "{v} escaped [0,100]");
                }
                assert!(m.latency >= 0.0);
            }
            assert!(feed.flows.len() <= MAX_FLOWS);
        }
        assert_eq!(feed.flows.len(), MAX_FLOWS);
    }

    #[test]
    fn test_status_filter_narrows_devices() {
        let mut view = MonitoringView::new(RefreshConfig::default());
        assert_eq!(view.visible_ids().len(), 4);

        view.handle_key(ch('s'));
        assert_eq!(view.visible_ids(), vec!["nms-001", "switch-001"]);

        view.handle_key(ch('s'));
        assert!(view.visible_ids().is_empty());
        assert!(render(&view).contains("No devices match the current filter"));

        view.handle_key(ch('s'));
        view.handle_key(ch('s'));
        assert_eq!(view.visible_ids(), vec!["ap-001"]);
        view.handle_key(ch('s'));
        assert_eq!(view.status, Choice::All);
    }

    #[test]
    fn test_detail_modal_shows_routes() {
        let mut view = MonitoringView::new(RefreshConfig::default());
        view.handle_key(key(KeyCode::Down));
        view.handle_key(key(KeyCode::Enter));
        assert_eq!(view.modal.current(), Some("router-001"));
        assert!(render(&view).contains("10.10.0.0/16"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_keeps_cadence_without_mutation() {
        let mut view = MonitoringView::new(RefreshConfig::default());
        view.mount();
        view.handle_key(ch(' '));
        assert!(view.is_paused());
        let before = view.feed();

        tokio::time::sleep(Duration::from_millis(6_100)).await;
        let refresher = view.refresher.as_ref().unwrap();
        assert_eq!(refresher.beats(), 3);
        assert_eq!(refresher.applied(), 0);
        assert_eq!(view.feed(), before);

        view.handle_key(ch(' '));
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(view.refresher.as_ref().unwrap().applied(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_freezes_snapshot() {
        let mut view = MonitoringView::new(RefreshConfig::default());
        view.mount();
        tokio::time::sleep(Duration::from_millis(4_100)).await;
        view.unmount();
        let snapshot = view.feed();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(view.feed(), snapshot);
        assert!(!view.is_paused());
    }
}
