// services/infra-dash/src/views/reconciliation.rs
//
// UIM vs NMS reconciliation console.
//
// Device and discrepancy collections live behind one lock shared with the
// background jobs (bulk resolve, auto-discovery, sync clock). A bulk job
// resolves the ids that were selected when it started, whatever happens to
// the selection afterwards.

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use parking_lot::Mutex;
use ratatui::{prelude::*, widgets::*};
use std::sync::Arc;
use svckit::types::{AssetStatus, Discrepancy, InventoryDevice, Severity, SyncStats};
use tracing::{debug, info};

use super::input::TextInput;
use super::{View, ViewAction};
use crate::config::RefreshConfig;
use crate::filter::{Choice, Filter, Searchable};
use crate::mock;
use crate::progress::spawn_ramp;
use crate::refresh::{spawn_ticker, Refresher, TaskHandle};
use crate::router::Route;
use crate::selection::{DetailModal, Selection};
use crate::ui::{self, colors};

impl Searchable for InventoryDevice {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.location.as_str(), self.vendor.as_str()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictFilter {
    Conflicts,
    Synced,
}

impl ConflictFilter {
    pub const ALL: [ConflictFilter; 2] = [ConflictFilter::Conflicts, ConflictFilter::Synced];

    fn of(device: &InventoryDevice) -> Self {
        if device.has_conflict {
            ConflictFilter::Conflicts
        } else {
            ConflictFilter::Synced
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ConflictFilter::Conflicts => "conflicts",
            ConflictFilter::Synced => "synced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Devices,
    Discrepancies,
}

/// Everything the reconciliation jobs read or write.
#[derive(Debug, Clone)]
pub struct ReconState {
    pub devices: Vec<InventoryDevice>,
    pub discrepancies: Vec<Discrepancy>,
    pub selection: Selection,
    /// Ramp value of the running bulk job.
    pub bulk_progress: Option<u8>,
    pub discovering: bool,
    pub last_sync: DateTime<Utc>,
}

impl ReconState {
    pub fn generate() -> Self {
        Self {
            devices: mock::inventory_devices(),
            discrepancies: mock::discrepancies(),
            selection: Selection::new(),
            bulk_progress: None,
            discovering: false,
            last_sync: Utc::now(),
        }
    }

    pub fn sync_stats(&self) -> SyncStats {
        mock::sync_stats(&self.devices, &self.discrepancies)
    }

    pub fn is_bulk_running(&self) -> bool {
        self.bulk_progress.is_some()
    }

    /// Unique device locations in source order.
    pub fn locations(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for device in &self.devices {
            if !seen.contains(&device.location) {
                seen.push(device.location.clone());
            }
        }
        seen
    }

    /// Marks one open discrepancy resolved.
    pub fn resolve(&mut self, id: &str) -> bool {
        let changed = match self.discrepancies.iter_mut().find(|d| d.id == id && !d.resolved) {
            Some(d) => {
                d.resolved = true;
                true
            }
            None => false,
        };
        if changed {
            self.selection.remove(id);
            self.refresh_conflicts();
        }
        changed
    }

    /// Resolves every listed id that is still open. Returns how many flipped.
    pub fn resolve_all<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut flipped = 0;
        for id in ids {
            if let Some(d) = self.discrepancies.iter_mut().find(|d| &d.id == id && !d.resolved) {
                d.resolved = true;
                flipped += 1;
            }
        }
        self.refresh_conflicts();
        flipped
    }

    fn refresh_conflicts(&mut self) {
        for device in &mut self.devices {
            device.has_conflict = self
                .discrepancies
                .iter()
                .any(|d| d.device_id == device.id && !d.resolved);
        }
    }

    /// Selection is frozen while a bulk job runs.
    pub fn toggle_selected(&mut self, id: &str) -> bool {
        if self.is_bulk_running() {
            debug!("Ignoring selection change during bulk resolve");
            return false;
        }
        self.selection.toggle(id)
    }

    pub fn clear_selection(&mut self) {
        if !self.is_bulk_running() {
            self.selection.clear();
        }
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => colors::RED,
        Severity::Medium => colors::GOLD,
        Severity::Low => colors::BLUE,
    }
}

fn asset_color(status: AssetStatus) -> Color {
    match status {
        AssetStatus::Active => colors::SUCCESS,
        AssetStatus::Maintenance => colors::GOLD,
        AssetStatus::Inactive => colors::SILVER,
    }
}

pub struct ReconciliationView {
    refresh: RefreshConfig,
    state: Arc<Mutex<ReconState>>,
    clock: Option<Refresher>,
    discovery: Option<TaskHandle>,
    bulk: Option<TaskHandle>,
    search: TextInput,
    conflict: Choice<ConflictFilter>,
    location: Choice<usize>,
    severity: Choice<Severity>,
    focus: Pane,
    device_cursor: usize,
    discrepancy_cursor: usize,
    modal: DetailModal,
    expanded: Option<String>,
}

impl ReconciliationView {
    pub fn new(refresh: RefreshConfig) -> Self {
        Self {
            refresh,
            state: Arc::new(Mutex::new(ReconState::generate())),
            clock: None,
            discovery: None,
            bulk: None,
            search: TextInput::default(),
            conflict: Choice::All,
            location: Choice::All,
            severity: Choice::All,
            focus: Pane::Devices,
            device_cursor: 0,
            discrepancy_cursor: 0,
            modal: DetailModal::default(),
            expanded: None,
        }
    }

    pub fn state(&self) -> ReconState {
        self.state.lock().clone()
    }

    fn location_name(&self, locations: &[String]) -> Option<String> {
        match self.location {
            Choice::All => None,
            Choice::Only(idx) => locations.get(idx).cloned(),
        }
    }

    fn device_filter<'a>(&'a self, location: Option<&'a str>) -> Filter<'a, InventoryDevice> {
        Filter::new()
            .search(self.search.value())
            .choice(self.conflict, ConflictFilter::of)
            .when(move |d: &InventoryDevice| location.map_or(true, |l| d.location == l))
    }

    fn discrepancy_filter(&self) -> Filter<'static, Discrepancy> {
        Filter::new()
            .when(|d: &Discrepancy| !d.resolved)
            .choice(self.severity, |d: &Discrepancy| d.severity)
    }

    pub fn visible_device_ids(&self) -> Vec<String> {
        let state = self.state.lock();
        let location = self.location_name(&state.locations());
        let ids = self
            .device_filter(location.as_deref())
            .apply(&state.devices)
            .into_iter()
            .map(|d| d.id.clone())
            .collect();
        ids
    }

    pub fn visible_discrepancy_ids(&self) -> Vec<String> {
        let state = self.state.lock();
        let ids = self
            .discrepancy_filter()
            .apply(&state.discrepancies)
            .into_iter()
            .map(|d| d.id.clone())
            .collect();
        ids
    }

    fn discrepancy_under_cursor(&self) -> Option<String> {
        self.visible_discrepancy_ids().get(self.discrepancy_cursor).cloned()
    }

    /// Starts auto-discovery unless one is already running.
    pub fn start_discovery(&mut self) -> bool {
        {
            let mut state = self.state.lock();
            if state.discovering {
                return false;
            }
            state.discovering = true;
        }
        info!("Auto-discovery started");
        let state = self.state.clone();
        let period = RefreshConfig::every(self.refresh.discovery_ms);
        self.discovery = Some(TaskHandle::spawn("reconciliation-discovery", async move {
            tokio::time::sleep(period).await;
            let mut state = state.lock();
            state.discovering = false;
            state.last_sync = Utc::now();
            info!("Auto-discovery finished, {} devices scanned", state.devices.len());
        }));
        true
    }

    /// Captures the current selection and resolves it after the progress
    /// ramp completes. Returns false when nothing is selected or a job is
    /// already running.
    pub fn start_bulk_resolve(&mut self) -> bool {
        let captured: Vec<String> = {
            let mut state = self.state.lock();
            if state.is_bulk_running() || state.selection.is_empty() {
                return false;
            }
            state.bulk_progress = Some(0);
            state.selection.ids().iter().cloned().collect()
        };
        info!("Bulk resolve started for {} discrepancies", captured.len());

        let on_step = self.state.clone();
        let on_done = self.state.clone();
        self.bulk = Some(spawn_ramp(
            "reconciliation-bulk",
            RefreshConfig::every(self.refresh.bulk_step_ms),
            self.refresh.bulk_step,
            move |value| on_step.lock().bulk_progress = Some(value),
            move || {
                let mut state = on_done.lock();
                let resolved = state.resolve_all(&captured);
                state.selection.clear();
                state.bulk_progress = None;
                info!("Bulk resolve finished, {} discrepancies resolved", resolved);
            },
        ));
        true
    }

    fn move_cursor(&mut self, down: bool) {
        match (self.focus, down) {
            (Pane::Devices, false) => self.device_cursor = self.device_cursor.saturating_sub(1),
            (Pane::Discrepancies, false) => {
                self.discrepancy_cursor = self.discrepancy_cursor.saturating_sub(1)
            }
            (Pane::Devices, true) => {
                let len = self.visible_device_ids().len();
                self.device_cursor = ui::clamp_cursor(self.device_cursor + 1, len);
            }
            (Pane::Discrepancies, true) => {
                let len = self.visible_discrepancy_ids().len();
                self.discrepancy_cursor = ui::clamp_cursor(self.discrepancy_cursor + 1, len);
            }
        }
    }

    fn filters_changed(&mut self) {
        self.device_cursor = 0;
        self.discrepancy_cursor = 0;
    }

    fn draw_stats(&self, frame: &mut Frame, area: Rect, state: &ReconState) {
        let stats = state.sync_stats();
        let sync_label = if state.discovering {
            "discovering...".to_string()
        } else {
            state.last_sync.format("%H:%M:%S").to_string()
        };
        ui::draw_stat_row(
            frame,
            area,
            &[
                ("TOTAL DEVICES", stats.total.to_string(), colors::WHITE),
                ("SYNCED", stats.synced.to_string(), colors::SUCCESS),
                ("CONFLICTS", stats.conflicts.to_string(), if stats.conflicts > 0 { colors::RED } else { colors::SILVER }),
                ("OPEN DISCREPANCIES", stats.pending.to_string(), colors::GOLD),
                ("LAST SYNC", sync_label, if state.discovering { colors::GOLD } else { colors::SILVER }),
            ],
        );
    }

    fn draw_status_line(&self, frame: &mut Frame, area: Rect, state: &ReconState, locations: &[String]) {
        if let Some(progress) = state.bulk_progress {
            frame.render_widget(
                Gauge::default()
                    .gauge_style(Style::default().fg(colors::GOLD).bg(colors::BG_DARK))
                    .percent(progress as u16)
                    .label(format!("Auto-reconciling {} discrepancies  {}%", state.selection.len(), progress)),
                area,
            );
            return;
        }
        let location = self
            .location
            .label_with(|idx| locations.get(*idx).cloned().unwrap_or_default());
        let search_style = if self.search.is_active() {
            Style::default().fg(colors::GOLD)
        } else {
            Style::default().fg(colors::WHITE)
        };
        let line = Line::from(vec![
            Span::styled("Search: ", Style::default().fg(colors::SILVER)),
            Span::styled(format!("{:<16}", self.search.display()), search_style),
            Span::styled("  Sync: ", Style::default().fg(colors::SILVER)),
            Span::styled(self.conflict.label_with(|c| c.as_str().to_string()), Style::default().fg(colors::WHITE)),
            Span::styled("  Location: ", Style::default().fg(colors::SILVER)),
            Span::styled(location, Style::default().fg(colors::WHITE)),
            Span::styled("  Severity: ", Style::default().fg(colors::SILVER)),
            Span::styled(self.severity.label_with(|s| s.to_string()), Style::default().fg(colors::WHITE)),
            Span::styled(
                format!("  Selected: {}", state.selection.len()),
                Style::default().fg(colors::GOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn pane_block(&self, title: &str, pane: Pane) -> Block<'static> {
        let block = ui::panel(title);
        if self.focus == pane {
            block.border_style(Style::default().fg(colors::GOLD))
        } else {
            block
        }
    }

    fn draw_devices(&self, frame: &mut Frame, area: Rect, devices: &[&InventoryDevice]) {
        let block = self.pane_block("UIM inventory", Pane::Devices);
        if devices.is_empty() {
            ui::draw_empty(frame, area, block, "No devices match the current filters");
            return;
        }
        let cursor = ui::clamp_cursor(self.device_cursor, devices.len());
        let rows: Vec<Row> = devices
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let (sync, sync_color) = if d.has_conflict {
                    ("conflict", colors::RED)
                } else {
                    ("synced", colors::SUCCESS)
                };
                Row::new(vec![
                    Cell::from(Span::styled(d.name.clone(), Style::default().fg(colors::WHITE).bold())),
                    Cell::from(d.kind.clone()),
                    Cell::from(d.location.clone()),
                    Cell::from(Span::styled(d.status.to_string(), Style::default().fg(asset_color(d.status)))),
                    Cell::from(Span::styled(sync, Style::default().fg(sync_color))),
                    Cell::from(d.vendor.clone()),
                    Cell::from(Span::styled(
                        format!("{} {:>3}%", ui::bar(d.utilization as f64, 100.0, 8), d.utilization),
                        Style::default().fg(ui::load_color(d.utilization as f64)),
                    )),
                    Cell::from(d.last_synced.format("%H:%M").to_string()),
                ])
                .style(ui::cursor_style(self.focus == Pane::Devices && i == cursor))
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Min(20),
                Constraint::Length(8),
                Constraint::Min(20),
                Constraint::Length(11),
                Constraint::Length(8),
                Constraint::Length(9),
                Constraint::Length(13),
                Constraint::Length(6),
            ],
        )
        .header(ui::header_row(&["DEVICE", "TYPE", "LOCATION", "STATUS", "SYNC", "VENDOR", "UTIL", "SYNCED"]))
        .style(Style::default().fg(colors::WHITE))
        .block(block);
        frame.render_widget(table, area);
    }

    fn draw_discrepancies(&self, frame: &mut Frame, area: Rect, state: &ReconState, open: &[&Discrepancy]) {
        let block = self.pane_block("Discrepancies", Pane::Discrepancies);
        if open.is_empty() {
            ui::draw_empty(frame, area, block, "No open discrepancies");
            return;
        }
        let cursor = ui::clamp_cursor(self.discrepancy_cursor, open.len());
        let items: Vec<ListItem> = open
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let mark = if state.selection.contains(&d.id) { "[x]" } else { "[ ]" };
                let mut lines = vec![Line::from(vec![
                    Span::styled(format!("{} ", mark), Style::default().fg(colors::GOLD)),
                    Span::styled(
                        format!("{:<6} ", d.severity),
                        Style::default().fg(severity_color(d.severity)).bold(),
                    ),
                    Span::styled(format!("{:<20} ", d.kind), Style::default().fg(colors::SILVER)),
                    Span::styled(format!("{:<20} ", d.device_name), Style::default().fg(colors::WHITE).bold()),
                    Span::styled(d.description.clone(), Style::default().fg(colors::WHITE)),
                ])];
                if self.expanded.as_deref() == Some(d.id.as_str()) {
                    let value = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
                    lines.push(Line::from(Span::styled(
                        format!(
                            "      UIM: {}  NMS: {}  category: {}  detected {}",
                            value(&d.uim_value),
                            value(&d.nms_value),
                            d.category,
                            d.detected_at.format("%H:%M")
                        ),
                        Style::default().fg(colors::SILVER),
                    )));
                    lines.push(Line::from(Span::styled(
                        format!("      impact: {}  action: {}", d.impact, d.recommended_action),
                        Style::default().fg(colors::GOLD),
                    )));
                }
                ListItem::new(lines).style(ui::cursor_style(self.focus == Pane::Discrepancies && i == cursor))
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_modal(&self, frame: &mut Frame, state: &ReconState, device: &InventoryDevice) {
        let area = ui::modal_area(frame, 60, 70);
        let block = ui::modal_panel(&device.name);
        let (lat, lon) = device.coordinates;
        let mut lines = vec![
            ui::field("Type", device.kind.clone()),
            ui::field("Location", device.location.clone()),
            ui::field("Coordinates", format!("{:.4}, {:.4}", lat, lon)),
            ui::field("Status", device.status.to_string()),
            ui::field("Vendor / firmware", format!("{} / {}", device.vendor, device.firmware)),
            ui::field("Capacity", device.capacity.clone()),
            ui::field("Utilization", format!("{}%", device.utilization)),
            ui::field("Ports", device.ports.to_string()),
            ui::field("Temperature", format!("{}°C", device.temperature)),
            ui::field("Uptime", format!("{} days", device.uptime_days)),
            ui::field("IP address", device.ip.clone()),
            ui::field("SNMP community", device.snmp_community.clone()),
            ui::field("Last synced", device.last_synced.format("%Y-%m-%d %H:%M").to_string()),
            Line::from(""),
        ];
        let own: Vec<&Discrepancy> = state
            .discrepancies
            .iter()
            .filter(|d| d.device_id == device.id)
            .collect();
        if own.is_empty() {
            lines.push(Line::from(Span::styled("No discrepancies recorded", Style::default().fg(colors::SILVER))));
        }
        for d in own {
            let (state_label, color) = if d.resolved {
                ("resolved", colors::SUCCESS)
            } else {
                (d.severity.as_str(), severity_color(d.severity))
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<9}", state_label), Style::default().fg(color)),
                Span::styled(d.description.clone(), Style::default().fg(colors::WHITE)),
            ]));
        }
        frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
    }
}

impl View for ReconciliationView {
    fn route(&self) -> Route {
        Route::Reconciliation
    }

    fn mount(&mut self) {
        let state = self.state.clone();
        self.clock = Some(spawn_ticker(
            "reconciliation-clock",
            RefreshConfig::every(self.refresh.sync_clock_ms),
            move |_| state.lock().last_sync = Utc::now(),
        ));
        self.start_discovery();
    }

    fn unmount(&mut self) {
        self.clock = None;
        self.discovery = None;
        if let Some(mut bulk) = self.bulk.take() {
            if !bulk.is_finished() {
                bulk.stop();
                self.state.lock().bulk_progress = None;
                info!("Bulk resolve abandoned on unmount");
            }
        }
        self.state.lock().discovering = false;
    }

    fn captures_input(&self) -> bool {
        self.search.is_active()
    }

    fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        if self.search.is_active() {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.search.deactivate(),
                _ => {
                    if self.search.handle(key) {
                        self.filters_changed();
                    }
                }
            }
            return ViewAction::None;
        }

        if self.modal.is_open() {
            if key.code == KeyCode::Esc {
                self.modal.close();
            }
            return ViewAction::None;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Pane::Devices => Pane::Discrepancies,
                    Pane::Discrepancies => Pane::Devices,
                };
            }
            KeyCode::Char('/') => self.search.activate(),
            KeyCode::Char('f') => {
                self.conflict = self.conflict.cycle(&ConflictFilter::ALL);
                self.filters_changed();
            }
            KeyCode::Char('l') => {
                let count = self.state.lock().locations().len();
                let options: Vec<usize> = (0..count).collect();
                self.location = self.location.cycle(&options);
                self.filters_changed();
            }
            KeyCode::Char('v') => {
                self.severity = self.severity.cycle(&Severity::ALL);
                self.filters_changed();
            }
            KeyCode::Char('c') => {
                self.search.clear();
                self.conflict = Choice::All;
                self.location = Choice::All;
                self.severity = Choice::All;
                self.filters_changed();
            }
            KeyCode::Up => self.move_cursor(false),
            KeyCode::Down => self.move_cursor(true),
            KeyCode::Enter => match self.focus {
                Pane::Devices => {
                    if let Some(id) = self.visible_device_ids().get(self.device_cursor) {
                        self.modal.open(id);
                    }
                }
                Pane::Discrepancies => {
                    if let Some(id) = self.discrepancy_under_cursor() {
                        self.expanded = if self.expanded.as_deref() == Some(id.as_str()) {
                            None
                        } else {
                            Some(id)
                        };
                    }
                }
            },
            KeyCode::Char(' ') if self.focus == Pane::Discrepancies => {
                if let Some(id) = self.discrepancy_under_cursor() {
                    self.state.lock().toggle_selected(&id);
                }
            }
            KeyCode::Char('r') if self.focus == Pane::Discrepancies => {
                if let Some(id) = self.discrepancy_under_cursor() {
                    let mut state = self.state.lock();
                    if !state.is_bulk_running() && state.resolve(&id) {
                        info!("Discrepancy {} resolved", id);
                    }
                }
            }
            KeyCode::Char('b') => {
                self.start_bulk_resolve();
            }
            KeyCode::Char('x') => self.state.lock().clear_selection(),
            KeyCode::Char('s') => {
                self.start_discovery();
            }
            _ => {}
        }
        ViewAction::None
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("TAB", "Pane"),
            ("/", "Search"),
            ("F/L/V", "Filters"),
            ("SPACE", "Select"),
            ("R", "Resolve"),
            ("B", "Bulk resolve"),
            ("S", "Sync now"),
        ]
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let state = self.state.lock();
        let locations = state.locations();
        let location = self.location_name(&locations);
        let device_filter = self.device_filter(location.as_deref());
        let devices = device_filter.apply(&state.devices);
        let discrepancy_filter = self.discrepancy_filter();
        let open = discrepancy_filter.apply(&state.discrepancies);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(7),
                Constraint::Min(7),
            ])
            .split(area);

        self.draw_stats(frame, chunks[0], &state);
        self.draw_status_line(frame, chunks[1], &state, &locations);
        self.draw_devices(frame, chunks[2], &devices);
        self.draw_discrepancies(frame, chunks[3], &state, &open);

        if let Some(device) = self
            .modal
            .current()
            .and_then(|id| state.devices.iter().find(|d| d.id == id))
        {
            self.draw_modal(frame, &state, device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::buffer_text;
    use crate::views::testing::{ch, key, typed};
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn render(view: &ReconciliationView) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 45)).unwrap();
        terminal.draw(|frame| view.draw(frame, frame.area())).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn resolved_ids(state: &ReconState) -> Vec<&str> {
        state
            .discrepancies
            .iter()
            .filter(|d| d.resolved)
            .map(|d| d.id.as_str())
            .collect()
    }

    #[test]
    fn test_locations_are_unique_in_source_order() {
        let state = ReconState::generate();
        assert_eq!(
            state.locations(),
            vec![
                "Jakarta Pusat",
                "Bandung Kota",
                "Jakarta-Bandung Route",
                "Surabaya Timur",
                "Yogyakarta"
            ]
        );
    }

    #[test]
    fn test_device_filters_combine() {
        let mut view = ReconciliationView::new(RefreshConfig::default());
        view.handle_key(ch('/'));
        for k in typed("bandung") {
            view.handle_key(k);
        }
        view.handle_key(key(KeyCode::Esc));
        assert_eq!(view.visible_device_ids(), vec!["dev-002", "dev-003"]);

        view.handle_key(ch('f'));
        assert_eq!(view.visible_device_ids(), vec!["dev-003"]);

        view.handle_key(ch('c'));
        view.handle_key(ch('l'));
        assert_eq!(view.visible_device_ids(), vec!["dev-001"]);
    }

    #[test]
    fn test_vendor_search_and_empty_state() {
        let mut view = ReconciliationView::new(RefreshConfig::default());
        view.handle_key(ch('/'));
        for k in typed("nokia") {
            view.handle_key(k);
        }
        view.handle_key(key(KeyCode::Enter));
        assert_eq!(view.visible_device_ids(), vec!["dev-005"]);

        view.handle_key(ch('f'));
        view.handle_key(ch('f'));
        assert!(view.visible_device_ids().is_empty());
        assert!(render(&view).contains("No devices match the current filters"));
    }

    #[test]
    fn test_severity_filter_over_open_discrepancies() {
        let mut view = ReconciliationView::new(RefreshConfig::default());
        view.handle_key(ch('v'));
        assert_eq!(view.visible_discrepancy_ids(), vec!["disc-001", "disc-004"]);

        view.state.lock().resolve("disc-001");
        assert_eq!(view.visible_discrepancy_ids(), vec!["disc-004"]);
    }

    #[test]
    fn test_single_resolve_clears_device_conflict() {
        let mut state = ReconState::generate();
        assert!(state.resolve("disc-002"));
        assert!(!state.resolve("disc-002"));
        let cable = |s: &ReconState| s.devices.iter().find(|d| d.id == "dev-003").unwrap().has_conflict;
        assert!(cable(&state));

        assert!(state.resolve("disc-005"));
        assert!(!cable(&state));
        assert_eq!(state.sync_stats(), SyncStats { total: 5, synced: 3, conflicts: 2, pending: 3 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_resolve_flips_exactly_the_selection() {
        let mut view = ReconciliationView::new(RefreshConfig::default());
        view.handle_key(key(KeyCode::Tab));
        view.handle_key(ch(' '));
        view.handle_key(key(KeyCode::Down));
        view.handle_key(key(KeyCode::Down));
        view.handle_key(key(KeyCode::Down));
        view.handle_key(ch(' '));
        assert_eq!(view.state().selection.len(), 2);

        assert!(view.start_bulk_resolve());
        assert!(!view.start_bulk_resolve());

        tokio::time::sleep(Duration::from_millis(1_050)).await;
        let midway = view.state();
        assert_eq!(midway.bulk_progress, Some(50));
        assert!(resolved_ids(&midway).is_empty());

        // Edits made mid-job do not change what gets resolved.
        view.handle_key(key(KeyCode::Down));
        view.handle_key(ch(' '));
        view.handle_key(ch('x'));
        assert_eq!(view.state().selection.len(), 2);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        let done = view.state();
        assert_eq!(resolved_ids(&done), vec!["disc-001", "disc-004"]);
        assert!(done.selection.is_empty());
        assert_eq!(done.bulk_progress, None);
        assert_eq!(done.sync_stats(), SyncStats { total: 5, synced: 3, conflicts: 2, pending: 3 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_resolve_needs_a_selection() {
        let mut view = ReconciliationView::new(RefreshConfig::default());
        assert!(!view.start_bulk_resolve());
        assert_eq!(view.state().bulk_progress, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_abandons_bulk_job() {
        let mut view = ReconciliationView::new(RefreshConfig::default());
        view.state.lock().toggle_selected("disc-002");
        view.mount();
        assert!(view.start_bulk_resolve());
        tokio::time::sleep(Duration::from_millis(500)).await;

        view.unmount();
        tokio::time::sleep(Duration::from_secs(10)).await;
        let state = view.state();
        assert!(resolved_ids(&state).is_empty());
        assert_eq!(state.bulk_progress, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_discovery_runs_once_at_a_time() {
        let mut view = ReconciliationView::new(RefreshConfig::default());
        view.mount();
        assert!(view.state().discovering);
        assert!(!view.start_discovery());
        assert!(render(&view).contains("discovering..."));

        tokio::time::sleep(Duration::from_millis(3_100)).await;
        assert!(!view.state().discovering);
        assert!(view.start_discovery());
        view.unmount();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_clock_ticks_while_mounted() {
        let mut view = ReconciliationView::new(RefreshConfig::default());
        view.mount();
        tokio::time::sleep(Duration::from_millis(30_100)).await;
        assert_eq!(view.clock.as_ref().map(|c| c.applied()), Some(1));
        view.unmount();
        assert!(view.clock.is_none());
    }

    #[test]
    fn test_expand_and_detail_modal() {
        let mut view = ReconciliationView::new(RefreshConfig::default());
        view.handle_key(key(KeyCode::Enter));
        assert_eq!(view.modal.current(), Some("dev-001"));
        assert!(render(&view).contains("192.168.1.10"));
        view.handle_key(key(KeyCode::Esc));

        view.handle_key(key(KeyCode::Tab));
        view.handle_key(key(KeyCode::Enter));
        assert_eq!(view.expanded.as_deref(), Some("disc-001"));
        assert!(render(&view).contains("UIM: 10 Gbps"));
    }
}
