// services/infra-dash/src/views/orders.rs
//
// Service order management: searchable order table, live fulfilment metrics,
// an order detail modal and an on-demand data refresh.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use parking_lot::RwLock;
use rand::Rng;
use ratatui::{prelude::*, widgets::*};
use std::sync::Arc;
use svckit::types::{
    InventoryStatus, OrderMetrics, OrderStatus, Priority, ServiceOrder, SyncStatus,
};
use tracing::info;

use super::input::TextInput;
use super::{View, ViewAction};
use crate::config::RefreshConfig;
use crate::filter::{Choice, Filter, Searchable};
use crate::mock;
use crate::refresh::{spawn_refresh, Perturb, Refresher, TaskHandle};
use crate::router::Route;
use crate::selection::DetailModal;
use crate::ui::{self, colors};

impl Searchable for ServiceOrder {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.order_number.as_str(), self.customer_name.as_str()]
    }
}

/// Fulfilment counters updated by the orders feed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdersLive {
    pub metrics: OrderMetrics,
    pub inventory: InventoryStatus,
}

impl Perturb for OrdersLive {
    fn perturb<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.metrics.orders_today += rng.gen_range(0..=1);
        if rng.gen_bool(0.3) {
            self.metrics.pending_fulfillment += 1;
        } else {
            self.metrics.pending_fulfillment = self.metrics.pending_fulfillment.saturating_sub(1);
        }
        self.inventory.sync_status = if rng.gen_bool(0.05) {
            SyncStatus::Syncing
        } else {
            SyncStatus::Synced
        };
        self.inventory.last_sync = Utc::now();
    }
}

/// Order list shared with the refresh job.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    pub orders: Vec<ServiceOrder>,
    pub loading: bool,
}

fn status_color(status: OrderStatus) -> Color {
    match status {
        OrderStatus::Pending => colors::GOLD,
        OrderStatus::Processing => colors::BLUE,
        OrderStatus::Fulfillment => colors::WHITE,
        OrderStatus::Shipped | OrderStatus::Delivered => colors::SUCCESS,
        OrderStatus::Cancelled => colors::SILVER,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Urgent => colors::RED,
        Priority::High => colors::GOLD,
        Priority::Medium => colors::BLUE,
        Priority::Low => colors::SILVER,
    }
}

pub struct OrdersView {
    refresh: RefreshConfig,
    book: Arc<RwLock<OrderBook>>,
    live: Arc<RwLock<OrdersLive>>,
    refresher: Option<Refresher>,
    reload: Option<TaskHandle>,
    search: TextInput,
    status: Choice<OrderStatus>,
    priority: Choice<Priority>,
    cursor: usize,
    modal: DetailModal,
}

impl OrdersView {
    pub fn new(refresh: RefreshConfig) -> Self {
        Self {
            refresh,
            book: Arc::new(RwLock::new(OrderBook {
                orders: mock::service_orders(),
                loading: false,
            })),
            live: Arc::new(RwLock::new(OrdersLive {
                metrics: mock::order_metrics(),
                inventory: mock::inventory_status(),
            })),
            refresher: None,
            reload: None,
            search: TextInput::default(),
            status: Choice::All,
            priority: Choice::All,
            cursor: 0,
            modal: DetailModal::default(),
        }
    }

    pub fn filtered(&self) -> Vec<ServiceOrder> {
        let book = self.book.read();
        Filter::<ServiceOrder>::new()
            .search(self.search.value())
            .choice(self.status, |o| o.status)
            .choice(self.priority, |o| o.priority)
            .apply(&book.orders)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn live(&self) -> OrdersLive {
        self.live.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.book.read().loading
    }

    /// Regenerates orders and metrics after `reload_ms` unless a reload is
    /// already pending. Filters and cursor are left alone.
    pub fn start_reload(&mut self) -> bool {
        {
            let mut book = self.book.write();
            if book.loading {
                return false;
            }
            book.loading = true;
        }
        info!("Refreshing service orders");
        let book = self.book.clone();
        let live = self.live.clone();
        let delay = RefreshConfig::every(self.refresh.reload_ms);
        self.reload = Some(TaskHandle::spawn("orders-reload", async move {
            tokio::time::sleep(delay).await;
            live.write().metrics = mock::order_metrics();
            let mut book = book.write();
            book.orders = mock::service_orders();
            book.loading = false;
            info!("Service orders refreshed, {} orders", book.orders.len());
        }));
        true
    }

    fn selected_order(&self) -> Option<ServiceOrder> {
        let id = self.modal.current()?;
        self.book.read().orders.iter().find(|o| o.id == id).cloned()
    }

    fn filters_changed(&mut self) {
        self.cursor = 0;
    }

    fn draw_live(&self, frame: &mut Frame, area: Rect) {
        let live = self.live.read();
        let m = &live.metrics;
        let inv = &live.inventory;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Length(1)])
            .split(area);
        ui::draw_stat_row(
            frame,
            chunks[0],
            &[
                ("ORDERS TODAY", m.orders_today.to_string(), colors::WHITE),
                ("PENDING FULFILMENT", m.pending_fulfillment.to_string(), colors::GOLD),
                ("SYNC ERRORS", m.sync_errors.to_string(), if m.sync_errors > 0 { colors::RED } else { colors::SILVER }),
                ("AVG PROCESSING", m.avg_processing_time.clone(), colors::SUCCESS),
            ],
        );
        let sync_color = match inv.sync_status {
            SyncStatus::Synced => colors::SUCCESS,
            SyncStatus::Syncing => colors::GOLD,
            SyncStatus::Error => colors::RED,
        };
        let line = Line::from(vec![
            Span::styled("Inventory: ", Style::default().fg(colors::SILVER)),
            Span::styled(format!("{} items", ui::format_number(inv.total_items as u64)), Style::default().fg(colors::WHITE)),
            Span::raw("  |  "),
            Span::styled(format!("{} low stock", inv.low_stock), Style::default().fg(colors::GOLD)),
            Span::raw("  |  "),
            Span::styled(format!("{} out of stock", inv.out_of_stock), Style::default().fg(colors::RED)),
            Span::raw("  |  "),
            Span::styled(inv.sync_status.to_string(), Style::default().fg(sync_color).bold()),
            Span::styled(
                format!(" at {}", inv.last_sync.format("%H:%M:%S")),
                Style::default().fg(colors::SILVER),
            ),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), chunks[1]);
    }

    fn draw_filters(&self, frame: &mut Frame, area: Rect, shown: usize) {
        let (total, loading) = {
            let book = self.book.read();
            (book.orders.len(), book.loading)
        };
        let search_style = if self.search.is_active() {
            Style::default().fg(colors::GOLD)
        } else {
            Style::default().fg(colors::WHITE)
        };
        let mut spans = vec![
            Span::styled("Search: ", Style::default().fg(colors::SILVER)),
            Span::styled(format!("{:<20}", self.search.display()), search_style),
            Span::styled("  Status: ", Style::default().fg(colors::SILVER)),
            Span::styled(self.status.label_with(|s| s.to_string()), Style::default().fg(colors::WHITE)),
            Span::styled("  Priority: ", Style::default().fg(colors::SILVER)),
            Span::styled(self.priority.label_with(|p| p.to_string()), Style::default().fg(colors::WHITE)),
            Span::styled(
                format!("  ({} of {})", shown, total),
                Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
            ),
        ];
        if loading {
            spans.push(Span::styled("  Refreshing orders...", Style::default().fg(colors::GOLD).bold()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect, orders: &[ServiceOrder]) {
        let block = ui::panel("Service orders");
        if orders.is_empty() {
            ui::draw_empty(frame, area, block, "No orders match the current filters");
            return;
        }
        let cursor = ui::clamp_cursor(self.cursor, orders.len());
        let rows: Vec<Row> = orders
            .iter()
            .enumerate()
            .map(|(i, o)| {
                Row::new(vec![
                    Cell::from(Span::styled(o.order_number.clone(), Style::default().fg(colors::WHITE).bold())),
                    Cell::from(o.customer_name.clone()),
                    Cell::from(Span::styled(o.status.to_string(), Style::default().fg(status_color(o.status)))),
                    Cell::from(Span::styled(o.priority.to_string(), Style::default().fg(priority_color(o.priority)))),
                    Cell::from(o.items.len().to_string()),
                    Cell::from(ui::format_rupiah(o.total_amount)),
                    Cell::from(o.estimated_delivery.format("%d %b %Y").to_string()),
                    Cell::from(o.tracking_number.clone().unwrap_or_else(|| "-".to_string())),
                ])
                .style(ui::cursor_style(i == cursor))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(14),
                Constraint::Min(22),
                Constraint::Length(12),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Length(16),
                Constraint::Length(12),
                Constraint::Length(14),
            ],
        )
        .header(ui::header_row(&[
            "ORDER", "CUSTOMER", "STATUS", "PRIORITY", "ITEMS", "TOTAL", "DELIVERY", "TRACKING",
        ]))
        .style(Style::default().fg(colors::WHITE))
        .block(block);

        frame.render_widget(table, area);
    }

    fn draw_modal(&self, frame: &mut Frame, order: &ServiceOrder) {
        let area = ui::modal_area(frame, 70, 70);
        let block = ui::modal_panel(&format!("Order {}", order.order_number));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Length(8), Constraint::Min(4), Constraint::Length(1)])
            .split(inner);

        let info = vec![
            ui::field("Customer", order.customer_name.clone()),
            ui::field("Status", order.status.to_string()),
            ui::field("Priority", order.priority.to_string()),
            ui::field("Created", order.created_at.format("%Y-%m-%d %H:%M").to_string()),
            ui::field("Fulfilment", order.fulfillment_location.clone()),
            ui::field("Inventory sync", if order.inventory_sync { "synced" } else { "not synced" }),
            ui::field("Assets", order.asset_allocation.join(", ")),
            ui::field("Tracking", order.tracking_number.clone().unwrap_or_else(|| "-".to_string())),
        ];
        frame.render_widget(Paragraph::new(info), chunks[0]);

        let rows: Vec<Row> = order
            .items
            .iter()
            .map(|item| {
                Row::new(vec![
                    Cell::from(item.product_name.clone()),
                    Cell::from(item.sku.clone()),
                    Cell::from(item.quantity.to_string()),
                    Cell::from(ui::format_rupiah(item.unit_price)),
                    Cell::from(format!("{}/{}", item.reserved_stock, item.available_stock)),
                    Cell::from(item.location.clone()),
                    Cell::from(ui::format_rupiah(item.line_total())),
                ])
            })
            .collect();
        let items = Table::new(
            rows,
            [
                Constraint::Min(20),
                Constraint::Length(14),
                Constraint::Length(5),
                Constraint::Length(11),
                Constraint::Length(11),
                Constraint::Length(11),
                Constraint::Length(15),
            ],
        )
        .header(ui::header_row(&["PRODUCT", "SKU", "QTY", "UNIT", "RSV/AVAIL", "LOCATION", "LINE TOTAL"]))
        .style(Style::default().fg(colors::WHITE));
        frame.render_widget(items, chunks[1]);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Total  ", Style::default().fg(colors::SILVER)),
                Span::styled(ui::format_rupiah(order.total_amount), Style::default().fg(colors::GOLD).bold()),
            ]))
            .alignment(Alignment::Right),
            chunks[2],
        );
    }
}

impl View for OrdersView {
    fn route(&self) -> Route {
        Route::Orders
    }

    fn mount(&mut self) {
        self.refresher = Some(spawn_refresh(
            "orders-feed",
            RefreshConfig::every(self.refresh.orders_ms),
            self.live.clone(),
        ));
    }

    fn unmount(&mut self) {
        self.refresher = None;
        self.reload = None;
        self.book.write().loading = false;
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
            KeyCode::Char('/') => self.search.activate(),
            KeyCode::Char('s') => {
                self.status = self.status.cycle(&OrderStatus::ALL);
                self.filters_changed();
            }
            KeyCode::Char('p') => {
                self.priority = self.priority.cycle(&Priority::ALL);
                self.filters_changed();
            }
            KeyCode::Char('c') => {
                self.search.clear();
                self.status = Choice::All;
                self.priority = Choice::All;
                self.filters_changed();
            }
            KeyCode::Char('r') => {
                self.start_reload();
            }
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => {
                self.cursor = ui::clamp_cursor(self.cursor + 1, self.filtered().len());
            }
            KeyCode::Enter => {
                let id = self
                    .filtered()
                    .get(self.cursor)
                    .map(|o| o.id.clone());
                if let Some(id) = id {
                    self.modal.open(&id);
                }
            }
            _ => {}
        }
        ViewAction::None
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("/", "Search"),
            ("S", "Status"),
            ("P", "Priority"),
            ("C", "Clear"),
            ("R", "Refresh"),
            ("ENTER", "Details"),
        ]
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let orders = self.filtered();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Length(1), Constraint::Min(5)])
            .split(area);

        self.draw_live(frame, chunks[0]);
        self.draw_filters(frame, chunks[1], orders.len());
        self.draw_table(frame, chunks[2], &orders);

        if let Some(order) = self.selected_order() {
            self.draw_modal(frame, &order);
        }
    }
}
