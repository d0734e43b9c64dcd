use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardKpis {
    pub total_active_orders: u32,
    pub network_utilization: f64,
    pub fiber_availability: String,
    pub pending_reconciliations: u32,
    pub total_revenue: String,
    pub active_users: u32,
    pub system_uptime: String,
    pub pending_tickets: u32,
    pub ai_prediction_alert: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Success,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub user: String,
    pub message: String,
    pub time_label: String,
    pub kind: ActivityKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionHealth {
    Optimal,
    Good,
    Warning,
    Critical,
}

impl RegionHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionHealth::Optimal => "optimal",
            RegionHealth::Good => "good",
            RegionHealth::Warning => "warning",
            RegionHealth::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStatus {
    pub region: String,
    pub health: RegionHealth,
    pub uptime: String,
    pub load: f64,
    pub devices: u32,
}

// ---------------------------------------------------------------------------
// Service orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Fulfillment,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Fulfillment,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Fulfillment => "fulfillment",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub product_name: String,
    pub sku: String,
    pub quantity: u32,
    /// Rupiah, no fractional part.
    pub unit_price: u64,
    pub available_stock: u32,
    pub reserved_stock: u32,
    pub location: String,
}

impl OrderItem {
    pub fn line_total(&self) -> u64 {
        self.quantity as u64 * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOrder {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub estimated_delivery: NaiveDate,
    pub tracking_number: Option<String>,
    pub fulfillment_location: String,
    pub inventory_sync: bool,
    pub asset_allocation: Vec<String>,
    pub total_amount: u64,
}

impl ServiceOrder {
    pub fn computed_total(&self) -> u64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    pub fn recompute_total(&mut self) {
        self.total_amount = self.computed_total();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Synced,
    Syncing,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryStatus {
    pub total_items: u32,
    pub low_stock: u32,
    pub out_of_stock: u32,
    pub sync_status: SyncStatus,
    pub last_sync: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMetrics {
    pub orders_today: u32,
    pub pending_fulfillment: u32,
    pub sync_errors: u32,
    pub avg_processing_time: String,
}

// ---------------------------------------------------------------------------
// Network monitoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Nms,
    Router,
    Switch,
    AccessPoint,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Nms => "NMS",
            DeviceKind::Router => "Router",
            DeviceKind::Switch => "Switch",
            DeviceKind::AccessPoint => "Access Point",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Offline,
    Warning,
    Error,
}

impl DeviceStatus {
    pub const ALL: [DeviceStatus; 4] = [
        DeviceStatus::Online,
        DeviceStatus::Offline,
        DeviceStatus::Warning,
        DeviceStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Warning => "warning",
            DeviceStatus::Error => "error",
        }
    }
}

/// Percentages for cpu, memory and bandwidth; latency in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetrics {
    pub cpu: f64,
    pub memory: f64,
    pub bandwidth: f64,
    pub latency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Active,
    Inactive,
    Changed,
}

impl RouteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Active => "active",
            RouteStatus::Inactive => "inactive",
            RouteStatus::Changed => "changed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub id: String,
    pub destination: String,
    pub gateway: String,
    pub interface: String,
    pub metric: u32,
    pub status: RouteStatus,
    pub last_change: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredDevice {
    pub id: String,
    pub name: String,
    pub kind: DeviceKind,
    pub status: DeviceStatus,
    pub location: String,
    pub last_seen: DateTime<Utc>,
    pub metrics: DeviceMetrics,
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Processing,
    Completed,
    Failed,
}

impl FlowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStatus::Processing => "processing",
            FlowStatus::Completed => "completed",
            FlowStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFlow {
    pub id: String,
    pub source: String,
    pub destination: String,
    pub protocol: String,
    pub data_size_mb: f64,
    pub status: FlowStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub total_devices: u32,
    pub online_devices: u32,
    pub route_changes: u32,
    pub data_flows: u32,
    pub sync_status: SyncStatus,
    pub last_sync: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSample {
    pub time_label: String,
    pub bandwidth: f64,
    pub latency: f64,
    pub packets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalUsage {
    pub region: String,
    pub usage: u8,
    pub growth: u8,
    pub customers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: u32,
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub confidence: u8,
    pub impact: RiskLevel,
    pub suggested_action: String,
    pub timeframe: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityForecast {
    pub node: String,
    pub location: String,
    pub current: u8,
    pub predicted_7d: u8,
    pub predicted_30d: u8,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [TimeRange::Day, TimeRange::Week, TimeRange::Month, TimeRange::Quarter];

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Day => "24 hours",
            TimeRange::Week => "7 days",
            TimeRange::Month => "30 days",
            TimeRange::Quarter => "3 months",
        }
    }

    pub fn next(&self) -> TimeRange {
        let idx = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

// ---------------------------------------------------------------------------
// Reconciliation (UIM vs NMS)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Active,
    Maintenance,
    Inactive,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Active => "active",
            AssetStatus::Maintenance => "maintenance",
            AssetStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryDevice {
    pub id: String,
    pub name: String,
    /// OLT, ODF, ODC, Splitter, Cable
    pub kind: String,
    pub location: String,
    pub coordinates: (f64, f64),
    pub status: AssetStatus,
    pub has_conflict: bool,
    pub last_synced: DateTime<Utc>,
    pub capacity: String,
    pub utilization: u8,
    pub ports: u32,
    pub vendor: String,
    pub firmware: String,
    pub temperature: u8,
    pub uptime_days: u32,
    pub ip: String,
    pub snmp_community: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    DataMismatch,
    StatusConflict,
    Duplicate,
    MissingNms,
    ConfigurationDrift,
}

impl DiscrepancyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscrepancyKind::DataMismatch => "data_mismatch",
            DiscrepancyKind::StatusConflict => "status_conflict",
            DiscrepancyKind::Duplicate => "duplicate",
            DiscrepancyKind::MissingNms => "missing_nms",
            DiscrepancyKind::ConfigurationDrift => "configuration_drift",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub id: String,
    pub device_id: String,
    pub device_name: String,
    pub kind: DiscrepancyKind,
    pub severity: Severity,
    pub description: String,
    pub uim_value: Option<String>,
    pub nms_value: Option<String>,
    pub detected_at: DateTime<Utc>,
    pub resolved: bool,
    pub impact: String,
    pub recommended_action: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    pub total: usize,
    pub synced: usize,
    pub conflicts: usize,
    pub pending: usize,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u32,
    pub message: String,
    pub time_label: String,
    pub read: bool,
}

macro_rules! display_via_as_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.pad(self.as_str())
                }
            }
        )*
    };
}

display_via_as_str!(
    RegionHealth,
    OrderStatus,
    Priority,
    SyncStatus,
    DeviceKind,
    DeviceStatus,
    RouteStatus,
    FlowStatus,
    RiskLevel,
    AssetStatus,
    Severity,
    DiscrepancyKind,
);
