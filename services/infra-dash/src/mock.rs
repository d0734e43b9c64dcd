// services/infra-dash/src/mock.rs
//
// Fixture generators for every screen.
//
// Shapes are fixed and values drift a little between calls. Derived fields
// (order totals, online counts, sync stats) are always computed from the
// generated records, never typed in separately.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use svckit::types::*;

use crate::refresh::Jitter;

fn ago(now: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    now - Duration::seconds(seconds)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub fn dashboard_kpis() -> DashboardKpis {
    let mut rng = rand::thread_rng();
    DashboardKpis {
        total_active_orders: 1_247 + rng.gen_range(0..5),
        network_utilization: Jitter::percent(2.0).apply(87.0, &mut rng).round(),
        fiber_availability: "98.5%".to_string(),
        pending_reconciliations: 23,
        total_revenue: "Rp 847.2M".to_string(),
        active_users: 15_420 + rng.gen_range(0..50),
        system_uptime: "99.97%".to_string(),
        pending_tickets: 8,
        ai_prediction_alert: "Potential bottleneck in South Jakarta at 15:00 WIB".to_string(),
    }
}

pub fn recent_activity() -> Vec<ActivityEntry> {
    let entry = |user: &str, message: &str, time: &str, kind| ActivityEntry {
        user: user.to_string(),
        message: message.to_string(),
        time_label: time.to_string(),
        kind,
    };
    vec![
        entry("Ahmad Pratama", "completed fiber installation for customer ID 12847", "2 min ago", ActivityKind::Success),
        entry("Sari Dewi", "initiated network reconciliation for Jakarta Pusat", "5 min ago", ActivityKind::Info),
        entry("System", "detected anomaly in network sector B-47", "12 min ago", ActivityKind::Warning),
        entry("Budi Santoso", "resolved customer complaint #TLK-2024-1156", "18 min ago", ActivityKind::Success),
        entry("System", "automated backup completed successfully", "1 hour ago", ActivityKind::Info),
    ]
}

pub fn network_regions() -> Vec<RegionStatus> {
    let mut rng = rand::thread_rng();
    let region = |name: &str, health, uptime: &str, load: f64, devices| RegionStatus {
        region: name.to_string(),
        health,
        uptime: uptime.to_string(),
        load,
        devices,
    };
    let load = Jitter::percent(1.5);
    vec![
        region("Jakarta", RegionHealth::Optimal, "99.8%", load.apply(78.0, &mut rng), 245),
        region("Surabaya", RegionHealth::Good, "99.2%", load.apply(65.0, &mut rng), 189),
        region("Bandung", RegionHealth::Warning, "97.1%", load.apply(92.0, &mut rng), 156),
        region("Medan", RegionHealth::Optimal, "99.6%", load.apply(71.0, &mut rng), 134),
    ]
}

// ---------------------------------------------------------------------------
// Service orders
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn order_item<R: Rng + ?Sized>(
    rng: &mut R,
    id: &str,
    product: &str,
    sku: &str,
    quantity: u32,
    unit_price: u64,
    available: u32,
    location: &str,
) -> OrderItem {
    let drift = (available / 10).max(1);
    OrderItem {
        id: id.to_string(),
        product_name: product.to_string(),
        sku: sku.to_string(),
        quantity,
        unit_price,
        available_stock: available - drift + rng.gen_range(0..=2 * drift),
        reserved_stock: quantity,
        location: location.to_string(),
    }
}

pub fn service_orders() -> Vec<ServiceOrder> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let hours = |h: i64| ago(now, h * 3_600);

    let mut orders = vec![
        ServiceOrder {
            id: "1".to_string(),
            order_number: "ORD-2025-001".to_string(),
            customer_name: "PT. Teknologi Nusantara".to_string(),
            items: vec![
                order_item(&mut rng, "1", "Fiber Optic Cable SM-6", "FOC-SM6-1000", 500, 25_000, 1_200, "Warehouse A"),
                order_item(&mut rng, "2", "Optical Splitter 1:8", "OPT-SPL-18", 20, 450_000, 50, "Warehouse B"),
            ],
            status: OrderStatus::Processing,
            priority: Priority::High,
            created_at: hours(28),
            updated_at: hours(24),
            estimated_delivery: (now + Duration::days(4)).date_naive(),
            tracking_number: None,
            fulfillment_location: "Jakarta Distribution Center".to_string(),
            inventory_sync: true,
            asset_allocation: vec!["WH-A-001".to_string(), "WH-B-002".to_string()],
            total_amount: 0,
        },
        ServiceOrder {
            id: "2".to_string(),
            order_number: "ORD-2025-002".to_string(),
            customer_name: "CV. Internet Mandiri".to_string(),
            items: vec![order_item(&mut rng, "3", "ONT Router Dual Band", "ONT-RDB-2024", 100, 850_000, 25, "Warehouse C")],
            status: OrderStatus::Pending,
            priority: Priority::Urgent,
            created_at: hours(30),
            updated_at: hours(30),
            estimated_delivery: (now + Duration::days(2)).date_naive(),
            tracking_number: None,
            fulfillment_location: "Surabaya Distribution Center".to_string(),
            inventory_sync: false,
            asset_allocation: vec!["WH-C-001".to_string()],
            total_amount: 0,
        },
        ServiceOrder {
            id: "3".to_string(),
            order_number: "ORD-2025-003".to_string(),
            customer_name: "PT. Solusi Digital".to_string(),
            items: vec![order_item(&mut rng, "4", "Ethernet Switch 24-Port", "ETH-SW-24P", 10, 1_200_000, 15, "Warehouse A")],
            status: OrderStatus::Fulfillment,
            priority: Priority::Medium,
            created_at: hours(46),
            updated_at: hours(29),
            estimated_delivery: (now + Duration::days(3)).date_naive(),
            tracking_number: Some("TRK-001-2025".to_string()),
            fulfillment_location: "Jakarta Distribution Center".to_string(),
            inventory_sync: true,
            asset_allocation: vec!["WH-A-003".to_string()],
            total_amount: 0,
        },
    ];

    for order in &mut orders {
        order.recompute_total();
    }
    orders
}

pub fn inventory_status() -> InventoryStatus {
    InventoryStatus {
        total_items: 2_890,
        low_stock: 12,
        out_of_stock: 3,
        sync_status: SyncStatus::Synced,
        last_sync: Utc::now(),
    }
}

pub fn order_metrics() -> OrderMetrics {
    OrderMetrics {
        orders_today: 47,
        pending_fulfillment: 8,
        sync_errors: 1,
        avg_processing_time: "2.3h".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Monitoring
// ---------------------------------------------------------------------------

pub fn monitored_devices() -> Vec<MonitoredDevice> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let mut metrics = |cpu: f64, memory: f64, bandwidth: f64, latency: f64| DeviceMetrics {
        cpu: Jitter::percent(3.0).apply(cpu, &mut rng),
        memory: Jitter::percent(3.0).apply(memory, &mut rng),
        bandwidth: Jitter::percent(3.0).apply(bandwidth, &mut rng),
        latency: Jitter::non_negative(1.0).apply(latency, &mut rng),
    };
    let route = |id: &str, dest: &str, gw: &str, iface: &str, metric, status, changed| RouteEntry {
        id: id.to_string(),
        destination: dest.to_string(),
        gateway: gw.to_string(),
        interface: iface.to_string(),
        metric,
        status,
        last_change: changed,
    };

    vec![
        MonitoredDevice {
            id: "nms-001".to_string(),
            name: "NMS Primary".to_string(),
            kind: DeviceKind::Nms,
            status: DeviceStatus::Online,
            location: "Jakarta Data Center".to_string(),
            last_seen: now,
            metrics: metrics(45.0, 62.0, 78.0, 12.0),
            routes: vec![route("route-001", "192.168.1.0/24", "10.0.0.1", "eth0", 100, RouteStatus::Active, now)],
        },
        MonitoredDevice {
            id: "router-001".to_string(),
            name: "Core Router JKT-01".to_string(),
            kind: DeviceKind::Router,
            status: DeviceStatus::Warning,
            location: "Jakarta Core".to_string(),
            last_seen: ago(now, 30),
            metrics: metrics(82.0, 71.0, 95.0, 25.0),
            routes: vec![route(
                "route-002",
                "10.10.0.0/16",
                "172.16.0.1",
                "gi0/0/1",
                110,
                RouteStatus::Changed,
                ago(now, 120),
            )],
        },
        MonitoredDevice {
            id: "switch-001".to_string(),
            name: "Access Switch SBY-01".to_string(),
            kind: DeviceKind::Switch,
            status: DeviceStatus::Online,
            location: "Surabaya Branch".to_string(),
            last_seen: now,
            metrics: metrics(34.0, 45.0, 56.0, 8.0),
            routes: vec![],
        },
        MonitoredDevice {
            id: "ap-001".to_string(),
            name: "WiFi AP Floor-3".to_string(),
            kind: DeviceKind::AccessPoint,
            status: DeviceStatus::Error,
            location: "Jakarta Office Floor 3".to_string(),
            last_seen: ago(now, 300),
            metrics: DeviceMetrics {
                cpu: 0.0,
                memory: 0.0,
                bandwidth: 0.0,
                latency: 0.0,
            },
            routes: vec![],
        },
    ]
}

pub fn data_flows() -> Vec<DataFlow> {
    let now = Utc::now();
    let flow = |id: &str, src: &str, dst: &str, proto: &str, size, status, at| DataFlow {
        id: id.to_string(),
        source: src.to_string(),
        destination: dst.to_string(),
        protocol: proto.to_string(),
        data_size_mb: size,
        status,
        timestamp: at,
    };
    vec![
        flow("flow-001", "NMS Primary", "SurrealDB Cluster", "HTTPS", 2.4, FlowStatus::Processing, now),
        flow("flow-002", "Core Router JKT-01", "Inventory System", "SNMP", 1.2, FlowStatus::Completed, ago(now, 30)),
        flow("flow-003", "Access Switch SBY-01", "Mapping Library", "TCP", 0.8, FlowStatus::Processing, now),
    ]
}

pub fn system_metrics(devices: &[MonitoredDevice], flows: &[DataFlow]) -> SystemMetrics {
    SystemMetrics {
        total_devices: devices.len() as u32,
        online_devices: devices.iter().filter(|d| d.status == DeviceStatus::Online).count() as u32,
        route_changes: devices
            .iter()
            .flat_map(|d| d.routes.iter())
            .filter(|r| r.status == RouteStatus::Changed)
            .count() as u32,
        data_flows: flows.len() as u32,
        sync_status: SyncStatus::Synced,
        last_sync: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

pub fn traffic_series() -> Vec<TrafficSample> {
    let mut rng = rand::thread_rng();
    let base = [
        ("00:00", 45.0, 12.0, 850.0),
        ("04:00", 32.0, 8.0, 620.0),
        ("08:00", 78.0, 18.0, 1_240.0),
        ("12:00", 85.0, 22.0, 1_450.0),
        ("16:00", 92.0, 28.0, 1_680.0),
        ("20:00", 88.0, 25.0, 1_580.0),
        ("24:00", 65.0, 15.0, 1_120.0),
    ];
    base.iter()
        .map(|&(time, bandwidth, latency, packets)| TrafficSample {
            time_label: time.to_string(),
            bandwidth: Jitter::new(1.0, 20.0, 95.0).apply(bandwidth, &mut rng),
            latency: Jitter::new(0.5, 5.0, 50.0).apply(latency, &mut rng),
            packets: Jitter::new(20.0, 400.0, 2_000.0).apply(packets, &mut rng),
        })
        .collect()
}

pub fn regional_usage() -> Vec<RegionalUsage> {
    [
        ("Jakarta", 85, 23, 15_420),
        ("Bandung", 45, 18, 8_350),
        ("Surabaya", 62, 31, 12_100),
        ("Medan", 35, 15, 5_680),
        ("Denpasar", 71, 28, 9_240),
    ]
    .iter()
    .map(|&(region, usage, growth, customers)| RegionalUsage {
        region: region.to_string(),
        usage,
        growth,
        customers,
    })
    .collect()
}

pub fn predictions() -> Vec<Prediction> {
    let p = |id, kind, title: &str, description: &str, confidence, impact, action: &str, timeframe: &str, priority| {
        Prediction {
            id,
            kind,
            title: title.to_string(),
            description: description.to_string(),
            confidence,
            impact,
            suggested_action: action.to_string(),
            timeframe: timeframe.to_string(),
            priority,
        }
    };
    vec![
        p(
            1,
            InsightKind::Warning,
            "Capacity exhaustion predicted",
            "Node TBS-JKT-01 is predicted to reach maximum capacity within 5 days",
            89,
            RiskLevel::High,
            "Add 100Gbps of bandwidth or rebalance load",
            "5 days",
            Priority::Urgent,
        ),
        p(
            2,
            InsightKind::Success,
            "Route optimisation found",
            "An alternative path can cut latency by 15ms",
            92,
            RiskLevel::Medium,
            "Roll out the new route via node TBS-BDG-02",
            "Immediate",
            Priority::Medium,
        ),
        p(
            3,
            InsightKind::Info,
            "Growth trend on track",
            "Bandwidth growth is consistent with the Q1 2025 forecast",
            95,
            RiskLevel::Low,
            "Routine monitoring, nothing urgent",
            "30 days",
            Priority::Low,
        ),
        p(
            4,
            InsightKind::Warning,
            "Traffic pattern anomaly",
            "Unusual traffic patterns in the Surabaya region during peak hours",
            78,
            RiskLevel::Medium,
            "Investigate potential DDoS or apply rate limiting",
            "2 days",
            Priority::High,
        ),
    ]
}

pub fn capacity_forecast() -> Vec<CapacityForecast> {
    [
        ("TBS-JKT-01", "Jakarta", 78, 85, 92, RiskLevel::High),
        ("TBS-BDG-02", "Bandung", 45, 48, 55, RiskLevel::Low),
        ("TBS-SBY-03", "Surabaya", 62, 68, 75, RiskLevel::Medium),
        ("TBS-MDN-04", "Medan", 35, 37, 42, RiskLevel::Low),
        ("TBS-DPS-05", "Denpasar", 71, 79, 88, RiskLevel::High),
        ("TBS-PLB-06", "Palembang", 58, 64, 72, RiskLevel::Medium),
    ]
    .iter()
    .map(|&(node, location, current, d7, d30, risk)| CapacityForecast {
        node: node.to_string(),
        location: location.to_string(),
        current,
        predicted_7d: d7,
        predicted_30d: d30,
        risk,
    })
    .collect()
}

pub fn growth_metrics() -> Vec<GrowthMetric> {
    [
        ("Daily Growth", "+2.3%"),
        ("Weekly Growth", "+15.8%"),
        ("Monthly Growth", "+48.2%"),
        ("YoY Growth", "+156%"),
    ]
    .iter()
    .map(|&(label, value)| GrowthMetric {
        label: label.to_string(),
        value: value.to_string(),
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

pub fn inventory_devices() -> Vec<InventoryDevice> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let rows = [
        ("dev-001", "OLT-JAKARTA-01", "OLT", "Jakarta Pusat", (-6.2088, 106.8456), AssetStatus::Active, 30, "10 Gbps", 72, 48, "Huawei", "v2.1.3", 45, 127, "192.168.1.10", "public"),
        ("dev-002", "ODF-BANDUNG-02", "ODF", "Bandung Kota", (-6.9175, 107.6191), AssetStatus::Active, 32, "1 Gbps", 45, 24, "ZTE", "v1.8.2", 38, 89, "192.168.2.20", "public"),
        ("dev-003", "CABLE-JKT-BDG-001", "Cable", "Jakarta-Bandung Route", (-6.5622, 107.2331), AssetStatus::Maintenance, 75, "100 Gbps", 23, 144, "Corning", "N/A", 25, 245, "192.168.3.30", "readonly"),
        ("dev-004", "SPLITTER-SURABAYA-03", "Splitter", "Surabaya Timur", (-7.2575, 112.7521), AssetStatus::Active, 35, "2.5 Gbps", 67, 32, "Fiberhome", "v3.0.1", 42, 56, "192.168.4.40", "public"),
        ("dev-005", "ODC-YOGYA-01", "ODC", "Yogyakarta", (-7.7956, 110.3695), AssetStatus::Inactive, 165, "5 Gbps", 0, 64, "Nokia", "v2.5.4", 35, 0, "192.168.5.50", "public"),
    ];
    let discrepancies = discrepancies();

    rows.iter()
        .map(
            |&(id, name, kind, location, coordinates, status, synced_min_ago, capacity, utilization, ports, vendor, firmware, temperature, uptime_days, ip, community)| {
                let utilization = if utilization == 0 {
                    0
                } else {
                    Jitter::percent(2.0).apply(utilization as f64, &mut rng).round() as u8
                };
                InventoryDevice {
                    id: id.to_string(),
                    name: name.to_string(),
                    kind: kind.to_string(),
                    location: location.to_string(),
                    coordinates,
                    status,
                    has_conflict: discrepancies.iter().any(|d| d.device_id == id && !d.resolved),
                    last_synced: ago(now, synced_min_ago * 60),
                    capacity: capacity.to_string(),
                    utilization,
                    ports,
                    vendor: vendor.to_string(),
                    firmware: firmware.to_string(),
                    temperature,
                    uptime_days,
                    ip: ip.to_string(),
                    snmp_community: community.to_string(),
                }
            },
        )
        .collect()
}

pub fn discrepancies() -> Vec<Discrepancy> {
    let now = Utc::now();
    #[allow(clippy::too_many_arguments)]
    fn disc(
        id: &str,
        device: (&str, &str),
        kind: DiscrepancyKind,
        severity: Severity,
        description: &str,
        values: Option<(&str, &str)>,
        detected_at: DateTime<Utc>,
        impact: &str,
        action: &str,
        category: &str,
    ) -> Discrepancy {
        Discrepancy {
            id: id.to_string(),
            device_id: device.0.to_string(),
            device_name: device.1.to_string(),
            kind,
            severity,
            description: description.to_string(),
            uim_value: values.map(|(uim, _)| uim.to_string()),
            nms_value: values.map(|(_, nms)| nms.to_string()),
            detected_at,
            resolved: false,
            impact: impact.to_string(),
            recommended_action: action.to_string(),
            category: category.to_string(),
        }
    }

    let olt = ("dev-001", "OLT-JAKARTA-01");
    let cable = ("dev-003", "CABLE-JKT-BDG-001");
    let odc = ("dev-005", "ODC-YOGYA-01");
    vec![
        disc(
            "disc-001",
            olt,
            DiscrepancyKind::DataMismatch,
            Severity::High,
            "Bandwidth capacity mismatch between UIM and NMS",
            Some(("10 Gbps", "1 Gbps")),
            ago(now, 30 * 60),
            "Performance monitoring inaccuracy",
            "Update NMS configuration",
            "Configuration",
        ),
        disc(
            "disc-002",
            cable,
            DiscrepancyKind::StatusConflict,
            Severity::Medium,
            "Status differs between UIM and NMS monitoring",
            Some(("Active", "Maintenance")),
            ago(now, 75 * 60),
            "Incorrect alarm generation",
            "Verify actual device status",
            "Status",
        ),
        disc(
            "disc-003",
            olt,
            DiscrepancyKind::Duplicate,
            Severity::Low,
            "Duplicate entry found in the UIM database",
            None,
            ago(now, 165 * 60),
            "Data redundancy",
            "Remove duplicate entries",
            "Data Integrity",
        ),
        disc(
            "disc-004",
            odc,
            DiscrepancyKind::MissingNms,
            Severity::High,
            "Device exists in UIM but is not monitored in NMS",
            Some(("Present", "Not Found")),
            ago(now, 165 * 60),
            "No monitoring coverage",
            "Add device to NMS",
            "Missing Data",
        ),
        disc(
            "disc-005",
            cable,
            DiscrepancyKind::ConfigurationDrift,
            Severity::Medium,
            "Firmware version mismatch detected",
            Some(("v2.1.0", "v2.0.8")),
            ago(now, 210 * 60),
            "Feature compatibility issues",
            "Sync firmware versions",
            "Configuration",
        ),
    ]
}

pub fn sync_stats(devices: &[InventoryDevice], discrepancies: &[Discrepancy]) -> SyncStats {
    SyncStats {
        total: devices.len(),
        synced: devices.iter().filter(|d| !d.has_conflict).count(),
        conflicts: devices.iter().filter(|d| d.has_conflict).count(),
        pending: discrepancies.iter().filter(|d| !d.resolved).count(),
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

pub fn notifications() -> Vec<Notification> {
    [
        (1, "Order SO-002 has been approved.", "1 hour ago", false),
        (2, "Anomaly detected on the Central Java network.", "3 hours ago", false),
        (3, "Daily reconciliation finished.", "Yesterday", true),
        (4, "System notice: servers going down for maintenance.", "1 day ago", true),
    ]
    .iter()
    .map(|&(id, message, time, read)| Notification {
        id,
        message: message.to_string(),
        time_label: time.to_string(),
        read,
    })
    .collect()
}

/// Every fixture collection in one document, for `--dump-fixtures`.
#[derive(Debug, Serialize)]
pub struct FixtureDump {
    pub kpis: DashboardKpis,
    pub activity: Vec<ActivityEntry>,
    pub regions: Vec<RegionStatus>,
    pub orders: Vec<ServiceOrder>,
    pub inventory: InventoryStatus,
    pub order_metrics: OrderMetrics,
    pub devices: Vec<MonitoredDevice>,
    pub flows: Vec<DataFlow>,
    pub system: SystemMetrics,
    pub traffic: Vec<TrafficSample>,
    pub regional_usage: Vec<RegionalUsage>,
    pub predictions: Vec<Prediction>,
    pub capacity: Vec<CapacityForecast>,
    pub growth: Vec<GrowthMetric>,
    pub inventory_devices: Vec<InventoryDevice>,
    pub discrepancies: Vec<Discrepancy>,
    pub sync_stats: SyncStats,
    pub notifications: Vec<Notification>,
}

pub fn fixture_dump() -> FixtureDump {
    let devices = monitored_devices();
    let flows = data_flows();
    let system = system_metrics(&devices, &flows);
    let inventory_devices = inventory_devices();
    let discrepancies = discrepancies();
    let sync_stats = sync_stats(&inventory_devices, &discrepancies);
    FixtureDump {
        kpis: dashboard_kpis(),
        activity: recent_activity(),
        regions: network_regions(),
        orders: service_orders(),
        inventory: inventory_status(),
        order_metrics: order_metrics(),
        devices,
        flows,
        system,
        traffic: traffic_series(),
        regional_usage: regional_usage(),
        predictions: predictions(),
        capacity: capacity_forecast(),
        growth: growth_metrics(),
        inventory_devices,
        discrepancies,
        sync_stats,
        notifications: notifications(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_totals_are_derived_from_items() {
        for _ in 0..10 {
            for order in service_orders() {
                assert!(!order.items.is_empty());
                assert_eq!(order.total_amount, order.computed_total());
            }
        }
        let first = &service_orders()[0];
        assert_eq!(first.total_amount, 500 * 25_000 + 20 * 450_000);
    }

    #[test]
    fn test_device_metrics_start_in_range() {
        for _ in 0..20 {
            for d in monitored_devices() {
                for v in [d.metrics.cpu, d.metrics.memory, d.metrics.bandwidth] {
                    assert!((0.0..=100.0).contains(&v));
                }
                assert!(d.metrics.latency >= 0.0);
            }
        }
    }

    #[test]
    fn test_system_metrics_count_from_devices() {
        let devices = monitored_devices();
        let flows = data_flows();
        let system = system_metrics(&devices, &flows);
        assert_eq!(system.total_devices, 4);
        assert_eq!(system.online_devices, 2);
        assert_eq!(system.route_changes, 1);
        assert_eq!(system.data_flows, 3);
    }

    #[test]
    fn test_conflicts_follow_open_discrepancies() {
        let devices = inventory_devices();
        let discrepancies = discrepancies();
        let conflicted: Vec<_> = devices.iter().filter(|d| d.has_conflict).map(|d| d.id.as_str()).collect();
        assert_eq!(conflicted, vec!["dev-001", "dev-003", "dev-005"]);

        let stats = sync_stats(&devices, &discrepancies);
        assert_eq!(stats, SyncStats { total: 5, synced: 2, conflicts: 3, pending: 5 });
    }

    #[test]
    fn test_traffic_series_within_chart_bounds() {
        for _ in 0..20 {
            let series = traffic_series();
            assert_eq!(series.len(), 7);
            for s in series {
                assert!((20.0..=95.0).contains(&s.bandwidth));
                assert!((5.0..=50.0).contains(&s.latency));
                assert!((400.0..=2_000.0).contains(&s.packets));
            }
        }
    }

    #[test]
    fn test_fixture_dump_serializes() {
        let json = serde_json::to_value(fixture_dump()).unwrap();
        assert_eq!(json["orders"].as_array().unwrap().len(), 3);
        assert_eq!(json["notifications"].as_array().unwrap().len(), 4);
        assert_eq!(json["discrepancies"][0]["kind"], "data_mismatch");
    }
}
