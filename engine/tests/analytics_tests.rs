//! Tests for the analytics service
//! Covers dead stock, surgeon portfolio, surgery profitability and dashboards

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use shared::{Doctor, InventoryItem, ItemCategory, Material, Role};
use surgical_inventory_engine::services::records::{RecordSurgeryInput, SurgeryLineInput};
use surgical_inventory_engine::{Config, Engine, Session, Snapshot};
use uuid::Uuid;

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn session(role: Role) -> Session {
    Session::new(Uuid::new_v4(), "Test User", role)
}

fn months_ago(months: u32) -> DateTime<Utc> {
    Utc::now().checked_sub_months(Months::new(months)).unwrap()
}

fn item(
    sku: &str,
    category: ItemCategory,
    quantity: i32,
    min_stock: i32,
    base: &str,
    selling: &str,
    last_movement_date: DateTime<Utc>,
) -> InventoryItem {
    InventoryItem {
        id: Uuid::new_v4(),
        name: format!("Item {}", sku),
        sku: sku.to_string(),
        category,
        material: Some(Material::Titanium),
        diameter: None,
        length: None,
        quantity,
        min_stock,
        base_price: dec(base),
        selling_price: dec(selling),
        last_movement_date,
        created_at: last_movement_date,
        updated_at: last_movement_date,
        created_by: Uuid::nil(),
    }
}

fn doctor(name: &str, specialty: &str) -> Doctor {
    Doctor {
        id: Uuid::new_v4(),
        name: name.to_string(),
        specialty: specialty.to_string(),
        hospital: "General Hospital".to_string(),
        created_at: Utc::now(),
    }
}

struct Fixture {
    engine: Engine,
    screws: InventoryItem,
    plates: InventoryItem,
    stale: InventoryItem,
    older: InventoryItem,
    spine: Doctor,
    trauma: Doctor,
}

fn fixture() -> Fixture {
    let screws = item("SCR-1", ItemCategory::Screws, 50, 10, "100", "150", Utc::now());
    let plates = item("PLT-1", ItemCategory::Plates, 3, 5, "1000", "1300", Utc::now());
    let stale = item("ROD-1", ItemCategory::Rods, 4, 1, "500", "600", months_ago(7));
    let older = item("NAIL-1", ItemCategory::Nails, 2, 1, "800", "900", months_ago(10));
    let spine = doctor("Dr. Samir", "Spine");
    let trauma = doctor("Dr. Laila", "Trauma");

    let snapshot = Snapshot {
        items: vec![screws.clone(), plates.clone(), stale.clone(), older.clone()],
        transactions: Vec::new(),
        doctors: vec![spine.clone(), trauma.clone()],
        suppliers: Vec::new(),
    };

    Fixture {
        engine: Engine::from_snapshot(Config::default(), snapshot).unwrap(),
        screws,
        plates,
        stale,
        older,
        spine,
        trauma,
    }
}

fn record(f: &Fixture, doctor: &Doctor, lines: Vec<(Uuid, i32)>) {
    f.engine
        .records
        .record_surgery(
            &session(Role::Supervisor),
            RecordSurgeryInput {
                doctor_id: doctor.id,
                patient_name: "Patient".to_string(),
                procedure: None,
                date: None,
                notes: None,
                items: lines
                    .into_iter()
                    .map(|(item_id, quantity)| SurgeryLineInput {
                        item_id,
                        quantity,
                        selling_price: None,
                    })
                    .collect(),
            },
        )
        .unwrap();
}

mod dead_stock {
    use super::*;

    #[test]
    fn lists_idle_items_longest_first() {
        let f = fixture();
        let report = f
            .engine
            .analytics
            .dead_stock_report(&session(Role::Stakeholder), None)
            .unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report[0].item.id, f.older.id);
        assert_eq!(report[1].item.id, f.stale.id);
        assert_eq!(report[0].total_value, dec("1600"));
        assert!(report[0].days_since_movement > report[1].days_since_movement);
    }

    #[test]
    fn threshold_override() {
        let f = fixture();
        let viewer = session(Role::Stakeholder);

        let nine = f.engine.analytics.dead_stock_report(&viewer, Some(9)).unwrap();
        assert_eq!(nine.len(), 1);
        assert_eq!(nine[0].item.id, f.older.id);

        let twelve = f.engine.analytics.dead_stock_report(&viewer, Some(12)).unwrap();
        assert!(twelve.is_empty());

        assert!(f
            .engine
            .analytics
            .dead_stock_report(&viewer, Some(5))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn movement_clears_dead_stock() {
        let f = fixture();
        record(&f, &f.spine, vec![(f.stale.id, 1)]);

        let report = f
            .engine
            .analytics
            .dead_stock_report(&session(Role::Supervisor), None)
            .unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].item.id, f.older.id);
    }

    #[test]
    fn data_entry_cannot_view_analytics() {
        let f = fixture();
        assert!(f
            .engine
            .analytics
            .dead_stock_report(&session(Role::DataEntry), None)
            .unwrap_err()
            .is_permission_denied());
    }
}

mod profitability {
    use super::*;

    #[test]
    fn portfolio_groups_by_doctor() {
        let f = fixture();
        // Spine: 2 surgeries, profit 2*50 + 1*300 + 1*50 = 450
        record(&f, &f.spine, vec![(f.screws.id, 2), (f.plates.id, 1)]);
        record(&f, &f.spine, vec![(f.screws.id, 1)]);
        // Trauma: 1 surgery, profit 100
        record(&f, &f.trauma, vec![(f.stale.id, 1)]);

        let portfolio = f
            .engine
            .analytics
            .surgeon_portfolio(&session(Role::Stakeholder))
            .unwrap();

        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio[0].doctor_id, f.spine.id);
        assert_eq!(portfolio[0].surgery_count, 2);
        assert_eq!(portfolio[0].profit, dec("450"));
        assert_eq!(portfolio[0].total_base_value, dec("1300"));
        assert_eq!(portfolio[0].specialty.as_deref(), Some("Spine"));
        assert_eq!(portfolio[1].profit, dec("100"));
    }

    #[test]
    fn surgery_margin_one_decimal() {
        let f = fixture();
        record(&f, &f.spine, vec![(f.screws.id, 2), (f.plates.id, 1)]);
        record(&f, &f.trauma, vec![(f.stale.id, 1)]);

        let surgeries = f
            .engine
            .analytics
            .surgery_profitability(&session(Role::Supervisor))
            .unwrap();

        assert_eq!(surgeries.len(), 2);
        // 400 / 1200 * 100 = 33.33...
        assert_eq!(surgeries[0].line_count, 2);
        assert_eq!(surgeries[0].profit, dec("400"));
        assert_eq!(surgeries[0].profit_margin, dec("33.3"));
        // 100 / 500 * 100 = 20
        assert_eq!(surgeries[1].profit_margin, dec("20.0"));
    }

    #[test]
    fn summary_names_top_doctor() {
        let f = fixture();
        record(&f, &f.spine, vec![(f.plates.id, 1)]);
        record(&f, &f.trauma, vec![(f.screws.id, 1)]);

        let summary = f
            .engine
            .analytics
            .analytics_summary(&session(Role::Stakeholder), None)
            .unwrap();

        assert_eq!(summary.surgery_count, 2);
        assert_eq!(summary.total_profit, dec("350"));
        assert_eq!(summary.avg_profit_per_surgery, dec("175"));
        assert_eq!(summary.top_doctor_name.as_deref(), Some("Dr. Samir"));
        assert_eq!(summary.top_doctor_profit, dec("300"));
        assert_eq!(summary.dead_stock_count, 2);
        assert_eq!(summary.dead_stock_value, dec("3600"));
    }

    #[test]
    fn empty_store_summary() {
        let engine = Engine::new(Config::default()).unwrap();
        let summary = engine
            .analytics
            .analytics_summary(&session(Role::Supervisor), None)
            .unwrap();
        assert_eq!(summary.surgery_count, 0);
        assert_eq!(summary.avg_profit_per_surgery, Decimal::ZERO);
        assert!(summary.top_doctor_name.is_none());
    }
}

mod dashboard {
    use super::*;

    #[test]
    fn financials_hidden_from_data_entry() {
        let f = fixture();
        let stats = f.engine.analytics.dashboard(&session(Role::DataEntry)).unwrap();

        assert_eq!(stats.total_skus, 4);
        assert_eq!(stats.total_units, 59);
        assert_eq!(stats.low_stock_count, 1);
        assert_eq!(stats.dead_stock_count, 2);
        assert!(stats.total_inventory_value.is_none());
        assert!(stats.total_sales.is_none());
        assert!(stats.total_profit.is_none());
    }

    #[test]
    fn financials_shown_to_stakeholder() {
        let f = fixture();
        record(&f, &f.spine, vec![(f.screws.id, 2)]);

        let stats = f.engine.analytics.dashboard(&session(Role::Stakeholder)).unwrap();
        // 48*100 + 3*1000 + 4*500 + 2*800
        assert_eq!(stats.total_inventory_value, Some(dec("11400")));
        assert_eq!(stats.total_purchases, Some(Decimal::ZERO));
        assert_eq!(stats.total_sales, Some(dec("300")));
        assert_eq!(stats.total_profit, Some(dec("100")));
    }

    #[test]
    fn low_stock_and_top_value() {
        let f = fixture();
        let supervisor = session(Role::Supervisor);

        let low = f.engine.analytics.low_stock_items(&supervisor, 5).unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, f.plates.id);

        let top = f.engine.analytics.top_items_by_value(&supervisor, 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, f.screws.id);
        assert_eq!(top[1].id, f.plates.id);

        assert!(f
            .engine
            .analytics
            .top_items_by_value(&session(Role::DataEntry), 2)
            .unwrap_err()
            .is_permission_denied());
    }

    #[test]
    fn category_breakdown_respects_financials() {
        let f = fixture();

        let visible = f
            .engine
            .analytics
            .inventory_by_category(&session(Role::Supervisor))
            .unwrap();
        assert_eq!(visible.len(), 4);
        let plates = visible
            .iter()
            .find(|c| c.category == ItemCategory::Plates)
            .unwrap();
        assert_eq!(plates.quantity, 3);
        assert_eq!(plates.value, Some(dec("3000")));

        let hidden = f
            .engine
            .analytics
            .inventory_by_category(&session(Role::DataEntry))
            .unwrap();
        assert!(hidden.iter().all(|c| c.value.is_none()));
    }
}
