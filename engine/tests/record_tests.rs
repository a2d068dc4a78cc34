//! Tests for stock movement records
//! Covers ledger effects, locking, editing and deletion rules

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{
    Doctor, InventoryItem, ItemCategory, Material, Role, Supplier, TransactionPricing,
    TransactionType,
};
use surgical_inventory_engine::services::directory::{CreateDoctorInput, CreateSupplierInput};
use surgical_inventory_engine::services::inventory::CreateItemInput;
use surgical_inventory_engine::services::records::{
    CreateTransactionInput, PurchaseInput, RecordSurgeryInput, StockOutInput, SurgeryLineInput,
    TransactionFilter, UpdateTransactionInput,
};
use surgical_inventory_engine::{Config, Engine, Session};
use uuid::Uuid;

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn session(role: Role) -> Session {
    Session::new(Uuid::new_v4(), "Test User", role)
}

struct Fixture {
    engine: Engine,
    supervisor: Session,
    item: InventoryItem,
    supplier: Supplier,
    doctor: Doctor,
}

fn fixture() -> Fixture {
    let engine = Engine::new(Config::default()).unwrap();
    let supervisor = session(Role::Supervisor);

    let item = engine
        .inventory
        .create_item(
            &supervisor,
            CreateItemInput {
                name: "Locking screw 5.0mm".to_string(),
                sku: "LSC-TI-50-40".to_string(),
                category: ItemCategory::Screws,
                material: Some(Material::Titanium),
                diameter: Some("5.0mm".to_string()),
                length: Some("40mm".to_string()),
                quantity: 5,
                min_stock: 2,
                base_price: dec("100"),
                selling_price: dec("150"),
            },
        )
        .unwrap();
    let supplier = engine
        .directory
        .create_supplier(
            &supervisor,
            CreateSupplierInput {
                name: "Delta Medical".to_string(),
                phone: Some("+20 100 000 0000".to_string()),
                email: Some("orders@delta.example".to_string()),
            },
        )
        .unwrap();
    let doctor = engine
        .directory
        .create_doctor(
            &supervisor,
            CreateDoctorInput {
                name: "Dr. Karim Hassan".to_string(),
                specialty: "Trauma".to_string(),
                hospital: "Cairo University Hospital".to_string(),
            },
        )
        .unwrap();

    Fixture {
        engine,
        supervisor,
        item,
        supplier,
        doctor,
    }
}

fn purchase(f: &Fixture, quantity: i32) -> CreateTransactionInput {
    CreateTransactionInput::Purchase(PurchaseInput {
        item_id: f.item.id,
        supplier_id: f.supplier.id,
        quantity,
        unit_cost: None,
        date: None,
        notes: None,
    })
}

fn stock_out(f: &Fixture, transaction_type: TransactionType, quantity: i32) -> StockOutInput {
    StockOutInput {
        transaction_type,
        item_id: f.item.id,
        quantity,
        selling_price: None,
        doctor_id: None,
        patient_name: None,
        procedure: None,
        date: None,
        notes: None,
    }
}

fn quantity_of(f: &Fixture) -> i32 {
    f.engine
        .inventory
        .get_item(&f.supervisor, f.item.id)
        .unwrap()
        .quantity
}

mod creation {
    use super::*;

    #[test]
    fn purchase_adds_stock_and_stamps_movement() {
        let f = fixture();
        let tx = f
            .engine
            .records
            .create_transaction(&session(Role::DataEntry), purchase(&f, 10))
            .unwrap();

        let item = f.engine.inventory.get_item(&f.supervisor, f.item.id).unwrap();
        assert_eq!(item.quantity, 15);
        assert!(item.last_movement_date >= f.item.last_movement_date);

        assert!(tx.is_locked);
        assert_eq!(tx.supplier_name.as_deref(), Some("Delta Medical"));
        assert_eq!(
            tx.pricing,
            TransactionPricing::Purchase {
                unit_cost: dec("100"),
                total_cost: dec("1000"),
            }
        );
    }

    #[test]
    fn sale_removes_stock_with_item_prices() {
        let f = fixture();
        let tx = f
            .engine
            .records
            .create_transaction(
                &f.supervisor,
                CreateTransactionInput::StockOut(stock_out(&f, TransactionType::Sale, 2)),
            )
            .unwrap();

        assert_eq!(quantity_of(&f), 3);
        assert_eq!(tx.pricing.total_base_value(), dec("200"));
        assert_eq!(tx.pricing.total_selling_value(), dec("300"));
        assert_eq!(tx.pricing.profit(), dec("100"));
    }

    #[test]
    fn stock_out_may_drive_quantity_negative() {
        let f = fixture();
        f.engine
            .records
            .create_transaction(
                &f.supervisor,
                CreateTransactionInput::StockOut(stock_out(&f, TransactionType::Sale, 8)),
            )
            .unwrap();
        assert_eq!(quantity_of(&f), -3);
    }

    #[test]
    fn sale_below_base_is_rejected_without_ledger_change() {
        let f = fixture();
        let mut input = stock_out(&f, TransactionType::Sale, 1);
        input.selling_price = Some(dec("90"));

        let err = f
            .engine
            .records
            .create_transaction(&f.supervisor, CreateTransactionInput::StockOut(input))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(quantity_of(&f), 5);
    }

    #[test]
    fn usage_below_base_is_allowed() {
        let f = fixture();
        let mut input = stock_out(&f, TransactionType::Usage, 1);
        input.selling_price = Some(dec("0"));

        assert!(f
            .engine
            .records
            .create_transaction(&f.supervisor, CreateTransactionInput::StockOut(input))
            .is_ok());
        assert_eq!(quantity_of(&f), 4);
    }

    #[test]
    fn surgery_requires_doctor() {
        let f = fixture();
        let err = f
            .engine
            .records
            .create_transaction(
                &f.supervisor,
                CreateTransactionInput::StockOut(stock_out(&f, TransactionType::Surgery, 1)),
            )
            .unwrap_err();
        assert!(err.is_validation());

        let mut input = stock_out(&f, TransactionType::Surgery, 1);
        input.doctor_id = Some(f.doctor.id);
        input.patient_name = Some("Ahmed Ali".to_string());
        let tx = f
            .engine
            .records
            .create_transaction(&f.supervisor, CreateTransactionInput::StockOut(input))
            .unwrap();
        assert_eq!(tx.doctor_name.as_deref(), Some("Dr. Karim Hassan"));
        assert!(tx.surgery_id.is_some());
    }

    #[test]
    fn unknown_references_fail_fast() {
        let f = fixture();
        let mut input = stock_out(&f, TransactionType::Sale, 1);
        input.item_id = Uuid::new_v4();
        assert!(f
            .engine
            .records
            .create_transaction(&f.supervisor, CreateTransactionInput::StockOut(input))
            .unwrap_err()
            .is_not_found());

        let bad_supplier = CreateTransactionInput::Purchase(PurchaseInput {
            item_id: f.item.id,
            supplier_id: Uuid::new_v4(),
            quantity: 1,
            unit_cost: None,
            date: None,
            notes: None,
        });
        assert!(f
            .engine
            .records
            .create_transaction(&f.supervisor, bad_supplier)
            .unwrap_err()
            .is_not_found());
        assert_eq!(quantity_of(&f), 5);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let f = fixture();
        assert!(f
            .engine
            .records
            .create_transaction(&f.supervisor, purchase(&f, 0))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn oversized_purchase_is_rejected_and_store_stays_usable() {
        let f = fixture();
        let err = f
            .engine
            .records
            .create_transaction(&f.supervisor, purchase(&f, i32::MAX))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(quantity_of(&f), 5);

        f.engine
            .records
            .create_transaction(&f.supervisor, purchase(&f, 3))
            .unwrap();
        assert_eq!(quantity_of(&f), 8);
    }

    #[test]
    fn price_above_maximum_is_rejected() {
        let f = fixture();
        let err = f
            .engine
            .records
            .create_transaction(
                &f.supervisor,
                CreateTransactionInput::Purchase(PurchaseInput {
                    item_id: f.item.id,
                    supplier_id: f.supplier.id,
                    quantity: 2,
                    unit_cost: Some(Decimal::MAX),
                    date: None,
                    notes: None,
                }),
            )
            .unwrap_err();
        assert!(err.is_validation());

        let mut sale = stock_out(&f, TransactionType::Sale, 2);
        sale.selling_price = Some(Decimal::MAX);
        assert!(f
            .engine
            .records
            .create_transaction(&f.supervisor, CreateTransactionInput::StockOut(sale))
            .unwrap_err()
            .is_validation());
        assert_eq!(quantity_of(&f), 5);
    }

    #[test]
    fn stakeholder_cannot_record() {
        let f = fixture();
        assert!(f
            .engine
            .records
            .create_transaction(&session(Role::Stakeholder), purchase(&f, 1))
            .unwrap_err()
            .is_permission_denied());
    }
}

mod surgeries {
    use super::*;

    #[test]
    fn multi_line_surgery_shares_id() {
        let f = fixture();
        let second = f
            .engine
            .inventory
            .create_item(
                &f.supervisor,
                CreateItemInput {
                    name: "Kirschner wire".to_string(),
                    sku: "KW-SS-16".to_string(),
                    category: ItemCategory::Wires,
                    material: Some(Material::Stainless),
                    diameter: Some("2.0mm".to_string()),
                    length: None,
                    quantity: 20,
                    min_stock: 5,
                    base_price: dec("20"),
                    selling_price: dec("35"),
                },
            )
            .unwrap();

        let lines = f
            .engine
            .records
            .record_surgery(
                &f.supervisor,
                RecordSurgeryInput {
                    doctor_id: f.doctor.id,
                    patient_name: "Mona Said".to_string(),
                    procedure: Some("Distal radius ORIF".to_string()),
                    date: NaiveDate::from_ymd_opt(2025, 3, 10),
                    notes: None,
                    items: vec![
                        SurgeryLineInput {
                            item_id: f.item.id,
                            quantity: 2,
                            selling_price: None,
                        },
                        SurgeryLineInput {
                            item_id: second.id,
                            quantity: 3,
                            selling_price: None,
                        },
                    ],
                },
            )
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].surgery_id, lines[1].surgery_id);
        assert_eq!(quantity_of(&f), 3);
        let wire = f.engine.inventory.get_item(&f.supervisor, second.id).unwrap();
        assert_eq!(wire.quantity, 17);
    }

    #[test]
    fn one_bad_line_rejects_whole_surgery() {
        let f = fixture();
        let err = f
            .engine
            .records
            .record_surgery(
                &f.supervisor,
                RecordSurgeryInput {
                    doctor_id: f.doctor.id,
                    patient_name: "Mona Said".to_string(),
                    procedure: None,
                    date: None,
                    notes: None,
                    items: vec![
                        SurgeryLineInput {
                            item_id: f.item.id,
                            quantity: 1,
                            selling_price: None,
                        },
                        SurgeryLineInput {
                            item_id: f.item.id,
                            quantity: 1,
                            selling_price: Some(dec("50")),
                        },
                    ],
                },
            )
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(quantity_of(&f), 5);
        let all = f
            .engine
            .records
            .list_transactions(&f.supervisor, &TransactionFilter::default())
            .unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn lines_overflowing_together_reject_whole_surgery() {
        let f = fixture();
        let line = SurgeryLineInput {
            item_id: f.item.id,
            quantity: i32::MAX,
            selling_price: None,
        };
        let err = f
            .engine
            .records
            .record_surgery(
                &f.supervisor,
                RecordSurgeryInput {
                    doctor_id: f.doctor.id,
                    patient_name: "Mona Said".to_string(),
                    procedure: None,
                    date: None,
                    notes: None,
                    items: vec![line.clone(), line],
                },
            )
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(quantity_of(&f), 5);
        assert!(f
            .engine
            .records
            .list_transactions(&f.supervisor, &TransactionFilter::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn surgery_without_items_is_rejected() {
        let f = fixture();
        let err = f
            .engine
            .records
            .record_surgery(
                &f.supervisor,
                RecordSurgeryInput {
                    doctor_id: f.doctor.id,
                    patient_name: "Mona Said".to_string(),
                    procedure: None,
                    date: None,
                    notes: None,
                    items: Vec::new(),
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
    }
}

mod locking {
    use super::*;

    #[test]
    fn data_entry_cannot_edit_locked_record() {
        let f = fixture();
        let clerk = session(Role::DataEntry);
        let tx = f.engine.records.create_transaction(&clerk, purchase(&f, 10)).unwrap();

        let err = f
            .engine
            .records
            .update_transaction(
                &clerk,
                tx.id,
                UpdateTransactionInput {
                    notes: Some("typo".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[test]
    fn supervisor_edit_recomputes_totals_but_not_ledger() {
        let f = fixture();
        let tx = f
            .engine
            .records
            .create_transaction(&f.supervisor, purchase(&f, 10))
            .unwrap();
        assert_eq!(quantity_of(&f), 15);

        let updated = f
            .engine
            .records
            .update_transaction(
                &f.supervisor,
                tx.id,
                UpdateTransactionInput {
                    quantity: Some(4),
                    unit_cost: Some(dec("90")),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.pricing.total_base_value(), dec("360"));
        assert!(updated.is_locked);
        assert_eq!(quantity_of(&f), 15);
    }

    #[test]
    fn edit_rechecks_margin_on_sales() {
        let f = fixture();
        let tx = f
            .engine
            .records
            .create_transaction(
                &f.supervisor,
                CreateTransactionInput::StockOut(stock_out(&f, TransactionType::Sale, 1)),
            )
            .unwrap();

        let err = f
            .engine
            .records
            .update_transaction(
                &f.supervisor,
                tx.id,
                UpdateTransactionInput {
                    selling_price: Some(dec("99")),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn delete_without_permission_keeps_record() {
        let f = fixture();
        let clerk = session(Role::DataEntry);
        let tx = f.engine.records.create_transaction(&clerk, purchase(&f, 10)).unwrap();

        let err = f.engine.records.delete_transaction(&clerk, tx.id).unwrap_err();
        assert!(err.is_permission_denied());
        assert!(f.engine.records.get_transaction(&clerk, tx.id).is_ok());
    }

    #[test]
    fn delete_does_not_reverse_ledger() {
        let f = fixture();
        let tx = f
            .engine
            .records
            .create_transaction(&f.supervisor, purchase(&f, 10))
            .unwrap();

        f.engine.records.delete_transaction(&f.supervisor, tx.id).unwrap();

        assert!(f
            .engine
            .records
            .get_transaction(&f.supervisor, tx.id)
            .unwrap_err()
            .is_not_found());
        assert_eq!(quantity_of(&f), 15);
    }
}

mod listing {
    use super::*;
    use shared::DateRange;

    #[test]
    fn filters_and_sorts_newest_first() {
        let f = fixture();
        let early = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let late = NaiveDate::from_ymd_opt(2025, 2, 5).unwrap();

        let mut first = stock_out(&f, TransactionType::Sale, 1);
        first.date = Some(early);
        f.engine
            .records
            .create_transaction(&f.supervisor, CreateTransactionInput::StockOut(first))
            .unwrap();

        let second = CreateTransactionInput::Purchase(PurchaseInput {
            item_id: f.item.id,
            supplier_id: f.supplier.id,
            quantity: 3,
            unit_cost: None,
            date: Some(late),
            notes: None,
        });
        f.engine.records.create_transaction(&f.supervisor, second).unwrap();

        let all = f
            .engine
            .records
            .list_transactions(&f.supervisor, &TransactionFilter::default())
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].date, late);

        let purchases = f
            .engine
            .records
            .list_transactions(
                &f.supervisor,
                &TransactionFilter {
                    transaction_type: Some(TransactionType::Purchase),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(purchases.len(), 1);

        let by_supplier_name = f
            .engine
            .records
            .list_transactions(
                &f.supervisor,
                &TransactionFilter {
                    search: Some("delta".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(by_supplier_name.len(), 1);

        let january = f
            .engine
            .records
            .list_transactions(
                &f.supervisor,
                &TransactionFilter {
                    date_range: Some(DateRange::new(
                        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
                    )),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(january.len(), 1);
        assert_eq!(january[0].transaction_type, TransactionType::Sale);
    }
}
