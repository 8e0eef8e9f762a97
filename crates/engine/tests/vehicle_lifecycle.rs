use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Disposition, Engine, EngineError, FixedClock, HoldNewCmd, HoldStatus, HoldStatusCmd,
    LedgerEntryCmd, LedgerEntryKind, ReportKind, SaleNewCmd, VehicleNewCmd,
};
use migration::MigratorTrait;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn engine_at(today: NaiveDate) -> (Engine, Arc<FixedClock>, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let clock = Arc::new(FixedClock::at_date(today));
    let engine = Engine::builder()
        .database(db.clone())
        .clock(clock.clone())
        .build()
        .await
        .unwrap();
    (engine, clock, db)
}

fn purchase_cmd(vin: &str, price_cents: i64, today: NaiveDate) -> VehicleNewCmd {
    VehicleNewCmd::new(vin, "Jo Seller", price_cents, today, "driver1", "yard1")
}

fn sale_cmd(vehicle_id: uuid::Uuid, price_cents: i64, today: NaiveDate) -> SaleNewCmd {
    SaleNewCmd::new(
        vehicle_id,
        "Acme Salvage",
        "2 Scrap Rd",
        "555-0101",
        price_cents,
        today,
        Disposition::Sold,
        "wendy",
    )
}

#[tokio::test]
async fn purchase_creates_record_and_pending_purchase_report() {
    let today = date(2024, 1, 5);
    let (engine, _clock, _db) = engine_at(today).await;

    let record = engine
        .create_vehicle_record(purchase_cmd("1FTEX1CM5BFA00017", 20_000, today))
        .await
        .unwrap();
    assert_eq!(record.disposition, Disposition::Tbd);
    assert!(!record.impound_or_lien);

    let loaded = engine.vehicle(record.id).await.unwrap();
    assert_eq!(loaded, record);

    let pending = engine.list_pending_reports().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].vehicle_id, record.id);
    assert_eq!(pending[0].kind, ReportKind::Purchase);
    assert_eq!(pending[0].due_date, today);
}

#[tokio::test]
async fn purchase_rejects_blank_vin_and_negative_price() {
    let today = date(2024, 1, 5);
    let (engine, _clock, _db) = engine_at(today).await;

    let err = engine
        .create_vehicle_record(purchase_cmd("   ", 20_000, today))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .create_vehicle_record(purchase_cmd("1FTEX1CM5BFA00017", -1, today))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert!(engine.list_pending_reports().await.unwrap().is_empty());
}

#[tokio::test]
async fn record_sale_disposes_vehicle_and_credits_drawer() {
    let today = date(2024, 2, 3);
    let (engine, _clock, _db) = engine_at(today).await;

    let record = engine
        .create_vehicle_record(purchase_cmd("1FTEX1CM5BFA00017", 20_000, today))
        .await
        .unwrap();

    let outcome = engine.record_sale(sale_cmd(record.id, 45_000, today)).await.unwrap();
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.sale.disposition, Disposition::Sold);

    let vehicle = engine.vehicle(record.id).await.unwrap();
    assert_eq!(vehicle.disposition, Disposition::Sold);
    assert_eq!(vehicle.sale_record_id, Some(outcome.sale.id));

    // Proceeds land in the recording user's drawer.
    let balance = engine.driver_balance("wendy").await.unwrap();
    assert_eq!(balance.cents(), 45_000);
    assert_eq!(balance.to_string(), "$450.00");

    let pending = engine.list_pending_reports().await.unwrap();
    let dispositions: Vec<_> = pending
        .iter()
        .filter(|entry| entry.kind == ReportKind::Disposition)
        .collect();
    assert_eq!(dispositions.len(), 1);
    assert_eq!(dispositions[0].sale_id, Some(outcome.sale.id));
}

#[tokio::test]
async fn sale_of_disposed_vehicle_conflicts_and_writes_nothing() {
    let today = date(2024, 2, 3);
    let (engine, _clock, _db) = engine_at(today).await;

    let record = engine
        .create_vehicle_record(purchase_cmd("1FTEX1CM5BFA00017", 20_000, today))
        .await
        .unwrap();
    engine.record_sale(sale_cmd(record.id, 45_000, today)).await.unwrap();

    let err = engine
        .record_sale(sale_cmd(record.id, 30_000, today))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    assert_eq!(engine.sales_for_vehicle(record.id).await.unwrap().len(), 1);
    // No second proceeds entry was written.
    assert_eq!(engine.driver_balance("wendy").await.unwrap().cents(), 45_000);
}

#[tokio::test]
async fn sale_validation_collects_missing_fields() {
    let today = date(2024, 2, 3);
    let (engine, _clock, _db) = engine_at(today).await;

    let record = engine
        .create_vehicle_record(purchase_cmd("1FTEX1CM5BFA00017", 20_000, today))
        .await
        .unwrap();

    let mut cmd = sale_cmd(record.id, 45_000, today);
    cmd.buyer_address = "  ".to_string();
    cmd.buyer_phone = String::new();
    let err = engine.record_sale(cmd).await.unwrap_err();
    match err {
        EngineError::Validation(msg) => {
            assert!(msg.contains("buyer address"));
            assert!(msg.contains("buyer phone"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    // Nothing was written.
    let vehicle = engine.vehicle(record.id).await.unwrap();
    assert_eq!(vehicle.disposition, Disposition::Tbd);
    assert!(engine.sales_for_vehicle(record.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn held_vehicle_cannot_be_sold_until_hold_clears() {
    let today = date(2024, 2, 3);
    let (engine, _clock, _db) = engine_at(today).await;

    let record = engine
        .create_vehicle_record(purchase_cmd("1FTEX1CM5BFA00017", 20_000, today))
        .await
        .unwrap();
    let hold = engine
        .create_hold(HoldNewCmd::new(record.id, today))
        .await
        .unwrap();

    assert!(engine.vehicle(record.id).await.unwrap().impound_or_lien);

    let err = engine
        .record_sale(sale_cmd(record.id, 45_000, today))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    engine
        .update_hold_status(HoldStatusCmd::new(hold.id, HoldStatus::Processed))
        .await
        .unwrap();
    engine
        .update_hold_status(
            HoldStatusCmd::new(hold.id, HoldStatus::Released).released_to("Owner"),
        )
        .await
        .unwrap();

    assert!(!engine.vehicle(record.id).await.unwrap().impound_or_lien);
    engine.record_sale(sale_cmd(record.id, 45_000, today)).await.unwrap();
}

#[tokio::test]
async fn set_disposition_is_forward_only_and_idempotent() {
    let today = date(2024, 2, 3);
    let (engine, _clock, _db) = engine_at(today).await;

    let record = engine
        .create_vehicle_record(purchase_cmd("1FTEX1CM5BFA00017", 20_000, today))
        .await
        .unwrap();

    let err = engine
        .set_disposition(record.id, Disposition::Tbd, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    engine
        .set_disposition(record.id, Disposition::Scrapped, None)
        .await
        .unwrap();
    // Same target again is a no-op.
    engine
        .set_disposition(record.id, Disposition::Scrapped, None)
        .await
        .unwrap();

    let err = engine
        .set_disposition(record.id, Disposition::Sold, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    assert_eq!(
        engine.vehicle(record.id).await.unwrap().disposition,
        Disposition::Scrapped
    );
}

#[tokio::test]
async fn balance_replays_entries_in_order() {
    let (engine, clock, _db) = engine_at(date(2024, 3, 1)).await;

    engine
        .append_ledger_entry(LedgerEntryCmd::new(
            "driver1",
            LedgerEntryKind::Deposit,
            100_00,
            "admin",
        ))
        .await
        .unwrap();
    clock.set_date(date(2024, 3, 2));
    engine
        .append_ledger_entry(LedgerEntryCmd::new(
            "driver1",
            LedgerEntryKind::Withdrawal,
            30_00,
            "admin",
        ))
        .await
        .unwrap();
    clock.set_date(date(2024, 3, 3));
    engine
        .record_sale_proceeds("driver1", 50_00, "1FTEX1CM5BFA00017", uuid::Uuid::new_v4(), "admin")
        .await
        .unwrap();

    assert_eq!(engine.driver_balance("driver1").await.unwrap().cents(), 120_00);

    // A set_balance mid-stream resets the baseline.
    clock.set_date(date(2024, 3, 4));
    engine
        .append_ledger_entry(LedgerEntryCmd::new(
            "driver1",
            LedgerEntryKind::SetBalance,
            500_00,
            "admin",
        ))
        .await
        .unwrap();
    assert_eq!(engine.driver_balance("driver1").await.unwrap().cents(), 500_00);
}

#[tokio::test]
async fn set_balance_before_other_entries_is_a_baseline() {
    let (engine, clock, _db) = engine_at(date(2024, 3, 1)).await;

    engine
        .append_ledger_entry(LedgerEntryCmd::new(
            "driver2",
            LedgerEntryKind::SetBalance,
            500_00,
            "admin",
        ))
        .await
        .unwrap();
    clock.set_date(date(2024, 3, 2));
    engine
        .append_ledger_entry(LedgerEntryCmd::new(
            "driver2",
            LedgerEntryKind::Deposit,
            100_00,
            "admin",
        ))
        .await
        .unwrap();
    clock.set_date(date(2024, 3, 3));
    engine
        .append_ledger_entry(LedgerEntryCmd::new(
            "driver2",
            LedgerEntryKind::Withdrawal,
            30_00,
            "admin",
        ))
        .await
        .unwrap();
    clock.set_date(date(2024, 3, 4));
    engine
        .record_sale_proceeds("driver2", 50_00, "VIN", uuid::Uuid::new_v4(), "admin")
        .await
        .unwrap();

    assert_eq!(engine.driver_balance("driver2").await.unwrap().cents(), 620_00);
}

#[tokio::test]
async fn ledger_amount_validation_follows_kind() {
    let (engine, _clock, _db) = engine_at(date(2024, 3, 1)).await;

    let err = engine
        .append_ledger_entry(LedgerEntryCmd::new(
            "driver1",
            LedgerEntryKind::Withdrawal,
            -5_00,
            "admin",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Adjustments are signed.
    engine
        .append_ledger_entry(LedgerEntryCmd::new(
            "driver1",
            LedgerEntryKind::Adjustment,
            -5_00,
            "admin",
        ))
        .await
        .unwrap();
    assert_eq!(engine.driver_balance("driver1").await.unwrap().cents(), -5_00);
}

#[tokio::test]
async fn vin_search_matches_substring_case_insensitively() {
    let today = date(2024, 1, 5);
    let (engine, _clock, _db) = engine_at(today).await;

    engine
        .create_vehicle_record(purchase_cmd("1FTEX1CM5BFA00017", 20_000, today))
        .await
        .unwrap();
    engine
        .create_vehicle_record(purchase_cmd("2GCEK19T7Y1234567", 15_000, today))
        .await
        .unwrap();

    let hits = engine.find_by_vin_fragment("cm5bfa").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].vin, "1FTEX1CM5BFA00017");

    assert!(engine.find_by_vin_fragment("zzz").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_available_excludes_disposed_and_held_vehicles() {
    let today = date(2024, 1, 5);
    let (engine, _clock, _db) = engine_at(today).await;

    let open = engine
        .create_vehicle_record(purchase_cmd("VINAVAILABLE00001", 10_000, today))
        .await
        .unwrap();
    let sold = engine
        .create_vehicle_record(purchase_cmd("VINSOLD0000000002", 10_000, today))
        .await
        .unwrap();
    let held = engine
        .create_vehicle_record(purchase_cmd("VINHELD0000000003", 10_000, today))
        .await
        .unwrap();

    engine.record_sale(sale_cmd(sold.id, 12_000, today)).await.unwrap();
    engine
        .create_hold(HoldNewCmd::new(held.id, today))
        .await
        .unwrap();

    let available = engine.list_available("yard1").await.unwrap();
    let ids: Vec<_> = available.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![open.id]);
}

#[tokio::test]
async fn delete_vehicle_cascades_sales_and_reports() {
    let today = date(2024, 2, 3);
    let (engine, _clock, _db) = engine_at(today).await;

    let record = engine
        .create_vehicle_record(purchase_cmd("1FTEX1CM5BFA00017", 20_000, today))
        .await
        .unwrap();
    let outcome = engine.record_sale(sale_cmd(record.id, 45_000, today)).await.unwrap();

    engine.delete_vehicle_record(record.id).await.unwrap();

    assert!(matches!(
        engine.vehicle(record.id).await.unwrap_err(),
        EngineError::NotFound(_)
    ));
    assert!(matches!(
        engine.sale(outcome.sale.id).await.unwrap_err(),
        EngineError::NotFound(_)
    ));
    assert!(engine.list_pending_reports().await.unwrap().is_empty());
}
