use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    Clock, ComplianceReportEntry, Disposition, Engine, EngineError, FixedClock, HoldNewCmd,
    HoldStatus, HoldStatusCmd, ReportKind, ReportStatus, SaleNewCmd, VehicleNewCmd, YardSettings,
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

async fn configure_yard(engine: &Engine) -> YardSettings {
    engine
        .upsert_yard_settings(YardSettings {
            yard_id: "yard1".to_string(),
            name: "Northside Auto Salvage".to_string(),
            address: Some("100 Yard Rd".to_string()),
            phone: Some("555-0100".to_string()),
            dismantler_license: Some("DL-4411".to_string()),
            nmvtis_id: "NM123".to_string(),
            nmvtis_pin: "9999".to_string(),
            transfer_recipient_name: "Metro Crush LLC".to_string(),
            transfer_recipient_address: Some("9 Shredder Way".to_string()),
            transfer_recipient_license: Some("MC-7001".to_string()),
        })
        .await
        .unwrap()
}

async fn purchase(engine: &Engine, vin: &str, price_cents: i64, today: NaiveDate) -> Uuid {
    engine
        .create_vehicle_record(
            VehicleNewCmd::new(vin, "Jo Seller", price_cents, today, "driver1", "yard1")
                .year(2009)
                .make("Ford"),
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn processing_a_hold_assigns_the_statutory_release_date() {
    let (engine, _clock, _db) = engine_at(date(2024, 1, 1)).await;
    let vehicle_id = purchase(&engine, "1FTEX1CM5BFA00017", 20_000, date(2024, 1, 1)).await;

    let hold = engine
        .create_hold(HoldNewCmd::new(vehicle_id, date(2024, 1, 1)))
        .await
        .unwrap();
    assert_eq!(hold.status, HoldStatus::Pending);
    assert_eq!(hold.release_date, None);

    let processed = engine
        .update_hold_status(HoldStatusCmd::new(hold.id, HoldStatus::Processed))
        .await
        .unwrap();
    assert_eq!(processed.status, HoldStatus::Processed);
    assert_eq!(processed.release_date, Some(date(2024, 1, 22)));
}

#[tokio::test]
async fn explicit_release_date_wins_over_the_default() {
    let (engine, _clock, _db) = engine_at(date(2024, 1, 1)).await;
    let vehicle_id = purchase(&engine, "1FTEX1CM5BFA00017", 20_000, date(2024, 1, 1)).await;

    let hold = engine
        .create_hold(
            HoldNewCmd::new(vehicle_id, date(2024, 1, 1)).release_date(date(2024, 2, 15)),
        )
        .await
        .unwrap();
    let processed = engine
        .update_hold_status(HoldStatusCmd::new(hold.id, HoldStatus::Processed))
        .await
        .unwrap();
    assert_eq!(processed.release_date, Some(date(2024, 2, 15)));
}

#[tokio::test]
async fn hold_status_rejects_illegal_transitions() {
    let (engine, _clock, _db) = engine_at(date(2024, 1, 1)).await;
    let vehicle_id = purchase(&engine, "1FTEX1CM5BFA00017", 20_000, date(2024, 1, 1)).await;
    let hold = engine
        .create_hold(HoldNewCmd::new(vehicle_id, date(2024, 1, 1)))
        .await
        .unwrap();

    let err = engine
        .update_hold_status(HoldStatusCmd::new(hold.id, HoldStatus::Released))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let err = engine
        .update_hold_status(HoldStatusCmd::new(hold.id, HoldStatus::AutoTransferred))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // Repeating the current status is a no-op, not a conflict.
    let unchanged = engine
        .update_hold_status(HoldStatusCmd::new(hold.id, HoldStatus::Pending))
        .await
        .unwrap();
    assert_eq!(unchanged, hold);
}

#[tokio::test]
async fn sweep_transfers_overdue_holds_at_purchase_price() {
    let (engine, clock, _db) = engine_at(date(2024, 1, 1)).await;
    configure_yard(&engine).await;
    let vehicle_id = purchase(&engine, "1FTEX1CM5BFA00017", 20_000, date(2024, 1, 1)).await;

    let hold = engine
        .create_hold(HoldNewCmd::new(vehicle_id, date(2024, 1, 1)))
        .await
        .unwrap();
    engine
        .update_hold_status(HoldStatusCmd::new(hold.id, HoldStatus::Processed))
        .await
        .unwrap();

    // Day before the release date: nothing is due.
    clock.set_date(date(2024, 1, 21));
    assert!(engine.run_auto_transfer_sweep().await.unwrap().is_empty());

    clock.set_date(date(2024, 1, 22));
    let transferred = engine.run_auto_transfer_sweep().await.unwrap();
    assert_eq!(transferred, vec![hold.id]);

    let swept = engine.hold(hold.id).await.unwrap();
    assert_eq!(swept.status, HoldStatus::AutoTransferred);
    assert_eq!(swept.auto_transfer_date, Some(date(2024, 1, 22)));
    let sale_id = swept.transfer_sale_id.unwrap();

    let vehicle = engine.vehicle(vehicle_id).await.unwrap();
    assert_eq!(vehicle.disposition, Disposition::Sold);
    assert_eq!(vehicle.sale_record_id, Some(sale_id));
    assert!(!vehicle.impound_or_lien);

    let sale = engine.sale(sale_id).await.unwrap();
    assert_eq!(sale.buyer_name, "Metro Crush LLC");
    assert_eq!(sale.sale_price_cents, 20_000);
    assert_eq!(sale.recorded_by, "auto_transfer");

    let dispositions: Vec<_> = engine
        .list_pending_reports()
        .await
        .unwrap()
        .into_iter()
        .filter(|entry| entry.kind == ReportKind::Disposition)
        .collect();
    assert_eq!(dispositions.len(), 1);
    assert_eq!(dispositions[0].sale_id, Some(sale_id));
}

#[tokio::test]
async fn sweep_is_idempotent() {
    let (engine, clock, _db) = engine_at(date(2024, 1, 1)).await;
    configure_yard(&engine).await;
    let vehicle_id = purchase(&engine, "1FTEX1CM5BFA00017", 20_000, date(2024, 1, 1)).await;
    let hold = engine
        .create_hold(HoldNewCmd::new(vehicle_id, date(2024, 1, 1)))
        .await
        .unwrap();
    engine
        .update_hold_status(HoldStatusCmd::new(hold.id, HoldStatus::Processed))
        .await
        .unwrap();

    clock.set_date(date(2024, 2, 1));
    assert_eq!(engine.run_auto_transfer_sweep().await.unwrap().len(), 1);
    assert!(engine.run_auto_transfer_sweep().await.unwrap().is_empty());
    assert_eq!(engine.sales_for_vehicle(vehicle_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sweep_skips_holds_for_unconfigured_yards() {
    let (engine, clock, _db) = engine_at(date(2024, 1, 1)).await;
    let vehicle_id = purchase(&engine, "1FTEX1CM5BFA00017", 20_000, date(2024, 1, 1)).await;
    let hold = engine
        .create_hold(HoldNewCmd::new(vehicle_id, date(2024, 1, 1)))
        .await
        .unwrap();
    engine
        .update_hold_status(HoldStatusCmd::new(hold.id, HoldStatus::Processed))
        .await
        .unwrap();

    clock.set_date(date(2024, 2, 1));
    assert!(engine.run_auto_transfer_sweep().await.unwrap().is_empty());

    // The hold stays eligible for a later run.
    let untouched = engine.hold(hold.id).await.unwrap();
    assert_eq!(untouched.status, HoldStatus::Processed);
    assert_eq!(untouched.auto_transfer_date, None);
}

#[tokio::test]
async fn sweep_does_not_touch_released_holds() {
    let (engine, clock, _db) = engine_at(date(2024, 1, 1)).await;
    configure_yard(&engine).await;
    let vehicle_id = purchase(&engine, "1FTEX1CM5BFA00017", 20_000, date(2024, 1, 1)).await;
    let hold = engine
        .create_hold(HoldNewCmd::new(vehicle_id, date(2024, 1, 1)))
        .await
        .unwrap();
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

    clock.set_date(date(2024, 2, 1));
    assert!(engine.run_auto_transfer_sweep().await.unwrap().is_empty());
    assert_eq!(
        engine.vehicle(vehicle_id).await.unwrap().disposition,
        Disposition::Tbd
    );
}

#[tokio::test]
async fn mark_submitted_is_idempotent_and_fails_on_unknown_ids() {
    let (engine, _clock, _db) = engine_at(date(2024, 1, 5)).await;
    let vehicle_id = purchase(&engine, "1FTEX1CM5BFA00017", 20_000, date(2024, 1, 5)).await;

    let pending = engine.list_pending_reports().await.unwrap();
    assert_eq!(pending.len(), 1);
    let report_id = pending[0].id;

    engine.mark_reports_submitted(&[report_id]).await.unwrap();
    assert!(engine.list_pending_reports().await.unwrap().is_empty());

    let history = engine.report_status_for_vehicle(vehicle_id).await.unwrap();
    assert_eq!(history[0].status, ReportStatus::Submitted);
    assert!(history[0].submitted_at.is_some());

    // Marking again is a no-op.
    engine.mark_reports_submitted(&[report_id]).await.unwrap();

    let err = engine
        .mark_reports_submitted(&[report_id, Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn nmvtis_batch_has_a_header_and_one_row_per_entry() {
    let today = date(2024, 2, 3);
    let (engine, _clock, _db) = engine_at(today).await;
    configure_yard(&engine).await;

    let sold_id = purchase(&engine, "1FTEX1CM5BFA00017", 20_000, today).await;
    purchase(&engine, "2GCEK19T7Y1234567", 15_000, today).await;
    engine
        .record_sale(
            SaleNewCmd::new(
                sold_id,
                "Acme Salvage",
                "2 Scrap Rd",
                "555-0101",
                45_000,
                today,
                Disposition::Sold,
                "wendy",
            )
            .buyer_license("AS-100"),
        )
        .await
        .unwrap();

    let entries = engine.list_pending_reports().await.unwrap();
    assert_eq!(entries.len(), 3);

    let batch = engine.build_nmvtis_batch("yard1", &entries).await.unwrap();
    let lines: Vec<&str> = batch.lines().collect();
    assert_eq!(lines.len(), entries.len() + 1);
    assert!(lines[0].starts_with("reference_id,nmvtis_id,nmvtis_pin"));
    for (index, line) in lines[1..].iter().enumerate() {
        assert!(line.starts_with(&format!("{},NM123,9999,", index + 1)));
    }
    assert!(batch.contains("1FTEX1CM5BFA00017"));
    assert!(batch.contains("Acme Salvage"));
    assert!(batch.contains("AS-100"));
}

#[tokio::test]
async fn nmvtis_batch_blanks_fields_for_missing_vehicle_data() {
    let today = date(2024, 2, 3);
    let (engine, clock, _db) = engine_at(today).await;
    configure_yard(&engine).await;

    let orphan = ComplianceReportEntry {
        id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        sale_id: None,
        kind: ReportKind::Purchase,
        status: ReportStatus::Pending,
        due_date: today,
        submitted_at: None,
        created_at: clock.now(),
    };

    let batch = engine.build_nmvtis_batch("yard1", &[orphan]).await.unwrap();
    let lines: Vec<&str> = batch.lines().collect();
    assert_eq!(lines.len(), 2);
    // Credentials are still stamped; everything vehicle-derived is blank.
    assert_eq!(lines[1], "1,NM123,9999,purchase,,,,,,,,");
}

#[tokio::test]
async fn nmvtis_batch_requires_yard_settings() {
    let (engine, _clock, _db) = engine_at(date(2024, 2, 3)).await;
    let err = engine.build_nmvtis_batch("yard1", &[]).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn bill_of_sale_names_the_parties() {
    let today = date(2024, 2, 3);
    let (engine, _clock, _db) = engine_at(today).await;
    configure_yard(&engine).await;
    let vehicle_id = purchase(&engine, "1FTEX1CM5BFA00017", 20_000, today).await;
    let outcome = engine
        .record_sale(SaleNewCmd::new(
            vehicle_id,
            "Acme Salvage",
            "2 Scrap Rd",
            "555-0101",
            45_000,
            today,
            Disposition::Sold,
            "wendy",
        ))
        .await
        .unwrap();

    let document = engine.bill_of_sale(outcome.sale.id).await.unwrap();
    assert_eq!(document.filename, "MV2459_1FTEX1CM5BFA00017_2024-02-03");
    assert!(document.html.contains("Acme Salvage"));
    assert!(document.html.contains("Northside Auto Salvage"));
    assert!(document.html.contains("$450.00"));
}
