use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    ComplianceReportEntry, EngineError, Mv2459Document, ReportKind, ReportStatus, ResultEngine,
    mv2459, reports, sales, vehicles,
};

use super::{Engine, with_tx};

/// Insert a new pending report entry.
pub(super) async fn schedule_report<C: ConnectionTrait>(
    db: &C,
    vehicle_id: Uuid,
    sale_id: Option<Uuid>,
    kind: ReportKind,
    due_date: NaiveDate,
    now: DateTime<Utc>,
) -> ResultEngine<ComplianceReportEntry> {
    let entry = ComplianceReportEntry {
        id: Uuid::new_v4(),
        vehicle_id,
        sale_id,
        kind,
        status: ReportStatus::Pending,
        due_date,
        submitted_at: None,
        created_at: now,
    };
    let model: reports::ActiveModel = (&entry).into();
    model.insert(db).await?;
    Ok(entry)
}

/// Schedule the disposition report for a vehicle, reusing an open entry
/// of the same kind if one exists so a disposition event never produces
/// two rows.
pub(super) async fn upsert_disposition_report<C: ConnectionTrait>(
    db: &C,
    vehicle_id: Uuid,
    sale_id: Uuid,
    due_date: NaiveDate,
    now: DateTime<Utc>,
) -> ResultEngine<ComplianceReportEntry> {
    let existing = reports::Entity::find()
        .filter(reports::Column::VehicleId.eq(vehicle_id.to_string()))
        .filter(reports::Column::Kind.eq(ReportKind::Disposition.as_str()))
        .filter(reports::Column::Status.is_in(["pending", "scheduled", "failed"]))
        .one(db)
        .await?;

    if let Some(model) = existing {
        let mut updated: reports::ActiveModel = model.clone().into();
        updated.sale_id = ActiveValue::Set(Some(sale_id.to_string()));
        updated.status = ActiveValue::Set(ReportStatus::Pending.as_str().to_string());
        updated.due_date = ActiveValue::Set(due_date);
        let saved = updated.update(db).await?;
        return ComplianceReportEntry::try_from(saved);
    }

    schedule_report(
        db,
        vehicle_id,
        Some(sale_id),
        ReportKind::Disposition,
        due_date,
        now,
    )
    .await
}

// Encoding failures are storage-side, not bad caller input.
fn csv_error(err: impl std::fmt::Display) -> EngineError {
    EngineError::Database(sea_orm::DbErr::Custom(format!("csv encoding failed: {err}")))
}

impl Engine {
    /// Open (pending/scheduled) report entries, soonest due first.
    pub async fn list_pending_reports(&self) -> ResultEngine<Vec<ComplianceReportEntry>> {
        let models = reports::Entity::find()
            .filter(reports::Column::Status.is_in(["pending", "scheduled"]))
            .order_by_asc(reports::Column::DueDate)
            .order_by_asc(reports::Column::Id)
            .all(&self.database)
            .await?;
        models
            .into_iter()
            .map(ComplianceReportEntry::try_from)
            .collect()
    }

    /// All report entries for one vehicle, oldest first.
    pub async fn report_status_for_vehicle(
        &self,
        vehicle_id: Uuid,
    ) -> ResultEngine<Vec<ComplianceReportEntry>> {
        let models = reports::Entity::find()
            .filter(reports::Column::VehicleId.eq(vehicle_id.to_string()))
            .order_by_asc(reports::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models
            .into_iter()
            .map(ComplianceReportEntry::try_from)
            .collect()
    }

    /// Mark a set of report entries as submitted.
    ///
    /// Idempotent: entries that are already submitted are left untouched.
    /// An unknown id fails the whole call with `NotFound` and nothing is
    /// written.
    pub async fn mark_reports_submitted(&self, report_ids: &[Uuid]) -> ResultEngine<()> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            for report_id in report_ids {
                let model = reports::Entity::find_by_id(report_id.to_string())
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound("report".to_string()))?;
                if model.status == ReportStatus::Submitted.as_str() {
                    continue;
                }
                let mut updated: reports::ActiveModel = model.into();
                updated.status = ActiveValue::Set(ReportStatus::Submitted.as_str().to_string());
                updated.submitted_at = ActiveValue::Set(Some(now));
                updated.update(&db_tx).await?;
            }
            Ok(())
        })
    }

    /// Render a batch of report entries as an NMVTIS CSV upload.
    ///
    /// One header row plus one row per entry. The NMVTIS id and PIN come
    /// from the yard settings on every row, never from per-vehicle data.
    /// A record with missing vehicle data gets blank fields; it never
    /// aborts the batch.
    pub async fn build_nmvtis_batch(
        &self,
        yard_id: &str,
        entries: &[ComplianceReportEntry],
    ) -> ResultEngine<String> {
        let yard = self.yard_settings(yard_id).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "reference_id",
                "nmvtis_id",
                "nmvtis_pin",
                "report_kind",
                "vin",
                "year",
                "make",
                "disposition",
                "event_date",
                "obtained_from",
                "transferred_to",
                "transferee_license",
            ])
            .map_err(csv_error)?;

        for (index, entry) in entries.iter().enumerate() {
            let vehicle = vehicles::Entity::find_by_id(entry.vehicle_id.to_string())
                .one(&self.database)
                .await?
                .and_then(|model| vehicles::VehicleRecord::try_from(model).ok());
            let sale = match entry.sale_id {
                Some(sale_id) => sales::Entity::find_by_id(sale_id.to_string())
                    .one(&self.database)
                    .await?
                    .and_then(|model| sales::SaleRecord::try_from(model).ok()),
                None => None,
            };
            if vehicle.is_none() {
                tracing::warn!(report_id = %entry.id, "batch row has no vehicle record");
            }

            let vin = vehicle.as_ref().map(|v| v.vin.clone()).unwrap_or_default();
            let year = vehicle
                .as_ref()
                .and_then(|v| v.year)
                .map(|y| y.to_string())
                .unwrap_or_default();
            let make = vehicle
                .as_ref()
                .and_then(|v| v.make.clone())
                .unwrap_or_default();
            let disposition = match (&sale, &vehicle) {
                (Some(s), _) => s.disposition.as_str().to_string(),
                (None, Some(v)) => v.disposition.as_str().to_string(),
                (None, None) => String::new(),
            };
            let event_date = match (&sale, &vehicle) {
                (Some(s), _) => s.sale_date.format("%Y-%m-%d").to_string(),
                (None, Some(v)) => v.purchase_date.format("%Y-%m-%d").to_string(),
                (None, None) => String::new(),
            };
            let obtained_from = vehicle
                .as_ref()
                .map(|v| v.seller_name.clone())
                .unwrap_or_default();
            let transferred_to = sale
                .as_ref()
                .map(|s| s.buyer_name.clone())
                .unwrap_or_default();
            let transferee_license = sale
                .as_ref()
                .and_then(|s| s.buyer_license.clone())
                .unwrap_or_default();

            writer
                .write_record([
                    (index + 1).to_string(),
                    yard.nmvtis_id.clone(),
                    yard.nmvtis_pin.clone(),
                    entry.kind.as_str().to_string(),
                    vin,
                    year,
                    make,
                    disposition,
                    event_date,
                    obtained_from,
                    transferred_to,
                    transferee_license,
                ])
                .map_err(csv_error)?;
        }

        let bytes = writer.into_inner().map_err(csv_error)?;
        String::from_utf8(bytes).map_err(csv_error)
    }

    /// Render the MV2459 bill of sale for a recorded sale.
    pub async fn bill_of_sale(&self, sale_id: Uuid) -> ResultEngine<Mv2459Document> {
        let sale = self.sale(sale_id).await?;
        let vehicle = self.vehicle(sale.original_transaction_id).await?;
        let yard = self.yard_settings(&vehicle.yard_id).await?;
        Ok(mv2459::render(&vehicle, &sale, &yard))
    }
}
