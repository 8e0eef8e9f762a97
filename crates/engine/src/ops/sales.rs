use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Disposition, EngineError, ResultEngine, SaleNewCmd, SaleRecord, SaleWarning, sales,
};

use super::{Engine, normalize_optional_text, reports, vehicles as vehicle_ops, with_tx};

/// Result of recording a sale.
///
/// The sale itself is committed; `warnings` lists best-effort follow-up
/// steps that failed afterwards and were logged instead of rolled back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleOutcome {
    pub sale: SaleRecord,
    pub warnings: Vec<SaleWarning>,
}

fn validate_sale(cmd: &SaleNewCmd) -> ResultEngine<()> {
    let mut problems = Vec::new();
    if cmd.buyer_name.trim().is_empty() {
        problems.push("buyer name is required");
    }
    if cmd.buyer_address.trim().is_empty() {
        problems.push("buyer address is required");
    }
    if cmd.buyer_phone.trim().is_empty() {
        problems.push("buyer phone is required");
    }
    if !cmd.disposition.is_sale_code() {
        problems.push("disposition must be one of sold, scrapped, exported, parts");
    }
    if cmd.sale_price_cents < 0 {
        problems.push("sale price must not be negative");
    }
    if cmd.received_cents.is_some_and(|cents| cents < 0) {
        problems.push("received amount must not be negative");
    }
    if cmd.recorded_by.trim().is_empty() {
        problems.push("recorded by is required");
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Validation(problems.join("; ")))
    }
}

impl Engine {
    /// Record an outgoing sale and dispose of the vehicle.
    ///
    /// The sale insert and the vehicle's disposition change commit in one
    /// transaction. The proceeds ledger entry and the disposition report
    /// entry are written afterwards, best-effort: a failure there becomes
    /// a [`SaleWarning`], never a rollback of the sale.
    pub async fn record_sale(&self, cmd: SaleNewCmd) -> ResultEngine<SaleOutcome> {
        validate_sale(&cmd)?;
        let now = self.now();
        let today = self.today();
        let sale_id = Uuid::new_v4();

        let (sale, vehicle) = with_tx!(self, |db_tx| {
            let vehicle = vehicle_ops::require_vehicle(&db_tx, cmd.vehicle_id).await?;
            if vehicle.disposition != Disposition::Tbd {
                return Err(EngineError::Conflict(format!(
                    "vehicle already disposed as {}",
                    vehicle.disposition.as_str()
                )));
            }
            if vehicle_ops::has_active_hold(&db_tx, vehicle.id).await? {
                return Err(EngineError::Conflict(
                    "vehicle is on an active impound/lien hold".to_string(),
                ));
            }

            let sale = SaleRecord {
                id: sale_id,
                original_transaction_id: vehicle.id,
                buyer_name: cmd.buyer_name.trim().to_string(),
                buyer_address: Some(cmd.buyer_address.trim().to_string()),
                buyer_phone: Some(cmd.buyer_phone.trim().to_string()),
                buyer_license: normalize_optional_text(cmd.buyer_license.as_deref()),
                sale_price_cents: cmd.sale_price_cents,
                received_cents: cmd.received_cents,
                sale_date: cmd.sale_date,
                disposition: cmd.disposition,
                notes: normalize_optional_text(cmd.notes.as_deref()),
                recorded_by: cmd.recorded_by.trim().to_string(),
                created_at: now,
            };
            let model: sales::ActiveModel = (&sale).into();
            model.insert(&db_tx).await?;

            let rows =
                vehicle_ops::cas_disposition(&db_tx, vehicle.id, sale.disposition, Some(sale.id))
                    .await?;
            if rows == 0 {
                return Err(EngineError::Conflict(
                    "vehicle was disposed concurrently".to_string(),
                ));
            }
            Ok::<_, EngineError>((sale, vehicle))
        })?;

        let mut warnings = Vec::new();

        if let Err(err) = self
            .record_sale_proceeds(
                &sale.recorded_by,
                sale.sale_price_cents,
                &vehicle.vin,
                sale.id,
                &sale.recorded_by,
            )
            .await
        {
            tracing::warn!(sale_id = %sale.id, error = %err, "proceeds ledger entry failed");
            warnings.push(SaleWarning::Ledger(err.to_string()));
        }

        if let Err(err) =
            reports::upsert_disposition_report(&self.database, vehicle.id, sale.id, today, now)
                .await
        {
            tracing::warn!(sale_id = %sale.id, error = %err, "disposition report scheduling failed");
            warnings.push(SaleWarning::Compliance(err.to_string()));
        }

        Ok(SaleOutcome { sale, warnings })
    }

    /// Return one sale record.
    pub async fn sale(&self, sale_id: Uuid) -> ResultEngine<SaleRecord> {
        let model = sales::Entity::find_by_id(sale_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("sale".to_string()))?;
        SaleRecord::try_from(model)
    }

    /// All sale records attached to a vehicle, oldest first.
    pub async fn sales_for_vehicle(&self, vehicle_id: Uuid) -> ResultEngine<Vec<SaleRecord>> {
        let models = sales::Entity::find()
            .filter(sales::Column::OriginalTransactionId.eq(vehicle_id.to_string()))
            .order_by_asc(sales::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(SaleRecord::try_from).collect()
    }
}
