use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, Statement, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Disposition, EngineError, ReportKind, ResultEngine, VehicleNewCmd, VehicleRecord, holds,
    vehicles,
};

use super::{Engine, normalize_optional_text, normalize_required_text, reports, with_tx};

/// Load a vehicle record or fail with `NotFound`.
pub(super) async fn require_vehicle<C: ConnectionTrait>(
    db: &C,
    vehicle_id: Uuid,
) -> ResultEngine<VehicleRecord> {
    let model = vehicles::Entity::find_by_id(vehicle_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound("vehicle".to_string()))?;
    VehicleRecord::try_from(model)
}

/// Conditionally move a vehicle out of `tbd`.
///
/// This is a compare-and-set: the UPDATE only applies while the stored
/// disposition is still `tbd`, so two writers can never both dispose of
/// the same vehicle. Returns the number of affected rows.
pub(super) async fn cas_disposition<C: ConnectionTrait>(
    db: &C,
    vehicle_id: Uuid,
    new_disposition: Disposition,
    sale_record_id: Option<Uuid>,
) -> ResultEngine<u64> {
    let backend = db.get_database_backend();
    let result = db
        .execute(Statement::from_sql_and_values(
            backend,
            "UPDATE vehicle_transactions \
             SET disposition = ?, sale_record_id = ? \
             WHERE id = ? AND disposition = 'tbd';",
            vec![
                new_disposition.as_str().into(),
                sale_record_id.map(|id| id.to_string()).into(),
                vehicle_id.to_string().into(),
            ],
        ))
        .await?;
    Ok(result.rows_affected())
}

/// Returns `true` when the vehicle has a hold in a non-terminal state.
pub(super) async fn has_active_hold<C: ConnectionTrait>(
    db: &C,
    vehicle_id: Uuid,
) -> ResultEngine<bool> {
    let count = holds::Entity::find()
        .filter(holds::Column::VehicleId.eq(vehicle_id.to_string()))
        .filter(holds::Column::Status.is_in(["pending", "processed"]))
        .count(db)
        .await?;
    Ok(count > 0)
}

impl Engine {
    /// Create a vehicle purchase record.
    ///
    /// The disposition defaults to `tbd`. The NMVTIS purchase report for
    /// the new record is scheduled in the same transaction, due today.
    pub async fn create_vehicle_record(&self, cmd: VehicleNewCmd) -> ResultEngine<VehicleRecord> {
        let vin = normalize_required_text(&cmd.vin, "vin")?;
        let seller_name = normalize_required_text(&cmd.seller_name, "seller name")?;

        let record = vehicles::new_record(
            vin,
            cmd.year,
            normalize_optional_text(cmd.make.as_deref()),
            seller_name,
            normalize_optional_text(cmd.seller_address.as_deref()),
            normalize_optional_text(cmd.seller_phone.as_deref()),
            cmd.purchase_price_cents,
            cmd.purchase_date,
            normalize_required_text(&cmd.driver_id, "driver")?,
            normalize_required_text(&cmd.yard_id, "yard")?,
            self.now(),
        )?;
        let model: vehicles::ActiveModel = (&record).into();
        let today = self.today();
        let now = self.now();

        with_tx!(self, |db_tx| {
            model.insert(&db_tx).await?;
            reports::schedule_report(&db_tx, record.id, None, ReportKind::Purchase, today, now)
                .await?;
            Ok(record.clone())
        })
    }

    /// Return one vehicle record.
    pub async fn vehicle(&self, vehicle_id: Uuid) -> ResultEngine<VehicleRecord> {
        require_vehicle(&self.database, vehicle_id).await
    }

    /// Move a vehicle's disposition forward.
    ///
    /// Succeeds as a no-op when the stored disposition already matches
    /// the requested one; fails with `Conflict` when another writer moved
    /// it somewhere else, and `NotFound` when the id is unknown.
    pub async fn set_disposition(
        &self,
        vehicle_id: Uuid,
        new_disposition: Disposition,
        sale_record_id: Option<Uuid>,
    ) -> ResultEngine<()> {
        if !new_disposition.is_sale_code() {
            return Err(EngineError::Validation(
                "disposition cannot move back to tbd".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let rows = cas_disposition(&db_tx, vehicle_id, new_disposition, sale_record_id).await?;
            if rows == 1 {
                Ok(())
            } else {
                // The guard missed: tell idempotent repeats apart from
                // real conflicts by re-reading.
                let current = require_vehicle(&db_tx, vehicle_id).await?;
                if current.disposition == new_disposition {
                    Ok(())
                } else {
                    Err(EngineError::Conflict(format!(
                        "vehicle already disposed as {}",
                        current.disposition.as_str()
                    )))
                }
            }
        })
    }

    /// List all vehicle records owned by a yard, newest first.
    pub async fn list_vehicles_by_yard(&self, yard_id: &str) -> ResultEngine<Vec<VehicleRecord>> {
        let models = vehicles::Entity::find()
            .filter(vehicles::Column::YardId.eq(yard_id.to_string()))
            .order_by_desc(vehicles::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(VehicleRecord::try_from).collect()
    }

    /// Case-insensitive VIN substring search (matches anywhere, not just
    /// the prefix).
    pub async fn find_by_vin_fragment(&self, fragment: &str) -> ResultEngine<Vec<VehicleRecord>> {
        let fragment = normalize_required_text(fragment, "vin fragment")?;
        let pattern = format!("%{}%", fragment.to_lowercase());
        let models = vehicles::Entity::find()
            .filter(Expr::cust("LOWER(vin)").like(pattern))
            .order_by_desc(vehicles::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(VehicleRecord::try_from).collect()
    }

    /// Vehicles a sale may be recorded against: still `tbd` and not on an
    /// active impound/lien hold.
    pub async fn list_available(&self, yard_id: &str) -> ResultEngine<Vec<VehicleRecord>> {
        let held_ids: Vec<String> = holds::Entity::find()
            .filter(holds::Column::Status.is_in(["pending", "processed"]))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|hold| hold.vehicle_id)
            .collect();

        let mut query = vehicles::Entity::find()
            .filter(vehicles::Column::YardId.eq(yard_id.to_string()))
            .filter(vehicles::Column::Disposition.eq(Disposition::Tbd.as_str()));
        if !held_ids.is_empty() {
            query = query.filter(vehicles::Column::Id.is_not_in(held_ids));
        }

        let models = query
            .order_by_desc(vehicles::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(VehicleRecord::try_from).collect()
    }

    /// Delete a vehicle record together with its sale records, holds and
    /// report entries (explicit admin action).
    pub async fn delete_vehicle_record(&self, vehicle_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_vehicle(&db_tx, vehicle_id).await?;
            let backend = self.database.get_database_backend();
            let id_value: sea_orm::Value = vehicle_id.to_string().into();

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM vehicle_sales WHERE original_transaction_id = ?;",
                    vec![id_value.clone()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM impound_holds WHERE vehicle_id = ?;",
                    vec![id_value.clone()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM compliance_reports WHERE vehicle_id = ?;",
                    vec![id_value.clone()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM vehicle_transactions WHERE id = ?;",
                    vec![id_value],
                ))
                .await?;

            Ok(())
        })
    }
}
