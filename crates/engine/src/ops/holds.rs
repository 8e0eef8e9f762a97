use chrono::Days;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Disposition, EngineError, HOLD_PERIOD_DAYS, HoldNewCmd, HoldStatus, HoldStatusCmd, ImpoundHold,
    ResultEngine, SaleRecord, holds, sales,
};

use super::{Engine, normalize_optional_text, reports, vehicles as vehicle_ops, with_tx};

/// Actor recorded on sales produced by the automatic transfer sweep.
const SWEEP_ACTOR: &str = "auto_transfer";

/// Recompute a vehicle's `impound_or_lien` flag from its holds.
async fn refresh_hold_flag<C: ConnectionTrait>(db: &C, vehicle_id: Uuid) -> ResultEngine<()> {
    let flag = vehicle_ops::has_active_hold(db, vehicle_id).await?;
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE vehicle_transactions SET impound_or_lien = ? WHERE id = ?;",
        vec![flag.into(), vehicle_id.to_string().into()],
    ))
    .await?;
    Ok(())
}

async fn require_hold<C: ConnectionTrait>(db: &C, hold_id: Uuid) -> ResultEngine<ImpoundHold> {
    let model = holds::Entity::find_by_id(hold_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound("hold".to_string()))?;
    ImpoundHold::try_from(model)
}

impl Engine {
    /// Place a vehicle on an impound/lien hold.
    ///
    /// The hold starts `pending` and the vehicle is flagged
    /// `impound_or_lien` in the same transaction.
    pub async fn create_hold(&self, cmd: HoldNewCmd) -> ResultEngine<ImpoundHold> {
        crate::util::require_non_negative(cmd.fees_cents, "hold fees")?;

        let hold = ImpoundHold {
            id: Uuid::new_v4(),
            vehicle_id: cmd.vehicle_id,
            status: HoldStatus::Pending,
            impound_date: cmd.impound_date,
            release_date: cmd.release_date,
            auction_date: None,
            released_to: None,
            storage_location: normalize_optional_text(cmd.storage_location.as_deref()),
            authority: normalize_optional_text(cmd.authority.as_deref()),
            fees_cents: cmd.fees_cents,
            auto_transfer_date: None,
            transfer_sale_id: None,
        };

        with_tx!(self, |db_tx| {
            vehicle_ops::require_vehicle(&db_tx, cmd.vehicle_id).await?;
            let model: holds::ActiveModel = (&hold).into();
            model.insert(&db_tx).await?;
            refresh_hold_flag(&db_tx, cmd.vehicle_id).await?;
            Ok(hold.clone())
        })
    }

    /// Return one hold.
    pub async fn hold(&self, hold_id: Uuid) -> ResultEngine<ImpoundHold> {
        require_hold(&self.database, hold_id).await
    }

    /// All holds for a vehicle, oldest impound first.
    pub async fn holds_for_vehicle(&self, vehicle_id: Uuid) -> ResultEngine<Vec<ImpoundHold>> {
        let models = holds::Entity::find()
            .filter(holds::Column::VehicleId.eq(vehicle_id.to_string()))
            .order_by_asc(holds::Column::ImpoundDate)
            .all(&self.database)
            .await?;
        models.into_iter().map(ImpoundHold::try_from).collect()
    }

    /// Holds still blocking a sale (pending or processed).
    pub async fn list_active_holds(&self) -> ResultEngine<Vec<ImpoundHold>> {
        let models = holds::Entity::find()
            .filter(holds::Column::Status.is_in(["pending", "processed"]))
            .order_by_asc(holds::Column::ImpoundDate)
            .all(&self.database)
            .await?;
        models.into_iter().map(ImpoundHold::try_from).collect()
    }

    /// Admin edit of a hold's status.
    ///
    /// Only `pending -> processed` and `processed -> released|auctioned`
    /// are allowed here; the sweep owns `auto_transferred`. Processing a
    /// hold without an explicit release date assigns
    /// `impound_date + 21 days`.
    pub async fn update_hold_status(&self, cmd: HoldStatusCmd) -> ResultEngine<ImpoundHold> {
        let today = self.today();
        with_tx!(self, |db_tx| {
            let hold = require_hold(&db_tx, cmd.hold_id).await?;
            if hold.status == cmd.new_status {
                return Ok(hold);
            }
            if !hold.status.can_transition_to(cmd.new_status) {
                return Err(EngineError::Conflict(format!(
                    "hold cannot move from {} to {}",
                    hold.status.as_str(),
                    cmd.new_status.as_str()
                )));
            }

            let mut updated = hold.clone();
            updated.status = cmd.new_status;
            match cmd.new_status {
                HoldStatus::Processed => {
                    updated.release_date = cmd
                        .release_date
                        .or(hold.release_date)
                        .or_else(|| hold.impound_date.checked_add_days(Days::new(
                            HOLD_PERIOD_DAYS as u64,
                        )));
                }
                HoldStatus::Released => {
                    updated.release_date = cmd.release_date.or(hold.release_date).or(Some(today));
                    updated.released_to = cmd.released_to.clone().or(hold.released_to.clone());
                }
                HoldStatus::Auctioned => {
                    updated.auction_date = cmd.auction_date.or(Some(today));
                }
                HoldStatus::Pending | HoldStatus::AutoTransferred => unreachable!(),
            }

            let model = holds::ActiveModel {
                id: ActiveValue::Unchanged(updated.id.to_string()),
                ..(&updated).into()
            };
            model.update(&db_tx).await?;
            refresh_hold_flag(&db_tx, hold.vehicle_id).await?;
            Ok(updated)
        })
    }

    /// Remove a hold record entirely (explicit admin action) and drop the
    /// vehicle's hold flag if nothing else is blocking it.
    pub async fn delete_hold(&self, hold_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let hold = require_hold(&db_tx, hold_id).await?;
            holds::Entity::delete_by_id(hold.id.to_string())
                .exec(&db_tx)
                .await?;
            refresh_hold_flag(&db_tx, hold.vehicle_id).await?;
            Ok(())
        })
    }

    /// Transfer every overdue processed hold to the yard's configured
    /// recipient.
    ///
    /// A hold qualifies once its release date has passed and no transfer
    /// has been stamped yet. Each qualifying hold is handled in its own
    /// transaction; a failure is logged and skipped so one bad record
    /// never stops the batch. Returns the ids of holds transferred by
    /// this call.
    pub async fn run_auto_transfer_sweep(&self) -> ResultEngine<Vec<Uuid>> {
        let today = self.today();
        let candidates = holds::Entity::find()
            .filter(holds::Column::Status.eq(HoldStatus::Processed.as_str()))
            .filter(holds::Column::ReleaseDate.is_not_null())
            .filter(holds::Column::ReleaseDate.lte(today))
            .filter(holds::Column::AutoTransferDate.is_null())
            .order_by_asc(holds::Column::ImpoundDate)
            .all(&self.database)
            .await?;

        let mut transferred = Vec::new();
        for model in candidates {
            let hold = match ImpoundHold::try_from(model) {
                Ok(hold) => hold,
                Err(err) => {
                    tracing::error!(error = %err, "skipping malformed hold record");
                    continue;
                }
            };
            match self.transfer_hold(&hold).await {
                Ok(true) => transferred.push(hold.id),
                Ok(false) => {
                    tracing::debug!(hold_id = %hold.id, "hold already claimed by another sweep");
                }
                Err(err) => {
                    tracing::error!(hold_id = %hold.id, error = %err, "auto transfer failed");
                }
            }
        }
        Ok(transferred)
    }

    /// Returns `true` when this call claimed and transferred the hold,
    /// `false` when another sweep got there first.
    async fn transfer_hold(&self, hold: &ImpoundHold) -> ResultEngine<bool> {
        let today = self.today();
        let now = self.now();
        let vehicle = self.vehicle(hold.vehicle_id).await?;
        let yard = self.yard_settings(&vehicle.yard_id).await?;
        let sale_id = Uuid::new_v4();

        with_tx!(self, |db_tx| {
            // Claim the hold first. The guard on `auto_transfer_date IS
            // NULL` makes concurrent or repeated sweeps touch it at most
            // once.
            let claimed = db_tx
                .execute(Statement::from_sql_and_values(
                    db_tx.get_database_backend(),
                    "UPDATE impound_holds \
                     SET status = 'auto_transferred', auto_transfer_date = ?, transfer_sale_id = ? \
                     WHERE id = ? AND status = 'processed' AND auto_transfer_date IS NULL;",
                    vec![
                        today.into(),
                        sale_id.to_string().into(),
                        hold.id.to_string().into(),
                    ],
                ))
                .await?
                .rows_affected();
            if claimed == 0 {
                return Ok(false);
            }

            let sale = SaleRecord {
                id: sale_id,
                original_transaction_id: vehicle.id,
                buyer_name: yard.transfer_recipient_name.clone(),
                buyer_address: yard.transfer_recipient_address.clone(),
                buyer_phone: None,
                buyer_license: yard.transfer_recipient_license.clone(),
                sale_price_cents: vehicle.purchase_price_cents,
                received_cents: None,
                sale_date: today,
                disposition: Disposition::Sold,
                notes: Some("automatic transfer after impound hold".to_string()),
                recorded_by: SWEEP_ACTOR.to_string(),
                created_at: now,
            };
            let model: sales::ActiveModel = (&sale).into();
            model.insert(&db_tx).await?;

            let rows =
                vehicle_ops::cas_disposition(&db_tx, vehicle.id, Disposition::Sold, Some(sale_id))
                    .await?;
            if rows == 0 {
                return Err(EngineError::Conflict(
                    "vehicle was disposed before its hold transferred".to_string(),
                ));
            }

            reports::upsert_disposition_report(&db_tx, vehicle.id, sale_id, today, now).await?;
            refresh_hold_flag(&db_tx, vehicle.id).await?;
            Ok(true)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use migration::MigratorTrait;
    use sea_orm::{Database, EntityTrait, PaginatorTrait};

    use super::Engine;
    use crate::{FixedClock, HoldNewCmd, HoldStatus, HoldStatusCmd, VehicleNewCmd, YardSettings, sales};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn engine_at(today: NaiveDate) -> Engine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        Engine::builder()
            .database(db)
            .clock(Arc::new(FixedClock::at_date(today)))
            .build()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn transfer_reports_whether_this_call_claimed_the_hold() {
        let engine = engine_at(date(2024, 1, 22)).await;
        engine
            .upsert_yard_settings(YardSettings {
                yard_id: "yard1".to_string(),
                name: "Northside Auto Salvage".to_string(),
                address: None,
                phone: None,
                dismantler_license: None,
                nmvtis_id: "NM123".to_string(),
                nmvtis_pin: "9999".to_string(),
                transfer_recipient_name: "Metro Crush LLC".to_string(),
                transfer_recipient_address: None,
                transfer_recipient_license: None,
            })
            .await
            .unwrap();
        let vehicle = engine
            .create_vehicle_record(VehicleNewCmd::new(
                "1FTEX1CM5BFA00017",
                "Jo Seller",
                20_000,
                date(2024, 1, 1),
                "driver1",
                "yard1",
            ))
            .await
            .unwrap();
        let hold = engine
            .create_hold(HoldNewCmd::new(vehicle.id, date(2024, 1, 1)))
            .await
            .unwrap();
        let hold = engine
            .update_hold_status(HoldStatusCmd::new(hold.id, HoldStatus::Processed))
            .await
            .unwrap();

        // First claim wins; a repeat over the same hold must say it did
        // nothing and write no second sale.
        assert!(engine.transfer_hold(&hold).await.unwrap());
        assert!(!engine.transfer_hold(&hold).await.unwrap());
        let sale_count = sales::Entity::find().count(&engine.database).await.unwrap();
        assert_eq!(sale_count, 1);
    }
}
