use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    CashLedgerEntry, EngineError, LedgerEntryCmd, LedgerEntryKind, MoneyCents, ResultEngine, ledger,
};

use super::{Engine, normalize_optional_text, normalize_required_text};

fn validate_amount(kind: LedgerEntryKind, amount_cents: i64) -> ResultEngine<()> {
    // Adjustments are signed; every other kind carries a magnitude.
    if kind != LedgerEntryKind::Adjustment && amount_cents < 0 {
        return Err(EngineError::Validation(format!(
            "{} amount must not be negative",
            kind.as_str()
        )));
    }
    Ok(())
}

/// Append one entry without further validation; shared by the public
/// append path and the sale/sweep proceeds writers.
pub(super) async fn insert_entry<C: ConnectionTrait>(
    db: &C,
    entry: &CashLedgerEntry,
) -> ResultEngine<()> {
    let model: ledger::ActiveModel = entry.into();
    model.insert(db).await?;
    Ok(())
}

impl Engine {
    /// Append a cash-drawer entry for a driver.
    pub async fn append_ledger_entry(&self, cmd: LedgerEntryCmd) -> ResultEngine<CashLedgerEntry> {
        let driver_id = normalize_required_text(&cmd.driver_id, "driver")?;
        let actor = normalize_required_text(&cmd.actor, "actor")?;
        validate_amount(cmd.kind, cmd.amount_cents)?;

        let entry = CashLedgerEntry {
            id: Uuid::new_v4(),
            driver_id,
            kind: cmd.kind,
            amount_cents: cmd.amount_cents,
            reason: normalize_optional_text(cmd.reason.as_deref()),
            actor,
            vin: normalize_optional_text(cmd.vin.as_deref()),
            sale_id: cmd.sale_id,
            recorded_at: self.now(),
        };
        insert_entry(&self.database, &entry).await?;
        Ok(entry)
    }

    /// Credit a driver's drawer with the proceeds of a sale.
    pub async fn record_sale_proceeds(
        &self,
        driver_id: &str,
        amount_cents: i64,
        vin: &str,
        sale_id: Uuid,
        actor: &str,
    ) -> ResultEngine<CashLedgerEntry> {
        let cmd = LedgerEntryCmd {
            driver_id: driver_id.to_string(),
            kind: LedgerEntryKind::SaleProceeds,
            amount_cents,
            reason: None,
            actor: actor.to_string(),
            vin: Some(vin.to_string()),
            sale_id: Some(sale_id),
        };
        self.append_ledger_entry(cmd).await
    }

    /// Current balance of a driver's drawer.
    ///
    /// Always derived: entries are replayed in `(recorded_at, id)` order
    /// and folded through [`CashLedgerEntry::apply`], so a `set_balance`
    /// entry resets the baseline and everything after it sums on top.
    pub async fn driver_balance(&self, driver_id: &str) -> ResultEngine<MoneyCents> {
        let entries = self.ledger_entries(driver_id).await?;
        let cents = entries
            .iter()
            .fold(0_i64, |running, entry| entry.apply(running));
        Ok(MoneyCents::new(cents))
    }

    /// Full drawer history for a driver, oldest first.
    pub async fn ledger_entries(&self, driver_id: &str) -> ResultEngine<Vec<CashLedgerEntry>> {
        let models = ledger::Entity::find()
            .filter(ledger::Column::DriverId.eq(driver_id.to_string()))
            .order_by_asc(ledger::Column::RecordedAt)
            .order_by_asc(ledger::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(CashLedgerEntry::try_from).collect()
    }
}
