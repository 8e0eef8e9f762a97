//! Per-driver cash drawer ledger.
//!
//! The ledger is append-only; a driver's balance is always derived by
//! replaying entries in `(recorded_at, id)` order. A `set_balance` entry
//! resets the running baseline to its amount; everything after it is
//! summed on top.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    Deposit,
    Withdrawal,
    Adjustment,
    SetBalance,
    SaleProceeds,
}

impl LedgerEntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Adjustment => "adjustment",
            Self::SetBalance => "set_balance",
            Self::SaleProceeds => "sale_proceeds",
        }
    }
}

impl TryFrom<&str> for LedgerEntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "adjustment" => Ok(Self::Adjustment),
            "set_balance" => Ok(Self::SetBalance),
            "sale_proceeds" => Ok(Self::SaleProceeds),
            other => Err(EngineError::Validation(format!(
                "invalid ledger entry kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashLedgerEntry {
    pub id: Uuid,
    pub driver_id: String,
    pub kind: LedgerEntryKind,
    /// Non-negative except for `adjustment`, which is signed.
    pub amount_cents: i64,
    pub reason: Option<String>,
    pub actor: String,
    /// VIN of the vehicle whose resale produced this entry, for
    /// `sale_proceeds` entries.
    pub vin: Option<String>,
    pub sale_id: Option<Uuid>,
    pub recorded_at: DateTime<Utc>,
}

impl CashLedgerEntry {
    /// Applies this entry to a running balance.
    pub fn apply(&self, running_cents: i64) -> i64 {
        match self.kind {
            LedgerEntryKind::Deposit | LedgerEntryKind::SaleProceeds => {
                running_cents + self.amount_cents
            }
            LedgerEntryKind::Withdrawal => running_cents - self.amount_cents,
            LedgerEntryKind::Adjustment => running_cents + self.amount_cents,
            LedgerEntryKind::SetBalance => self.amount_cents,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub driver_id: String,
    pub kind: String,
    pub amount_cents: i64,
    pub reason: Option<String>,
    pub actor: String,
    pub vin: Option<String>,
    pub sale_id: Option<String>,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CashLedgerEntry> for ActiveModel {
    fn from(entry: &CashLedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            driver_id: ActiveValue::Set(entry.driver_id.clone()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            amount_cents: ActiveValue::Set(entry.amount_cents),
            reason: ActiveValue::Set(entry.reason.clone()),
            actor: ActiveValue::Set(entry.actor.clone()),
            vin: ActiveValue::Set(entry.vin.clone()),
            sale_id: ActiveValue::Set(entry.sale_id.map(|id| id.to_string())),
            recorded_at: ActiveValue::Set(entry.recorded_at),
        }
    }
}

impl TryFrom<Model> for CashLedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crate::util::parse_uuid(&model.id, "ledger entry")?,
            driver_id: model.driver_id,
            kind: LedgerEntryKind::try_from(model.kind.as_str())?,
            amount_cents: model.amount_cents,
            reason: model.reason,
            actor: model.actor,
            vin: model.vin,
            sale_id: model.sale_id.and_then(|s| Uuid::parse_str(&s).ok()),
            recorded_at: model.recorded_at,
        })
    }
}
