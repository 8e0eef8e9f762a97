//! Impound/lien holds.
//!
//! A hold temporarily prevents normal sale of a vehicle. State machine:
//!
//! ```text
//! pending -> processed -> { released | auctioned | auto_transferred }
//! ```
//!
//! `released`, `auctioned` and `auto_transferred` are terminal. The
//! `auto_transferred` state is reached only through the reconciliation
//! sweep, never by an admin edit.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Days a processed hold waits before the automatic transfer.
pub const HOLD_PERIOD_DAYS: i64 = 21;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldStatus {
    Pending,
    Processed,
    Released,
    Auctioned,
    AutoTransferred,
}

impl HoldStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Released => "released",
            Self::Auctioned => "auctioned",
            Self::AutoTransferred => "auto_transferred",
        }
    }

    /// A hold in a non-terminal state still blocks the normal sale path.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Processed)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }

    /// Admin-editable transitions. The sweep owns
    /// `processed -> auto_transferred` and is not listed here.
    pub fn can_transition_to(self, next: HoldStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processed)
                | (Self::Processed, Self::Released)
                | (Self::Processed, Self::Auctioned)
        )
    }
}

impl TryFrom<&str> for HoldStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "processed" => Ok(Self::Processed),
            "released" => Ok(Self::Released),
            "auctioned" => Ok(Self::Auctioned),
            "auto_transferred" => Ok(Self::AutoTransferred),
            other => Err(EngineError::Validation(format!(
                "invalid hold status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpoundHold {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub status: HoldStatus,
    pub impound_date: NaiveDate,
    /// Assigned as `impound_date + 21 days` when the hold is processed
    /// without an explicit date.
    pub release_date: Option<NaiveDate>,
    pub auction_date: Option<NaiveDate>,
    /// Who the vehicle was released to. Advisory for legal recordkeeping;
    /// absence does not block the transition.
    pub released_to: Option<String>,
    pub storage_location: Option<String>,
    pub authority: Option<String>,
    pub fees_cents: i64,
    /// Compare-and-set guard for the sweep: once stamped, the hold is
    /// handled and re-running the sweep must not touch it again.
    pub auto_transfer_date: Option<NaiveDate>,
    pub transfer_sale_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "impound_holds")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub vehicle_id: String,
    pub status: String,
    pub impound_date: Date,
    pub release_date: Option<Date>,
    pub auction_date: Option<Date>,
    pub released_to: Option<String>,
    pub storage_location: Option<String>,
    pub authority: Option<String>,
    pub fees_cents: i64,
    pub auto_transfer_date: Option<Date>,
    pub transfer_sale_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicles::Entity",
        from = "Column::VehicleId",
        to = "super::vehicles::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Vehicles,
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ImpoundHold> for ActiveModel {
    fn from(hold: &ImpoundHold) -> Self {
        Self {
            id: ActiveValue::Set(hold.id.to_string()),
            vehicle_id: ActiveValue::Set(hold.vehicle_id.to_string()),
            status: ActiveValue::Set(hold.status.as_str().to_string()),
            impound_date: ActiveValue::Set(hold.impound_date),
            release_date: ActiveValue::Set(hold.release_date),
            auction_date: ActiveValue::Set(hold.auction_date),
            released_to: ActiveValue::Set(hold.released_to.clone()),
            storage_location: ActiveValue::Set(hold.storage_location.clone()),
            authority: ActiveValue::Set(hold.authority.clone()),
            fees_cents: ActiveValue::Set(hold.fees_cents),
            auto_transfer_date: ActiveValue::Set(hold.auto_transfer_date),
            transfer_sale_id: ActiveValue::Set(hold.transfer_sale_id.map(|id| id.to_string())),
        }
    }
}

impl TryFrom<Model> for ImpoundHold {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crate::util::parse_uuid(&model.id, "hold")?,
            vehicle_id: crate::util::parse_uuid(&model.vehicle_id, "vehicle")?,
            status: HoldStatus::try_from(model.status.as_str())?,
            impound_date: model.impound_date,
            release_date: model.release_date,
            auction_date: model.auction_date,
            released_to: model.released_to,
            storage_location: model.storage_location,
            authority: model.authority,
            fees_cents: model.fees_cents,
            auto_transfer_date: model.auto_transfer_date,
            transfer_sale_id: model
                .transfer_sale_id
                .and_then(|s| Uuid::parse_str(&s).ok()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_follow_state_machine() {
        assert!(HoldStatus::Pending.can_transition_to(HoldStatus::Processed));
        assert!(HoldStatus::Processed.can_transition_to(HoldStatus::Released));
        assert!(HoldStatus::Processed.can_transition_to(HoldStatus::Auctioned));

        assert!(!HoldStatus::Pending.can_transition_to(HoldStatus::Released));
        assert!(!HoldStatus::Processed.can_transition_to(HoldStatus::AutoTransferred));
        assert!(!HoldStatus::Released.can_transition_to(HoldStatus::Processed));
        assert!(!HoldStatus::AutoTransferred.can_transition_to(HoldStatus::Released));
    }

    #[test]
    fn terminal_states() {
        assert!(HoldStatus::Pending.is_active());
        assert!(HoldStatus::Processed.is_active());
        assert!(HoldStatus::Released.is_terminal());
        assert!(HoldStatus::Auctioned.is_terminal());
        assert!(HoldStatus::AutoTransferred.is_terminal());
    }
}
