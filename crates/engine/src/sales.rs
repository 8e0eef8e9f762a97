//! Outgoing disposition records.
//!
//! A `SaleRecord` captures one outgoing event (explicit sale, scrap,
//! export, or automatic post-hold transfer). It is created once, never
//! mutated, and deleted only together with its vehicle record. Writing a
//! sale always updates the referenced vehicle's disposition to match.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Disposition, EngineError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: Uuid,
    /// The vehicle record this sale disposes of.
    pub original_transaction_id: Uuid,
    pub buyer_name: String,
    pub buyer_address: Option<String>,
    pub buyer_phone: Option<String>,
    pub buyer_license: Option<String>,
    pub sale_price_cents: i64,
    /// Cash actually collected. Advisory; not enforced equal to the
    /// nominal sale price.
    pub received_cents: Option<i64>,
    pub sale_date: NaiveDate,
    pub disposition: Disposition,
    pub notes: Option<String>,
    pub recorded_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicle_sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub original_transaction_id: String,
    pub buyer_name: String,
    pub buyer_address: Option<String>,
    pub buyer_phone: Option<String>,
    pub buyer_license: Option<String>,
    pub sale_price_cents: i64,
    pub received_cents: Option<i64>,
    pub sale_date: Date,
    pub disposition: String,
    pub notes: Option<String>,
    pub recorded_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicles::Entity",
        from = "Column::OriginalTransactionId",
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

impl From<&SaleRecord> for ActiveModel {
    fn from(sale: &SaleRecord) -> Self {
        Self {
            id: ActiveValue::Set(sale.id.to_string()),
            original_transaction_id: ActiveValue::Set(sale.original_transaction_id.to_string()),
            buyer_name: ActiveValue::Set(sale.buyer_name.clone()),
            buyer_address: ActiveValue::Set(sale.buyer_address.clone()),
            buyer_phone: ActiveValue::Set(sale.buyer_phone.clone()),
            buyer_license: ActiveValue::Set(sale.buyer_license.clone()),
            sale_price_cents: ActiveValue::Set(sale.sale_price_cents),
            received_cents: ActiveValue::Set(sale.received_cents),
            sale_date: ActiveValue::Set(sale.sale_date),
            disposition: ActiveValue::Set(sale.disposition.as_str().to_string()),
            notes: ActiveValue::Set(sale.notes.clone()),
            recorded_by: ActiveValue::Set(sale.recorded_by.clone()),
            created_at: ActiveValue::Set(sale.created_at),
        }
    }
}

impl TryFrom<Model> for SaleRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crate::util::parse_uuid(&model.id, "sale")?,
            original_transaction_id: crate::util::parse_uuid(
                &model.original_transaction_id,
                "vehicle",
            )?,
            buyer_name: model.buyer_name,
            buyer_address: model.buyer_address,
            buyer_phone: model.buyer_phone,
            buyer_license: model.buyer_license,
            sale_price_cents: model.sale_price_cents,
            received_cents: model.received_cents,
            sale_date: model.sale_date,
            disposition: Disposition::try_from(model.disposition.as_str())?,
            notes: model.notes,
            recorded_by: model.recorded_by,
            created_at: model.created_at,
        })
    }
}
