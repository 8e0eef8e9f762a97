//! Vehicle purchase records.
//!
//! A `VehicleRecord` is created once at purchase time and is logically
//! immutable afterwards, except for its disposition (changed exactly once
//! per sale/scrap event, never reverted) and the back-reference to the
//! sale record that caused the change.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Final legal/physical outcome of a purchased vehicle.
///
/// `Tbd` is the in-inventory default; the other four are the allowed sale
/// codes. Transitions only move forward: `tbd -> {sold, scrapped,
/// exported, parts}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Tbd,
    Sold,
    Scrapped,
    Exported,
    Parts,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tbd => "tbd",
            Self::Sold => "sold",
            Self::Scrapped => "scrapped",
            Self::Exported => "exported",
            Self::Parts => "parts",
        }
    }

    /// Returns `true` for the four codes a sale may carry (everything but
    /// `tbd`).
    pub fn is_sale_code(self) -> bool {
        !matches!(self, Self::Tbd)
    }
}

impl TryFrom<&str> for Disposition {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "tbd" => Ok(Self::Tbd),
            "sold" => Ok(Self::Sold),
            "scrapped" => Ok(Self::Scrapped),
            "exported" => Ok(Self::Exported),
            "parts" => Ok(Self::Parts),
            other => Err(EngineError::Validation(format!(
                "invalid disposition: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: Uuid,
    /// 17-character VIN. Not unique across records: the same vehicle can
    /// be re-purchased after a resale.
    pub vin: String,
    pub year: Option<i32>,
    pub make: Option<String>,
    pub seller_name: String,
    pub seller_address: Option<String>,
    pub seller_phone: Option<String>,
    pub purchase_price_cents: i64,
    pub purchase_date: NaiveDate,
    /// Driver who acquired the vehicle (cash drawer owner).
    pub driver_id: String,
    pub yard_id: String,
    pub disposition: Disposition,
    /// Set while the vehicle is under an impound or lien hold. Independent
    /// of the disposition.
    pub impound_or_lien: bool,
    /// Back-reference to the sale record that changed the disposition.
    pub sale_record_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicle_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub vin: String,
    pub year: Option<i32>,
    pub make: Option<String>,
    pub seller_name: String,
    pub seller_address: Option<String>,
    pub seller_phone: Option<String>,
    pub purchase_price_cents: i64,
    pub purchase_date: Date,
    pub driver_id: String,
    pub yard_id: String,
    pub disposition: String,
    pub impound_or_lien: bool,
    pub sale_record_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sales::Entity")]
    Sales,
    #[sea_orm(has_many = "super::holds::Entity")]
    Holds,
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl Related<super::holds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Holds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&VehicleRecord> for ActiveModel {
    fn from(record: &VehicleRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            vin: ActiveValue::Set(record.vin.clone()),
            year: ActiveValue::Set(record.year),
            make: ActiveValue::Set(record.make.clone()),
            seller_name: ActiveValue::Set(record.seller_name.clone()),
            seller_address: ActiveValue::Set(record.seller_address.clone()),
            seller_phone: ActiveValue::Set(record.seller_phone.clone()),
            purchase_price_cents: ActiveValue::Set(record.purchase_price_cents),
            purchase_date: ActiveValue::Set(record.purchase_date),
            driver_id: ActiveValue::Set(record.driver_id.clone()),
            yard_id: ActiveValue::Set(record.yard_id.clone()),
            disposition: ActiveValue::Set(record.disposition.as_str().to_string()),
            impound_or_lien: ActiveValue::Set(record.impound_or_lien),
            sale_record_id: ActiveValue::Set(record.sale_record_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(record.created_at),
        }
    }
}

impl TryFrom<Model> for VehicleRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crate::util::parse_uuid(&model.id, "vehicle")?,
            vin: model.vin,
            year: model.year,
            make: model.make,
            seller_name: model.seller_name,
            seller_address: model.seller_address,
            seller_phone: model.seller_phone,
            purchase_price_cents: model.purchase_price_cents,
            purchase_date: model.purchase_date,
            driver_id: model.driver_id,
            yard_id: model.yard_id,
            disposition: Disposition::try_from(model.disposition.as_str())?,
            impound_or_lien: model.impound_or_lien,
            sale_record_id: model
                .sale_record_id
                .and_then(|s| Uuid::parse_str(&s).ok()),
            created_at: model.created_at,
        })
    }
}

/// Validate and construct a new record in inventory (`tbd`).
pub(crate) fn new_record(
    vin: String,
    year: Option<i32>,
    make: Option<String>,
    seller_name: String,
    seller_address: Option<String>,
    seller_phone: Option<String>,
    purchase_price_cents: i64,
    purchase_date: NaiveDate,
    driver_id: String,
    yard_id: String,
    created_at: DateTime<Utc>,
) -> ResultEngine<VehicleRecord> {
    crate::util::require_non_negative(purchase_price_cents, "purchase price")?;
    Ok(VehicleRecord {
        id: Uuid::new_v4(),
        vin,
        year,
        make,
        seller_name,
        seller_address,
        seller_phone,
        purchase_price_cents,
        purchase_date,
        driver_id,
        yard_id,
        disposition: Disposition::Tbd,
        impound_or_lien: false,
        sale_record_id: None,
        created_at,
    })
}
