//! Yard-level configuration.
//!
//! One row per yard: dismantler credentials for NMVTIS reporting and the
//! designated downstream salvage recipient used by the post-hold
//! automatic transfer. The NMVTIS id/PIN on export rows always come from
//! here, never from per-vehicle data.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YardSettings {
    pub yard_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub dismantler_license: Option<String>,
    pub nmvtis_id: String,
    pub nmvtis_pin: String,
    /// Fixed buyer identity for automatic post-hold transfers.
    pub transfer_recipient_name: String,
    pub transfer_recipient_address: Option<String>,
    pub transfer_recipient_license: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "yard_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub yard_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub dismantler_license: Option<String>,
    pub nmvtis_id: String,
    pub nmvtis_pin: String,
    pub transfer_recipient_name: String,
    pub transfer_recipient_address: Option<String>,
    pub transfer_recipient_license: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&YardSettings> for ActiveModel {
    fn from(settings: &YardSettings) -> Self {
        Self {
            yard_id: ActiveValue::Set(settings.yard_id.clone()),
            name: ActiveValue::Set(settings.name.clone()),
            address: ActiveValue::Set(settings.address.clone()),
            phone: ActiveValue::Set(settings.phone.clone()),
            dismantler_license: ActiveValue::Set(settings.dismantler_license.clone()),
            nmvtis_id: ActiveValue::Set(settings.nmvtis_id.clone()),
            nmvtis_pin: ActiveValue::Set(settings.nmvtis_pin.clone()),
            transfer_recipient_name: ActiveValue::Set(settings.transfer_recipient_name.clone()),
            transfer_recipient_address: ActiveValue::Set(
                settings.transfer_recipient_address.clone(),
            ),
            transfer_recipient_license: ActiveValue::Set(
                settings.transfer_recipient_license.clone(),
            ),
        }
    }
}

impl From<Model> for YardSettings {
    fn from(model: Model) -> Self {
        Self {
            yard_id: model.yard_id,
            name: model.name,
            address: model.address,
            phone: model.phone,
            dismantler_license: model.dismantler_license,
            nmvtis_id: model.nmvtis_id,
            nmvtis_pin: model.nmvtis_pin,
            transfer_recipient_name: model.transfer_recipient_name,
            transfer_recipient_address: model.transfer_recipient_address,
            transfer_recipient_license: model.transfer_recipient_license,
        }
    }
}
