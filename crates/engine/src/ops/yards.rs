use sea_orm::{ActiveValue, prelude::*};

use crate::{EngineError, ResultEngine, YardSettings, yards};

use super::{Engine, normalize_required_text};

impl Engine {
    /// Create or replace the settings row for a yard.
    ///
    /// The NMVTIS credentials and the transfer recipient are required:
    /// both the batch export and the hold sweep refuse to run without
    /// them.
    pub async fn upsert_yard_settings(&self, settings: YardSettings) -> ResultEngine<YardSettings> {
        let settings = YardSettings {
            yard_id: normalize_required_text(&settings.yard_id, "yard id")?,
            name: normalize_required_text(&settings.name, "yard name")?,
            nmvtis_id: normalize_required_text(&settings.nmvtis_id, "nmvtis id")?,
            nmvtis_pin: normalize_required_text(&settings.nmvtis_pin, "nmvtis pin")?,
            transfer_recipient_name: normalize_required_text(
                &settings.transfer_recipient_name,
                "transfer recipient name",
            )?,
            ..settings
        };

        let existing = yards::Entity::find_by_id(settings.yard_id.clone())
            .one(&self.database)
            .await?;
        let model: yards::ActiveModel = (&settings).into();
        if existing.is_some() {
            let model = yards::ActiveModel {
                yard_id: ActiveValue::Unchanged(settings.yard_id.clone()),
                ..model
            };
            model.update(&self.database).await?;
        } else {
            model.insert(&self.database).await?;
        }
        Ok(settings)
    }

    /// Settings for one yard; `NotFound` until the yard is configured.
    pub async fn yard_settings(&self, yard_id: &str) -> ResultEngine<YardSettings> {
        let model = yards::Entity::find_by_id(yard_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("yard settings".to_string()))?;
        Ok(YardSettings::from(model))
    }
}
