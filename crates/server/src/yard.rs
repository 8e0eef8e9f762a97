//! Yard settings endpoints.

use api_types::yard::{YardQuery, YardSettingsDto};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::YardSettings;

use crate::{ServerError, server::ServerState, user};

fn dto(settings: YardSettings) -> YardSettingsDto {
    YardSettingsDto {
        yard_id: settings.yard_id,
        name: settings.name,
        address: settings.address,
        phone: settings.phone,
        dismantler_license: settings.dismantler_license,
        nmvtis_id: settings.nmvtis_id,
        nmvtis_pin: settings.nmvtis_pin,
        transfer_recipient_name: settings.transfer_recipient_name,
        transfer_recipient_address: settings.transfer_recipient_address,
        transfer_recipient_license: settings.transfer_recipient_license,
    }
}

pub async fn upsert(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<YardSettingsDto>,
) -> Result<Json<YardSettingsDto>, ServerError> {
    let settings = YardSettings {
        yard_id: payload.yard_id,
        name: payload.name,
        address: payload.address,
        phone: payload.phone,
        dismantler_license: payload.dismantler_license,
        nmvtis_id: payload.nmvtis_id,
        nmvtis_pin: payload.nmvtis_pin,
        transfer_recipient_name: payload.transfer_recipient_name,
        transfer_recipient_address: payload.transfer_recipient_address,
        transfer_recipient_license: payload.transfer_recipient_license,
    };
    let saved = state.engine.upsert_yard_settings(settings).await?;
    Ok(Json(dto(saved)))
}

pub async fn get(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<YardQuery>,
) -> Result<Json<YardSettingsDto>, ServerError> {
    let settings = state.engine.yard_settings(&query.yard_id).await?;
    Ok(Json(dto(settings)))
}
