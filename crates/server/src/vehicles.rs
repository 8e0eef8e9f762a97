//! Vehicle purchase record endpoints.

use api_types::vehicle::{
    VehicleListQuery, VehicleListResponse, VehicleNew, VehicleView, VinSearchQuery,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{VehicleNewCmd, VehicleRecord};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn view(record: VehicleRecord) -> VehicleView {
    VehicleView {
        id: record.id,
        vin: record.vin,
        year: record.year,
        make: record.make,
        seller_name: record.seller_name,
        seller_address: record.seller_address,
        seller_phone: record.seller_phone,
        purchase_price_cents: record.purchase_price_cents,
        purchase_date: record.purchase_date,
        driver_id: record.driver_id,
        yard_id: record.yard_id,
        disposition: record.disposition.as_str().to_string(),
        impound_or_lien: record.impound_or_lien,
        sale_record_id: record.sale_record_id,
        created_at: record.created_at,
    }
}

pub async fn create(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<VehicleNew>,
) -> Result<(StatusCode, Json<VehicleView>), ServerError> {
    let mut cmd = VehicleNewCmd::new(
        payload.vin,
        payload.seller_name,
        payload.purchase_price_cents,
        payload.purchase_date,
        payload.driver_id,
        payload.yard_id,
    );
    cmd.year = payload.year;
    cmd.make = payload.make;
    cmd.seller_address = payload.seller_address;
    cmd.seller_phone = payload.seller_phone;

    let record = state.engine.create_vehicle_record(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(record))))
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<VehicleListQuery>,
) -> Result<Json<VehicleListResponse>, ServerError> {
    let vehicles = state.engine.list_vehicles_by_yard(&query.yard_id).await?;
    Ok(Json(VehicleListResponse {
        vehicles: vehicles.into_iter().map(view).collect(),
    }))
}

pub async fn search(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<VinSearchQuery>,
) -> Result<Json<VehicleListResponse>, ServerError> {
    let vehicles = state.engine.find_by_vin_fragment(&query.vin).await?;
    Ok(Json(VehicleListResponse {
        vehicles: vehicles.into_iter().map(view).collect(),
    }))
}

pub async fn available(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<VehicleListQuery>,
) -> Result<Json<VehicleListResponse>, ServerError> {
    let vehicles = state.engine.list_available(&query.yard_id).await?;
    Ok(Json(VehicleListResponse {
        vehicles: vehicles.into_iter().map(view).collect(),
    }))
}

pub async fn remove(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_vehicle_record(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
