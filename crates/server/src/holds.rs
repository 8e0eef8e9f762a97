//! Impound/lien hold endpoints.

use api_types::hold::{HoldNew, HoldStatusUpdate, HoldView, SweepResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{HoldNewCmd, HoldStatus, HoldStatusCmd, ImpoundHold};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn view(hold: ImpoundHold) -> HoldView {
    HoldView {
        id: hold.id,
        vehicle_id: hold.vehicle_id,
        status: hold.status.as_str().to_string(),
        impound_date: hold.impound_date,
        release_date: hold.release_date,
        auction_date: hold.auction_date,
        released_to: hold.released_to,
        storage_location: hold.storage_location,
        authority: hold.authority,
        fees_cents: hold.fees_cents,
        auto_transfer_date: hold.auto_transfer_date,
        transfer_sale_id: hold.transfer_sale_id,
    }
}

pub async fn create(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<HoldNew>,
) -> Result<(StatusCode, Json<HoldView>), ServerError> {
    let mut cmd = HoldNewCmd::new(payload.vehicle_id, payload.impound_date);
    cmd.release_date = payload.release_date;
    cmd.storage_location = payload.storage_location;
    cmd.authority = payload.authority;
    cmd.fees_cents = payload.fees_cents.unwrap_or(0);

    let hold = state.engine.create_hold(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(hold))))
}

pub async fn update_status(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<HoldStatusUpdate>,
) -> Result<Json<HoldView>, ServerError> {
    let status = HoldStatus::try_from(payload.status.as_str())?;
    let mut cmd = HoldStatusCmd::new(id, status);
    cmd.release_date = payload.release_date;
    cmd.auction_date = payload.auction_date;
    cmd.released_to = payload.released_to;

    let hold = state.engine.update_hold_status(cmd).await?;
    Ok(Json(view(hold)))
}

pub async fn sweep(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SweepResponse>, ServerError> {
    let transferred = state.engine.run_auto_transfer_sweep().await?;
    Ok(Json(SweepResponse { transferred }))
}

pub async fn remove(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_hold(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
