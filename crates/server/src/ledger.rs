//! Cash drawer endpoints.

use api_types::ledger::{BalanceQuery, BalanceResponse, LedgerEntryNew, LedgerEntryView};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::{CashLedgerEntry, LedgerEntryCmd, LedgerEntryKind};

use crate::{ServerError, server::ServerState, user};

fn view(entry: CashLedgerEntry) -> LedgerEntryView {
    LedgerEntryView {
        id: entry.id,
        driver_id: entry.driver_id,
        kind: entry.kind.as_str().to_string(),
        amount_cents: entry.amount_cents,
        reason: entry.reason,
        actor: entry.actor,
        vin: entry.vin,
        sale_id: entry.sale_id,
        recorded_at: entry.recorded_at,
    }
}

pub async fn append(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<LedgerEntryNew>,
) -> Result<(StatusCode, Json<LedgerEntryView>), ServerError> {
    let kind = LedgerEntryKind::try_from(payload.kind.as_str())?;
    let mut cmd = LedgerEntryCmd::new(payload.driver_id, kind, payload.amount_cents, user.username);
    cmd.reason = payload.reason;
    cmd.vin = payload.vin;

    let entry = state.engine.append_ledger_entry(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(entry))))
}

pub async fn balance(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceResponse>, ServerError> {
    let balance = state.engine.driver_balance(&query.driver_id).await?;
    Ok(Json(BalanceResponse {
        driver_id: query.driver_id,
        balance_cents: balance.cents(),
        display: balance.to_string(),
    }))
}
