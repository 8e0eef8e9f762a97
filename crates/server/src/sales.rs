//! Sale endpoints, including the MV2459 bill-of-sale download.

use api_types::sale::{SaleCreated, SaleNew, SaleView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use engine::{Disposition, SaleNewCmd, SaleRecord};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn view(sale: SaleRecord) -> SaleView {
    SaleView {
        id: sale.id,
        vehicle_id: sale.original_transaction_id,
        buyer_name: sale.buyer_name,
        buyer_address: sale.buyer_address,
        buyer_phone: sale.buyer_phone,
        buyer_license: sale.buyer_license,
        sale_price_cents: sale.sale_price_cents,
        received_cents: sale.received_cents,
        sale_date: sale.sale_date,
        disposition: sale.disposition.as_str().to_string(),
        notes: sale.notes,
        recorded_by: sale.recorded_by,
        created_at: sale.created_at,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SaleNew>,
) -> Result<(StatusCode, Json<SaleCreated>), ServerError> {
    let disposition = Disposition::try_from(payload.disposition.as_str())?;
    let mut cmd = SaleNewCmd::new(
        payload.vehicle_id,
        payload.buyer_name,
        payload.buyer_address,
        payload.buyer_phone,
        payload.sale_price_cents,
        payload.sale_date,
        disposition,
        user.username,
    );
    cmd.buyer_license = payload.buyer_license;
    cmd.received_cents = payload.received_cents;
    cmd.notes = payload.notes;

    let outcome = state.engine.record_sale(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(SaleCreated {
            sale: view(outcome.sale),
            warnings: outcome
                .warnings
                .iter()
                .map(ToString::to_string)
                .collect(),
        }),
    ))
}

pub async fn bill_of_sale(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let document = state.engine.bill_of_sale(id).await?;
    let disposition = format!("inline; filename=\"{}.html\"", document.filename);
    Ok((
        [(header::CONTENT_DISPOSITION, disposition)],
        Html(document.html),
    ))
}
