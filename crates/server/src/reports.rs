//! Compliance report endpoints: pending list, submission marking and the
//! NMVTIS CSV batch download.

use api_types::report::{MarkSubmitted, NmvtisBatchQuery, ReportListResponse, ReportView};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::ComplianceReportEntry;

use crate::{ServerError, server::ServerState, user};

fn view(entry: ComplianceReportEntry) -> ReportView {
    ReportView {
        id: entry.id,
        vehicle_id: entry.vehicle_id,
        sale_id: entry.sale_id,
        kind: entry.kind.as_str().to_string(),
        status: entry.status.as_str().to_string(),
        due_date: entry.due_date,
        submitted_at: entry.submitted_at,
        created_at: entry.created_at,
    }
}

pub async fn pending(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ReportListResponse>, ServerError> {
    let reports = state.engine.list_pending_reports().await?;
    Ok(Json(ReportListResponse {
        reports: reports.into_iter().map(view).collect(),
    }))
}

pub async fn mark_submitted(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<MarkSubmitted>,
) -> Result<StatusCode, ServerError> {
    state.engine.mark_reports_submitted(&payload.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn nmvtis_batch(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<NmvtisBatchQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let entries = state.engine.list_pending_reports().await?;
    let csv = state
        .engine
        .build_nmvtis_batch(&query.yard_id, &entries)
        .await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"nmvtis_batch.csv\"".to_string(),
            ),
        ],
        csv,
    ))
}
