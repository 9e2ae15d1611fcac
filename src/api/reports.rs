use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CreateReportRequest, CurrentUser, ReportDto};
use crate::services::NewReport;

/// POST /reports
/// Any authenticated user; the report is owned by the caller.
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    CurrentUser(author): CurrentUser,
    Json(payload): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReportDto>>), ApiError> {
    let report = state
        .reports()
        .create(
            &author,
            NewReport {
                category: payload.category,
                message: payload.message,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ReportDto::from(report))),
    ))
}

/// GET /reports
/// Admins get every report, staff only their own.
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    CurrentUser(viewer): CurrentUser,
) -> Result<Json<ApiResponse<Vec<ReportDto>>>, ApiError> {
    let reports = state.reports().list(&viewer).await?;
    let dtos: Vec<ReportDto> = reports.into_iter().map(ReportDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}
