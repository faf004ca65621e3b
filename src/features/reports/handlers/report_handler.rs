use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::reports::dtos::{
    NearbyQuery, NearbyReportDto, ProcessingOutcomeDto, ReportResponseDto, StaleReportsQuery,
    SubmitReportResponseDto, UpdateReportStatusDto,
};
use crate::features::reports::models::ReportSubmission;
use crate::features::reports::services::{ReportPipeline, ReportService};
use crate::shared::constants::{DEFAULT_RECENT_REPORTS_LIMIT, DEFAULT_USER_REPORTS_LIMIT};
use crate::shared::geo::GeoPoint;
use crate::shared::types::{ApiResponse, LimitQuery, Meta};

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
    pub pipeline: Arc<ReportPipeline>,
}

/// Submit a new report
///
/// The report is stored as `pending` and triaged in the background. Any
/// priority or department sent by the client is ignored.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = ReportSubmission,
    responses(
        (status = 201, description = "Report accepted", body = ApiResponse<SubmitReportResponseDto>),
        (status = 400, description = "Invalid report data"),
        (status = 503, description = "Report processing unavailable")
    ),
    tag = "reports"
)]
pub async fn submit_report(
    State(state): State<ReportState>,
    AppJson(submission): AppJson<ReportSubmission>,
) -> Result<(StatusCode, Json<ApiResponse<SubmitReportResponseDto>>)> {
    let report = state.report_service.submit(&submission).await?;

    let dto = SubmitReportResponseDto {
        report_id: report.id,
        status: report.status,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(dto),
            Some("Report submitted successfully".to_string()),
            None,
        )),
    ))
}

/// List the most recent reports
#[utoipa::path(
    get,
    path = "/api/reports",
    params(LimitQuery),
    responses(
        (status = 200, description = "Recent reports", body = ApiResponse<Vec<ReportResponseDto>>)
    ),
    tag = "reports"
)]
pub async fn list_recent_reports(
    State(state): State<ReportState>,
    AppQuery(query): AppQuery<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = state
        .report_service
        .list_recent(query.resolve(DEFAULT_RECENT_REPORTS_LIMIT))
        .await?;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();
    let meta = Meta::of_len(dtos.len());
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}

/// List reports near a point, nearest first
#[utoipa::path(
    get,
    path = "/api/reports/nearby",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Nearby reports", body = ApiResponse<Vec<NearbyReportDto>>),
        (status = 400, description = "Invalid coordinates or radius")
    ),
    tag = "reports"
)]
pub async fn list_nearby_reports(
    State(state): State<ReportState>,
    AppQuery(query): AppQuery<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<NearbyReportDto>>>> {
    let limit = LimitQuery { limit: query.limit }.resolve(DEFAULT_RECENT_REPORTS_LIMIT);
    let nearby = state
        .report_service
        .list_nearby(GeoPoint::new(query.lat, query.lon), query.radius_km, limit)
        .await?;
    let dtos: Vec<NearbyReportDto> = nearby.into_iter().map(|n| n.into()).collect();
    let meta = Meta::of_len(dtos.len());
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}

/// Get report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Update report status
///
/// Status only moves forward: pending, in_progress, resolved.
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Status cannot move backwards")
    ),
    tag = "reports"
)]
pub async fn update_report_status(
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = state.report_service.update_status(id, &dto).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// List reports filed by a user, newest first
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/reports",
    params(
        ("user_id" = String, Path, description = "User ID"),
        LimitQuery
    ),
    responses(
        (status = 200, description = "User's reports", body = ApiResponse<Vec<ReportResponseDto>>)
    ),
    tag = "reports"
)]
pub async fn list_user_reports(
    State(state): State<ReportState>,
    Path(user_id): Path<String>,
    AppQuery(query): AppQuery<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = state
        .report_service
        .list_by_user(&user_id, query.resolve(DEFAULT_USER_REPORTS_LIMIT))
        .await?;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();
    let meta = Meta::of_len(dtos.len());
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}

/// Run triage for a stored report (internal)
///
/// Same handler as the "report created" trigger, using the stored report
/// fields as the submission.
#[utoipa::path(
    post,
    path = "/api/internal/reports/{id}/process",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report processed", body = ApiResponse<ProcessingOutcomeDto>),
        (status = 400, description = "Stored report is invalid"),
        (status = 401, description = "Missing or invalid internal token"),
        (status = 404, description = "Report not found"),
        (status = 502, description = "Urgent notification failed")
    ),
    security(("internal_token" = [])),
    tag = "internal"
)]
pub async fn process_report(
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProcessingOutcomeDto>>> {
    let report = state.report_service.get_by_id(id).await?;

    let outcome = state
        .pipeline
        .on_report_created(id, &report.to_submission())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(outcome.into()),
        Some("Report processed successfully".to_string()),
        None,
    )))
}

/// List reports older than a number of days (internal)
///
/// Oldest first. Used by the external retention job.
#[utoipa::path(
    get,
    path = "/api/internal/reports/stale",
    params(StaleReportsQuery),
    responses(
        (status = 200, description = "Stale reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 400, description = "Invalid age"),
        (status = 401, description = "Missing or invalid internal token")
    ),
    security(("internal_token" = [])),
    tag = "internal"
)]
pub async fn list_stale_reports(
    State(state): State<ReportState>,
    AppQuery(query): AppQuery<StaleReportsQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    if query.older_than_days == 0 {
        return Err(AppError::BadRequest(
            "older_than_days must be at least 1".to_string(),
        ));
    }

    let cutoff = Utc::now() - Duration::days(i64::from(query.older_than_days));
    let reports = state.report_service.list_older_than(cutoff).await?;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();
    let meta = Meta::of_len(dtos.len());
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}
