use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::activity_logs::dtos::ActivityLogResponseDto;
use crate::features::activity_logs::services::ActivityLogger;
use crate::shared::types::{ApiResponse, Meta};

/// Get the activity trail of a report, oldest first
#[utoipa::path(
    get,
    path = "/api/reports/{id}/activity",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Activity trail", body = ApiResponse<Vec<ActivityLogResponseDto>>)
    ),
    tag = "activity"
)]
pub async fn list_report_activity(
    State(logger): State<Arc<ActivityLogger>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ActivityLogResponseDto>>>> {
    let entries = logger.list_for_report(id).await?;
    let meta = Meta::of_len(entries.len());
    let dtos: Vec<ActivityLogResponseDto> = entries.into_iter().map(|e| e.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}
