use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::files::workers::{ExpirationReconciler, SweepSummary};
use crate::shared::types::ApiResponse;

/// Run one expiration sweep now
///
/// For external schedulers. Guarded by HTTP Basic auth.
#[utoipa::path(
    post,
    path = "/api/internal/cleanup",
    tag = "internal",
    responses(
        (status = 200, description = "Sweep finished", body = ApiResponse<SweepSummary>),
        (status = 401, description = "Missing or wrong credentials")
    ),
    security(
        ("cleanup_basic" = [])
    )
)]
pub async fn trigger_cleanup(
    State(reconciler): State<Arc<ExpirationReconciler>>,
) -> Result<Json<ApiResponse<SweepSummary>>, AppError> {
    let summary = reconciler.sweep().await?;

    Ok(Json(ApiResponse::success(
        Some(summary),
        Some(format!("Removed {} expired files", summary.reconciled)),
        None,
    )))
}
