//! Admin handlers for the access log

use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::models::{AccessLogEntry, ClearLogsResponse};
use crate::state::AppState;

use super::AuthenticatedUser;

/// How many trailing entries the log listing returns.
const LOG_TAIL: usize = 50;

/// GET /api/admin/access-logs - Most recent access log entries
pub async fn access_logs(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Json<Vec<AccessLogEntry>> {
    Json(state.auth_service.access_log().recent(LOG_TAIL).await)
}

/// POST /api/admin/access-logs/clear - Empty the access log
pub async fn clear_access_logs(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> ApiResult<Json<ClearLogsResponse>> {
    state.auth_service.access_log().clear().await?;
    tracing::info!("Access logs cleared");

    Ok(Json(ClearLogsResponse { ok: true }))
}
