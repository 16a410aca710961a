use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use crate::db::sessions::{SessionRow, SessionSummary};
use crate::error::{AppError, AppResult};
use crate::extract::{self, DashboardMemo};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One stored session plus the memo fields re-extracted from its result.
/// Extraction is pure, so recomputing on read always matches what the
/// evaluation saw.
#[derive(Debug, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: SessionRow,
    pub memo: DashboardMemo,
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<SessionSummary>>> {
    let limit = params.limit.unwrap_or(20);
    let offset = params.offset.unwrap_or(0);

    let sessions = crate::db::sessions::list_sessions(&state.pool, limit, offset)
        .await
        .map_err(AppError::Database)?;

    Ok(Json(sessions))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionDetail>> {
    let session = crate::db::sessions::get_session(&state.pool, id)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;

    let memo = extract::build_memo(
        section_text(&session.result, "riskScore"),
        section_text(&session.result, "tamData"),
        section_text(&session.result, "industryNews"),
    );

    Ok(Json(SessionDetail { session, memo }))
}

fn section_text<'a>(result: &'a Value, section: &str) -> &'a str {
    result
        .get(section)
        .and_then(|s| s.get("text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
}
