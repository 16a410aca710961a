use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// One persisted evaluation run. Sessions are written once at evaluation time
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    pub id: Uuid,
    pub startup_name: String,
    pub industry: String,
    pub funding_stage: String,
    pub intake: serde_json::Value,
    pub result: serde_json::Value,
    pub confidence: i32,
    pub risk_level: String,
    pub trace_id: Option<String>,
    pub evaluation_duration_ms: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The slim shape the session-history table renders.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub startup_name: String,
    pub industry: String,
    pub funding_stage: String,
    pub confidence: i32,
    pub risk_level: String,
    pub created_at: Option<DateTime<Utc>>,
}

pub struct InsertSession<'a> {
    pub id: Uuid,
    pub startup_name: &'a str,
    pub industry: &'a str,
    pub funding_stage: &'a str,
    pub intake: &'a serde_json::Value,
    pub result: &'a serde_json::Value,
    pub confidence: i32,
    pub risk_level: &'a str,
    pub trace_id: Option<&'a str>,
    pub evaluation_duration_ms: i32,
}

#[tracing::instrument(name = "db.sessions.insert", skip_all)]
pub async fn insert_session(pool: &PgPool, params: &InsertSession<'_>) -> Result<Uuid, sqlx::Error> {
    let row: (Uuid,) = sqlx::query_as(
        "INSERT INTO sessions \
         (id, startup_name, industry, funding_stage, intake, result, \
          confidence, risk_level, trace_id, evaluation_duration_ms) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING id",
    )
    .bind(params.id)
    .bind(params.startup_name)
    .bind(params.industry)
    .bind(params.funding_stage)
    .bind(params.intake)
    .bind(params.result)
    .bind(params.confidence)
    .bind(params.risk_level)
    .bind(params.trace_id)
    .bind(params.evaluation_duration_ms)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

#[tracing::instrument(name = "db.sessions.get", skip(pool))]
pub async fn get_session(pool: &PgPool, id: Uuid) -> Result<Option<SessionRow>, sqlx::Error> {
    sqlx::query_as::<_, SessionRow>(
        "SELECT id, startup_name, industry, funding_stage, intake, result, \
         confidence, risk_level, trace_id, evaluation_duration_ms, created_at \
         FROM sessions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

#[tracing::instrument(name = "db.sessions.list", skip(pool))]
pub async fn list_sessions(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<SessionSummary>, sqlx::Error> {
    sqlx::query_as::<_, SessionSummary>(
        "SELECT id, startup_name, industry, funding_stage, confidence, \
         risk_level, created_at \
         FROM sessions ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}
