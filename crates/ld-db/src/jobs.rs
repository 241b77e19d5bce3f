//! The bridge intake queue (`lead_pull_jobs`). Owned by the external bridge
//! collaborator; the store only claims and marks rows — it never interprets
//! `search_criteria` itself (see `bridge::map_job_to_waterfall_request`).

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LeadPullJob {
    pub id: Uuid,
    pub client_id: String,
    pub suggestion_id: Option<String>,
    pub volume: i64,
    pub channel: String,
    pub enable_external: bool,
    pub max_external_credits: f64,
    pub search_criteria: serde_json::Value,
    pub status: String,
}

fn row_to_job(row: &sqlx::postgres::PgRow) -> Result<LeadPullJob> {
    Ok(LeadPullJob {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        suggestion_id: row.try_get("suggestion_id")?,
        volume: row.try_get("volume")?,
        channel: row.try_get("channel")?,
        enable_external: row.try_get("enable_external")?,
        max_external_credits: row.try_get("max_external_credits")?,
        search_criteria: row.try_get("search_criteria")?,
        status: row.try_get("status")?,
    })
}

/// Claims the oldest pending job with `FOR UPDATE SKIP LOCKED`, so that
/// multiple bridge-worker processes polling concurrently never double-claim
/// the same row.
pub async fn claim_pending_job(pool: &PgPool) -> Result<Option<LeadPullJob>> {
    let now = Utc::now();
    let row = sqlx::query(
        r#"
        UPDATE lead_pull_jobs
        SET status = 'processing', started_at = $1
        WHERE id = (
            SELECT id FROM lead_pull_jobs
            WHERE status = 'pending'
            ORDER BY created_at ASC
            LIMIT 1
            FOR UPDATE SKIP LOCKED
        )
        RETURNING *
        "#,
    )
    .bind(now)
    .fetch_optional(pool)
    .await
    .context("claim_pending_job failed")?;

    row.as_ref().map(row_to_job).transpose()
}

pub async fn mark_job_completed(pool: &PgPool, id: Uuid, result: &serde_json::Value) -> Result<()> {
    sqlx::query(
        "UPDATE lead_pull_jobs SET status = 'completed', completed_at = $1, result_data = $2 WHERE id = $3",
    )
    .bind(Utc::now())
    .bind(result)
    .bind(id)
    .execute(pool)
    .await
    .context("mark_job_completed failed")?;

    Ok(())
}

pub async fn mark_job_failed(pool: &PgPool, id: Uuid, error_message: &str) -> Result<()> {
    sqlx::query(
        "UPDATE lead_pull_jobs SET status = 'failed', completed_at = $1, error_message = $2 WHERE id = $3",
    )
    .bind(Utc::now())
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await
    .context("mark_job_failed failed")?;

    Ok(())
}
