use anyhow::{Context, Result};
use ld_schemas::{DispositionStatus, TriggeredBy};
use sqlx::{Executor, Postgres};

pub async fn insert_history<'e, E>(
    exec: E,
    contact_email: &str,
    contact_client_id: &str,
    previous_status: Option<DispositionStatus>,
    new_status: DispositionStatus,
    reason: Option<&str>,
    triggered_by: TriggeredBy,
    campaign_id: Option<&str>,
    metadata: &serde_json::Value,
) -> Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO disposition_history (
            contact_email, contact_client_id, previous_status, new_status,
            transition_reason, triggered_by, campaign_id, metadata
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(contact_email)
    .bind(contact_client_id)
    .bind(previous_status.map(|s| s.as_str()))
    .bind(new_status.as_str())
    .bind(reason)
    .bind(triggered_by.as_str())
    .bind(campaign_id)
    .bind(metadata)
    .execute(exec)
    .await
    .context("insert_history failed")?;

    Ok(())
}

pub async fn get_contact_history<'e, E>(
    exec: E,
    email: &str,
    client_id: &str,
    limit: i64,
) -> Result<Vec<ld_schemas::DispositionHistory>>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query(
        "SELECT * FROM disposition_history WHERE contact_email = $1 AND contact_client_id = $2 \
         ORDER BY created_at DESC LIMIT $3",
    )
    .bind(email)
    .bind(client_id)
    .bind(limit)
    .fetch_all(exec)
    .await
    .context("get_contact_history failed")?;

    rows.iter().map(crate::rows::row_to_history).collect()
}
