use anyhow::{Context, Result};
use ld_schemas::OwnershipChangeReason;
use sqlx::{Executor, Postgres};

pub async fn insert_ownership_change<'e, E>(
    exec: E,
    company_domain: &str,
    previous_owner_id: Option<&str>,
    new_owner_id: Option<&str>,
    reason: OwnershipChangeReason,
) -> Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "INSERT INTO client_ownership (company_domain, previous_owner_id, new_owner_id, change_reason) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(company_domain)
    .bind(previous_owner_id)
    .bind(new_owner_id)
    .bind(reason.as_str())
    .execute(exec)
    .await
    .context("insert_ownership_change failed")?;

    Ok(())
}

pub async fn list_owned_companies<'e, E>(
    exec: E,
    client_id: Option<&str>,
) -> Result<Vec<ld_schemas::Company>>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = match client_id {
        Some(cid) => {
            sqlx::query(
                "SELECT * FROM companies WHERE client_owner_id = $1 ORDER BY client_owned_at DESC",
            )
            .bind(cid)
            .fetch_all(exec)
            .await
        }
        None => {
            sqlx::query(
                "SELECT * FROM companies WHERE client_owner_id IS NOT NULL ORDER BY client_owned_at DESC",
            )
            .fetch_all(exec)
            .await
        }
    }
    .context("list_owned_companies failed")?;

    rows.iter().map(crate::rows::row_to_company).collect()
}
