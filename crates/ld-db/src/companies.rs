use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ld_schemas::Company;
use sqlx::{Executor, Postgres};

use crate::rows::row_to_company;

pub async fn get_company<'e, E>(exec: E, domain: &str) -> Result<Option<Company>>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query("SELECT * FROM companies WHERE domain = $1")
        .bind(domain)
        .fetch_optional(exec)
        .await
        .context("get_company failed")?;

    row.as_ref().map(row_to_company).transpose()
}

/// Creates the company row if absent, leaving an existing row untouched
/// apart from filling in `name` when it was previously null.
pub async fn ensure_company<'e, E>(exec: E, domain: &str, name: Option<&str>) -> Result<Company>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query(
        r#"
        INSERT INTO companies (domain, name)
        VALUES ($1, $2)
        ON CONFLICT (domain) DO UPDATE SET name = COALESCE(companies.name, EXCLUDED.name)
        RETURNING *
        "#,
    )
    .bind(domain)
    .bind(name)
    .fetch_one(exec)
    .await
    .context("ensure_company failed")?;

    row_to_company(&row)
}

/// Bumps the per-company counters touched by a fill assignment, inside the
/// same transaction as the contact's own transition (invariant: company
/// counters never drift from the contacts they summarize).
pub async fn bump_counters_on_assignment<'e, E>(
    exec: E,
    domain: &str,
    now: DateTime<Utc>,
) -> Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE companies SET contacts_in_sequence = contacts_in_sequence + 1, \
         contacts_touched = contacts_touched + 1, company_status = 'active', \
         last_contact_date = $1, updated_at = $1 \
         WHERE domain = $2",
    )
    .bind(now)
    .bind(domain)
    .execute(exec)
    .await
    .context("bump_counters_on_assignment failed")?;

    Ok(())
}

/// Recomputes `contacts_total` for a domain — called after a bulk write-back
/// adds new contacts, since those inserts happen outside the per-contact
/// transition path.
pub async fn recount_contacts_total<'e, E>(exec: E, domain: &str) -> Result<()>
where
    E: Executor<'e, Database = Postgres> + Copy,
{
    sqlx::query(
        "UPDATE companies SET contacts_total = (SELECT COUNT(*) FROM contacts WHERE company_domain = $1), updated_at = now() WHERE domain = $1",
    )
    .bind(domain)
    .execute(exec)
    .await
    .context("recount_contacts_total failed")?;

    Ok(())
}

/// Decrements `contacts_in_sequence` (never below zero) for a contact
/// leaving the in-sequence state, moving the company to `cooling` once the
/// count reaches zero and it had been touched at least once before.
pub async fn release_in_sequence_slot<'e, E>(exec: E, domain: &str, now: DateTime<Utc>) -> Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        UPDATE companies SET
            contacts_in_sequence = GREATEST(contacts_in_sequence - 1, 0),
            company_status = CASE
                WHEN GREATEST(contacts_in_sequence - 1, 0) = 0 AND contacts_touched > 0
                    THEN 'cooling'
                ELSE company_status
            END,
            updated_at = $1
        WHERE domain = $2
        "#,
    )
    .bind(now)
    .bind(domain)
    .execute(exec)
    .await
    .context("release_in_sequence_slot failed")?;

    Ok(())
}

pub async fn mark_won_customer<'e, E>(exec: E, domain: &str, now: DateTime<Utc>) -> Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE companies SET company_status = 'customer', is_customer = true, \
         customer_since = $1, updated_at = $1 WHERE domain = $2",
    )
    .bind(now)
    .bind(domain)
    .execute(exec)
    .await
    .context("mark_won_customer failed")?;

    Ok(())
}

pub async fn mark_suppressed<'e, E>(
    exec: E,
    domain: &str,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE companies SET company_status = 'suppressed', company_suppressed = true, \
         suppressed_reason = $1, suppressed_at = $2, updated_at = $2 WHERE domain = $3",
    )
    .bind(reason)
    .bind(now)
    .bind(domain)
    .execute(exec)
    .await
    .context("mark_suppressed failed")?;

    Ok(())
}

pub async fn set_ownership<'e, E>(
    exec: E,
    domain: &str,
    owner_id: &str,
    owned_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE companies SET client_owner_id = $1, client_owned_at = $2, \
         ownership_expires_at = $3, updated_at = $2 WHERE domain = $4",
    )
    .bind(owner_id)
    .bind(owned_at)
    .bind(expires_at)
    .bind(domain)
    .execute(exec)
    .await
    .context("set_ownership failed")?;

    Ok(())
}

pub async fn clear_ownership<'e, E>(exec: E, domain: &str, now: DateTime<Utc>) -> Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "UPDATE companies SET client_owner_id = NULL, client_owned_at = NULL, \
         ownership_expires_at = NULL, updated_at = $1 WHERE domain = $2",
    )
    .bind(now)
    .bind(domain)
    .execute(exec)
    .await
    .context("clear_ownership failed")?;

    Ok(())
}
