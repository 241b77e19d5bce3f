use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ld_schemas::{Contact, DispositionStatus};
use sqlx::{Executor, Postgres};

use crate::rows::row_to_contact;

/// Insert a single contact. The `company_domain` foreign key requires the
/// company row to already exist — callers go through
/// [`crate::companies::ensure_company`] first.
pub async fn create_contact<'e, E>(exec: E, contact: &Contact) -> Result<Contact>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query(
        r#"
        INSERT INTO contacts (
            email, client_id, company_domain, first_name, last_name,
            last_known_title, last_known_company, disposition_status,
            data_enriched_at, source_system, source_id
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(&contact.email)
    .bind(&contact.client_id)
    .bind(&contact.company_domain)
    .bind(&contact.first_name)
    .bind(&contact.last_name)
    .bind(&contact.last_known_title)
    .bind(&contact.last_known_company)
    .bind(contact.disposition_status.as_str())
    .bind(contact.data_enriched_at)
    .bind(&contact.source_system)
    .bind(&contact.source_id)
    .fetch_one(exec)
    .await
    .context("create_contact failed")?;

    row_to_contact(&row)
}

pub async fn get_contact<'e, E>(exec: E, email: &str, client_id: &str) -> Result<Option<Contact>>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query("SELECT * FROM contacts WHERE email = $1 AND client_id = $2")
        .bind(email)
        .bind(client_id)
        .fetch_optional(exec)
        .await
        .context("get_contact failed")?;

    row.as_ref().map(row_to_contact).transpose()
}

/// Same as [`get_contact`] but locks the row, for callers about to validate
/// and then mutate it within the same transaction (the state machine's
/// `transition`).
pub async fn get_contact_for_update<'e, E>(
    exec: E,
    email: &str,
    client_id: &str,
) -> Result<Option<Contact>>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query("SELECT * FROM contacts WHERE email = $1 AND client_id = $2 FOR UPDATE")
        .bind(email)
        .bind(client_id)
        .fetch_optional(exec)
        .await
        .context("get_contact_for_update failed")?;

    row.as_ref().map(row_to_contact).transpose()
}

pub async fn get_contacts_by_domain<'e, E>(exec: E, domain: &str) -> Result<Vec<Contact>>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query("SELECT * FROM contacts WHERE company_domain = $1")
        .bind(domain)
        .fetch_all(exec)
        .await
        .context("get_contacts_by_domain failed")?;

    rows.iter().map(row_to_contact).collect()
}

/// Bulk insert, skipping contacts whose (email, client_id) already exists.
/// Returns the number actually inserted (used by the write-back path to
/// compute `duplicates_skipped`).
pub async fn bulk_create_contacts<'e, E>(exec: E, contacts: &[Contact]) -> Result<i64>
where
    E: Executor<'e, Database = Postgres> + Copy,
{
    let mut inserted = 0i64;
    for contact in contacts {
        let result = sqlx::query(
            r#"
            INSERT INTO contacts (
                email, client_id, company_domain, first_name, last_name,
                last_known_title, last_known_company, disposition_status,
                data_enriched_at, source_system, source_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (email, client_id) DO NOTHING
            "#,
        )
        .bind(&contact.email)
        .bind(&contact.client_id)
        .bind(&contact.company_domain)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.last_known_title)
        .bind(&contact.last_known_company)
        .bind(contact.disposition_status.as_str())
        .bind(contact.data_enriched_at)
        .bind(&contact.source_system)
        .bind(&contact.source_id)
        .execute(exec)
        .await
        .context("bulk_create_contacts insert failed")?;

        inserted += result.rows_affected() as i64;
    }
    Ok(inserted)
}

/// Fields a single disposition transition is allowed to touch — an explicit,
/// typed shape instead of a free-form field setter, so the set of columns a
/// transition can write is closed and reviewable.
#[derive(Debug, Clone)]
pub struct ContactTransitionUpdate {
    pub new_status: DispositionStatus,
    pub email_cooldown_until: Option<DateTime<Utc>>,
    pub linkedin_cooldown_until: Option<DateTime<Utc>>,
    pub phone_cooldown_until: Option<DateTime<Utc>>,
    pub email_suppressed: Option<bool>,
    pub linkedin_suppressed: Option<bool>,
    pub phone_suppressed: Option<bool>,
}

pub async fn apply_contact_transition<'e, E>(
    exec: E,
    email: &str,
    client_id: &str,
    update: &ContactTransitionUpdate,
    now: DateTime<Utc>,
) -> Result<Contact>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query(
        r#"
        UPDATE contacts SET
            disposition_status = $1,
            disposition_updated_at = $2,
            email_cooldown_until = COALESCE($3, email_cooldown_until),
            linkedin_cooldown_until = COALESCE($4, linkedin_cooldown_until),
            phone_cooldown_until = COALESCE($5, phone_cooldown_until),
            email_suppressed = COALESCE($6, email_suppressed),
            linkedin_suppressed = COALESCE($7, linkedin_suppressed),
            phone_suppressed = COALESCE($8, phone_suppressed),
            updated_at = $2
        WHERE email = $9 AND client_id = $10
        RETURNING *
        "#,
    )
    .bind(update.new_status.as_str())
    .bind(now)
    .bind(update.email_cooldown_until)
    .bind(update.linkedin_cooldown_until)
    .bind(update.phone_cooldown_until)
    .bind(update.email_suppressed)
    .bind(update.linkedin_suppressed)
    .bind(update.phone_suppressed)
    .bind(email)
    .bind(client_id)
    .fetch_one(exec)
    .await
    .context("apply_contact_transition failed")?;

    row_to_contact(&row)
}

/// Cascade email suppression to every other contact at the same domain —
/// used only on a hard-no, which suppresses only the *email* channel for
/// siblings (unlike the hard-no contact's own three flags).
pub async fn suppress_domain_email<'e, E>(exec: E, domain: &str, except_email: &str) -> Result<u64>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        "UPDATE contacts SET email_suppressed = true, updated_at = now() \
         WHERE company_domain = $1 AND email <> $2 AND email_suppressed = false",
    )
    .bind(domain)
    .bind(except_email)
    .execute(exec)
    .await
    .context("suppress_domain_email failed")?;

    Ok(result.rows_affected())
}

/// Records a campaign assignment's effect on the contact row: bumps the
/// channel's `last_contacted` timestamp and `sequence_count`. The
/// disposition transition to `in_sequence` itself goes through
/// `apply_contact_transition` first.
pub async fn record_contact_touch<'e, E>(
    exec: E,
    email: &str,
    client_id: &str,
    channel: ld_schemas::Channel,
    now: DateTime<Utc>,
) -> Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = match channel {
        ld_schemas::Channel::Email => {
            "UPDATE contacts SET email_last_contacted = $1, sequence_count = sequence_count + 1, updated_at = $1 WHERE email = $2 AND client_id = $3"
        }
        ld_schemas::Channel::Linkedin => {
            "UPDATE contacts SET linkedin_last_contacted = $1, sequence_count = sequence_count + 1, updated_at = $1 WHERE email = $2 AND client_id = $3"
        }
        ld_schemas::Channel::Phone => {
            "UPDATE contacts SET phone_last_contacted = $1, sequence_count = sequence_count + 1, updated_at = $1 WHERE email = $2 AND client_id = $3"
        }
    };

    sqlx::query(query)
        .bind(now)
        .bind(email)
        .bind(client_id)
        .execute(exec)
        .await
        .context("record_contact_touch failed")?;

    Ok(())
}
