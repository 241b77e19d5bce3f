//! Maintenance sweep queries (the `process_*` operations).
//! Pure reads — the sweep logic that decides what to do with these rows
//! lives in `ld-state-machine` and `ld-deconfliction`.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use ld_schemas::{Company, Contact};
use sqlx::PgPool;

pub async fn get_expired_cooldowns(pool: &PgPool) -> Result<Vec<Contact>> {
    let now = Utc::now();
    let rows = sqlx::query(
        "SELECT * FROM contacts WHERE disposition_status IN \
         ('completed_no_response', 'replied_neutral', 'replied_negative', 'lost_closed') \
         AND email_cooldown_until IS NOT NULL AND email_cooldown_until <= $1",
    )
    .bind(now)
    .fetch_all(pool)
    .await
    .context("get_expired_cooldowns failed")?;

    rows.iter().map(crate::rows::row_to_contact).collect()
}

pub async fn get_stale_contacts(pool: &PgPool, months: i64) -> Result<Vec<Contact>> {
    let cutoff = Utc::now() - Duration::days(months * 30);
    let rows = sqlx::query(
        "SELECT * FROM contacts WHERE data_enriched_at IS NOT NULL AND data_enriched_at < $1 \
         AND disposition_status NOT IN \
         ('replied_hard_no', 'bounced', 'unsubscribed', 'won_customer', 'stale_data')",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await
    .context("get_stale_contacts failed")?;

    rows.iter().map(crate::rows::row_to_contact).collect()
}

pub async fn get_expired_ownerships(pool: &PgPool) -> Result<Vec<Company>> {
    let now = Utc::now();
    let rows = sqlx::query(
        "SELECT * FROM companies WHERE client_owner_id IS NOT NULL \
         AND ownership_expires_at IS NOT NULL AND ownership_expires_at <= $1 \
         AND contacts_in_sequence = 0",
    )
    .bind(now)
    .fetch_all(pool)
    .await
    .context("get_expired_ownerships failed")?;

    rows.iter().map(crate::rows::row_to_company).collect()
}
