//! ld-db — the Store.
//!
//! Postgres connection pooling, embedded migrations, and every typed read/
//! write operation the rest of the workspace needs. There is deliberately no
//! free-form field setter here (see `ContactTransitionUpdate` in
//! [`contacts`]) — every write names the exact columns it touches.
//!
//! Functions that take `impl sqlx::Executor` can be called with either a
//! `&PgPool` or an open `&mut Transaction` — callers that need several
//! writes to land atomically (a transition plus its history row plus the
//! company counter bump) open one transaction and thread it through.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod assignments;
pub mod bridge;
pub mod companies;
pub mod contacts;
pub mod eligibility;
pub mod history;
pub mod jobs;
pub mod maintenance;
pub mod ownership;
mod rows;
pub mod tam;

pub use assignments::{count_company_in_sequence, insert_assignment, list_contacts, ListContactsFilter};
pub use bridge::map_job_to_waterfall_request;
pub use companies::{
    bump_counters_on_assignment, clear_ownership, ensure_company, get_company, mark_suppressed,
    mark_won_customer, recount_contacts_total, release_in_sequence_slot, set_ownership,
};
pub use contacts::{
    apply_contact_transition, bulk_create_contacts, create_contact, get_contact,
    get_contact_for_update, get_contacts_by_domain, record_contact_touch, suppress_domain_email,
    ContactTransitionUpdate,
};
pub use eligibility::{query_eligible_contacts, EligibilityQuery};
pub use history::{get_contact_history, insert_history};
pub use jobs::{claim_pending_job, mark_job_completed, mark_job_failed, LeadPullJob};
pub use maintenance::{get_expired_cooldowns, get_expired_ownerships, get_stale_contacts};
pub use ownership::{insert_ownership_change, list_owned_companies};
pub use tam::{get_burn_rate, get_distinct_clients, get_snapshots, get_tam_pools, insert_tam_snapshot};

pub const ENV_DB_URL: &str = "LD_DATABASE_URL";

/// Connect to Postgres using `LD_DATABASE_URL`.
pub async fn connect_from_env() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;

    PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .context("failed to connect to Postgres")
}

/// Test helper: connect using `LD_DATABASE_URL` and ensure migrations are
/// applied. Integration tests call this and skip entirely when the env var
/// is unset, rather than failing.
pub async fn testkit_db_pool() -> Result<PgPool> {
    let pool = connect_from_env().await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_contacts_table: bool,
}

/// Connectivity + schema-presence check for operator tooling.
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let (exists,): (bool,) = sqlx::query_as(
        "select exists (select 1 from information_schema.tables where table_schema='public' and table_name='contacts')",
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok: one == 1,
        has_contacts_table: exists,
    })
}
