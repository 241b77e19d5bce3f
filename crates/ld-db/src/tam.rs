use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::{Executor, Postgres};

/// Raw pool counts for the seven TAM buckets. `ld-tam`
/// layers burn rate / ETA / health classification on top of this.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct TamPoolCounts {
    pub total_universe: i64,
    pub never_touched: i64,
    pub in_cooldown: i64,
    pub available_now: i64,
    pub permanent_suppress: i64,
    pub in_sequence: i64,
    pub won_customer: i64,
}

pub async fn get_tam_pools(pool: &sqlx::PgPool, client_id: Option<&str>) -> Result<TamPoolCounts> {
    let now: DateTime<Utc> = Utc::now();

    let query = r#"
        SELECT
            COUNT(*) AS total_universe,
            COUNT(*) FILTER (WHERE disposition_status = 'fresh' AND sequence_count = 0)
                AS never_touched,
            COUNT(*) FILTER (WHERE disposition_status IN (
                    'completed_no_response', 'replied_neutral', 'replied_negative', 'lost_closed'
                ) AND email_cooldown_until IS NOT NULL AND email_cooldown_until > $1)
                AS in_cooldown,
            COUNT(*) FILTER (WHERE disposition_status IN ('fresh', 'retouch_eligible')
                AND email_suppressed = false
                AND (email_cooldown_until IS NULL OR email_cooldown_until <= $1))
                AS available_now,
            COUNT(*) FILTER (WHERE disposition_status IN ('replied_hard_no', 'bounced', 'unsubscribed'))
                AS permanent_suppress,
            COUNT(*) FILTER (WHERE disposition_status = 'in_sequence') AS in_sequence,
            COUNT(*) FILTER (WHERE disposition_status = 'won_customer') AS won_customer
        FROM contacts
    "#;

    let counts = if let Some(cid) = client_id {
        sqlx::query_as::<_, TamPoolCounts>(&format!("{query} WHERE client_id = $2"))
            .bind(now)
            .bind(cid)
            .fetch_one(pool)
            .await
    } else {
        sqlx::query_as::<_, TamPoolCounts>(query)
            .bind(now)
            .fetch_one(pool)
            .await
    }
    .context("get_tam_pools failed")?;

    Ok(counts)
}

/// Contacts moved to `in_sequence` in the last 7 days.
pub async fn get_burn_rate(pool: &sqlx::PgPool, client_id: Option<&str>) -> Result<f64> {
    let cutoff = Utc::now() - Duration::days(7);

    let (burned,): (i64,) = if let Some(cid) = client_id {
        sqlx::query_as(
            "SELECT COUNT(*) FROM disposition_history WHERE new_status = 'in_sequence' \
             AND created_at > $1 AND contact_client_id = $2",
        )
        .bind(cutoff)
        .bind(cid)
        .fetch_one(pool)
        .await
    } else {
        sqlx::query_as(
            "SELECT COUNT(*) FROM disposition_history WHERE new_status = 'in_sequence' AND created_at > $1",
        )
        .bind(cutoff)
        .fetch_one(pool)
        .await
    }
    .context("get_burn_rate failed")?;

    Ok(burned as f64)
}

#[derive(Debug, Clone)]
pub struct TamSnapshotInput {
    pub client_id: Option<String>,
    pub counts: TamPoolCounts,
    pub burn_rate_weekly: Option<f64>,
    pub exhaustion_eta_weeks: Option<f64>,
}

/// Upserts on `(snapshot_date, client_id)`, or on `snapshot_date` alone for
/// the global (`client_id IS NULL`) snapshot. Two separate partial unique
/// indexes back these (see migration `0001`, since a plain NULL is never
/// "distinct" for conflict inference) so the conflict target has to match
/// whichever one applies.
pub async fn insert_tam_snapshot<'e, E>(
    exec: E,
    snapshot_date: NaiveDate,
    input: &TamSnapshotInput,
) -> Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    let conflict_target = if input.client_id.is_some() {
        "(snapshot_date, client_id) WHERE client_id IS NOT NULL"
    } else {
        "(snapshot_date) WHERE client_id IS NULL"
    };

    let sql = format!(
        r#"
        INSERT INTO tam_snapshots (
            snapshot_date, client_id, total_universe, never_touched, in_cooldown,
            available_now, permanent_suppress, in_sequence, won_customer,
            burn_rate_weekly, exhaustion_eta_weeks
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT {conflict_target} DO UPDATE SET
            total_universe = EXCLUDED.total_universe,
            never_touched = EXCLUDED.never_touched,
            in_cooldown = EXCLUDED.in_cooldown,
            available_now = EXCLUDED.available_now,
            permanent_suppress = EXCLUDED.permanent_suppress,
            in_sequence = EXCLUDED.in_sequence,
            won_customer = EXCLUDED.won_customer,
            burn_rate_weekly = EXCLUDED.burn_rate_weekly,
            exhaustion_eta_weeks = EXCLUDED.exhaustion_eta_weeks
        "#
    );

    sqlx::query(&sql)
        .bind(snapshot_date)
        .bind(&input.client_id)
        .bind(input.counts.total_universe)
        .bind(input.counts.never_touched)
        .bind(input.counts.in_cooldown)
        .bind(input.counts.available_now)
        .bind(input.counts.permanent_suppress)
        .bind(input.counts.in_sequence)
        .bind(input.counts.won_customer)
        .bind(input.burn_rate_weekly)
        .bind(input.exhaustion_eta_weeks)
        .execute(exec)
        .await
        .context("insert_tam_snapshot failed")?;

    Ok(())
}

pub async fn get_snapshots(
    pool: &sqlx::PgPool,
    client_id: Option<&str>,
    days: i64,
) -> Result<Vec<ld_schemas::TamSnapshot>> {
    let cutoff = (Utc::now() - Duration::days(days)).date_naive();

    let rows = if let Some(cid) = client_id {
        sqlx::query(
            "SELECT * FROM tam_snapshots WHERE client_id = $1 AND snapshot_date > $2 ORDER BY snapshot_date DESC",
        )
        .bind(cid)
        .bind(cutoff)
        .fetch_all(pool)
        .await
    } else {
        sqlx::query(
            "SELECT * FROM tam_snapshots WHERE client_id IS NULL AND snapshot_date > $1 ORDER BY snapshot_date DESC",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }
    .context("get_snapshots failed")?;

    use sqlx::Row;
    rows.iter()
        .map(|row| {
            Ok(ld_schemas::TamSnapshot {
                snapshot_date: row.try_get("snapshot_date")?,
                client_id: row.try_get("client_id")?,
                total_universe: row.try_get("total_universe")?,
                never_touched: row.try_get("never_touched")?,
                in_cooldown: row.try_get("in_cooldown")?,
                available_now: row.try_get("available_now")?,
                permanent_suppress: row.try_get("permanent_suppress")?,
                in_sequence: row.try_get("in_sequence")?,
                won_customer: row.try_get("won_customer")?,
                burn_rate_weekly: row.try_get("burn_rate_weekly")?,
                exhaustion_eta_weeks: row.try_get("exhaustion_eta_weeks")?,
            })
        })
        .collect::<Result<Vec<_>>>()
}

pub async fn get_distinct_clients(pool: &sqlx::PgPool) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT client_id FROM contacts")
        .fetch_all(pool)
        .await
        .context("get_distinct_clients failed")?;

    Ok(rows.into_iter().map(|(c,)| c).collect())
}
