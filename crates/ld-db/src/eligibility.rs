use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use ld_schemas::{Channel, Contact, DispositionStatus};
use sqlx::{Postgres, QueryBuilder};

/// Parameters for the nine-predicate eligibility filter.
/// `status_filter` defaults to `[fresh, retouch_eligible]` when empty.
pub struct EligibilityQuery<'a> {
    pub client_id: &'a str,
    pub channel: Channel,
    pub title_keywords: &'a [String],
    pub status_filter: &'a [DispositionStatus],
    pub limit: i64,
}

const STALE_DATA_DAYS: i64 = 180;

/// Runs the eligibility query. The channel name only ever comes from the
/// [`Channel`] enum (never free-text), so interpolating it into the column
/// identifier is safe — it can only ever be `email`, `linkedin`, or `phone`.
pub async fn query_eligible_contacts(
    pool: &sqlx::PgPool,
    q: &EligibilityQuery<'_>,
) -> Result<Vec<Contact>> {
    let now: DateTime<Utc> = Utc::now();
    let stale_cutoff = now - Duration::days(STALE_DATA_DAYS);
    let cooldown_col = format!("{}_cooldown_until", q.channel.column_prefix());
    let suppressed_col = format!("{}_suppressed", q.channel.column_prefix());

    let statuses: Vec<&str> = if q.status_filter.is_empty() {
        vec![
            DispositionStatus::Fresh.as_str(),
            DispositionStatus::RetouchEligible.as_str(),
        ]
    } else {
        q.status_filter.iter().map(|s| s.as_str()).collect()
    };

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT c.* FROM contacts c JOIN companies co ON c.company_domain = co.domain WHERE c.client_id = ",
    );
    builder.push_bind(q.client_id);

    builder.push(" AND c.disposition_status IN (");
    {
        let mut sep = builder.separated(", ");
        for status in &statuses {
            sep.push_bind(*status);
        }
    }
    builder.push(")");

    builder
        .push(format!(" AND c.{suppressed_col} = false"))
        .push(format!(" AND (c.{cooldown_col} IS NULL OR c.{cooldown_col} <= "))
        .push_bind(now)
        .push(")")
        .push(" AND co.company_suppressed = false")
        .push(" AND co.is_customer = false")
        .push(" AND (co.client_owner_id = ")
        .push_bind(q.client_id)
        .push(" OR co.client_owner_id IS NULL)")
        .push(" AND (c.data_enriched_at IS NULL OR c.data_enriched_at > ")
        .push_bind(stale_cutoff)
        .push(")");

    if !q.title_keywords.is_empty() {
        builder.push(" AND (");
        for (i, kw) in q.title_keywords.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder.push("LOWER(c.last_known_title) LIKE ");
            builder.push_bind(format!("%{}%", kw.to_lowercase()));
        }
        builder.push(")");
    }

    builder.push(
        " ORDER BY CASE WHEN c.disposition_status = 'fresh' THEN 0 ELSE 1 END, \
         c.data_enriched_at DESC NULLS LAST, c.sequence_count ASC LIMIT ",
    );
    builder.push_bind(q.limit);

    let rows = builder
        .build()
        .fetch_all(pool)
        .await
        .context("query_eligible_contacts failed")?;

    rows.iter().map(crate::rows::row_to_contact).collect()
}
