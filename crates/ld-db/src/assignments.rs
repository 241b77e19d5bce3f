use anyhow::{Context, Result};
use ld_schemas::Channel;
use sqlx::{Executor, Postgres};

pub async fn insert_assignment<'e, E>(
    exec: E,
    contact_email: &str,
    contact_client_id: &str,
    campaign_id: &str,
    client_id: &str,
    channel: Channel,
) -> Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "INSERT INTO campaign_assignments (contact_email, contact_client_id, campaign_id, client_id, channel) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(contact_email)
    .bind(contact_client_id)
    .bind(campaign_id)
    .bind(client_id)
    .bind(channel.as_str())
    .execute(exec)
    .await
    .context("insert_assignment failed")?;

    Ok(())
}

pub async fn count_company_in_sequence<'e, E>(exec: E, domain: &str) -> Result<i64>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: (i64,) =
        sqlx::query_as("SELECT contacts_in_sequence FROM companies WHERE domain = $1")
            .bind(domain)
            .fetch_one(exec)
            .await
            .context("count_company_in_sequence failed")?;

    Ok(row.0)
}

#[derive(Debug, Clone, Default)]
pub struct ListContactsFilter<'a> {
    pub client_id: Option<&'a str>,
    pub status: Option<&'a str>,
    pub search: Option<&'a str>,
    pub limit: i64,
    pub offset: i64,
}

/// Paginated contact listing for operator tooling. Filters are applied
/// conditionally, always through bound parameters, never string-interpolated
/// values.
pub async fn list_contacts(
    pool: &sqlx::PgPool,
    filter: &ListContactsFilter<'_>,
) -> Result<(Vec<ld_schemas::Contact>, i64)> {
    let mut where_clauses: Vec<String> = Vec::new();
    let mut idx = 0;

    if filter.client_id.is_some() {
        idx += 1;
        where_clauses.push(format!("client_id = ${idx}"));
    }
    if filter.status.is_some() {
        idx += 1;
        where_clauses.push(format!("disposition_status = ${idx}"));
    }
    if filter.search.is_some() {
        idx += 1;
        where_clauses.push(format!(
            "(LOWER(email) LIKE ${idx} OR LOWER(last_known_company) LIKE ${idx} OR LOWER(company_domain) LIKE ${idx})"
        ));
    }

    let where_sql = if where_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", where_clauses.join(" AND "))
    };

    let mut count_query = sqlx::query_as::<_, (i64,)>(&format!(
        "SELECT COUNT(*) FROM contacts {where_sql}"
    ));
    if let Some(cid) = filter.client_id {
        count_query = count_query.bind(cid);
    }
    if let Some(status) = filter.status {
        count_query = count_query.bind(status);
    }
    if let Some(search) = filter.search {
        count_query = count_query.bind(format!("%{}%", search.to_lowercase()));
    }
    let (total,) = count_query
        .fetch_one(pool)
        .await
        .context("list_contacts count failed")?;

    let limit_idx = idx + 1;
    let offset_idx = idx + 2;
    let mut rows_query = sqlx::query(&format!(
        "SELECT * FROM contacts {where_sql} ORDER BY updated_at DESC LIMIT ${limit_idx} OFFSET ${offset_idx}"
    ));
    if let Some(cid) = filter.client_id {
        rows_query = rows_query.bind(cid);
    }
    if let Some(status) = filter.status {
        rows_query = rows_query.bind(status);
    }
    if let Some(search) = filter.search {
        rows_query = rows_query.bind(format!("%{}%", search.to_lowercase()));
    }
    rows_query = rows_query.bind(filter.limit).bind(filter.offset);

    let rows = rows_query
        .fetch_all(pool)
        .await
        .context("list_contacts query failed")?;

    let contacts = rows
        .iter()
        .map(crate::rows::row_to_contact)
        .collect::<Result<Vec<_>>>()?;

    Ok((contacts, total))
}
