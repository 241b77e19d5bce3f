//! ld-deconfliction — first-mover company ownership.
//!
//! A company is unowned, owned by one client, or (once its expiry passes
//! with no contacts still in sequence) available to be re-claimed. The gate
//! result is a pure, deterministic enum the caller matches on rather than a
//! bare bool, so the "why" travels with the decision.

use chrono::{DateTime, Duration, Utc};
use ld_schemas::Company;
use sqlx::PgPool;

/// Result of [`can_target`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetGate {
    /// No company row yet, or this client already owns it, or the prior
    /// owner's claim has expired with no contacts left in sequence.
    Permitted,
    /// Another client currently owns this company.
    Blocked { owner_client_id: String },
}

impl TargetGate {
    pub fn is_permitted(&self) -> bool {
        matches!(self, Self::Permitted)
    }
}

/// Pure ownership check against an already-fetched company row. `None` for
/// `company` means the domain has no row yet, which is always permitted —
/// first contact creates the company.
pub fn can_target(company: Option<&Company>, client_id: &str, now: DateTime<Utc>) -> TargetGate {
    let Some(company) = company else {
        return TargetGate::Permitted;
    };

    let Some(owner) = company.client_owner_id.as_deref() else {
        return TargetGate::Permitted;
    };

    if owner == client_id {
        return TargetGate::Permitted;
    }

    let expired = company
        .ownership_expires_at
        .is_some_and(|expiry| expiry <= now);
    if expired && company.contacts_in_sequence == 0 {
        return TargetGate::Permitted;
    }

    TargetGate::Blocked {
        owner_client_id: owner.to_string(),
    }
}

fn expiry_from(now: DateTime<Utc>, ownership_duration_months: i64) -> DateTime<Utc> {
    now + Duration::days(ownership_duration_months * 30)
}

/// Claims `domain` for `client_id` if it is unowned or already owned by
/// this client. Returns `false` (no-op) if another client holds it —
/// callers should check [`can_target`] first if they want to distinguish
/// "blocked" from "already yours". Opens and commits its own transaction.
pub async fn claim(
    pool: &PgPool,
    domain: &str,
    client_id: &str,
    ownership_duration_months: i64,
) -> anyhow::Result<bool> {
    let mut tx = pool.begin().await?;
    let claimed = claim_in_tx(&mut tx, domain, client_id, ownership_duration_months).await?;
    tx.commit().await?;
    Ok(claimed)
}

/// Same as [`claim`] but runs against a transaction the caller already
/// holds open, so it can be combined with the transition and assignment
/// writes of one fill into a single atomic unit. The caller commits.
pub async fn claim_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    domain: &str,
    client_id: &str,
    ownership_duration_months: i64,
) -> anyhow::Result<bool> {
    let company = ld_db::get_company(&mut **tx, domain).await?;
    let Some(company) = company else {
        return Ok(false);
    };

    if let Some(owner) = &company.client_owner_id {
        if owner != client_id {
            return Ok(false);
        }
    }

    let now = Utc::now();
    let expiry = expiry_from(now, ownership_duration_months);
    ld_db::set_ownership(&mut **tx, domain, client_id, now, expiry).await?;
    ld_db::insert_ownership_change(
        &mut **tx,
        domain,
        company.client_owner_id.as_deref(),
        Some(client_id),
        ld_schemas::OwnershipChangeReason::FirstClaim,
    )
    .await?;
    Ok(true)
}

/// Releases ownership of `domain`, if any (admin action).
pub async fn release(pool: &PgPool, domain: &str) -> anyhow::Result<bool> {
    let mut tx = pool.begin().await?;
    let company = ld_db::get_company(&mut *tx, domain).await?;
    let Some(company) = company else {
        return Ok(false);
    };
    let Some(previous_owner) = company.client_owner_id.clone() else {
        return Ok(false);
    };

    let now = Utc::now();
    ld_db::clear_ownership(&mut *tx, domain, now).await?;
    ld_db::insert_ownership_change(
        &mut *tx,
        domain,
        Some(&previous_owner),
        None,
        ld_schemas::OwnershipChangeReason::ManualRelease,
    )
    .await?;
    tx.commit().await?;
    Ok(true)
}

/// Transfers ownership of `domain` to `new_client_id` (admin action),
/// regardless of current owner.
pub async fn transfer(
    pool: &PgPool,
    domain: &str,
    new_client_id: &str,
    ownership_duration_months: i64,
) -> anyhow::Result<bool> {
    let mut tx = pool.begin().await?;
    let company = ld_db::get_company(&mut *tx, domain).await?;
    let Some(company) = company else {
        return Ok(false);
    };

    let now = Utc::now();
    let expiry = expiry_from(now, ownership_duration_months);
    ld_db::set_ownership(&mut *tx, domain, new_client_id, now, expiry).await?;
    ld_db::insert_ownership_change(
        &mut *tx,
        domain,
        company.client_owner_id.as_deref(),
        Some(new_client_id),
        ld_schemas::OwnershipChangeReason::AdminTransfer,
    )
    .await?;
    tx.commit().await?;
    Ok(true)
}

/// Releases ownership for every company whose expiry has passed with no
/// contacts left in sequence. Returns the number released.
pub async fn sweep_expired(pool: &PgPool) -> anyhow::Result<i64> {
    let expired = ld_db::get_expired_ownerships(pool).await?;
    let mut count = 0i64;
    for company in expired {
        let mut tx = pool.begin().await?;
        ld_db::clear_ownership(&mut *tx, &company.domain, Utc::now()).await?;
        ld_db::insert_ownership_change(
            &mut *tx,
            &company.domain,
            company.client_owner_id.as_deref(),
            None,
            ld_schemas::OwnershipChangeReason::Expired,
        )
        .await?;
        tx.commit().await?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(owner: Option<&str>, expires_at: Option<DateTime<Utc>>, in_sequence: i64) -> Company {
        Company {
            domain: "acme.test".into(),
            name: None,
            company_status: ld_schemas::CompanyStatus::Active,
            company_suppressed: false,
            suppressed_reason: None,
            suppressed_at: None,
            contacts_total: 0,
            contacts_in_sequence: in_sequence,
            contacts_touched: 0,
            last_contact_date: None,
            company_cooldown_until: None,
            is_customer: false,
            customer_since: None,
            client_owner_id: owner.map(str::to_string),
            client_owned_at: None,
            ownership_expires_at: expires_at,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn unowned_company_is_always_permitted() {
        let now = Utc::now();
        assert_eq!(can_target(None, "client-a", now), TargetGate::Permitted);
        let c = company(None, None, 0);
        assert_eq!(can_target(Some(&c), "client-a", now), TargetGate::Permitted);
    }

    #[test]
    fn owner_itself_is_permitted() {
        let now = Utc::now();
        let c = company(Some("client-a"), None, 3);
        assert_eq!(can_target(Some(&c), "client-a", now), TargetGate::Permitted);
    }

    #[test]
    fn other_owner_blocks() {
        let now = Utc::now();
        let c = company(Some("client-a"), None, 0);
        assert_eq!(
            can_target(Some(&c), "client-b", now),
            TargetGate::Blocked {
                owner_client_id: "client-a".into()
            }
        );
    }

    #[test]
    fn expired_ownership_with_zero_in_sequence_is_permitted() {
        let now = Utc::now();
        let c = company(Some("client-a"), Some(now - Duration::days(1)), 0);
        assert_eq!(can_target(Some(&c), "client-b", now), TargetGate::Permitted);
    }

    #[test]
    fn expired_ownership_with_active_sequence_still_blocks() {
        let now = Utc::now();
        let c = company(Some("client-a"), Some(now - Duration::days(1)), 2);
        assert_eq!(
            can_target(Some(&c), "client-b", now),
            TargetGate::Blocked {
                owner_client_id: "client-a".into()
            }
        );
    }

    #[test]
    fn expiry_is_months_times_thirty_days() {
        let now = Utc::now();
        let expiry = expiry_from(now, 12);
        assert_eq!(expiry, now + Duration::days(360));
    }
}
