//! ld-state-machine — disposition transitions and the two maintenance
//! sweeps.
//!
//! ```text
//!                 ┌─────────┐
//!         ┌──────▶│  fresh  │──────┐
//!         │       └─────────┘      │
//!         │            │           ▼
//!  job_change     in_sequence  stale_data
//!         │            │           │
//!         │            ▼           │
//!         │   completed / replied_* / bounced / unsubscribed
//!         │            │
//!         └── retouch_eligible ◀───┘
//! ```
//!
//! `transition` is the only way a contact's `disposition_status` changes.
//! It validates the move against [`legal`], computes the cooldown and
//! suppression side effects via [`policy`], and persists everything — the
//! contact row, the history row, and the company counters — inside one
//! transaction (invariant: company counters never drift from the contacts
//! they summarize).

mod legal;
mod policy;

pub use legal::{allowed_targets, is_legal};
pub use policy::{cooldown_for, cooldown_until, suppression_for, CooldownConfig, SuppressionUpdate};

use std::fmt;

use chrono::Utc;
use ld_db::ContactTransitionUpdate;
use ld_schemas::{Channel, Contact, DispositionStatus, TriggeredBy};
use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct TransitionError {
    pub contact_email: String,
    pub from: DispositionStatus,
    pub to: DispositionStatus,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "illegal transition for {}: {} -> {} (allowed: {:?})",
            self.contact_email,
            self.from,
            self.to,
            legal::allowed_targets(self.from)
        )
    }
}

impl std::error::Error for TransitionError {}

#[derive(Debug, Clone)]
pub struct ContactNotFound {
    pub email: String,
    pub client_id: String,
}

impl fmt::Display for ContactNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contact not found: {} / {}", self.email, self.client_id)
    }
}

impl std::error::Error for ContactNotFound {}

/// A transition or the store I/O that carries it out failed.
#[derive(Debug)]
pub enum TransitionFailure {
    NotFound(ContactNotFound),
    Illegal(TransitionError),
    Store(anyhow::Error),
}

impl fmt::Display for TransitionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(e) => write!(f, "{e}"),
            Self::Illegal(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TransitionFailure {}

impl From<anyhow::Error> for TransitionFailure {
    fn from(e: anyhow::Error) -> Self {
        Self::Store(e)
    }
}

/// Transitions one contact to `new_status` on `channel`, applying cooldown
/// and suppression side effects, updating company counters, logging
/// history, and cascading hard-no suppression across the company's other
/// contacts — all in one transaction opened and committed here.
#[allow(clippy::too_many_arguments)]
pub async fn transition(
    pool: &PgPool,
    cfg: &CooldownConfig,
    email: &str,
    client_id: &str,
    new_status: DispositionStatus,
    channel: Channel,
    reason: Option<&str>,
    triggered_by: TriggeredBy,
    campaign_id: Option<&str>,
) -> Result<Contact, TransitionFailure> {
    let mut tx = pool.begin().await.map_err(|e| anyhow::Error::from(e))?;

    let updated = transition_in_tx(
        &mut tx,
        cfg,
        email,
        client_id,
        new_status,
        channel,
        reason,
        triggered_by,
        campaign_id,
    )
    .await?;

    tx.commit().await.map_err(|e| anyhow::Error::from(e))?;

    Ok(updated)
}

/// Same as [`transition`] but runs against a transaction the caller already
/// holds open, so it can be combined with other writes (assignment logging,
/// ownership claim) into one atomic unit. The caller commits.
#[allow(clippy::too_many_arguments)]
pub async fn transition_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    cfg: &CooldownConfig,
    email: &str,
    client_id: &str,
    new_status: DispositionStatus,
    channel: Channel,
    reason: Option<&str>,
    triggered_by: TriggeredBy,
    campaign_id: Option<&str>,
) -> Result<Contact, TransitionFailure> {
    let contact = ld_db::get_contact_for_update(&mut **tx, email, client_id)
        .await?
        .ok_or_else(|| {
            TransitionFailure::NotFound(ContactNotFound {
                email: email.to_string(),
                client_id: client_id.to_string(),
            })
        })?;

    let current = contact.disposition_status;
    if current == new_status {
        // Same-state transitions are permitted no-ops: no history row, no
        // side effects, no company counter churn.
        return Ok(contact);
    }
    if !legal::is_legal(current, new_status) {
        return Err(TransitionFailure::Illegal(TransitionError {
            contact_email: email.to_string(),
            from: current,
            to: new_status,
        }));
    }

    let now = Utc::now();
    let cooldown = policy::cooldown_until(new_status, channel, cfg, now);
    let suppression = policy::suppression_for(new_status);

    let update = ContactTransitionUpdate {
        new_status,
        email_cooldown_until: match channel {
            Channel::Email => cooldown,
            _ => None,
        },
        linkedin_cooldown_until: match channel {
            Channel::Linkedin => cooldown,
            _ => None,
        },
        phone_cooldown_until: match channel {
            Channel::Phone => cooldown,
            _ => None,
        },
        email_suppressed: suppression.email,
        linkedin_suppressed: suppression.linkedin,
        phone_suppressed: suppression.phone,
    };

    let updated = ld_db::apply_contact_transition(&mut **tx, email, client_id, &update, now).await?;

    ld_db::insert_history(
        &mut **tx,
        email,
        client_id,
        Some(current),
        new_status,
        reason,
        triggered_by,
        campaign_id,
        &serde_json::json!({}),
    )
    .await?;

    update_company_state(tx, &contact.company_domain, current, new_status, now).await?;

    if new_status == DispositionStatus::RepliedHardNo {
        ld_db::suppress_domain_email(&mut **tx, &contact.company_domain, email).await?;
    }

    Ok(updated)
}

async fn update_company_state(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    domain: &str,
    old_status: DispositionStatus,
    new_status: DispositionStatus,
    now: chrono::DateTime<Utc>,
) -> anyhow::Result<()> {
    if new_status == DispositionStatus::InSequence {
        ld_db::bump_counters_on_assignment(&mut **tx, domain, now).await?;
    } else if old_status == DispositionStatus::InSequence {
        ld_db::release_in_sequence_slot(&mut **tx, domain, now).await?;
    }

    if new_status == DispositionStatus::WonCustomer {
        ld_db::mark_won_customer(&mut **tx, domain, now).await?;
    }

    if new_status == DispositionStatus::RepliedHardNo {
        ld_db::mark_suppressed(&mut **tx, domain, "hard_no_received", now).await?;
    }

    Ok(())
}

/// Moves every contact with an expired cooldown to `retouch_eligible`.
/// Illegal transitions (a contact whose status changed out from under this
/// sweep between the query and the attempt) are swallowed, not propagated.
pub async fn process_expired_cooldowns(pool: &PgPool, cfg: &CooldownConfig) -> anyhow::Result<i64> {
    let contacts = ld_db::get_expired_cooldowns(pool).await?;
    let mut count = 0i64;
    for c in contacts {
        match transition(
            pool,
            cfg,
            &c.email,
            &c.client_id,
            DispositionStatus::RetouchEligible,
            Channel::Email,
            Some("cooldown_expired"),
            TriggeredBy::System,
            None,
        )
        .await
        {
            Ok(_) => count += 1,
            Err(TransitionFailure::Illegal(_)) | Err(TransitionFailure::NotFound(_)) => {}
            Err(TransitionFailure::Store(e)) => return Err(e),
        }
    }
    Ok(count)
}

/// Flags contacts whose enrichment data is older than `months` as
/// `stale_data`.
pub async fn process_stale_data(pool: &PgPool, cfg: &CooldownConfig, months: i64) -> anyhow::Result<i64> {
    let contacts = ld_db::get_stale_contacts(pool, months).await?;
    let mut count = 0i64;
    for c in contacts {
        match transition(
            pool,
            cfg,
            &c.email,
            &c.client_id,
            DispositionStatus::StaleData,
            Channel::Email,
            Some(&format!("data_enriched_at older than {months} months")),
            TriggeredBy::System,
            None,
        )
        .await
        {
            Ok(_) => count += 1,
            Err(TransitionFailure::Illegal(_)) | Err(TransitionFailure::NotFound(_)) => {}
            Err(TransitionFailure::Store(e)) => return Err(e),
        }
    }
    Ok(count)
}
