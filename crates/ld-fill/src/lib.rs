//! ld-fill — the campaign fill engine.
//!
//! Blends fresh and retouch-eligible contacts to a target ratio, enforces a
//! per-company cap across both pools together, backfills from leftover
//! fresh contacts when retouch supply runs short, and assigns the final
//! list: transition to `in_sequence`, bump the channel's `last_contacted`,
//! log the assignment, and claim company ownership if it's still unowned.

mod cap;

pub use cap::{apply_company_cap, count_by_company};

use chrono::Utc;
use ld_schemas::{CampaignFillRequest, CampaignFillResult, Contact, DispositionStatus, TriggeredBy};
use ld_state_machine::CooldownConfig;
use sqlx::PgPool;
use std::collections::HashMap;

pub struct FillDefaults {
    pub fresh_retouch_ratio: f64,
    pub max_contacts_per_company: i64,
    pub ownership_duration_months: i64,
}

impl From<&ld_config::Settings> for FillDefaults {
    fn from(s: &ld_config::Settings) -> Self {
        Self {
            fresh_retouch_ratio: s.fresh_retouch_ratio,
            max_contacts_per_company: s.max_contacts_per_company,
            ownership_duration_months: s.ownership_duration_months,
        }
    }
}

pub async fn fill(
    pool: &PgPool,
    cooldown_cfg: &CooldownConfig,
    defaults: &FillDefaults,
    request: &CampaignFillRequest,
) -> anyhow::Result<CampaignFillResult> {
    let ratio = request.fresh_ratio.unwrap_or(defaults.fresh_retouch_ratio);
    let max_per_company = request
        .max_per_company
        .unwrap_or(defaults.max_contacts_per_company);

    let mut warnings = Vec::new();

    let fresh_target = (request.volume as f64 * ratio) as i64;
    let fresh_contacts = ld_db::query_eligible_contacts(
        pool,
        &ld_db::EligibilityQuery {
            client_id: &request.client_id,
            channel: request.channel,
            title_keywords: &request.title_keywords,
            status_filter: &[DispositionStatus::Fresh],
            limit: fresh_target * 2,
        },
    )
    .await?;

    let retouch_target = request.volume - fresh_target;
    let retouch_contacts = ld_db::query_eligible_contacts(
        pool,
        &ld_db::EligibilityQuery {
            client_id: &request.client_id,
            channel: request.channel,
            title_keywords: &request.title_keywords,
            status_filter: &[DispositionStatus::RetouchEligible],
            limit: retouch_target * 2,
        },
    )
    .await?;

    if (fresh_contacts.len() as i64) < fresh_target {
        warnings.push(format!(
            "insufficient fresh leads: requested {fresh_target}, found {}",
            fresh_contacts.len()
        ));
    }

    let selected_fresh = apply_company_cap(&fresh_contacts, max_per_company, &HashMap::new());
    let company_counts = count_by_company(&selected_fresh);
    let selected_retouch = apply_company_cap(&retouch_contacts, max_per_company, &company_counts);

    let mut all_selected: Vec<Contact> = Vec::new();
    let fresh_take = (fresh_target as usize).min(selected_fresh.len());
    all_selected.extend_from_slice(&selected_fresh[..fresh_take]);

    let remaining = (request.volume - all_selected.len() as i64).max(0) as usize;
    let retouch_take = remaining.min(selected_retouch.len());
    all_selected.extend_from_slice(&selected_retouch[..retouch_take]);

    if (all_selected.len() as i64) < request.volume {
        let backfill_count = (request.volume - all_selected.len() as i64) as usize;
        let start = fresh_take;
        let end = (start + backfill_count).min(selected_fresh.len());
        if start < end {
            all_selected.extend_from_slice(&selected_fresh[start..end]);
        }
    }

    if (all_selected.len() as i64) < request.volume {
        warnings.push(format!(
            "volume shortfall: requested {}, assigned {}",
            request.volume,
            all_selected.len()
        ));
    }

    let mut companies_touched = std::collections::HashSet::new();
    let mut fresh_count = 0i64;
    let mut retouch_count = 0i64;

    for contact in &all_selected {
        assign_contact(pool, cooldown_cfg, defaults, contact, request).await?;
        companies_touched.insert(contact.company_domain.clone());
        if contact.disposition_status == DispositionStatus::Fresh {
            fresh_count += 1;
        } else {
            retouch_count += 1;
        }
    }

    Ok(CampaignFillResult {
        campaign_id: request.campaign_id.clone(),
        client_id: request.client_id.clone(),
        total_requested: request.volume,
        total_assigned: all_selected.len() as i64,
        fresh_count,
        retouch_count,
        companies_touched: companies_touched.len() as i64,
        contacts: all_selected,
        warnings,
    })
}

/// Transitions, touches, logs, and claims ownership for one contact as a
/// single transaction: either every write lands or none do.
async fn assign_contact(
    pool: &PgPool,
    cooldown_cfg: &CooldownConfig,
    defaults: &FillDefaults,
    contact: &Contact,
    request: &CampaignFillRequest,
) -> anyhow::Result<()> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    ld_state_machine::transition_in_tx(
        &mut tx,
        cooldown_cfg,
        &contact.email,
        &contact.client_id,
        DispositionStatus::InSequence,
        request.channel,
        Some(&format!("assigned_to_campaign:{}", request.campaign_id)),
        TriggeredBy::CampaignFill,
        Some(&request.campaign_id),
    )
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    ld_db::record_contact_touch(&mut *tx, &contact.email, &contact.client_id, request.channel, now)
        .await?;

    ld_db::insert_assignment(
        &mut *tx,
        &contact.email,
        &contact.client_id,
        &request.campaign_id,
        &request.client_id,
        request.channel,
    )
    .await?;

    ld_deconfliction::claim_in_tx(
        &mut tx,
        &contact.company_domain,
        &request.client_id,
        defaults.ownership_duration_months,
    )
    .await?;

    tx.commit().await?;

    Ok(())
}
