//! ld-waterfall — the provider cascade.
//!
//! Fills from the internal pool first via [`ld_fill`], then — if a deficit
//! remains and external search is enabled — walks the configured provider
//! order spending credits until the deficit closes or the credit budget
//! runs out, writes any leads found back as new contacts, and optionally
//! refills the deficit from what it just wrote back.
//!
//! A provider's `search` never raises (see `ld-providers`), so the
//! per-provider loop has no try/catch — a non-empty `ProviderResult.errors`
//! is simply folded into this result's warnings and the cascade moves on.
//! A [`tokio_util::sync::CancellationToken`] lets a caller abort mid-cascade;
//! the partial result accumulated so far is returned with a warning rather
//! than an error.

mod writeback;

use ld_fill::FillDefaults;
use ld_schemas::{CampaignFillRequest, SearchCriteria, WaterfallFillRequest, WaterfallFillResult};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

pub use writeback::write_back_leads;

pub async fn fill_campaign(
    pool: &PgPool,
    cooldown_cfg: &ld_state_machine::CooldownConfig,
    settings: &ld_config::Settings,
    request: &WaterfallFillRequest,
    cancel: CancellationToken,
) -> anyhow::Result<WaterfallFillResult> {
    let mut result = WaterfallFillResult::new(
        request.campaign_id.clone(),
        request.client_id.clone(),
        request.volume,
    );

    // Step 1: internal fill from the existing eligible pool.
    let internal_defaults = FillDefaults::from(settings);
    let internal_request = CampaignFillRequest {
        campaign_id: request.campaign_id.clone(),
        client_id: request.client_id.clone(),
        channel: request.channel,
        volume: request.volume,
        title_keywords: request.title_keywords.clone(),
        fresh_ratio: request.fresh_ratio,
        max_per_company: request.max_per_company,
    };
    let internal = ld_fill::fill(pool, cooldown_cfg, &internal_defaults, &internal_request).await?;

    result.internal_filled = internal.total_assigned;
    result.fresh_count = internal.fresh_count;
    result.retouch_count = internal.retouch_count;
    result.companies_touched = internal.companies_touched;
    result.contacts = internal.contacts;
    result.warnings.extend(internal.warnings);
    result
        .per_provider_counts
        .insert("internal".to_string(), internal.total_assigned);

    let mut deficit = request.volume - result.internal_filled;

    // Step 2-6: external cascade, only if there's still a deficit and the
    // caller allows it.
    if deficit > 0 && request.enable_external && settings.waterfall_enabled {
        if cancel.is_cancelled() {
            result.warnings.push("waterfall cancelled before external cascade started".to_string());
        } else {
            run_external_cascade(pool, settings, request, &mut result, &mut deficit, cancel).await?;
        }
    }

    result.total_assigned = result.internal_filled + result.external_filled;

    if deficit > 0 {
        result.warnings.push(format!(
            "volume shortfall: requested {} (internal={}, external={})",
            request.volume, result.internal_filled, result.external_filled
        ));
    }

    Ok(result)
}

async fn run_external_cascade(
    pool: &PgPool,
    settings: &ld_config::Settings,
    request: &WaterfallFillRequest,
    result: &mut WaterfallFillResult,
    deficit: &mut i64,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let providers = ld_providers::all_providers(settings);
    let order = settings.provider_order();
    let active = ld_providers::active_providers(&providers, &order, request.providers_override.as_deref());

    let max_credits = request.max_external_credits.min(settings.waterfall_max_credits_per_fill);
    let mut credits_spent = 0.0f64;
    let mut all_leads = Vec::new();

    for provider in active {
        if *deficit <= 0 {
            break;
        }
        if credits_spent >= max_credits {
            result.warnings.push(format!(
                "Credit limit reached ({credits_spent}/{max_credits})"
            ));
            break;
        }
        if cancel.is_cancelled() {
            result
                .warnings
                .push("waterfall cancelled mid-cascade, returning partial result".to_string());
            break;
        }

        let criteria = SearchCriteria {
            client_id: request.client_id.clone(),
            industry: request.industry.clone(),
            job_titles: request.title_keywords.clone(),
            company_sizes: request.company_sizes.clone(),
            locations: request.locations.clone(),
            keywords: request.search_keywords.clone(),
            company_domains: request.company_domains.clone(),
            limit: *deficit,
        };

        let search = provider.search(&criteria);
        let outcome = tokio::select! {
            r = search => Some(r),
            _ = cancel.cancelled() => None,
        };

        let Some(provider_result) = outcome else {
            tracing::warn!(campaign_id = %request.campaign_id, "waterfall cancelled mid-cascade");
            result
                .warnings
                .push("waterfall cancelled mid-cascade, returning partial result".to_string());
            break;
        };

        for err in &provider_result.errors {
            tracing::warn!(provider = provider.provider_name(), error = %err, "provider search reported an error");
            result
                .warnings
                .push(format!("{}: {err}", provider.provider_name()));
        }

        credits_spent += provider_result.credits_consumed;
        *result
            .credits_consumed
            .entry(provider.provider_name().to_string())
            .or_insert(0.0) += provider_result.credits_consumed;
        *result
            .per_provider_counts
            .entry(provider.provider_name().to_string())
            .or_insert(0) += provider_result.leads.len() as i64;

        *deficit -= provider_result.leads.len() as i64;
        all_leads.extend(provider_result.leads);
    }

    if all_leads.is_empty() {
        return Ok(());
    }

    let write_back = write_back_leads(pool, &request.client_id, &all_leads).await?;
    result.write_back_count = write_back.new_inserted;
    result.write_back_details = Some(write_back.clone());
    result.warnings.extend(write_back.errors.clone());

    // Step 7: conditional refill — assign whatever we just wrote back, up
    // to the remaining deficit, as a pure-fresh fill (fresh_ratio=1.0).
    if write_back.new_inserted > 0 {
        let refill_volume = (request.volume - result.internal_filled).min(write_back.new_inserted).max(0);
        if refill_volume > 0 {
            let refill_defaults = FillDefaults::from(settings);
            let refill_request = CampaignFillRequest {
                campaign_id: request.campaign_id.clone(),
                client_id: request.client_id.clone(),
                channel: request.channel,
                volume: refill_volume,
                title_keywords: request.title_keywords.clone(),
                fresh_ratio: Some(1.0),
                max_per_company: request.max_per_company,
            };
            let refill = ld_fill::fill(pool, &ld_state_machine::CooldownConfig::from(settings), &refill_defaults, &refill_request).await?;
            result.external_filled = refill.total_assigned;
            result.fresh_count += refill.fresh_count;
            result.companies_touched += refill.companies_touched;
            result.contacts.extend(refill.contacts);
            result.warnings.extend(refill.warnings);
        }
    }

    Ok(())
}

/// Bridge entry point: maps an externally-claimed `lead_pull_jobs` row to
/// a waterfall request and runs it, marking the job completed or failed.
/// The polling loop that calls this repeatedly remains an external
/// collaborator; only the per-job unit of work lives here.
pub async fn process_bridge_job(
    pool: &PgPool,
    cooldown_cfg: &ld_state_machine::CooldownConfig,
    settings: &ld_config::Settings,
    job: &ld_db::LeadPullJob,
) -> anyhow::Result<WaterfallFillResult> {
    let request = ld_db::map_job_to_waterfall_request(job);
    match fill_campaign(pool, cooldown_cfg, settings, &request, CancellationToken::new()).await {
        Ok(result) => {
            let result_json = serde_json::to_value(&result)?;
            ld_db::mark_job_completed(pool, job.id, &result_json).await?;
            Ok(result)
        }
        Err(e) => {
            ld_db::mark_job_failed(pool, job.id, &e.to_string()).await?;
            Err(e)
        }
    }
}
