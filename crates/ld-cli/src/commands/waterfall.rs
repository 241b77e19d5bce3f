use anyhow::Result;
use ld_schemas::WaterfallFillRequest;
use tokio_util::sync::CancellationToken;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    campaign_id: String,
    client_id: String,
    channel: String,
    volume: i64,
    title_keywords: Option<String>,
    fresh_ratio: Option<f64>,
    max_per_company: Option<i64>,
    enable_external: bool,
    max_external_credits: f64,
    providers_override: Option<String>,
    industry: Option<String>,
    company_sizes: Option<String>,
    locations: Option<String>,
    search_keywords: Option<String>,
    company_domains: Option<String>,
) -> Result<()> {
    let settings = ld_config::Settings::from_env();
    let pool = ld_db::connect_from_env().await?;
    let cooldown_cfg = ld_state_machine::CooldownConfig::from(&settings);

    let providers_override = match super::split_csv(&providers_override) {
        names if names.is_empty() => None,
        names => Some(names),
    };

    let request = WaterfallFillRequest {
        campaign_id,
        client_id,
        channel: super::parse_channel(&channel)?,
        volume,
        title_keywords: super::split_csv(&title_keywords),
        fresh_ratio,
        max_per_company,
        enable_external,
        max_external_credits,
        providers_override,
        industry,
        company_sizes: super::split_csv(&company_sizes),
        locations: super::split_csv(&locations),
        search_keywords: super::split_csv(&search_keywords),
        company_domains: super::split_csv(&company_domains),
    };

    let result = ld_waterfall::fill_campaign(
        &pool,
        &cooldown_cfg,
        &settings,
        &request,
        CancellationToken::new(),
    )
    .await?;

    println!("campaign_id={}", result.campaign_id);
    println!("total_requested={}", result.total_requested);
    println!("internal_filled={}", result.internal_filled);
    println!("external_filled={}", result.external_filled);
    println!("write_back_count={}", result.write_back_count);
    for (provider, credits) in &result.credits_consumed {
        println!("credits_consumed.{provider}={credits}");
    }
    for (provider, count) in &result.per_provider_counts {
        println!("per_provider_counts.{provider}={count}");
    }
    for w in &result.warnings {
        println!("warning={w}");
    }

    Ok(())
}
