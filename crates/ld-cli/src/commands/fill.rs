use anyhow::Result;
use ld_schemas::CampaignFillRequest;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    campaign_id: String,
    client_id: String,
    channel: String,
    volume: i64,
    title_keywords: Option<String>,
    fresh_ratio: Option<f64>,
    max_per_company: Option<i64>,
) -> Result<()> {
    let settings = ld_config::Settings::from_env();
    let pool = ld_db::connect_from_env().await?;
    let cooldown_cfg = ld_state_machine::CooldownConfig::from(&settings);
    let defaults = ld_fill::FillDefaults::from(&settings);

    let request = CampaignFillRequest {
        campaign_id,
        client_id,
        channel: super::parse_channel(&channel)?,
        volume,
        title_keywords: super::split_csv(&title_keywords),
        fresh_ratio,
        max_per_company,
    };

    let result = ld_fill::fill(&pool, &cooldown_cfg, &defaults, &request).await?;

    println!("campaign_id={}", result.campaign_id);
    println!("total_requested={}", result.total_requested);
    println!("total_assigned={}", result.total_assigned);
    println!("fresh_count={}", result.fresh_count);
    println!("retouch_count={}", result.retouch_count);
    println!("companies_touched={}", result.companies_touched);
    for w in &result.warnings {
        println!("warning={w}");
    }

    Ok(())
}
