use anyhow::Result;

pub async fn cooldowns() -> Result<()> {
    let settings = ld_config::Settings::from_env();
    let pool = ld_db::connect_from_env().await?;
    let cfg = ld_state_machine::CooldownConfig::from(&settings);

    let count = ld_state_machine::process_expired_cooldowns(&pool, &cfg).await?;
    println!("cooldowns_cleared={count}");
    Ok(())
}

pub async fn stale() -> Result<()> {
    let settings = ld_config::Settings::from_env();
    let pool = ld_db::connect_from_env().await?;
    let cfg = ld_state_machine::CooldownConfig::from(&settings);

    let count = ld_state_machine::process_stale_data(&pool, &cfg, settings.stale_data_months).await?;
    println!("marked_stale={count}");
    Ok(())
}

pub async fn ownership_expiry() -> Result<()> {
    let pool = ld_db::connect_from_env().await?;
    let count = ld_deconfliction::sweep_expired(&pool).await?;
    println!("ownerships_released={count}");
    Ok(())
}
