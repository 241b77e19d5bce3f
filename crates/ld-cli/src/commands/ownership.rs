use anyhow::Result;

pub async fn claim(domain: String, client_id: String) -> Result<()> {
    let settings = ld_config::Settings::from_env();
    let pool = ld_db::connect_from_env().await?;
    let claimed = ld_deconfliction::claim(&pool, &domain, &client_id, settings.ownership_duration_months).await?;
    println!("claimed={claimed}");
    Ok(())
}

pub async fn release(domain: String) -> Result<()> {
    let pool = ld_db::connect_from_env().await?;
    let released = ld_deconfliction::release(&pool, &domain).await?;
    println!("released={released}");
    Ok(())
}

pub async fn transfer(domain: String, client_id: String) -> Result<()> {
    let settings = ld_config::Settings::from_env();
    let pool = ld_db::connect_from_env().await?;
    let transferred =
        ld_deconfliction::transfer(&pool, &domain, &client_id, settings.ownership_duration_months).await?;
    println!("transferred={transferred}");
    Ok(())
}
