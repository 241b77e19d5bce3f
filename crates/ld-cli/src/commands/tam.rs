use anyhow::Result;

pub async fn health(client_id: Option<String>) -> Result<()> {
    let settings = ld_config::Settings::from_env();
    let pool = ld_db::connect_from_env().await?;

    let health = ld_tam::get_health(&pool, &settings, client_id.as_deref()).await?;

    println!("client_id={}", client_id.as_deref().unwrap_or("<global>"));
    println!("total_universe={}", health.total_universe);
    println!("never_touched={}", health.never_touched);
    println!("in_cooldown={}", health.in_cooldown);
    println!("available_now={}", health.available_now);
    println!("permanent_suppress={}", health.permanent_suppress);
    println!("in_sequence={}", health.in_sequence);
    println!("won_customer={}", health.won_customer);
    println!("burn_rate_weekly={}", health.burn_rate_weekly);
    match health.exhaustion_eta_weeks {
        Some(eta) => println!("exhaustion_eta_weeks={eta}"),
        None => println!("exhaustion_eta_weeks=<none>"),
    }
    println!("health_status={}", health.health_status.as_str());

    Ok(())
}

pub async fn snapshot(client_id: Option<String>) -> Result<()> {
    let pool = ld_db::connect_from_env().await?;
    ld_tam::capture_snapshot(&pool, client_id.as_deref()).await?;
    println!("snapshot_captured=true");
    Ok(())
}

pub async fn snapshot_all() -> Result<()> {
    let pool = ld_db::connect_from_env().await?;
    let count = ld_tam::capture_all(&pool).await?;
    println!("snapshots_captured={count}");
    Ok(())
}

pub async fn trends(client_id: Option<String>, days: i64) -> Result<()> {
    let pool = ld_db::connect_from_env().await?;
    let snapshots = ld_tam::get_trends(&pool, client_id.as_deref(), days).await?;

    for s in snapshots {
        println!(
            "date={} available_now={} burn_rate_weekly={} eta_weeks={}",
            s.snapshot_date,
            s.available_now,
            s.burn_rate_weekly.unwrap_or(0.0),
            s.exhaustion_eta_weeks
                .map(|e| e.to_string())
                .unwrap_or_else(|| "<none>".to_string())
        );
    }

    Ok(())
}
