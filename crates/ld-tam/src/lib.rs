//! ld-tam — the TAM tracker.
//!
//! Classifies the health of a client's (or the whole platform's) total
//! addressable market from live pool counts and a trailing burn rate, and
//! persists point-in-time snapshots for trend reporting.

use chrono::Utc;
use ld_db::tam::{TamPoolCounts, TamSnapshotInput};
use ld_schemas::{TamHealth, TamHealthStatus, TamSnapshot};
use sqlx::PgPool;

/// Computes the live health snapshot for `client_id` (`None` = whole
/// platform). `exhaustion_eta_weeks` is `available_now / burn_rate`, left
/// unset when nothing is burning — an idle pool isn't "about to run out."
pub async fn get_health(
    pool: &PgPool,
    settings: &ld_config::Settings,
    client_id: Option<&str>,
) -> anyhow::Result<TamHealth> {
    let counts = ld_db::get_tam_pools(pool, client_id).await?;
    let burn_rate_weekly = ld_db::get_burn_rate(pool, client_id).await?;
    let eta = exhaustion_eta(&counts, burn_rate_weekly);
    let health_status = classify(eta, settings);

    Ok(TamHealth {
        total_universe: counts.total_universe,
        never_touched: counts.never_touched,
        in_cooldown: counts.in_cooldown,
        available_now: counts.available_now,
        permanent_suppress: counts.permanent_suppress,
        in_sequence: counts.in_sequence,
        won_customer: counts.won_customer,
        burn_rate_weekly,
        exhaustion_eta_weeks: eta,
        health_status,
    })
}

fn exhaustion_eta(counts: &TamPoolCounts, burn_rate_weekly: f64) -> Option<f64> {
    if burn_rate_weekly > 0.0 {
        Some(counts.available_now as f64 / burn_rate_weekly)
    } else {
        None
    }
}

fn classify(eta: Option<f64>, settings: &ld_config::Settings) -> TamHealthStatus {
    match eta {
        Some(weeks) if weeks < settings.tam_critical_weeks as f64 => TamHealthStatus::Critical,
        Some(weeks) if weeks < settings.tam_warning_weeks as f64 => TamHealthStatus::Warning,
        _ => TamHealthStatus::Healthy,
    }
}

/// Persists today's pool counts and burn rate for `client_id` (`None` =
/// global). Upserts on `(snapshot_date, client_id)` so re-running on the
/// same day overwrites rather than duplicating.
pub async fn capture_snapshot(
    pool: &PgPool,
    client_id: Option<&str>,
) -> anyhow::Result<()> {
    let counts = ld_db::get_tam_pools(pool, client_id).await?;
    let burn_rate_weekly = ld_db::get_burn_rate(pool, client_id).await?;
    let eta = exhaustion_eta(&counts, burn_rate_weekly);

    ld_db::insert_tam_snapshot(
        pool,
        Utc::now().date_naive(),
        &TamSnapshotInput {
            client_id: client_id.map(str::to_string),
            counts,
            burn_rate_weekly: Some(burn_rate_weekly),
            exhaustion_eta_weeks: eta,
        },
    )
    .await
}

/// Captures the global snapshot plus one per distinct `client_id` currently
/// present in the contacts table — the operator-triggered daily sweep.
pub async fn capture_all(pool: &PgPool) -> anyhow::Result<i64> {
    capture_snapshot(pool, None).await?;
    let mut captured = 1i64;

    for client_id in ld_db::get_distinct_clients(pool).await? {
        capture_snapshot(pool, Some(&client_id)).await?;
        captured += 1;
    }

    Ok(captured)
}

/// Snapshots for `client_id` within the trailing `days`, oldest first — the
/// shape a trend chart wants, as opposed to `ld_db::get_snapshots`'s
/// newest-first storage order.
pub async fn get_trends(
    pool: &PgPool,
    client_id: Option<&str>,
    days: i64,
) -> anyhow::Result<Vec<TamSnapshot>> {
    let mut snapshots = ld_db::get_snapshots(pool, client_id, days).await?;
    snapshots.reverse();
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ld_config::Settings {
        let mut s = ld_config::Settings::from_env();
        s.tam_warning_weeks = 8;
        s.tam_critical_weeks = 4;
        s
    }

    #[test]
    fn idle_pool_with_no_burn_is_healthy_regardless_of_size() {
        let counts = TamPoolCounts {
            available_now: 10_000,
            ..Default::default()
        };
        assert_eq!(exhaustion_eta(&counts, 0.0), None);
        assert_eq!(classify(None, &settings()), TamHealthStatus::Healthy);
    }

    #[test]
    fn eta_under_critical_threshold_is_critical() {
        let counts = TamPoolCounts {
            available_now: 40,
            ..Default::default()
        };
        let eta = exhaustion_eta(&counts, 20.0).unwrap();
        assert_eq!(eta, 2.0);
        assert_eq!(classify(Some(eta), &settings()), TamHealthStatus::Critical);
    }

    #[test]
    fn eta_between_warning_and_critical_is_warning() {
        assert_eq!(classify(Some(6.0), &settings()), TamHealthStatus::Warning);
    }

    #[test]
    fn eta_above_warning_threshold_is_healthy() {
        assert_eq!(classify(Some(12.0), &settings()), TamHealthStatus::Healthy);
    }
}
