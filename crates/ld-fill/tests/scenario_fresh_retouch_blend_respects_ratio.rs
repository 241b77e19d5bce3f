use chrono::Utc;
use ld_fill::FillDefaults;
use ld_schemas::{CampaignFillRequest, Channel, Contact, DispositionStatus};
use ld_state_machine::CooldownConfig;

fn new_contact(email: &str, client_id: &str, domain: &str, status: DispositionStatus) -> Contact {
    Contact {
        email: email.into(),
        client_id: client_id.into(),
        company_domain: domain.into(),
        first_name: None,
        last_name: None,
        last_known_title: Some("VP Sales".into()),
        last_known_company: None,
        disposition_status: status,
        disposition_updated_at: None,
        email_last_contacted: None,
        linkedin_last_contacted: None,
        phone_last_contacted: None,
        email_cooldown_until: None,
        linkedin_cooldown_until: None,
        phone_cooldown_until: None,
        email_suppressed: false,
        linkedin_suppressed: false,
        phone_suppressed: false,
        data_enriched_at: Some(Utc::now()),
        sequence_count: 0,
        source_system: None,
        source_id: None,
        created_at: None,
        updated_at: None,
    }
}

/// Scenario: 100 FRESH + 100 RETOUCH_ELIGIBLE at distinct domains, volume
/// 10, fresh_ratio=0.7 -> 7 fresh, 3 retouch, 10 distinct companies touched.
#[tokio::test]
async fn blends_fresh_and_retouch_to_the_requested_ratio() -> anyhow::Result<()> {
    let pool = match std::env::var(ld_db::ENV_DB_URL) {
        Ok(_) => ld_db::testkit_db_pool().await?,
        Err(_) => {
            eprintln!("SKIP: {} not set", ld_db::ENV_DB_URL);
            return Ok(());
        }
    };

    let run_id = Utc::now().timestamp_nanos_opt().unwrap();
    let client_id = format!("client-s5-{run_id}");

    for i in 0..100 {
        let domain = format!("s5-fresh-{run_id}-{i}.example");
        ld_db::ensure_company(&pool, &domain, None).await?;
        let contact = new_contact(&format!("f{i}@s5-fresh-{run_id}-{i}.example"), &client_id, &domain, DispositionStatus::Fresh);
        ld_db::create_contact(&pool, &contact).await?;
    }
    for i in 0..100 {
        let domain = format!("s5-retouch-{run_id}-{i}.example");
        ld_db::ensure_company(&pool, &domain, None).await?;
        let contact = new_contact(
            &format!("r{i}@s5-retouch-{run_id}-{i}.example"),
            &client_id,
            &domain,
            DispositionStatus::RetouchEligible,
        );
        ld_db::create_contact(&pool, &contact).await?;
    }

    let cooldown_cfg = CooldownConfig::default();
    let defaults = FillDefaults {
        fresh_retouch_ratio: 0.7,
        max_contacts_per_company: 10,
        ownership_duration_months: 12,
    };
    let request = CampaignFillRequest {
        campaign_id: "s5-campaign".to_string(),
        client_id: client_id.clone(),
        channel: Channel::Email,
        volume: 10,
        title_keywords: Vec::new(),
        fresh_ratio: Some(0.7),
        max_per_company: None,
    };

    let result = ld_fill::fill(&pool, &cooldown_cfg, &defaults, &request).await?;

    assert_eq!(result.total_assigned, 10);
    assert_eq!(result.fresh_count, 7);
    assert_eq!(result.retouch_count, 3);
    assert_eq!(result.companies_touched, 10);

    Ok(())
}
