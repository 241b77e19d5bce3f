use chrono::Utc;
use ld_fill::FillDefaults;
use ld_schemas::{CampaignFillRequest, Channel, Contact, DispositionStatus};
use ld_state_machine::CooldownConfig;

fn new_contact(email: &str, client_id: &str, domain: &str) -> Contact {
    Contact {
        email: email.into(),
        client_id: client_id.into(),
        company_domain: domain.into(),
        first_name: None,
        last_name: None,
        last_known_title: Some("VP Sales".into()),
        last_known_company: None,
        disposition_status: DispositionStatus::Fresh,
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

/// Scenario: 10 eligible contacts at one domain, max_per_company=3,
/// requested volume=5 -> only 3 get assigned and a shortfall warning fires.
#[tokio::test]
async fn ten_eligible_contacts_one_domain_capped_at_three() -> anyhow::Result<()> {
    let pool = match std::env::var(ld_db::ENV_DB_URL) {
        Ok(_) => ld_db::testkit_db_pool().await?,
        Err(_) => {
            eprintln!("SKIP: {} not set", ld_db::ENV_DB_URL);
            return Ok(());
        }
    };

    let domain = format!("s4-cap-{}.example", Utc::now().timestamp_nanos_opt().unwrap());
    ld_db::ensure_company(&pool, &domain, None).await?;

    let client_id = format!("client-s4-{}", Utc::now().timestamp_nanos_opt().unwrap());
    for i in 0..10 {
        let contact = new_contact(&format!("c{i}@s4-cap.test"), &client_id, &domain);
        ld_db::create_contact(&pool, &contact).await?;
    }

    let cooldown_cfg = CooldownConfig::default();
    let defaults = FillDefaults {
        fresh_retouch_ratio: 0.7,
        max_contacts_per_company: 3,
        ownership_duration_months: 12,
    };
    let request = CampaignFillRequest {
        campaign_id: "s4-campaign".to_string(),
        client_id: client_id.clone(),
        channel: Channel::Email,
        volume: 5,
        title_keywords: Vec::new(),
        fresh_ratio: Some(1.0),
        max_per_company: Some(3),
    };

    let result = ld_fill::fill(&pool, &cooldown_cfg, &defaults, &request).await?;

    assert_eq!(result.total_assigned, 3);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("shortfall") && w.contains('5') && w.contains('3')));

    Ok(())
}
