use chrono::Utc;
use ld_schemas::{Channel, Company, Contact, DispositionStatus, TriggeredBy};
use ld_state_machine::CooldownConfig;

fn new_contact(email: &str, client_id: &str, domain: &str) -> Contact {
    Contact {
        email: email.into(),
        client_id: client_id.into(),
        company_domain: domain.into(),
        first_name: None,
        last_name: None,
        last_known_title: None,
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

/// Scenario: fresh -> IN_SEQUENCE -> COMPLETED_NO_RESPONSE -> (sweep) ->
/// RETOUCH_ELIGIBLE, with the company counters and status following along.
#[tokio::test]
async fn fresh_to_in_sequence_to_completed_then_swept_to_retouch() -> anyhow::Result<()> {
    let pool = match std::env::var(ld_db::ENV_DB_URL) {
        Ok(_) => ld_db::testkit_db_pool().await?,
        Err(_) => {
            eprintln!("SKIP: {} not set", ld_db::ENV_DB_URL);
            return Ok(());
        }
    };

    let domain = format!("s1-sweep-{}.example", Utc::now().timestamp_nanos_opt().unwrap());
    ld_db::ensure_company(&pool, &domain, None).await?;
    let contact = new_contact("s1@x.test", "client-s1", &domain);
    ld_db::create_contact(&pool, &contact).await?;

    let cfg = CooldownConfig::default();

    ld_state_machine::transition(
        &pool,
        &cfg,
        &contact.email,
        &contact.client_id,
        DispositionStatus::InSequence,
        Channel::Email,
        None,
        TriggeredBy::Ui,
        None,
    )
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let company: Company = ld_db::get_company(&pool, &domain).await?.unwrap();
    assert_eq!(company.contacts_in_sequence, 1);
    assert_eq!(company.company_status, ld_schemas::CompanyStatus::Active);

    ld_state_machine::transition(
        &pool,
        &cfg,
        &contact.email,
        &contact.client_id,
        DispositionStatus::CompletedNoResponse,
        Channel::Email,
        None,
        TriggeredBy::Ui,
        None,
    )
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let after_complete = ld_db::get_contact(&pool, &contact.email, &contact.client_id).await?.unwrap();
    assert!(after_complete.email_cooldown_until.is_some());
    let company = ld_db::get_company(&pool, &domain).await?.unwrap();
    assert_eq!(company.contacts_in_sequence, 0);
    assert_eq!(company.company_status, ld_schemas::CompanyStatus::Cooling);

    // Force the cooldown into the past so the sweep picks it up, rather than
    // waiting 90 real days.
    sqlx::query("UPDATE contacts SET email_cooldown_until = $1 WHERE email = $2")
        .bind(Utc::now() - chrono::Duration::days(1))
        .bind(&contact.email)
        .execute(&pool)
        .await?;

    let swept = ld_state_machine::process_expired_cooldowns(&pool, &cfg).await?;
    assert!(swept >= 1);

    let final_contact = ld_db::get_contact(&pool, &contact.email, &contact.client_id).await?.unwrap();
    assert_eq!(final_contact.disposition_status, DispositionStatus::RetouchEligible);

    let history = ld_db::get_contact_history(&pool, &contact.email, &contact.client_id).await?;
    assert!(history.len() >= 3);

    Ok(())
}
