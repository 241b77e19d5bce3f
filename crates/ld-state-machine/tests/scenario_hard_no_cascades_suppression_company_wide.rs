use chrono::Utc;
use ld_schemas::{Channel, CompanyStatus, Contact, DispositionStatus, TriggeredBy};
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
        disposition_status: DispositionStatus::InSequence,
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

/// Scenario: a hard-no from one contact at a company suppresses the whole
/// company (and every other contact at that domain), not just the one
/// contact that replied.
#[tokio::test]
async fn hard_no_suppresses_every_contact_at_the_company() -> anyhow::Result<()> {
    let pool = match std::env::var(ld_db::ENV_DB_URL) {
        Ok(_) => ld_db::testkit_db_pool().await?,
        Err(_) => {
            eprintln!("SKIP: {} not set", ld_db::ENV_DB_URL);
            return Ok(());
        }
    };

    let domain = format!("s2-hardno-{}.example", Utc::now().timestamp_nanos_opt().unwrap());
    ld_db::ensure_company(&pool, &domain, None).await?;

    let a = new_contact("a@acme.test", "client_1", &domain);
    let b = new_contact("b@acme.test", "client_1", &domain);
    let c = new_contact("c@acme.test", "client_1", &domain);
    for contact in [&a, &b, &c] {
        ld_db::create_contact(&pool, contact).await?;
    }

    let cfg = CooldownConfig::default();
    ld_state_machine::transition(
        &pool,
        &cfg,
        &a.email,
        &a.client_id,
        DispositionStatus::RepliedHardNo,
        Channel::Email,
        Some("not interested, do not contact again"),
        TriggeredBy::Ui,
        None,
    )
    .await
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let company = ld_db::get_company(&pool, &domain).await?.unwrap();
    assert!(company.company_suppressed);
    assert_eq!(company.company_status, CompanyStatus::Suppressed);

    for email in [&a.email, &b.email, &c.email] {
        let contact = ld_db::get_contact(&pool, email, "client_1").await?.unwrap();
        assert!(contact.email_suppressed, "{email} should be suppressed");
    }

    Ok(())
}
