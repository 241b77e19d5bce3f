use chrono::Utc;
use ld_schemas::{Channel, Contact, DispositionStatus};

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

#[tokio::test]
async fn eligibility_query_excludes_owned_by_other_client_and_suppressed() -> anyhow::Result<()> {
    let pool = match std::env::var(ld_db::ENV_DB_URL) {
        Ok(_) => ld_db::testkit_db_pool().await?,
        Err(_) => {
            eprintln!("SKIP: {} not set", ld_db::ENV_DB_URL);
            return Ok(());
        }
    };

    let domain = format!("eligibility-test-{}.example", Utc::now().timestamp_nanos_opt().unwrap());
    ld_db::ensure_company(&pool, &domain, None).await?;

    let eligible = new_contact("eligible@x.test", "client-a", &domain);
    ld_db::create_contact(&pool, &eligible).await?;

    let mut suppressed = new_contact("suppressed@x.test", "client-a", &domain);
    suppressed.email = "suppressed@x.test".into();
    ld_db::create_contact(&pool, &suppressed).await?;
    sqlx::query("UPDATE contacts SET email_suppressed = true WHERE email = $1")
        .bind(&suppressed.email)
        .execute(&pool)
        .await?;

    ld_db::set_ownership(&pool, &domain, "client-b", Utc::now(), Utc::now() + chrono::Duration::days(365)).await?;

    let results = ld_db::query_eligible_contacts(
        &pool,
        &ld_db::EligibilityQuery {
            client_id: "client-a",
            channel: Channel::Email,
            title_keywords: &[],
            status_filter: &[],
            limit: 100,
        },
    )
    .await?;

    // client-a no longer owns the company (client-b claimed it), so neither
    // contact should surface even though `eligible@x.test` itself is fine.
    assert!(!results.iter().any(|c| c.email == eligible.email));
    assert!(!results.iter().any(|c| c.email == suppressed.email));

    ld_db::clear_ownership(&pool, &domain, Utc::now()).await?;

    let results = ld_db::query_eligible_contacts(
        &pool,
        &ld_db::EligibilityQuery {
            client_id: "client-a",
            channel: Channel::Email,
            title_keywords: &[],
            status_filter: &[],
            limit: 100,
        },
    )
    .await?;

    assert!(results.iter().any(|c| c.email == eligible.email));
    assert!(!results.iter().any(|c| c.email == suppressed.email));

    Ok(())
}
