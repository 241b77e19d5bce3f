use chrono::Utc;
use ld_schemas::{Channel, Contact, DispositionStatus};

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

/// Scenario: an unowned domain is claimed by the first client to assign a
/// contact there; a concurrent client is blocked from targeting it, and the
/// ownership expiry is `months * 30` days out.
#[tokio::test]
async fn first_claim_sets_ownership_and_blocks_a_second_client() -> anyhow::Result<()> {
    let pool = match std::env::var(ld_db::ENV_DB_URL) {
        Ok(_) => ld_db::testkit_db_pool().await?,
        Err(_) => {
            eprintln!("SKIP: {} not set", ld_db::ENV_DB_URL);
            return Ok(());
        }
    };

    let domain = format!("s3-claim-{}.example", Utc::now().timestamp_nanos_opt().unwrap());
    ld_db::ensure_company(&pool, &domain, None).await?;
    let contact = new_contact("zeta@x.test", "client_1", &domain);
    ld_db::create_contact(&pool, &contact).await?;

    let claimed = ld_deconfliction::claim(&pool, &domain, "client_1", 12).await?;
    assert!(claimed);

    let company = ld_db::get_company(&pool, &domain).await?.unwrap();
    assert_eq!(company.client_owner_id.as_deref(), Some("client_1"));
    let owned_at = company.client_owned_at.unwrap();
    let expires_at = company.ownership_expires_at.unwrap();
    let delta = expires_at - owned_at;
    assert_eq!(delta.num_days(), 12 * 30);

    // client_1 assigning the same domain again is a no-op claim, still theirs.
    let reclaimed = ld_deconfliction::claim(&pool, &domain, "client_1", 12).await?;
    assert!(reclaimed);

    // client_2 cannot target the domain while client_1 owns it.
    let gate = ld_deconfliction::can_target(Some(&company), "client_2", Utc::now());
    assert!(!gate.is_permitted());

    let blocked_claim = ld_deconfliction::claim(&pool, &domain, "client_2", 12).await?;
    assert!(!blocked_claim);

    let eligible = ld_db::query_eligible_contacts(
        &pool,
        &ld_db::EligibilityQuery {
            client_id: "client_2",
            channel: Channel::Email,
            title_keywords: &[],
            status_filter: &[],
            limit: 100,
        },
    )
    .await?;
    assert!(!eligible.iter().any(|c| c.email == contact.email));

    Ok(())
}
