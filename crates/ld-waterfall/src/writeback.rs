//! Turns external leads pulled from a provider into new `fresh` contacts.

use chrono::Utc;
use ld_schemas::{Contact, DispositionStatus, ExternalLead, WriteBackResult};
use sqlx::PgPool;

/// Rejects a lead with no usable email and derives `company_domain` from it
/// when the provider didn't supply one.
fn external_lead_to_contact(lead: &ExternalLead, client_id: &str) -> Option<Contact> {
    let email = lead.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return None;
    }

    let domain = lead
        .company_domain
        .as_deref()
        .map(str::to_lowercase)
        .filter(|d| !d.is_empty())
        .or_else(|| email.split('@').nth(1).map(str::to_string))?;

    Some(Contact {
        email,
        client_id: client_id.to_string(),
        company_domain: domain,
        first_name: lead.first_name.clone(),
        last_name: lead.last_name.clone(),
        last_known_title: lead.title.clone(),
        last_known_company: lead.company_name.clone(),
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
        source_system: Some(lead.source_provider.clone()),
        source_id: lead.source_id.clone(),
        created_at: None,
        updated_at: None,
    })
}

/// Writes a batch of external leads back as fresh contacts, skipping
/// unusable and duplicate ones. Ensures the companies touched exist and
/// have an up to date `contacts_total` before returning, so the caller's
/// fill-eligibility view of the company is immediately correct.
pub async fn write_back_leads(
    pool: &PgPool,
    client_id: &str,
    leads: &[ExternalLead],
) -> anyhow::Result<WriteBackResult> {
    let mut contacts = Vec::with_capacity(leads.len());
    let mut invalid_skipped = 0i64;

    for lead in leads {
        match external_lead_to_contact(lead, client_id) {
            Some(contact) => contacts.push(contact),
            None => invalid_skipped += 1,
        }
    }

    if contacts.is_empty() {
        return Ok(WriteBackResult {
            total_processed: leads.len() as i64,
            new_inserted: 0,
            duplicates_skipped: 0,
            invalid_skipped,
            errors: Vec::new(),
        });
    }

    let mut domains: Vec<&str> = contacts.iter().map(|c| c.company_domain.as_str()).collect();
    domains.sort_unstable();
    domains.dedup();

    // The contacts.company_domain foreign key requires the company row to
    // exist before insert, so lazily create it first ("every newly
    // created domain lazily creates a Company row").
    for domain in &domains {
        ld_db::ensure_company(pool, domain, None).await?;
    }

    let inserted = match ld_db::bulk_create_contacts(pool, &contacts).await {
        Ok(count) => count,
        Err(e) => {
            return Ok(WriteBackResult {
                total_processed: leads.len() as i64,
                new_inserted: 0,
                duplicates_skipped: 0,
                invalid_skipped,
                errors: vec![format!("bulk insert failed: {e}")],
            })
        }
    };

    for domain in &domains {
        ld_db::recount_contacts_total(pool, domain).await?;
    }

    Ok(WriteBackResult {
        total_processed: leads.len() as i64,
        new_inserted: inserted,
        duplicates_skipped: contacts.len() as i64 - inserted,
        invalid_skipped,
        errors: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn lead(email: &str, domain: Option<&str>) -> ExternalLead {
        ExternalLead {
            email: email.to_string(),
            first_name: None,
            last_name: None,
            company_name: None,
            company_domain: domain.map(str::to_string),
            title: None,
            linkedin_url: None,
            phone: None,
            location: None,
            industry: None,
            company_size: None,
            source_provider: "ai_ark".to_string(),
            source_id: None,
            raw_data: Value::Null,
        }
    }

    #[test]
    fn rejects_lead_with_no_email() {
        assert!(external_lead_to_contact(&lead("", None), "acme").is_none());
        assert!(external_lead_to_contact(&lead("not-an-email", None), "acme").is_none());
    }

    #[test]
    fn derives_domain_from_email_when_missing() {
        let contact = external_lead_to_contact(&lead("Jane@Acme.com", None), "acme").unwrap();
        assert_eq!(contact.email, "jane@acme.com");
        assert_eq!(contact.company_domain, "acme.com");
    }

    #[test]
    fn prefers_explicit_domain_over_email_derived_one() {
        let contact = external_lead_to_contact(&lead("jane@mail.acme.com", Some("Acme.com")), "acme").unwrap();
        assert_eq!(contact.company_domain, "acme.com");
    }
}
