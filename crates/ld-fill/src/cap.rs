//! Pure per-company cap enforcement, kept free of
//! I/O for unit testing.

use ld_schemas::Contact;
use std::collections::HashMap;

/// Keeps at most `max_per_company` contacts per `company_domain`, in the
/// order given, seeding the running counts from `existing_counts` so a
/// second pass (retouch after fresh) respects slots the first pass already
/// used.
pub fn apply_company_cap(
    contacts: &[Contact],
    max_per_company: i64,
    existing_counts: &HashMap<String, i64>,
) -> Vec<Contact> {
    let mut counts = existing_counts.clone();
    let mut result = Vec::new();
    for c in contacts {
        let current = counts.get(&c.company_domain).copied().unwrap_or(0);
        if current < max_per_company {
            result.push(c.clone());
            counts.insert(c.company_domain.clone(), current + 1);
        }
    }
    result
}

pub fn count_by_company(contacts: &[Contact]) -> HashMap<String, i64> {
    let mut counts = HashMap::new();
    for c in contacts {
        *counts.entry(c.company_domain.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn contact(email: &str, domain: &str) -> Contact {
        Contact {
            email: email.into(),
            client_id: "client-a".into(),
            company_domain: domain.into(),
            first_name: None,
            last_name: None,
            last_known_title: None,
            last_known_company: None,
            disposition_status: ld_schemas::DispositionStatus::Fresh,
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

    #[test]
    fn caps_contacts_per_company() {
        let contacts = vec![
            contact("a1@x.test", "acme.test"),
            contact("a2@x.test", "acme.test"),
            contact("a3@x.test", "acme.test"),
            contact("b1@x.test", "globex.test"),
        ];
        let result = apply_company_cap(&contacts, 2, &HashMap::new());
        assert_eq!(result.len(), 3);
        assert_eq!(
            result.iter().filter(|c| c.company_domain == "acme.test").count(),
            2
        );
    }

    #[test]
    fn seeds_counts_from_existing_pass() {
        let mut existing = HashMap::new();
        existing.insert("acme.test".to_string(), 2);
        let contacts = vec![contact("a4@x.test", "acme.test")];
        let result = apply_company_cap(&contacts, 2, &existing);
        assert!(result.is_empty());
    }

    #[test]
    fn count_by_company_tallies_correctly() {
        let contacts = vec![
            contact("a1@x.test", "acme.test"),
            contact("a2@x.test", "acme.test"),
            contact("b1@x.test", "globex.test"),
        ];
        let counts = count_by_company(&contacts);
        assert_eq!(counts["acme.test"], 2);
        assert_eq!(counts["globex.test"], 1);
    }
}
