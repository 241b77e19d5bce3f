//! Jina — Reader-based scraping of a company's team/about pages, falling
//! back to keyword search when no domains are given.

use ld_schemas::{ExternalLead, ProviderResult, SearchCriteria};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::LeadProvider;

const TEAM_PAGE_PATHS: &[&str] = &["/team", "/about", "/about-us", "/contact", "/our-team", "/people"];
const EXCLUDED_LOCAL_PARTS: &[&str] = &["info", "support", "hello", "contact", "noreply", "no-reply", "admin"];

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap())
}

fn linkedin_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"linkedin\.com/in/[a-zA-Z0-9_-]+").unwrap())
}

pub struct JinaProvider {
    api_key: String,
    reader_url: String,
    http: reqwest::Client,
}

impl JinaProvider {
    pub fn new(settings: &ld_config::Settings) -> Self {
        Self {
            api_key: settings.jina_api_key.clone(),
            reader_url: settings.jina_api_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn fetch_page(&self, url: &str) -> Option<String> {
        let mut req = self.http.get(format!("{}/{}", self.reader_url, url));
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }
        let resp = req.send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        resp.text().await.ok()
    }

    async fn search_by_domains(&self, domains: &[String]) -> (Vec<ExternalLead>, f64) {
        let mut leads = Vec::new();
        let mut credits = 0.0;

        for domain in domains {
            for path in TEAM_PAGE_PATHS {
                let url = format!("https://{domain}{path}");
                let Some(text) = self.fetch_page(&url).await else {
                    continue;
                };
                credits += 1.0;
                let page_leads = extract_contacts(&text, domain);
                if !page_leads.is_empty() {
                    leads.extend(page_leads);
                    break;
                }
            }
        }

        (leads, credits)
    }

    async fn search_by_keywords(&self, criteria: &SearchCriteria) -> (Vec<ExternalLead>, f64) {
        let query = [&criteria.keywords[..], &criteria.job_titles[..]]
            .concat()
            .join(" ");
        if query.trim().is_empty() {
            return (Vec::new(), 0.0);
        }

        let mut req = self
            .http
            .get("https://s.jina.ai/")
            .query(&[("q", query.as_str())]);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }
        let Ok(resp) = req.send().await else {
            return (Vec::new(), 1.0);
        };
        let Ok(text) = resp.text().await else {
            return (Vec::new(), 1.0);
        };

        (extract_contacts(&text, ""), 1.0)
    }
}

fn extract_contacts(text: &str, domain: &str) -> Vec<ExternalLead> {
    let mut seen = std::collections::HashSet::new();
    let mut leads = Vec::new();

    for m in email_pattern().find_iter(text) {
        let email = m.as_str().to_lowercase();
        let local_part = email.split('@').next().unwrap_or_default();
        if EXCLUDED_LOCAL_PARTS.contains(&local_part) {
            continue;
        }
        if !seen.insert(email.clone()) {
            continue;
        }

        let (first_name, last_name) = match local_part.split_once('.') {
            Some((f, l)) => (Some(capitalize(f)), Some(capitalize(l))),
            None => (None, None),
        };

        let email_domain = email.split('@').nth(1).unwrap_or(domain).to_string();
        let linkedin_url = linkedin_pattern()
            .find(text)
            .map(|m| format!("https://{}", m.as_str()));

        leads.push(ExternalLead {
            email,
            first_name,
            last_name,
            company_name: None,
            company_domain: Some(if domain.is_empty() { email_domain } else { domain.to_string() }),
            title: None,
            linkedin_url,
            phone: None,
            location: None,
            industry: None,
            company_size: None,
            source_provider: "jina".to_string(),
            source_id: None,
            raw_data: Value::Null,
        });
    }

    leads
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[async_trait::async_trait]
impl LeadProvider for JinaProvider {
    fn provider_name(&self) -> &'static str {
        "jina"
    }

    fn priority(&self) -> i32 {
        3
    }

    async fn search(&self, criteria: &SearchCriteria) -> ProviderResult {
        let (leads, credits) = if !criteria.company_domains.is_empty() {
            self.search_by_domains(&criteria.company_domains).await
        } else {
            self.search_by_keywords(criteria).await
        };

        ProviderResult {
            total_found: leads.len() as i64,
            credits_consumed: credits,
            leads,
            errors: Vec::new(),
        }
    }

    async fn health_check(&self) -> bool {
        self.fetch_page("https://example.com").await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_contacts_filters_generic_mailboxes() {
        let text = "Reach us at info@acme.com or jane.doe@acme.com";
        let leads = extract_contacts(text, "acme.com");
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].email, "jane.doe@acme.com");
        assert_eq!(leads[0].first_name.as_deref(), Some("Jane"));
        assert_eq!(leads[0].last_name.as_deref(), Some("Doe"));
    }

    #[test]
    fn extract_contacts_dedupes_repeated_addresses() {
        let text = "jane.doe@acme.com appears twice: jane.doe@acme.com";
        let leads = extract_contacts(text, "acme.com");
        assert_eq!(leads.len(), 1);
    }

    #[test]
    fn extract_contacts_picks_up_linkedin_profile_urls() {
        let text = "jane.doe@acme.com - linkedin.com/in/janedoe";
        let leads = extract_contacts(text, "acme.com");
        assert_eq!(
            leads[0].linkedin_url.as_deref(),
            Some("https://linkedin.com/in/janedoe")
        );
    }
}
