//! Spider — crawls a company's site looking for team/about/contact pages.
//! Requires `company_domains`; unlike Jina it crawls rather than fetching a
//! fixed path list.

use ld_schemas::{ExternalLead, ProviderResult, SearchCriteria};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

use crate::LeadProvider;

const PAGE_KEYWORDS: &[&str] = &["team", "about", "contact", "people", "staff", "leadership"];
const EXCLUDED_LOCAL_PARTS: &[&str] = &[
    "info", "support", "hello", "contact", "noreply", "no-reply", "admin", "sales", "marketing",
];

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap())
}

pub struct SpiderProvider {
    api_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl SpiderProvider {
    pub fn new(settings: &ld_config::Settings) -> Self {
        Self {
            api_url: settings.spider_api_url.trim_end_matches('/').to_string(),
            api_key: settings.spider_api_key.clone(),
            http: reqwest::Client::new(),
        }
    }

    async fn crawl(&self, domain: &str) -> Result<Vec<Value>, String> {
        let payload = json!({
            "url": format!("https://{domain}"),
            "limit": 10,
            "return_format": "markdown",
            "request": "smart",
            "depth": 2,
        });

        let resp = self
            .http
            .post(format!("{}/crawl", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| format!("Spider connection error: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("Spider API error: {}", resp.status()));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| format!("Spider response parse error: {e}"))?;

        Ok(data.as_array().cloned().unwrap_or_default())
    }
}

fn is_relevant_page(page: &Value) -> bool {
    let url = page.get("url").and_then(Value::as_str).unwrap_or_default().to_lowercase();
    let content_head: String = page
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .chars()
        .take(500)
        .collect::<String>()
        .to_lowercase();

    PAGE_KEYWORDS
        .iter()
        .any(|kw| url.contains(kw) || content_head.contains(kw))
}

fn extract_contacts(page: &Value, domain: &str) -> Vec<ExternalLead> {
    let content = page.get("content").and_then(Value::as_str).unwrap_or_default();
    let mut seen = std::collections::HashSet::new();
    let mut leads = Vec::new();

    for m in email_pattern().find_iter(content) {
        let email = m.as_str().to_lowercase();
        let local_part = email.split('@').next().unwrap_or_default();
        if EXCLUDED_LOCAL_PARTS.contains(&local_part) || !seen.insert(email.clone()) {
            continue;
        }

        leads.push(ExternalLead {
            email,
            first_name: None,
            last_name: None,
            company_name: None,
            company_domain: Some(domain.to_string()),
            title: None,
            linkedin_url: None,
            phone: None,
            location: None,
            industry: None,
            company_size: None,
            source_provider: "spider".to_string(),
            source_id: None,
            raw_data: page.clone(),
        });
    }

    leads
}

#[async_trait::async_trait]
impl LeadProvider for SpiderProvider {
    fn provider_name(&self) -> &'static str {
        "spider"
    }

    fn priority(&self) -> i32 {
        4
    }

    async fn search(&self, criteria: &SearchCriteria) -> ProviderResult {
        if criteria.company_domains.is_empty() {
            return ProviderResult {
                errors: vec!["Spider requires company_domains to crawl".to_string()],
                ..Default::default()
            };
        }
        if self.api_key.is_empty() {
            return ProviderResult {
                errors: vec!["Spider API key not configured".to_string()],
                ..Default::default()
            };
        }

        let mut leads = Vec::new();
        let mut errors = Vec::new();
        let mut pages_crawled = 0i64;

        for domain in &criteria.company_domains {
            match self.crawl(domain).await {
                Ok(pages) => {
                    let relevant: Vec<&Value> = pages.iter().filter(|p| is_relevant_page(p)).collect();
                    pages_crawled += relevant.len() as i64;
                    for page in relevant {
                        leads.extend(extract_contacts(page, domain));
                    }
                }
                Err(e) => errors.push(e),
            }
        }

        ProviderResult {
            total_found: leads.len() as i64,
            credits_consumed: pages_crawled as f64 * 0.5,
            leads,
            errors,
        }
    }

    async fn health_check(&self) -> bool {
        if self.api_key.is_empty() {
            return false;
        }
        self.http
            .post(format!("{}/scrape", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&json!({ "url": "https://example.com" }))
            .send()
            .await
            .map(|r| r.status().as_u16() < 500)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_relevant_page_matches_on_url_or_content() {
        assert!(is_relevant_page(&json!({"url": "https://acme.com/team", "content": ""})));
        assert!(is_relevant_page(&json!({"url": "https://acme.com/x", "content": "Meet our leadership"})));
        assert!(!is_relevant_page(&json!({"url": "https://acme.com/pricing", "content": "plans"})));
    }

    #[test]
    fn extract_contacts_excludes_marketing_and_sales_mailboxes() {
        let page = json!({"content": "sales@acme.com jane@acme.com"});
        let leads = extract_contacts(&page, "acme.com");
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].email, "jane@acme.com");
    }
}
