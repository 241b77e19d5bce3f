//! Clay — webhook-triggered enrichment workflow, optionally polled for an
//! async run.

use ld_schemas::{ExternalLead, ProviderResult, SearchCriteria};
use serde_json::{json, Value};
use std::time::Duration;

use crate::LeadProvider;

const POLL_INTERVAL: Duration = Duration::from_secs(10);
const MAX_WAIT: Duration = Duration::from_secs(180);

pub struct ClayProvider {
    webhook_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl ClayProvider {
    pub fn new(settings: &ld_config::Settings) -> Self {
        Self {
            webhook_url: settings.clay_webhook_url.clone(),
            api_key: settings.clay_api_key.clone(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("reqwest client"),
        }
    }

    async fn poll_results(&self, run_id: &str) -> Result<Vec<Value>, String> {
        let deadline = tokio::time::Instant::now() + MAX_WAIT;
        loop {
            let resp = self
                .http
                .get(format!("https://api.clay.com/v1/runs/{run_id}"))
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| format!("Clay poll error: {e}"))?;

            let data: Value = resp
                .json()
                .await
                .map_err(|e| format!("Clay poll parse error: {e}"))?;

            match data.get("status").and_then(Value::as_str) {
                Some("completed") => {
                    return Ok(data
                        .get("rows")
                        .or_else(|| data.get("results"))
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default());
                }
                Some("failed") => {
                    return Err("Clay run failed".to_string());
                }
                _ => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(format!("Clay run {run_id} timed out after {MAX_WAIT:?}"));
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }

    fn parse_results(&self, rows: &[Value]) -> Vec<ExternalLead> {
        rows.iter()
            .filter_map(|row| {
                let email = first_of(row, &["Email", "email", "Work Email", "work_email"])?;
                Some(ExternalLead {
                    email,
                    first_name: first_of(row, &["First Name", "first_name"]),
                    last_name: first_of(row, &["Last Name", "last_name"]),
                    company_name: first_of(row, &["Company", "company", "Company Name", "company_name"]),
                    company_domain: first_of(row, &["Domain", "domain", "Company Domain", "company_domain"]),
                    title: first_of(row, &["Title", "title", "Job Title", "job_title"]),
                    linkedin_url: first_of(row, &["LinkedIn", "linkedin", "LinkedIn URL", "linkedin_url"]),
                    phone: first_of(row, &["Phone", "phone", "Mobile", "mobile"]),
                    location: first_of(row, &["Location", "location", "City", "city"]),
                    industry: first_of(row, &["Industry", "industry"]),
                    company_size: first_of(row, &["Company Size", "company_size", "Employees", "employees"]),
                    source_provider: "clay".to_string(),
                    source_id: first_of(row, &["id", "Id", "ID"]),
                    raw_data: row.clone(),
                })
            })
            .collect()
    }
}

fn first_of(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str).map(str::to_string))
}

#[async_trait::async_trait]
impl LeadProvider for ClayProvider {
    fn provider_name(&self) -> &'static str {
        "clay"
    }

    fn priority(&self) -> i32 {
        2
    }

    async fn search(&self, criteria: &SearchCriteria) -> ProviderResult {
        if self.webhook_url.is_empty() {
            return ProviderResult {
                errors: vec!["Clay webhook URL not configured".to_string()],
                ..Default::default()
            };
        }

        let payload = json!({
            "client_id": criteria.client_id,
            "industry": criteria.industry,
            "job_titles": criteria.job_titles,
            "company_sizes": criteria.company_sizes,
            "locations": criteria.locations,
            "keywords": criteria.keywords,
            "company_domains": criteria.company_domains,
            "limit": criteria.limit,
        });

        let resp = match self.http.post(&self.webhook_url).json(&payload).send().await {
            Ok(r) => r,
            Err(e) => {
                return ProviderResult {
                    errors: vec![format!("Clay connection error: {e}")],
                    ..Default::default()
                }
            }
        };

        if !resp.status().is_success() {
            return ProviderResult {
                errors: vec![format!("Clay webhook error: {}", resp.status())],
                ..Default::default()
            };
        }

        let data: Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                return ProviderResult {
                    errors: vec![format!("Clay response parse error: {e}")],
                    ..Default::default()
                }
            }
        };

        let rows = if let Some(rows) = data.get("rows").or_else(|| data.get("results")).and_then(Value::as_array) {
            rows.clone()
        } else if let Some(run_id) = data.get("run_id").and_then(Value::as_str) {
            match self.poll_results(run_id).await {
                Ok(rows) => rows,
                Err(e) => {
                    return ProviderResult {
                        errors: vec![e],
                        ..Default::default()
                    }
                }
            }
        } else {
            return ProviderResult {
                errors: vec!["Clay webhook accepted the request asynchronously with no run_id to poll".to_string()],
                ..Default::default()
            };
        };

        let leads = self.parse_results(&rows);
        ProviderResult {
            credits_consumed: leads.len() as f64 * 2.0,
            total_found: leads.len() as i64,
            leads,
            errors: Vec::new(),
        }
    }

    async fn health_check(&self) -> bool {
        if self.webhook_url.is_empty() {
            return false;
        }
        self.http
            .head(&self.webhook_url)
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
    fn parse_results_falls_back_across_case_variant_field_names() {
        let provider = ClayProvider {
            webhook_url: String::new(),
            api_key: String::new(),
            http: reqwest::Client::new(),
        };
        let rows = vec![json!({"Email": "a@example.com", "Company Name": "Acme"})];
        let leads = provider.parse_results(&rows);
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].email, "a@example.com");
        assert_eq!(leads[0].company_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn parse_results_skips_rows_without_any_email_field() {
        let provider = ClayProvider {
            webhook_url: String::new(),
            api_key: String::new(),
            http: reqwest::Client::new(),
        };
        let rows = vec![json!({"Company": "Acme"})];
        assert!(provider.parse_results(&rows).is_empty());
    }
}
