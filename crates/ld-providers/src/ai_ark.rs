//! AI Ark — B2B contact database with semantic/similarity search.

use ld_schemas::{ExternalLead, ProviderResult, SearchCriteria};
use serde_json::{json, Value};

use crate::LeadProvider;

pub struct AiArkProvider {
    api_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl AiArkProvider {
    pub fn new(settings: &ld_config::Settings) -> Self {
        Self {
            api_url: settings.ai_ark_api_url.trim_end_matches('/').to_string(),
            api_key: settings.ai_ark_api_key.clone(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl LeadProvider for AiArkProvider {
    fn provider_name(&self) -> &'static str {
        "ai_ark"
    }

    fn priority(&self) -> i32 {
        1
    }

    async fn search(&self, criteria: &SearchCriteria) -> ProviderResult {
        if self.api_key.is_empty() {
            return ProviderResult {
                errors: vec!["AI Ark API key not configured".to_string()],
                ..Default::default()
            };
        }

        let mut payload = json!({ "limit": criteria.limit });
        let obj = payload.as_object_mut().expect("payload is an object");
        if !criteria.job_titles.is_empty() {
            obj.insert("job_titles".into(), json!(criteria.job_titles));
        }
        if let Some(industry) = &criteria.industry {
            obj.insert("industry".into(), json!(industry));
        }
        if !criteria.locations.is_empty() {
            obj.insert("locations".into(), json!(criteria.locations));
        }
        if !criteria.company_sizes.is_empty() {
            obj.insert("company_sizes".into(), json!(criteria.company_sizes));
        }
        if !criteria.keywords.is_empty() {
            obj.insert("keywords".into(), json!(criteria.keywords));
        }
        if !criteria.company_domains.is_empty() {
            obj.insert("company_domains".into(), json!(criteria.company_domains));
        }

        let resp = match self
            .http
            .post(format!("{}/people/search", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "ai_ark search failed");
                return ProviderResult {
                    errors: vec![format!("AI Ark connection error: {e}")],
                    ..Default::default()
                }
            }
        };

        let status = resp.status();
        if !status.is_success() {
            return ProviderResult {
                errors: vec![format!("AI Ark API error: {status}")],
                ..Default::default()
            };
        }

        let data: Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                return ProviderResult {
                    errors: vec![format!("AI Ark response parse error: {e}")],
                    ..Default::default()
                }
            }
        };

        let results = data
            .get("results")
            .or_else(|| data.get("data"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let leads: Vec<ExternalLead> = results
            .iter()
            .filter_map(|item| {
                let email = str_field(item, "email").or_else(|| str_field(item, "work_email"))?;
                Some(ExternalLead {
                    email,
                    first_name: str_field(item, "first_name"),
                    last_name: str_field(item, "last_name"),
                    company_name: str_field(item, "company_name").or_else(|| str_field(item, "company")),
                    company_domain: str_field(item, "company_domain").or_else(|| str_field(item, "domain")),
                    title: str_field(item, "title").or_else(|| str_field(item, "job_title")),
                    linkedin_url: str_field(item, "linkedin_url").or_else(|| str_field(item, "linkedin")),
                    phone: str_field(item, "phone").or_else(|| str_field(item, "mobile")),
                    location: str_field(item, "location").or_else(|| str_field(item, "city")),
                    industry: str_field(item, "industry"),
                    company_size: str_field(item, "company_size").or_else(|| str_field(item, "employees")),
                    source_provider: "ai_ark".to_string(),
                    source_id: str_field(item, "id"),
                    raw_data: item.clone(),
                })
            })
            .collect();

        let total_found = data
            .get("total")
            .and_then(Value::as_i64)
            .unwrap_or(leads.len() as i64);

        ProviderResult {
            credits_consumed: leads.len() as f64,
            total_found,
            leads,
            errors: Vec::new(),
        }
    }

    async fn health_check(&self) -> bool {
        if self.api_key.is_empty() {
            return false;
        }
        self.http
            .get(format!("{}/health", self.api_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map(|r| r.status().as_u16() < 500)
            .unwrap_or(false)
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}
