//! Pure mapping from a claimed [`crate::jobs::LeadPullJob`] to a
//! [`ld_schemas::WaterfallFillRequest`]. The bridge worker's poll loop and
//! retry policy stay an external collaborator's concern, but this mapping
//! interprets the job row shape and is worth testing in this repository.

use std::str::FromStr;

use ld_schemas::{Channel, WaterfallFillRequest};

use crate::jobs::LeadPullJob;

pub fn map_job_to_waterfall_request(job: &LeadPullJob) -> WaterfallFillRequest {
    let criteria = &job.search_criteria;

    let title_keywords = dedup_preserve_order(
        string_array(criteria, "title_keywords")
            .into_iter()
            .chain(string_array(criteria, "persona_titles")),
    );

    let mut search_keywords = string_array(criteria, "search_keywords");
    if let Some(signals) = criteria.get("signals").and_then(|v| v.as_array()) {
        for signal in signals {
            if let Some(s) = signal.as_str() {
                search_keywords.push(s.to_string());
            } else if let Some(name) = signal.get("name").and_then(|v| v.as_str()) {
                search_keywords.push(name.to_string());
            }
        }
    }
    let search_keywords = dedup_preserve_order(search_keywords.into_iter());

    let channel = Channel::from_str(&job.channel).unwrap_or(Channel::Email);
    let campaign_id = job
        .suggestion_id
        .clone()
        .unwrap_or_else(|| job.id.to_string());

    WaterfallFillRequest {
        campaign_id,
        client_id: job.client_id.clone(),
        channel,
        volume: job.volume,
        title_keywords,
        fresh_ratio: None,
        max_per_company: None,
        enable_external: job.enable_external,
        max_external_credits: job.max_external_credits,
        providers_override: None,
        industry: criteria
            .get("industry")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        company_sizes: string_array(criteria, "company_sizes"),
        locations: string_array(criteria, "locations"),
        search_keywords,
        company_domains: string_array(criteria, "company_domains"),
    }
}

fn string_array(value: &serde_json::Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn dedup_preserve_order(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn job(criteria: serde_json::Value) -> LeadPullJob {
        LeadPullJob {
            id: Uuid::nil(),
            client_id: "client-a".into(),
            suggestion_id: None,
            volume: 50,
            channel: "email".into(),
            enable_external: true,
            max_external_credits: 100.0,
            search_criteria: criteria,
            status: "pending".into(),
        }
    }

    #[test]
    fn merges_and_dedups_title_sources() {
        let j = job(json!({
            "title_keywords": ["VP Sales", "CTO"],
            "persona_titles": ["CTO", "Head of Growth"],
        }));
        let req = map_job_to_waterfall_request(&j);
        assert_eq!(req.title_keywords, vec!["VP Sales", "CTO", "Head of Growth"]);
    }

    #[test]
    fn unions_search_keywords_with_signal_names() {
        let j = job(json!({
            "search_keywords": ["funding"],
            "signals": ["hiring", {"name": "layoffs"}, {"other": "ignored"}],
        }));
        let req = map_job_to_waterfall_request(&j);
        assert_eq!(req.search_keywords, vec!["funding", "hiring", "layoffs"]);
    }

    #[test]
    fn invalid_channel_defaults_to_email() {
        let mut j = job(json!({}));
        j.channel = "carrier_pigeon".into();
        let req = map_job_to_waterfall_request(&j);
        assert_eq!(req.channel, Channel::Email);
    }

    #[test]
    fn campaign_id_falls_back_to_job_id() {
        let j = job(json!({}));
        let req = map_job_to_waterfall_request(&j);
        assert_eq!(req.campaign_id, Uuid::nil().to_string());
    }

    #[test]
    fn campaign_id_prefers_suggestion_id() {
        let mut j = job(json!({}));
        j.suggestion_id = Some("sugg-1".into());
        let req = map_job_to_waterfall_request(&j);
        assert_eq!(req.campaign_id, "sugg-1");
    }
}
