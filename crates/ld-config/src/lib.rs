//! ld-config
//!
//! Two things live here:
//!
//! 1. A layered YAML loader (`load_layered_yaml`) that deep-merges a list of
//!    files in order and produces a canonical, content-hashed JSON blob —
//!    used by `ld-cli config-hash` to fingerprint a deployment's config.
//! 2. A typed [`Settings`] struct read from individual environment
//!    variables, so every tunable named in configuration has a single typed
//!    home.

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Layered YAML loader
// ---------------------------------------------------------------------------

pub struct LoadedConfig {
    pub config_json: Value,
    pub canonical_json: String,
    pub config_hash: String,
}

/// Reads each path in order, parses as YAML, and deep-merges into a single
/// JSON document (later files win on key conflict). Returns the merged
/// document plus its canonical form and SHA-256 hash.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(serde_json::Map::new());

    for path in paths {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config layer {path}"))?;
        let layer: Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config layer {path} as yaml"))?;
        deep_merge(&mut merged, &layer);
    }

    let canonical_json = canonicalize_json(&merged);
    let mut hasher = Sha256::new();
    hasher.update(canonical_json.as_bytes());
    let config_hash = hex::encode(hasher.finalize());

    Ok(LoadedConfig {
        config_json: merged,
        canonical_json,
        config_hash,
    })
}

fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => {
                        base_map.insert(key.clone(), overlay_val.clone());
                    }
                }
            }
        }
        (base_slot, overlay_val) => {
            *base_slot = overlay_val.clone();
        }
    }
}

/// Recursively sorts object keys so the JSON string is stable across runs
/// regardless of original key order.
fn canonicalize_json(value: &Value) -> String {
    serde_json::to_string(&sort_keys(value)).expect("serializing canonicalized config")
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.iter().map(|(k, v)| (k.clone(), sort_keys(v))).collect();
            serde_json::to_value(sorted).expect("re-serializing sorted map")
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Typed runtime settings
// ---------------------------------------------------------------------------

/// Runtime settings for the disposition control plane, read from individual
/// environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub postgres_host: String,
    pub postgres_port: u16,
    pub postgres_db: String,
    pub postgres_user: String,
    pub postgres_password: String,

    pub cooldown_no_response_days: i64,
    pub cooldown_neutral_reply_days: i64,
    pub cooldown_negative_reply_days: i64,
    pub cooldown_lost_closed_days: i64,
    pub cooldown_linkedin_days: i64,
    pub cooldown_phone_days: i64,

    pub ownership_duration_months: i64,

    pub max_contacts_per_company: i64,
    pub fresh_retouch_ratio: f64,

    pub stale_data_months: i64,

    pub tam_warning_weeks: i64,
    pub tam_critical_weeks: i64,

    pub ai_ark_api_url: String,
    pub ai_ark_api_key: String,
    pub clay_webhook_url: String,
    pub clay_api_key: String,
    pub jina_api_key: String,
    pub jina_api_url: String,
    pub spider_api_key: String,
    pub spider_api_url: String,

    pub waterfall_enabled: bool,
    pub waterfall_max_credits_per_fill: f64,
    pub waterfall_provider_order: String,

    pub poll_interval: i64,
    pub default_volume: i64,
}

impl Settings {
    /// Reads all fields from the environment, falling back to documented
    /// defaults. Does not call `dotenvy::dotenv()` itself — `ld-cli`'s
    /// `main` loads `.env.local` once before calling this.
    pub fn from_env() -> Self {
        Self {
            postgres_host: env_or("POSTGRES_HOST", "localhost"),
            postgres_port: env_or("POSTGRES_PORT", "5432").parse().unwrap_or(5432),
            postgres_db: env_or("POSTGRES_DB", "postgres"),
            postgres_user: env_or("POSTGRES_USER", "postgres"),
            postgres_password: env_or("POSTGRES_PASSWORD", ""),

            cooldown_no_response_days: env_i64("COOLDOWN_NO_RESPONSE_DAYS", 90),
            cooldown_neutral_reply_days: env_i64("COOLDOWN_NEUTRAL_REPLY_DAYS", 45),
            cooldown_negative_reply_days: env_i64("COOLDOWN_NEGATIVE_REPLY_DAYS", 180),
            cooldown_lost_closed_days: env_i64("COOLDOWN_LOST_CLOSED_DAYS", 90),
            cooldown_linkedin_days: env_i64("COOLDOWN_LINKEDIN_DAYS", 30),
            cooldown_phone_days: env_i64("COOLDOWN_PHONE_DAYS", 60),

            ownership_duration_months: env_i64("OWNERSHIP_DURATION_MONTHS", 12),

            max_contacts_per_company: env_i64("MAX_CONTACTS_PER_COMPANY", 3),
            fresh_retouch_ratio: env_f64("FRESH_RETOUCH_RATIO", 0.7),

            stale_data_months: env_i64("STALE_DATA_MONTHS", 6),

            tam_warning_weeks: env_i64("TAM_WARNING_WEEKS", 8),
            tam_critical_weeks: env_i64("TAM_CRITICAL_WEEKS", 4),

            ai_ark_api_url: env_or("AI_ARK_API_URL", "https://api.ai-ark.com/v1"),
            ai_ark_api_key: env_or("AI_ARK_API_KEY", ""),
            clay_webhook_url: env_or("CLAY_WEBHOOK_URL", ""),
            clay_api_key: env_or("CLAY_API_KEY", ""),
            jina_api_key: env_or("JINA_API_KEY", ""),
            jina_api_url: env_or("JINA_API_URL", "https://r.jina.ai"),
            spider_api_key: env_or("SPIDER_API_KEY", ""),
            spider_api_url: env_or("SPIDER_API_URL", "https://api.spider.cloud"),

            waterfall_enabled: env_bool("WATERFALL_ENABLED", true),
            waterfall_max_credits_per_fill: env_f64("WATERFALL_MAX_CREDITS_PER_FILL", 100.0),
            waterfall_provider_order: env_or(
                "WATERFALL_PROVIDER_ORDER",
                "internal,ai_ark,clay,jina,spider",
            ),

            poll_interval: env_i64("POLL_INTERVAL", 5),
            default_volume: env_i64("DEFAULT_VOLUME", 500),
        }
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.postgres_user,
            self.postgres_password,
            self.postgres_host,
            self.postgres_port,
            self.postgres_db
        )
    }

    /// Parsed, ordered provider names from `waterfall_provider_order`,
    /// ignoring blank entries left by a trailing comma.
    pub fn provider_order(&self) -> Vec<String> {
        self.waterfall_provider_order
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_merge_overlays_scalars_and_nested_objects() {
        let mut base: Value = serde_json::json!({"a": 1, "nested": {"x": 1, "y": 2}});
        let overlay: Value = serde_json::json!({"a": 2, "nested": {"y": 9, "z": 3}});
        deep_merge(&mut base, &overlay);
        assert_eq!(base["a"], 2);
        assert_eq!(base["nested"]["x"], 1);
        assert_eq!(base["nested"]["y"], 9);
        assert_eq!(base["nested"]["z"], 3);
    }

    #[test]
    fn canonical_json_is_stable_regardless_of_key_order() {
        let a: Value = serde_json::json!({"b": 1, "a": 2});
        let b: Value = serde_json::json!({"a": 2, "b": 1});
        assert_eq!(canonicalize_json(&a), canonicalize_json(&b));
    }

    #[test]
    fn provider_order_filters_blank_entries() {
        let mut s = Settings::from_env();
        s.waterfall_provider_order = "internal, ai_ark,,clay".to_string();
        assert_eq!(s.provider_order(), vec!["internal", "ai_ark", "clay"]);
    }

    #[test]
    fn database_url_has_expected_shape() {
        let mut s = Settings::from_env();
        s.postgres_user = "u".into();
        s.postgres_password = "p".into();
        s.postgres_host = "h".into();
        s.postgres_port = 5432;
        s.postgres_db = "d".into();
        assert_eq!(s.database_url(), "postgresql://u:p@h:5432/d");
    }
}
