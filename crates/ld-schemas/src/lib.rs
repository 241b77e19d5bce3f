//! ld-schemas
//!
//! Domain types shared across the disposition control plane: the contact and
//! company state enums, the five persisted entities, and the request/result
//! shapes passed between the fill engine, waterfall, and TAM tracker.
//!
//! Enums are stored as plain text columns rather than native Postgres enum
//! types, so a new disposition status never requires a migration to widen a
//! type. `as_str` / `parse` are the only conversion surface; `ld-db` is the
//! only crate that should call them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Contact disposition states. Fourteen states; see [`TRANSITIONS`] in
/// `ld-state-machine` for the legal transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispositionStatus {
    Fresh,
    InSequence,
    CompletedNoResponse,
    RepliedPositive,
    RepliedNeutral,
    RepliedNegative,
    RepliedHardNo,
    Bounced,
    Unsubscribed,
    RetouchEligible,
    StaleData,
    JobChangeDetected,
    WonCustomer,
    LostClosed,
}

impl DispositionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::InSequence => "in_sequence",
            Self::CompletedNoResponse => "completed_no_response",
            Self::RepliedPositive => "replied_positive",
            Self::RepliedNeutral => "replied_neutral",
            Self::RepliedNegative => "replied_negative",
            Self::RepliedHardNo => "replied_hard_no",
            Self::Bounced => "bounced",
            Self::Unsubscribed => "unsubscribed",
            Self::RetouchEligible => "retouch_eligible",
            Self::StaleData => "stale_data",
            Self::JobChangeDetected => "job_change_detected",
            Self::WonCustomer => "won_customer",
            Self::LostClosed => "lost_closed",
        }
    }

    /// `true` for the four states treated as terminal-for-channel.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::RepliedHardNo | Self::Bounced | Self::Unsubscribed | Self::WonCustomer
        )
    }
}

impl fmt::Display for DispositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DispositionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "fresh" => Self::Fresh,
            "in_sequence" => Self::InSequence,
            "completed_no_response" => Self::CompletedNoResponse,
            "replied_positive" => Self::RepliedPositive,
            "replied_neutral" => Self::RepliedNeutral,
            "replied_negative" => Self::RepliedNegative,
            "replied_hard_no" => Self::RepliedHardNo,
            "bounced" => Self::Bounced,
            "unsubscribed" => Self::Unsubscribed,
            "retouch_eligible" => Self::RetouchEligible,
            "stale_data" => Self::StaleData,
            "job_change_detected" => Self::JobChangeDetected,
            "won_customer" => Self::WonCustomer,
            "lost_closed" => Self::LostClosed,
            other => return Err(UnknownVariant(other.to_string())),
        })
    }
}

/// Company lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStatus {
    Fresh,
    Active,
    Cooling,
    Suppressed,
    Customer,
}

impl CompanyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Active => "active",
            Self::Cooling => "cooling",
            Self::Suppressed => "suppressed",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for CompanyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CompanyStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "fresh" => Self::Fresh,
            "active" => Self::Active,
            "cooling" => Self::Cooling,
            "suppressed" => Self::Suppressed,
            "customer" => Self::Customer,
            other => return Err(UnknownVariant(other.to_string())),
        })
    }
}

/// Outreach channel. The eligibility query and cooldown tables are
/// parameterised on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Linkedin,
    Phone,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Linkedin => "linkedin",
            Self::Phone => "phone",
        }
    }

    /// Column prefix used by the eligibility query template (`<channel>_suppressed`, etc).
    pub fn column_prefix(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "email" => Self::Email,
            "linkedin" => Self::Linkedin,
            "phone" => Self::Phone,
            other => return Err(UnknownVariant(other.to_string())),
        })
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::Email
    }
}

/// Reason recorded against an [`OwnershipChange`] row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipChangeReason {
    FirstClaim,
    Expired,
    ManualRelease,
    AdminTransfer,
}

impl OwnershipChangeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstClaim => "first_claim",
            Self::Expired => "expired",
            Self::ManualRelease => "manual_release",
            Self::AdminTransfer => "admin_transfer",
        }
    }
}

impl fmt::Display for OwnershipChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who initiated a disposition transition (`DispositionHistory.triggered_by`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggeredBy {
    System,
    Ui,
    CampaignFill,
    Maintenance,
}

impl TriggeredBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Ui => "ui",
            Self::CampaignFill => "campaign_fill",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for TriggeredBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An enum column held a value this build doesn't recognize — almost always
/// a forward-compat mismatch between a running binary and a migrated schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown enum variant: {}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

// ---------------------------------------------------------------------------
// Domain entities
// ---------------------------------------------------------------------------

/// A contact, keyed by (email, client_id) — two clients independently track
/// the same person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub client_id: String,
    pub company_domain: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub last_known_title: Option<String>,
    pub last_known_company: Option<String>,
    pub disposition_status: DispositionStatus,
    pub disposition_updated_at: Option<DateTime<Utc>>,
    pub email_last_contacted: Option<DateTime<Utc>>,
    pub linkedin_last_contacted: Option<DateTime<Utc>>,
    pub phone_last_contacted: Option<DateTime<Utc>>,
    pub email_cooldown_until: Option<DateTime<Utc>>,
    pub linkedin_cooldown_until: Option<DateTime<Utc>>,
    pub phone_cooldown_until: Option<DateTime<Utc>>,
    pub email_suppressed: bool,
    pub linkedin_suppressed: bool,
    pub phone_suppressed: bool,
    pub data_enriched_at: Option<DateTime<Utc>>,
    pub sequence_count: i64,
    pub source_system: Option<String>,
    pub source_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Contact {
    /// Whichever channel's suppressed flag + cooldown apply.
    pub fn suppressed_on(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email_suppressed,
            Channel::Linkedin => self.linkedin_suppressed,
            Channel::Phone => self.phone_suppressed,
        }
    }

    pub fn cooldown_until(&self, channel: Channel) -> Option<DateTime<Utc>> {
        match channel {
            Channel::Email => self.email_cooldown_until,
            Channel::Linkedin => self.linkedin_cooldown_until,
            Channel::Phone => self.phone_cooldown_until,
        }
    }

    pub fn last_contacted(&self, channel: Channel) -> Option<DateTime<Utc>> {
        match channel {
            Channel::Email => self.email_last_contacted,
            Channel::Linkedin => self.linkedin_last_contacted,
            Channel::Phone => self.phone_last_contacted,
        }
    }
}

/// A company, keyed by domain (global, not per-client).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub domain: String,
    pub name: Option<String>,
    pub company_status: CompanyStatus,
    pub company_suppressed: bool,
    pub suppressed_reason: Option<String>,
    pub suppressed_at: Option<DateTime<Utc>>,
    pub contacts_total: i64,
    pub contacts_in_sequence: i64,
    pub contacts_touched: i64,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub company_cooldown_until: Option<DateTime<Utc>>,
    pub is_customer: bool,
    pub customer_since: Option<DateTime<Utc>>,
    pub client_owner_id: Option<String>,
    pub client_owned_at: Option<DateTime<Utc>>,
    pub ownership_expires_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Append-only disposition transition log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispositionHistory {
    pub id: Uuid,
    pub contact_email: String,
    pub contact_client_id: String,
    pub previous_status: Option<DispositionStatus>,
    pub new_status: DispositionStatus,
    pub transition_reason: Option<String>,
    pub triggered_by: TriggeredBy,
    pub campaign_id: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Append-only ownership change log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipChange {
    pub id: Uuid,
    pub company_domain: String,
    pub previous_owner_id: Option<String>,
    pub new_owner_id: Option<String>,
    pub change_reason: OwnershipChangeReason,
    pub changed_at: DateTime<Utc>,
}

/// One row per (contact, campaign) assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignAssignment {
    pub id: Uuid,
    pub contact_email: String,
    pub contact_client_id: String,
    pub campaign_id: String,
    pub client_id: String,
    pub channel: Channel,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub outcome: Option<String>,
}

/// One row per (snapshot_date, client_id) — null client_id is the global
/// snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TamSnapshot {
    pub snapshot_date: chrono::NaiveDate,
    pub client_id: Option<String>,
    pub total_universe: i64,
    pub never_touched: i64,
    pub in_cooldown: i64,
    pub available_now: i64,
    pub permanent_suppress: i64,
    pub in_sequence: i64,
    pub won_customer: i64,
    pub burn_rate_weekly: Option<f64>,
    pub exhaustion_eta_weeks: Option<f64>,
}

/// Computed TAM health — not persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TamHealth {
    pub total_universe: i64,
    pub never_touched: i64,
    pub in_cooldown: i64,
    pub available_now: i64,
    pub permanent_suppress: i64,
    pub in_sequence: i64,
    pub won_customer: i64,
    pub burn_rate_weekly: f64,
    pub exhaustion_eta_weeks: Option<f64>,
    pub health_status: TamHealthStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TamHealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl TamHealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for TamHealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Fill engine request/result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignFillRequest {
    pub campaign_id: String,
    pub client_id: String,
    #[serde(default)]
    pub channel: Channel,
    pub volume: i64,
    #[serde(default)]
    pub title_keywords: Vec<String>,
    /// Override of `fresh_retouch_ratio` (default 0.7).
    pub fresh_ratio: Option<f64>,
    /// Override of `max_contacts_per_company` (default 3).
    pub max_per_company: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignFillResult {
    pub campaign_id: String,
    pub client_id: String,
    pub total_requested: i64,
    pub total_assigned: i64,
    pub fresh_count: i64,
    pub retouch_count: i64,
    pub companies_touched: i64,
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Provider adapter contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchCriteria {
    pub client_id: String,
    pub industry: Option<String>,
    #[serde(default)]
    pub job_titles: Vec<String>,
    #[serde(default)]
    pub company_sizes: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub company_domains: Vec<String>,
    pub limit: i64,
}

impl SearchCriteria {
    /// Return a copy with `limit` replaced — used when the waterfall adjusts
    /// the remaining deficit between provider calls.
    pub fn with_limit(&self, limit: i64) -> Self {
        Self {
            limit,
            ..self.clone()
        }
    }
}

/// A provider-shaped lead row, prior to write-back mapping.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExternalLead {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub company_domain: Option<String>,
    pub title: Option<String>,
    pub linkedin_url: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub source_provider: String,
    pub source_id: Option<String>,
    #[serde(default)]
    pub raw_data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderResult {
    #[serde(default)]
    pub leads: Vec<ExternalLead>,
    pub total_found: i64,
    pub credits_consumed: f64,
    #[serde(default)]
    pub errors: Vec<String>,
}

// ---------------------------------------------------------------------------
// Waterfall request/result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallFillRequest {
    pub campaign_id: String,
    pub client_id: String,
    #[serde(default)]
    pub channel: Channel,
    pub volume: i64,
    #[serde(default)]
    pub title_keywords: Vec<String>,
    pub fresh_ratio: Option<f64>,
    pub max_per_company: Option<i64>,

    #[serde(default = "default_true")]
    pub enable_external: bool,
    pub max_external_credits: f64,
    pub providers_override: Option<Vec<String>>,

    pub industry: Option<String>,
    #[serde(default)]
    pub company_sizes: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub search_keywords: Vec<String>,
    #[serde(default)]
    pub company_domains: Vec<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WriteBackResult {
    pub total_processed: i64,
    pub new_inserted: i64,
    pub duplicates_skipped: i64,
    pub invalid_skipped: i64,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallFillResult {
    pub campaign_id: String,
    pub client_id: String,
    pub total_requested: i64,
    pub total_assigned: i64,
    pub fresh_count: i64,
    pub retouch_count: i64,
    pub companies_touched: i64,
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub warnings: Vec<String>,

    pub internal_filled: i64,
    pub external_filled: i64,
    #[serde(default)]
    pub per_provider_counts: std::collections::BTreeMap<String, i64>,
    #[serde(default)]
    pub credits_consumed: std::collections::BTreeMap<String, f64>,
    pub write_back_count: i64,
    pub write_back_details: Option<WriteBackResult>,
}

impl WaterfallFillResult {
    pub fn new(campaign_id: String, client_id: String, total_requested: i64) -> Self {
        Self {
            campaign_id,
            client_id,
            total_requested,
            total_assigned: 0,
            fresh_count: 0,
            retouch_count: 0,
            companies_touched: 0,
            contacts: Vec::new(),
            warnings: Vec::new(),
            internal_filled: 0,
            external_filled: 0,
            per_provider_counts: std::collections::BTreeMap::new(),
            credits_consumed: std::collections::BTreeMap::new(),
            write_back_count: 0,
            write_back_details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn disposition_status_round_trips_through_str() {
        for s in [
            DispositionStatus::Fresh,
            DispositionStatus::InSequence,
            DispositionStatus::RepliedHardNo,
            DispositionStatus::WonCustomer,
        ] {
            let parsed = DispositionStatus::from_str(s.as_str()).unwrap();
            assert_eq!(parsed.as_str(), s.as_str());
        }
    }

    #[test]
    fn terminal_states_allow_no_further_transition() {
        assert!(DispositionStatus::RepliedHardNo.is_terminal());
        assert!(DispositionStatus::Bounced.is_terminal());
        assert!(DispositionStatus::Unsubscribed.is_terminal());
        assert!(DispositionStatus::WonCustomer.is_terminal());
        assert!(!DispositionStatus::Fresh.is_terminal());
        assert!(!DispositionStatus::RetouchEligible.is_terminal());
    }

    #[test]
    fn channel_defaults_to_email() {
        assert_eq!(Channel::default().as_str(), "email");
    }

    #[test]
    fn unknown_enum_variant_is_reported() {
        assert!(DispositionStatus::from_str("not_a_status").is_err());
    }
}
