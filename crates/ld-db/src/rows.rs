//! Row → domain struct mapping. Kept in one place so a schema change only
//! touches one file.

use std::str::FromStr;

use anyhow::{Context, Result};
use ld_schemas::{Channel, Company, CompanyStatus, Contact, DispositionHistory, DispositionStatus, OwnershipChange, OwnershipChangeReason, TriggeredBy, CampaignAssignment};
use sqlx::postgres::PgRow;
use sqlx::Row;

pub fn row_to_contact(row: &PgRow) -> Result<Contact> {
    let status_str: String = row.try_get("disposition_status")?;
    Ok(Contact {
        email: row.try_get("email")?,
        client_id: row.try_get("client_id")?,
        company_domain: row.try_get("company_domain")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        last_known_title: row.try_get("last_known_title")?,
        last_known_company: row.try_get("last_known_company")?,
        disposition_status: DispositionStatus::from_str(&status_str)
            .with_context(|| format!("contact {status_str} has unrecognized disposition_status"))?,
        disposition_updated_at: row.try_get("disposition_updated_at")?,
        email_last_contacted: row.try_get("email_last_contacted")?,
        linkedin_last_contacted: row.try_get("linkedin_last_contacted")?,
        phone_last_contacted: row.try_get("phone_last_contacted")?,
        email_cooldown_until: row.try_get("email_cooldown_until")?,
        linkedin_cooldown_until: row.try_get("linkedin_cooldown_until")?,
        phone_cooldown_until: row.try_get("phone_cooldown_until")?,
        email_suppressed: row.try_get("email_suppressed")?,
        linkedin_suppressed: row.try_get("linkedin_suppressed")?,
        phone_suppressed: row.try_get("phone_suppressed")?,
        data_enriched_at: row.try_get("data_enriched_at")?,
        sequence_count: row.try_get("sequence_count")?,
        source_system: row.try_get("source_system")?,
        source_id: row.try_get("source_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub fn row_to_company(row: &PgRow) -> Result<Company> {
    let status_str: String = row.try_get("company_status")?;
    Ok(Company {
        domain: row.try_get("domain")?,
        name: row.try_get("name")?,
        company_status: CompanyStatus::from_str(&status_str)
            .with_context(|| format!("company has unrecognized company_status {status_str}"))?,
        company_suppressed: row.try_get("company_suppressed")?,
        suppressed_reason: row.try_get("suppressed_reason")?,
        suppressed_at: row.try_get("suppressed_at")?,
        contacts_total: row.try_get("contacts_total")?,
        contacts_in_sequence: row.try_get("contacts_in_sequence")?,
        contacts_touched: row.try_get("contacts_touched")?,
        last_contact_date: row.try_get("last_contact_date")?,
        company_cooldown_until: row.try_get("company_cooldown_until")?,
        is_customer: row.try_get("is_customer")?,
        customer_since: row.try_get("customer_since")?,
        client_owner_id: row.try_get("client_owner_id")?,
        client_owned_at: row.try_get("client_owned_at")?,
        ownership_expires_at: row.try_get("ownership_expires_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub fn row_to_history(row: &PgRow) -> Result<DispositionHistory> {
    let prev: Option<String> = row.try_get("previous_status")?;
    let new_status: String = row.try_get("new_status")?;
    let triggered_by: String = row.try_get("triggered_by")?;
    Ok(DispositionHistory {
        id: row.try_get("id")?,
        contact_email: row.try_get("contact_email")?,
        contact_client_id: row.try_get("contact_client_id")?,
        previous_status: prev
            .map(|s| DispositionStatus::from_str(&s))
            .transpose()
            .context("history row has unrecognized previous_status")?,
        new_status: DispositionStatus::from_str(&new_status)
            .context("history row has unrecognized new_status")?,
        transition_reason: row.try_get("transition_reason")?,
        triggered_by: match triggered_by.as_str() {
            "system" => TriggeredBy::System,
            "ui" => TriggeredBy::Ui,
            "campaign_fill" => TriggeredBy::CampaignFill,
            "maintenance" => TriggeredBy::Maintenance,
            other => anyhow::bail!("unrecognized triggered_by {other}"),
        },
        campaign_id: row.try_get("campaign_id")?,
        metadata: row.try_get("metadata")?,
        created_at: row.try_get("created_at")?,
    })
}

pub fn row_to_ownership_change(row: &PgRow) -> Result<OwnershipChange> {
    let reason: String = row.try_get("change_reason")?;
    Ok(OwnershipChange {
        id: row.try_get("id")?,
        company_domain: row.try_get("company_domain")?,
        previous_owner_id: row.try_get("previous_owner_id")?,
        new_owner_id: row.try_get("new_owner_id")?,
        change_reason: match reason.as_str() {
            "first_claim" => OwnershipChangeReason::FirstClaim,
            "expired" => OwnershipChangeReason::Expired,
            "manual_release" => OwnershipChangeReason::ManualRelease,
            "admin_transfer" => OwnershipChangeReason::AdminTransfer,
            other => anyhow::bail!("unrecognized change_reason {other}"),
        },
        changed_at: row.try_get("changed_at")?,
    })
}

pub fn row_to_assignment(row: &PgRow) -> Result<CampaignAssignment> {
    let channel: String = row.try_get("channel")?;
    Ok(CampaignAssignment {
        id: row.try_get("id")?,
        contact_email: row.try_get("contact_email")?,
        contact_client_id: row.try_get("contact_client_id")?,
        campaign_id: row.try_get("campaign_id")?,
        client_id: row.try_get("client_id")?,
        channel: Channel::from_str(&channel).context("unrecognized channel on assignment row")?,
        assigned_at: row.try_get("assigned_at")?,
        completed_at: row.try_get("completed_at")?,
        outcome: row.try_get("outcome")?,
    })
}
