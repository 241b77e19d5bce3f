//! Pure cooldown/suppression policy. Kept free of any I/O
//! so it is trivially unit-testable; `lib.rs` is the only caller.

use chrono::{DateTime, Duration, Utc};
use ld_schemas::{Channel, DispositionStatus as S};

/// Cooldown lengths, sourced from `ld-config::Settings` by the caller —
/// kept as a plain struct here so this crate does not need to depend on
/// `ld-config` for five integers.
#[derive(Debug, Clone, Copy)]
pub struct CooldownConfig {
    pub no_response_days: i64,
    pub neutral_reply_days: i64,
    pub negative_reply_days: i64,
    pub lost_closed_days: i64,
    pub linkedin_days: i64,
    pub phone_days: i64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            no_response_days: 90,
            neutral_reply_days: 45,
            negative_reply_days: 180,
            lost_closed_days: 90,
            linkedin_days: 30,
            phone_days: 60,
        }
    }
}

impl From<&ld_config::Settings> for CooldownConfig {
    fn from(s: &ld_config::Settings) -> Self {
        Self {
            no_response_days: s.cooldown_no_response_days,
            neutral_reply_days: s.cooldown_neutral_reply_days,
            negative_reply_days: s.cooldown_negative_reply_days,
            lost_closed_days: s.cooldown_lost_closed_days,
            linkedin_days: s.cooldown_linkedin_days,
            phone_days: s.cooldown_phone_days,
        }
    }
}

/// Cooldown for a transition into `new_status`, on `channel`. Email gets the
/// per-status breakdown; LinkedIn and phone get a flat per-channel cooldown
/// applied to the same set of "leaving in_sequence" statuses.
pub fn cooldown_for(new_status: S, channel: Channel, cfg: &CooldownConfig) -> Option<Duration> {
    let email_days = match new_status {
        S::CompletedNoResponse => Some(cfg.no_response_days),
        S::RepliedNeutral => Some(cfg.neutral_reply_days),
        S::RepliedNegative => Some(cfg.negative_reply_days),
        S::LostClosed => Some(cfg.lost_closed_days),
        _ => None,
    }?;

    let days = match channel {
        Channel::Email => email_days,
        Channel::Linkedin => cfg.linkedin_days,
        Channel::Phone => cfg.phone_days,
    };
    Some(Duration::days(days))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressionUpdate {
    pub email: Option<bool>,
    pub linkedin: Option<bool>,
    pub phone: Option<bool>,
}

/// Suppression flags to set on a transition into `new_status`. A hard no
/// suppresses all three channels on the contact itself; bounce/unsubscribe
/// only suppress email. Never returns `Some(false)` — suppression is
/// one-directional, nothing in this state machine lifts it.
pub fn suppression_for(new_status: S) -> SuppressionUpdate {
    match new_status {
        S::RepliedHardNo => SuppressionUpdate {
            email: Some(true),
            linkedin: Some(true),
            phone: Some(true),
        },
        S::Bounced | S::Unsubscribed => SuppressionUpdate {
            email: Some(true),
            ..Default::default()
        },
        _ => SuppressionUpdate::default(),
    }
}

pub fn cooldown_until(new_status: S, channel: Channel, cfg: &CooldownConfig, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    cooldown_for(new_status, channel, cfg).map(|d| now + d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_no_suppresses_all_three_channels() {
        let s = suppression_for(S::RepliedHardNo);
        assert_eq!(s.email, Some(true));
        assert_eq!(s.linkedin, Some(true));
        assert_eq!(s.phone, Some(true));
    }

    #[test]
    fn bounced_only_suppresses_email() {
        let s = suppression_for(S::Bounced);
        assert_eq!(s.email, Some(true));
        assert_eq!(s.linkedin, None);
        assert_eq!(s.phone, None);
    }

    #[test]
    fn replied_positive_sets_no_suppression() {
        let s = suppression_for(S::RepliedPositive);
        assert_eq!(s.email, None);
        assert_eq!(s.linkedin, None);
        assert_eq!(s.phone, None);
    }

    #[test]
    fn cooldown_uses_per_status_days_on_email() {
        let cfg = CooldownConfig::default();
        let d = cooldown_for(S::RepliedNegative, Channel::Email, &cfg).unwrap();
        assert_eq!(d, Duration::days(180));
    }

    #[test]
    fn cooldown_uses_flat_channel_days_off_email() {
        let cfg = CooldownConfig::default();
        let d = cooldown_for(S::RepliedNegative, Channel::Linkedin, &cfg).unwrap();
        assert_eq!(d, Duration::days(30));
    }

    #[test]
    fn non_cooldown_status_has_no_cooldown() {
        let cfg = CooldownConfig::default();
        assert!(cooldown_for(S::InSequence, Channel::Email, &cfg).is_none());
    }
}
