//! The legal transition table. A contact may always
//! transition to its own current state (a no-op, logged anyway by the
//! caller) — anything else must be listed here.

use ld_schemas::DispositionStatus as S;

pub fn allowed_targets(current: S) -> &'static [S] {
    match current {
        S::Fresh => &[S::InSequence, S::StaleData, S::JobChangeDetected],
        S::InSequence => &[
            S::CompletedNoResponse,
            S::RepliedPositive,
            S::RepliedNeutral,
            S::RepliedNegative,
            S::RepliedHardNo,
            S::Bounced,
            S::Unsubscribed,
        ],
        S::CompletedNoResponse => &[S::RetouchEligible, S::StaleData, S::JobChangeDetected],
        S::RepliedPositive => &[S::WonCustomer, S::LostClosed],
        S::RepliedNeutral => &[S::RetouchEligible, S::StaleData],
        S::RepliedNegative => &[S::RetouchEligible, S::StaleData],
        S::RepliedHardNo => &[],
        S::Bounced => &[],
        S::Unsubscribed => &[],
        S::RetouchEligible => &[S::InSequence, S::StaleData, S::JobChangeDetected],
        S::StaleData => &[S::Fresh, S::RetouchEligible],
        S::JobChangeDetected => &[S::Fresh],
        S::WonCustomer => &[],
        S::LostClosed => &[S::RetouchEligible],
    }
}

pub fn is_legal(current: S, target: S) -> bool {
    current == target || allowed_targets(current).contains(&target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_allow_nothing_out() {
        for s in [S::RepliedHardNo, S::Bounced, S::Unsubscribed, S::WonCustomer] {
            assert!(allowed_targets(s).is_empty());
        }
    }

    #[test]
    fn same_state_is_always_legal() {
        assert!(is_legal(S::Fresh, S::Fresh));
        assert!(is_legal(S::RepliedHardNo, S::RepliedHardNo));
    }

    #[test]
    fn fresh_cannot_jump_straight_to_won_customer() {
        assert!(!is_legal(S::Fresh, S::WonCustomer));
    }

    #[test]
    fn in_sequence_can_reach_every_reply_outcome() {
        for target in [
            S::CompletedNoResponse,
            S::RepliedPositive,
            S::RepliedNeutral,
            S::RepliedNegative,
            S::RepliedHardNo,
            S::Bounced,
            S::Unsubscribed,
        ] {
            assert!(is_legal(S::InSequence, target));
        }
    }
}
