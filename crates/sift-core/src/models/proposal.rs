use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review state of a category proposal.
///
/// Transitions are monotonic: `Pending` may move to `Accepted` or `Rejected`,
/// and the terminal states never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ProposalStatus::Pending),
            "accepted" => Some(ProposalStatus::Accepted),
            "rejected" => Some(ProposalStatus::Rejected),
            _ => None,
        }
    }

    /// Whether a transition from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: ProposalStatus) -> bool {
        self == ProposalStatus::Pending && next != ProposalStatus::Pending
    }
}

/// A proposed new category, before persistence.
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub proposed_name: String,
    pub cluster_size: usize,
    pub sample_message_ids: Vec<i64>,
    pub description: String,
    pub reasoning: String,
}

/// A persisted category proposal awaiting (or past) review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryProposal {
    pub id: i64,
    pub proposed_name: String,
    pub cluster_size: usize,
    pub sample_message_ids: Vec<i64>,
    pub description: String,
    pub reasoning: String,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_are_monotonic() {
        assert!(ProposalStatus::Pending.can_transition_to(ProposalStatus::Accepted));
        assert!(ProposalStatus::Pending.can_transition_to(ProposalStatus::Rejected));
        assert!(!ProposalStatus::Pending.can_transition_to(ProposalStatus::Pending));
        assert!(!ProposalStatus::Accepted.can_transition_to(ProposalStatus::Pending));
        assert!(!ProposalStatus::Accepted.can_transition_to(ProposalStatus::Rejected));
        assert!(!ProposalStatus::Rejected.can_transition_to(ProposalStatus::Accepted));
    }
}
