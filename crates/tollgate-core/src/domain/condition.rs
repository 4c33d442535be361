//! Condition - decision をリソースの status に載せる形
//!
//! Kubernetes の `status.conditions[]` と同じ形です。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decision::AdmissionDecision;

/// Condition type written on the dependent resource.
pub const CONDITION_READY: &str = "Ready";

/// Reason when the guard let the reconcile through.
pub const REASON_ADMITTED: &str = "Admitted";

/// Reason when the owner's provisioning state blocked the reconcile.
pub const REASON_OWNER_NOT_READY: &str = "OwnerNotReady";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

impl StatusCondition {
    /// Build the `Ready` condition for a decision.
    ///
    /// A block yields `Ready=False` carrying the block reason as message.
    pub fn from_decision(decision: &AdmissionDecision, now: DateTime<Utc>) -> Self {
        match decision {
            AdmissionDecision::Proceed => Self {
                type_: CONDITION_READY.to_string(),
                status: ConditionStatus::True,
                reason: REASON_ADMITTED.to_string(),
                message: String::new(),
                last_transition_time: now,
            },
            AdmissionDecision::Block { reason } => Self {
                type_: CONDITION_READY.to_string(),
                status: ConditionStatus::False,
                reason: REASON_OWNER_NOT_READY.to_string(),
                message: reason.clone(),
                last_transition_time: now,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn block_becomes_ready_false() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let c = StatusCondition::from_decision(&AdmissionDecision::block("waiting"), now);
        assert_eq!(c.status, ConditionStatus::False);
        assert_eq!(c.reason, REASON_OWNER_NOT_READY);
        assert_eq!(c.message, "waiting");
        assert_eq!(c.last_transition_time, now);
    }

    #[test]
    fn serializes_with_kubernetes_field_names() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let c = StatusCondition::from_decision(&AdmissionDecision::Proceed, now);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["type"], "Ready");
        assert_eq!(v["status"], "True");
        assert_eq!(v["reason"], "Admitted");
        assert!(v.get("message").is_none());
        assert!(v.get("lastTransitionTime").is_some());
    }
}
