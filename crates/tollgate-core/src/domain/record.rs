//! Admission history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decision::AdmissionDecision;
use super::ids::ReconcileId;
use super::kind::ResourceKind;
use super::owner::OwnerReference;
use super::state::RemoteState;

/// One evaluation of the admission path, kept so operators can answer
/// "why was this resource not updated at time T".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRecord {
    pub reconcile_id: ReconcileId,
    pub kind: ResourceKind,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerReference>,

    /// Owner state as observed for this attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_state: Option<RemoteState>,

    #[serde(flatten)]
    pub decision: AdmissionDecision,

    pub evaluated_at: DateTime<Utc>,
}
