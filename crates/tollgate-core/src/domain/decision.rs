//! Decision model: whether a dependent resource may be mutated now.
//!
//! An `AdmissionDecision` is computed fresh on every reconcile attempt and
//! thrown away once the controller acted on it. Remote state can change
//! between attempts, so nothing here is cached.

use serde::{Deserialize, Serialize};

use super::kind::ResourceKind;
use super::state::RemoteState;

/// Outcome of an admission check.
///
/// Serialized as SCREAMING_SNAKE_CASE tags: `PROCEED` / `BLOCK`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdmissionDecision {
    /// Continue with the mutating call (create/update against the cloud API).
    Proceed,

    /// Skip the mutation this cycle; `reason` is shown to the user.
    Block { reason: String },
}

impl AdmissionDecision {
    pub fn block(reason: impl Into<String>) -> Self {
        Self::Block {
            reason: reason.into(),
        }
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }

    pub fn is_blocked(&self) -> bool {
        !self.is_proceed()
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Proceed => None,
            Self::Block { reason } => Some(reason),
        }
    }
}

/// Message used when an owner's state blocks its dependents.
///
/// The state is embedded verbatim (never re-cased) so users can match it
/// against what the cloud console shows. An absent state renders as `""`.
pub fn owner_not_ready_reason(owner_kind: &ResourceKind, state: Option<&RemoteState>) -> String {
    let state = state.map(RemoteState::as_str).unwrap_or("");
    format!("Owning {owner_kind} is in provisioning state \"{state}\"")
}
