//! A plain resource snapshot that satisfies both capability traits.
//!
//! Controllers usually implement [`Dependent`] / [`HasObservedState`] on
//! their own CRD types. `ResourceRecord` covers the cases where no such type
//! exists: the in-memory store, the CLI scenario format, and tests.

use serde::{Deserialize, Serialize};

use super::kind::ResourceKind;
use super::owner::OwnerReference;
use super::state::RemoteState;
use crate::ports::{Dependent, HasObservedState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub kind: ResourceKind,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerReference>,

    /// Observed provisioning state (`status.provisioningState`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RemoteState>,
}

impl ResourceRecord {
    pub fn new(kind: impl Into<ResourceKind>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            namespace: None,
            owner: None,
            state: None,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn owned_by(mut self, owner: OwnerReference) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_state(mut self, state: impl Into<RemoteState>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// The reference other resources use to point at this one.
    pub fn reference(&self) -> OwnerReference {
        OwnerReference {
            kind: self.kind.clone(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl Dependent for ResourceRecord {
    fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn owner(&self) -> Option<&OwnerReference> {
        self.owner.as_ref()
    }
}

impl HasObservedState for ResourceRecord {
    fn observed_kind(&self) -> &ResourceKind {
        &self.kind
    }

    fn observed_state(&self) -> Option<&str> {
        self.state.as_ref().map(RemoteState::as_str)
    }
}
