//! Owner references and the result of resolving them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::kind::ResourceKind;
use super::state::RemoteState;

/// A weak reference from a dependent resource to the resource that owns it.
///
/// This is a lookup key only; it never implies the dependent holds the owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerReference {
    pub kind: ResourceKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl OwnerReference {
    pub fn new(kind: impl Into<ResourceKind>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            namespace: None,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

impl fmt::Display for OwnerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", self.kind, ns, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

/// What the owner resolver found for a dependent.
///
/// `NoOwner` and `OwnerState(None)` are deliberately different: the first
/// means nothing to wait on, the second means an owner exists but its state
/// is not known yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "lookup", content = "state", rename_all = "snake_case")]
pub enum OwnerLookup {
    NoOwner,
    OwnerState(Option<RemoteState>),
}

impl OwnerLookup {
    /// Shorthand for an owner reporting `state`.
    pub fn reported(state: impl Into<RemoteState>) -> Self {
        Self::OwnerState(Some(state.into()))
    }

    /// Shorthand for an owner that reports no state.
    pub fn unknown() -> Self {
        Self::OwnerState(None)
    }

    pub fn has_owner(&self) -> bool {
        matches!(self, Self::OwnerState(_))
    }

    pub fn state(&self) -> Option<&RemoteState> {
        match self {
            Self::NoOwner => None,
            Self::OwnerState(state) => state.as_ref(),
        }
    }
}

impl From<Option<RemoteState>> for OwnerLookup {
    fn from(state: Option<RemoteState>) -> Self {
        Self::OwnerState(state)
    }
}
