//! Capability traits implemented by resource types.

use crate::domain::{OwnerReference, ResourceKind};

/// Anything that exposes an observed provisioning state.
///
/// Owner kinds implement this instead of being type-switched on; a resource
/// whose status has not been populated yet returns `None`.
pub trait HasObservedState {
    /// Kind of the resource itself, checked against the dependent's owner
    /// reference.
    fn observed_kind(&self) -> &ResourceKind;

    fn observed_state(&self) -> Option<&str>;
}

/// A resource that may be owned by another resource.
pub trait Dependent {
    fn kind(&self) -> &ResourceKind;

    fn name(&self) -> &str;

    fn namespace(&self) -> Option<&str> {
        None
    }

    /// The declared owner, or `None` if this resource reconciles on its own.
    fn owner(&self) -> Option<&OwnerReference>;
}
