//! Owner resolver: turns a dependent's owner reference into an
//! [`OwnerLookup`].
//!
//! Two entry points:
//! - [`resolve_observed`] when the owner object was already fetched,
//! - [`resolve_owner_state`] when it has to be read through an
//!   [`OwnerStateSource`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{GuardError, LookupError, OwnerLookup, RemoteState};
use crate::ports::{Dependent, HasObservedState, OwnerStateSource};

/// What to do when the owner cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFailurePolicy {
    /// Every failure is returned as a retryable [`GuardError::Lookup`].
    #[default]
    Propagate,

    /// A missing owner counts as no owner; transport failures still return
    /// an error.
    NotFoundIsNoOwner,

    /// Any failure becomes an owner with unknown state, which blocks.
    TreatAsUnknown,
}

/// Resolve a dependent's owner that the caller already fetched.
///
/// Only the dependent's owner reference decides whether there is an owner:
/// - no reference: [`OwnerLookup::NoOwner`], `owner` is ignored,
/// - a reference but `owner` is `None`: the owner was not found, handled by
///   `policy` exactly like [`resolve_owner_state`],
/// - `owner` of a different kind than the reference:
///   [`GuardError::UnexpectedOwnerKind`].
pub fn resolve_observed<D, O>(
    dependent: &D,
    owner: Option<&O>,
    policy: LookupFailurePolicy,
) -> Result<OwnerLookup, GuardError>
where
    D: Dependent + ?Sized,
    O: HasObservedState + ?Sized,
{
    let Some(reference) = dependent.owner() else {
        if owner.is_some() {
            debug!(kind = %dependent.kind(), name = dependent.name(), "ignoring owner of a dependent that declares none");
        }
        return Ok(OwnerLookup::NoOwner);
    };

    let Some(owner) = owner else {
        return apply_policy(LookupError::NotFound(reference.clone()), policy);
    };

    if *owner.observed_kind() != reference.kind {
        return Err(GuardError::UnexpectedOwnerKind {
            dependent: dependent.kind().clone(),
            expected: reference.kind.clone(),
            actual: owner.observed_kind().clone(),
        });
    }

    Ok(OwnerLookup::OwnerState(
        owner.observed_state().map(RemoteState::from),
    ))
}

/// Resolve a dependent's owner through `source`.
///
/// A dependent without an owner reference resolves to
/// [`OwnerLookup::NoOwner`] and the source is never called.
pub async fn resolve_owner_state<D>(
    dependent: &D,
    source: &dyn OwnerStateSource,
    policy: LookupFailurePolicy,
) -> Result<OwnerLookup, GuardError>
where
    D: Dependent + ?Sized,
{
    let Some(owner) = dependent.owner() else {
        debug!(kind = %dependent.kind(), name = dependent.name(), "no owner declared");
        return Ok(OwnerLookup::NoOwner);
    };

    match source.get_state(owner).await {
        Ok(state) => Ok(OwnerLookup::OwnerState(state)),
        Err(err) => apply_policy(err, policy),
    }
}

fn apply_policy(err: LookupError, policy: LookupFailurePolicy) -> Result<OwnerLookup, GuardError> {
    match policy {
        LookupFailurePolicy::NotFoundIsNoOwner if matches!(err, LookupError::NotFound(_)) => {
            debug!(error = %err, "treating missing owner as no owner");
            Ok(OwnerLookup::NoOwner)
        }
        LookupFailurePolicy::TreatAsUnknown => {
            warn!(error = %err, "owner lookup failed, treating state as unknown");
            Ok(OwnerLookup::unknown())
        }
        _ => Err(GuardError::Lookup(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OwnerReference, ResourceRecord};
    use crate::impls::InMemoryOwnerStore;
    use rstest::rstest;

    fn server_ref() -> OwnerReference {
        OwnerReference::new("DatabaseServer", "pg-main")
    }

    fn owned_database() -> ResourceRecord {
        ResourceRecord::new("Database", "orders").owned_by(server_ref())
    }

    #[test]
    fn observed_owner_without_state_is_unknown() {
        let server = ResourceRecord::new("DatabaseServer", "pg-main");
        let lookup =
            resolve_observed(&owned_database(), Some(&server), LookupFailurePolicy::Propagate);
        assert_eq!(lookup.unwrap(), OwnerLookup::unknown());
    }

    #[test]
    fn observed_owner_state_is_copied_verbatim() {
        let server = ResourceRecord::new("DatabaseServer", "pg-main").with_state("Updating");
        let lookup =
            resolve_observed(&owned_database(), Some(&server), LookupFailurePolicy::Propagate);
        assert_eq!(lookup.unwrap(), OwnerLookup::reported("Updating"));
    }

    #[rstest]
    #[case::propagate(LookupFailurePolicy::Propagate, None)]
    #[case::not_found_is_no_owner(LookupFailurePolicy::NotFoundIsNoOwner, Some(OwnerLookup::NoOwner))]
    #[case::treat_as_unknown(LookupFailurePolicy::TreatAsUnknown, Some(OwnerLookup::unknown()))]
    fn declared_owner_not_passed_follows_policy(
        #[case] policy: LookupFailurePolicy,
        #[case] expected: Option<OwnerLookup>,
    ) {
        let result = resolve_observed::<_, ResourceRecord>(&owned_database(), None, policy);
        match expected {
            Some(lookup) => assert_eq!(result.unwrap(), lookup),
            None => assert!(matches!(
                result,
                Err(GuardError::Lookup(LookupError::NotFound(r))) if r == server_ref()
            )),
        }
    }

    #[test]
    fn owner_passed_for_dependent_without_reference_is_ignored() {
        let standalone = ResourceRecord::new("Database", "scratch");
        let unrelated = ResourceRecord::new("StorageAccount", "blobs").with_state("Succeeded");

        let lookup =
            resolve_observed(&standalone, Some(&unrelated), LookupFailurePolicy::Propagate);
        assert_eq!(lookup.unwrap(), OwnerLookup::NoOwner);
        assert_eq!(
            resolve_observed::<_, ResourceRecord>(&standalone, None, LookupFailurePolicy::Propagate)
                .unwrap(),
            OwnerLookup::NoOwner
        );
    }

    #[test]
    fn observed_owner_of_other_kind_is_rejected() {
        let unrelated = ResourceRecord::new("StorageAccount", "blobs").with_state("Succeeded");

        let err = resolve_observed(
            &owned_database(),
            Some(&unrelated),
            LookupFailurePolicy::TreatAsUnknown,
        )
        .unwrap_err();
        assert!(matches!(
            &err,
            GuardError::UnexpectedOwnerKind { actual, .. } if actual.as_str() == "StorageAccount"
        ));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn no_owner_reference_skips_the_source() {
        // 空の store でも NotFound にならないこと
        let store = InMemoryOwnerStore::new();
        let db = ResourceRecord::new("Database", "orders");

        let lookup = resolve_owner_state(&db, &store, LookupFailurePolicy::Propagate)
            .await
            .unwrap();
        assert_eq!(lookup, OwnerLookup::NoOwner);
    }

    #[tokio::test]
    async fn present_owner_state_is_returned() {
        let store = InMemoryOwnerStore::new();
        store.insert(server_ref(), Some("Succeeded".into())).await;
        let db = ResourceRecord::new("Database", "orders").owned_by(server_ref());

        let lookup = resolve_owner_state(&db, &store, LookupFailurePolicy::Propagate)
            .await
            .unwrap();
        assert_eq!(lookup, OwnerLookup::reported("Succeeded"));
    }

    #[rstest]
    #[case::propagate(LookupFailurePolicy::Propagate, None)]
    #[case::not_found_is_no_owner(LookupFailurePolicy::NotFoundIsNoOwner, Some(OwnerLookup::NoOwner))]
    #[case::treat_as_unknown(LookupFailurePolicy::TreatAsUnknown, Some(OwnerLookup::unknown()))]
    #[tokio::test]
    async fn missing_owner_follows_policy(
        #[case] policy: LookupFailurePolicy,
        #[case] expected: Option<OwnerLookup>,
    ) {
        let store = InMemoryOwnerStore::new();
        let db = ResourceRecord::new("Database", "orders").owned_by(server_ref());

        let result = resolve_owner_state(&db, &store, policy).await;
        match expected {
            Some(lookup) => assert_eq!(result.unwrap(), lookup),
            None => assert!(matches!(
                result,
                Err(GuardError::Lookup(LookupError::NotFound(_)))
            )),
        }
    }

    #[tokio::test]
    async fn transport_failure_is_not_hidden_by_not_found_policy() {
        let store = InMemoryOwnerStore::new();
        store.fail_with(server_ref(), "connection reset").await;
        let db = ResourceRecord::new("Database", "orders").owned_by(server_ref());

        let err = resolve_owner_state(&db, &store, LookupFailurePolicy::NotFoundIsNoOwner)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn policy_deserializes_from_snake_case() {
        let p: LookupFailurePolicy = serde_json::from_str("\"not_found_is_no_owner\"").unwrap();
        assert_eq!(p, LookupFailurePolicy::NotFoundIsNoOwner);
        assert_eq!(LookupFailurePolicy::default(), LookupFailurePolicy::Propagate);
    }
}
