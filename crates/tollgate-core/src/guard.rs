//! Admission guard: owner lookup + classifier → decision.
//!
//! The guard is a decision table, not a state machine:
//!
//! | owner lookup             | classifier says | decision |
//! |--------------------------|-----------------|----------|
//! | `NoOwner`                | (not asked)     | Proceed  |
//! | `OwnerState(s)`          | not blocking    | Proceed  |
//! | `OwnerState(s)`          | blocking        | Block    |
//!
//! It keeps no state between calls; the same inputs always give the same
//! decision.

use std::sync::Arc;

use crate::classifier::StateClassifier;
use crate::domain::{AdmissionDecision, OwnerLookup, ResourceKind, owner_not_ready_reason};
use crate::ports::{CheckContext, PreReconcileCheck};

/// Decide whether a dependent of an `owner_kind` owner may be mutated.
pub fn check_admission(
    lookup: &OwnerLookup,
    owner_kind: &ResourceKind,
    classifier: &StateClassifier,
) -> AdmissionDecision {
    match lookup {
        OwnerLookup::NoOwner => AdmissionDecision::Proceed,
        OwnerLookup::OwnerState(state) => {
            if classifier.is_blocking_state(state.as_ref()) {
                AdmissionDecision::block(owner_not_ready_reason(owner_kind, state.as_ref()))
            } else {
                AdmissionDecision::Proceed
            }
        }
    }
}

/// Guard configuration for one dependent kind: which kind owns it and which
/// owner states are safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerStateGuard {
    owner_kind: ResourceKind,
    classifier: StateClassifier,
}

impl OwnerStateGuard {
    pub fn new(owner_kind: impl Into<ResourceKind>, classifier: StateClassifier) -> Self {
        Self {
            owner_kind: owner_kind.into(),
            classifier,
        }
    }

    pub fn owner_kind(&self) -> &ResourceKind {
        &self.owner_kind
    }

    pub fn classifier(&self) -> &StateClassifier {
        &self.classifier
    }

    pub fn decide(&self, lookup: &OwnerLookup) -> AdmissionDecision {
        check_admission(lookup, &self.owner_kind, &self.classifier)
    }
}

impl PreReconcileCheck for OwnerStateGuard {
    fn name(&self) -> &str {
        "owner-provisioning-state"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> AdmissionDecision {
        self.decide(ctx.owner)
    }
}

/// Ordered list of checks. The first `Block` wins; an empty chain proceeds.
#[derive(Clone, Default)]
pub struct CheckChain {
    checks: Vec<Arc<dyn PreReconcileCheck>>,
}

impl CheckChain {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn push(&mut self, check: Arc<dyn PreReconcileCheck>) {
        self.checks.push(check);
    }

    pub fn with(mut self, check: Arc<dyn PreReconcileCheck>) -> Self {
        self.push(check);
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run the chain, optionally followed by one more check.
    ///
    /// The trailing check lets a controller keep shared checks in the chain
    /// and append the per-kind owner guard without cloning the chain.
    pub fn evaluate(
        &self,
        ctx: &CheckContext<'_>,
        last: Option<&dyn PreReconcileCheck>,
    ) -> (AdmissionDecision, Option<String>) {
        for check in &self.checks {
            if let Some(blocked) = run_check(check.as_ref(), ctx) {
                return blocked;
            }
        }
        last.and_then(|check| run_check(check, ctx))
            .unwrap_or((AdmissionDecision::Proceed, None))
    }
}

fn run_check(
    check: &dyn PreReconcileCheck,
    ctx: &CheckContext<'_>,
) -> Option<(AdmissionDecision, Option<String>)> {
    let decision = check.check(ctx);
    decision
        .is_blocked()
        .then(|| (decision, Some(check.name().to_string())))
}

impl std::fmt::Debug for CheckChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.checks.iter().map(|c| c.name()))
            .finish()
    }
}
