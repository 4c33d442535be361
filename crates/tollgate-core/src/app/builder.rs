//! ControllerBuilder - AdmissionController の組み立てとワイヤリング
//!
//! # Fail-fast 設計
//! - expect_kinds() で期待される dependent kind を宣言
//! - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
//! - OwnerStateSource が無ければ BuildError

use std::sync::Arc;

use crate::app::controller::AdmissionController;
use crate::app::requeue::RequeuePolicy;
use crate::domain::ResourceKind;
use crate::guard::{CheckChain, OwnerStateGuard};
use crate::ports::{
    Clock, IdGenerator, OwnerStateSource, PreReconcileCheck, SystemClock, UlidGenerator,
};
use crate::registry::{GuardRegistry, RegistryError};
use crate::resolver::LookupFailurePolicy;

/// Builds an [`AdmissionController`].
///
/// ```ignore
/// let controller = ControllerBuilder::new()
///     .register("Database", OwnerStateGuard::new("DatabaseServer", StateClassifier::database_server()))?
///     .expect_kinds(&["Database"])
///     .with_owner_state_source(store)
///     .build()?;
/// ```
pub struct ControllerBuilder {
    registry: GuardRegistry,
    chain: CheckChain,
    source: Option<Arc<dyn OwnerStateSource>>,
    lookup_policy: LookupFailurePolicy,
    requeue: RequeuePolicy,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    expected_kinds: Option<Vec<ResourceKind>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing resource kinds: {0:?}. These kinds were expected but have no guard.")]
    MissingKinds(Vec<ResourceKind>),

    #[error("no owner state source configured")]
    MissingOwnerStateSource,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ControllerBuilder {
    pub fn new() -> Self {
        Self {
            registry: GuardRegistry::new(),
            chain: CheckChain::new(),
            source: None,
            lookup_policy: LookupFailurePolicy::default(),
            requeue: RequeuePolicy::default(),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UlidGenerator::new(SystemClock)),
            expected_kinds: None,
        }
    }

    /// Register the owner guard for a dependent kind.
    pub fn register(
        mut self,
        dependent_kind: impl Into<ResourceKind>,
        guard: OwnerStateGuard,
    ) -> Result<Self, RegistryError> {
        self.registry.register(dependent_kind, guard)?;
        Ok(self)
    }

    /// Add a check that runs before the owner guard for every kind.
    pub fn with_check(mut self, check: Arc<dyn PreReconcileCheck>) -> Self {
        self.chain.push(check);
        self
    }

    pub fn with_owner_state_source(mut self, source: Arc<dyn OwnerStateSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_lookup_failure_policy(mut self, policy: LookupFailurePolicy) -> Self {
        self.lookup_policy = policy;
        self
    }

    pub fn with_requeue_policy(mut self, policy: RequeuePolicy) -> Self {
        self.requeue = policy;
        self
    }

    /// Use `clock` for condition timestamps and reconcile ids.
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + Clone + 'static,
    {
        self.clock = Arc::new(clock.clone());
        self.ids = Arc::new(UlidGenerator::new(clock));
        self
    }

    /// Dependent kinds that must have a guard when `build()` runs.
    pub fn expect_kinds(mut self, kinds: &[&str]) -> Self {
        self.expected_kinds = Some(kinds.iter().map(|&k| ResourceKind::new(k)).collect());
        self
    }

    pub fn build(self) -> Result<AdmissionController, BuildError> {
        if let Some(expected) = &self.expected_kinds {
            let missing: Vec<ResourceKind> = expected
                .iter()
                .filter(|k| self.registry.get(k).is_none())
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingKinds(missing));
            }
        }

        let source = self.source.ok_or(BuildError::MissingOwnerStateSource)?;

        Ok(AdmissionController {
            registry: Arc::new(self.registry),
            chain: self.chain,
            source,
            lookup_policy: self.lookup_policy,
            requeue: self.requeue,
            clock: self.clock,
            ids: self.ids,
        })
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
