//! AdmissionController - reconcile ループから呼ぶ入口
//!
//! # フロー
//! 1. dependent の kind から登録済みガードを引く（未登録は致命的エラー）
//! 2. 宣言された owner の kind を検証（不一致も致命的エラー）
//! 3. Owner Resolver で owner の状態を取得（I/O はここだけ）
//! 4. チェーン（共通チェック → owner ガード）で decision を出す
//! 5. ReconcileAction と AdmissionRecord を返す
//!
//! decision はキャッシュしません。呼ぶたびに最初から評価します。

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, error, info, info_span, warn};

use crate::app::requeue::RequeuePolicy;
use crate::domain::{
    AdmissionDecision, AdmissionRecord, GuardError, OwnerLookup, ReconcileId, StatusCondition,
};
use crate::guard::{CheckChain, OwnerStateGuard};
use crate::ports::{
    CheckContext, Clock, Dependent, HasObservedState, IdGenerator, OwnerStateSource,
    PreReconcileCheck,
};
use crate::registry::GuardRegistry;
use crate::resolver::{LookupFailurePolicy, resolve_observed, resolve_owner_state};

/// What the surrounding controller should do with this reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Go ahead with the mutating cloud call.
    Proceed,

    /// Skip the mutation, write `condition` to the dependent's status and
    /// reconcile again after `after`.
    Requeue {
        after: Duration,
        condition: StatusCondition,
    },
}

/// Result of one admission evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub action: ReconcileAction,
    pub record: AdmissionRecord,
    /// Name of the check that blocked, if any.
    pub blocked_by: Option<String>,
}

impl Admission {
    pub fn decision(&self) -> &AdmissionDecision {
        &self.record.decision
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self.action, ReconcileAction::Proceed)
    }
}

/// Built by [`ControllerBuilder`](crate::app::ControllerBuilder).
pub struct AdmissionController {
    pub(crate) registry: Arc<GuardRegistry>,
    pub(crate) chain: CheckChain,
    pub(crate) source: Arc<dyn OwnerStateSource>,
    pub(crate) lookup_policy: LookupFailurePolicy,
    pub(crate) requeue: RequeuePolicy,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

impl AdmissionController {
    pub fn registry(&self) -> &GuardRegistry {
        &self.registry
    }

    pub fn lookup_policy(&self) -> LookupFailurePolicy {
        self.lookup_policy
    }

    /// Evaluate admission for `dependent`, reading its owner through the
    /// configured [`OwnerStateSource`].
    ///
    /// `attempt` is the number of consecutive blocked reconciles so far plus
    /// one; it only drives the requeue delay.
    ///
    /// # Errors
    /// - [`GuardError::Lookup`] when the owner could not be read (retryable),
    /// - [`GuardError::UnknownResourceKind`] / [`GuardError::UnexpectedOwnerKind`]
    ///   when the controller is wired to the wrong kind (not retryable).
    pub async fn admit<D>(&self, dependent: &D, attempt: u32) -> Result<Admission, GuardError>
    where
        D: Dependent + Sync + ?Sized,
    {
        let reconcile_id = self.ids.generate_reconcile_id();
        let span = info_span!(
            "admission",
            %reconcile_id,
            kind = %dependent.kind(),
            name = dependent.name(),
        );

        async move {
            let guard = self.guard_for(dependent)?;
            let lookup =
                match resolve_owner_state(dependent, self.source.as_ref(), self.lookup_policy)
                    .await
                {
                    Ok(lookup) => lookup,
                    Err(err) => {
                        warn!(error = %err, retryable = err.is_retryable(), "owner lookup failed");
                        return Err(err);
                    }
                };
            Ok::<_, GuardError>(self.decide(reconcile_id, dependent, &guard, lookup, attempt))
        }
        .instrument(span)
        .await
    }

    /// Evaluate admission when the owner object is already in hand.
    ///
    /// No I/O happens. `owner` is what the caller fetched for the
    /// dependent's owner reference; `None` there means the owner was not
    /// found and goes through the lookup failure policy. `owner` is ignored
    /// when the dependent declares no owner.
    pub fn admit_observed<D, O>(
        &self,
        dependent: &D,
        owner: Option<&O>,
        attempt: u32,
    ) -> Result<Admission, GuardError>
    where
        D: Dependent + ?Sized,
        O: HasObservedState + ?Sized,
    {
        let reconcile_id = self.ids.generate_reconcile_id();
        let span = info_span!(
            "admission",
            %reconcile_id,
            kind = %dependent.kind(),
            name = dependent.name(),
        );
        let _entered = span.enter();

        let guard = self.guard_for(dependent)?;
        let lookup = resolve_observed(dependent, owner, self.lookup_policy).inspect_err(|err| {
            warn!(error = %err, retryable = err.is_retryable(), "observed owner rejected");
        })?;
        Ok(self.decide(reconcile_id, dependent, &guard, lookup, attempt))
    }

    fn guard_for<D>(&self, dependent: &D) -> Result<Arc<OwnerStateGuard>, GuardError>
    where
        D: Dependent + ?Sized,
    {
        let Some(guard) = self.registry.get(dependent.kind()) else {
            error!("no guard registered for this resource kind");
            return Err(GuardError::UnknownResourceKind(dependent.kind().clone()));
        };

        if let Some(owner) = dependent.owner()
            && owner.kind != *guard.owner_kind()
        {
            error!(
                expected = %guard.owner_kind(),
                actual = %owner.kind,
                "owner reference has unexpected kind"
            );
            return Err(GuardError::UnexpectedOwnerKind {
                dependent: dependent.kind().clone(),
                expected: guard.owner_kind().clone(),
                actual: owner.kind.clone(),
            });
        }

        Ok(guard)
    }

    fn decide<D>(
        &self,
        reconcile_id: ReconcileId,
        dependent: &D,
        guard: &OwnerStateGuard,
        lookup: OwnerLookup,
        attempt: u32,
    ) -> Admission
    where
        D: Dependent + ?Sized,
    {
        let ctx = CheckContext {
            kind: dependent.kind(),
            name: dependent.name(),
            owner: &lookup,
        };
        let owner_guard: &dyn PreReconcileCheck = guard;
        let (decision, blocked_by) = self.chain.evaluate(&ctx, Some(owner_guard));
        let now = self.clock.now();

        let action = match &decision {
            AdmissionDecision::Proceed => {
                info!(has_owner = lookup.has_owner(), owner_state = ?lookup.state(), "admitted");
                ReconcileAction::Proceed
            }
            AdmissionDecision::Block { reason } => {
                let after = self.requeue.next_delay(attempt);
                info!(
                    blocked_by = blocked_by.as_deref().unwrap_or_default(),
                    %reason,
                    requeue_after_ms = after.as_millis() as u64,
                    "blocked"
                );
                ReconcileAction::Requeue {
                    after,
                    condition: StatusCondition::from_decision(&decision, now),
                }
            }
        };

        let record = AdmissionRecord {
            reconcile_id,
            kind: dependent.kind().clone(),
            name: dependent.name().to_string(),
            namespace: dependent.namespace().map(str::to_string),
            owner: dependent.owner().cloned(),
            owner_state: lookup.state().cloned(),
            decision,
            evaluated_at: now,
        };

        Admission {
            action,
            record,
            blocked_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ControllerBuilder;
    use crate::classifier::StateClassifier;
    use crate::domain::condition::{ConditionStatus, REASON_OWNER_NOT_READY};
    use crate::domain::{OwnerReference, RemoteState, ResourceRecord};
    use crate::impls::InMemoryOwnerStore;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};

    fn server_ref() -> OwnerReference {
        OwnerReference::new("DatabaseServer", "pg-main").in_namespace("prod")
    }

    fn database() -> ResourceRecord {
        ResourceRecord::new("Database", "orders")
            .in_namespace("prod")
            .owned_by(server_ref())
    }

    async fn controller_with(state: Option<&str>) -> (AdmissionController, Arc<InMemoryOwnerStore>) {
        let store = Arc::new(InMemoryOwnerStore::new());
        store
            .insert(server_ref(), state.map(RemoteState::from))
            .await;
        let controller = ControllerBuilder::new()
            .register(
                "Database",
                OwnerStateGuard::new("DatabaseServer", StateClassifier::database_server()),
            )
            .unwrap()
            .with_owner_state_source(store.clone())
            .with_requeue_policy(RequeuePolicy::default().without_jitter())
            .with_clock(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            ))
            .build()
            .unwrap();
        (controller, store)
    }

    #[tokio::test]
    async fn capitalized_terminal_state_proceeds() {
        let (controller, _) = controller_with(Some("Succeeded")).await;
        let admission = controller.admit(&database(), 1).await.unwrap();

        assert!(admission.is_proceed());
        assert_eq!(admission.blocked_by, None);
        assert_eq!(admission.record.owner_state, Some(RemoteState::new("Succeeded")));
    }

    #[tokio::test]
    async fn updating_owner_requeues_with_condition() {
        let (controller, _) = controller_with(Some("Updating")).await;
        let admission = controller.admit(&database(), 2).await.unwrap();

        let ReconcileAction::Requeue { after, condition } = &admission.action else {
            panic!("expected requeue, got {:?}", admission.action);
        };
        assert_eq!(*after, Duration::from_secs(10));
        assert_eq!(condition.status, ConditionStatus::False);
        assert_eq!(condition.reason, REASON_OWNER_NOT_READY);
        assert_eq!(
            condition.message,
            "Owning DatabaseServer is in provisioning state \"Updating\""
        );
        assert_eq!(admission.blocked_by.as_deref(), Some("owner-provisioning-state"));
    }

    #[tokio::test]
    async fn dependent_without_owner_proceeds() {
        let (controller, _) = controller_with(Some("Updating")).await;
        let orphan = ResourceRecord::new("Database", "scratch");
        let admission = controller.admit(&orphan, 1).await.unwrap();
        assert!(admission.is_proceed());
        assert_eq!(admission.record.owner, None);
    }

    #[tokio::test]
    async fn decision_follows_owner_state_between_calls() {
        // 同じ dependent でも owner の状態が変われば結果も変わる（キャッシュしない）
        let (controller, store) = controller_with(Some("Creating")).await;
        assert!(!controller.admit(&database(), 1).await.unwrap().is_proceed());

        store.insert(server_ref(), Some("Ready".into())).await;
        assert!(controller.admit(&database(), 2).await.unwrap().is_proceed());
    }

    #[tokio::test]
    async fn missing_owner_propagates_by_default() {
        let (controller, store) = controller_with(None).await;
        store.remove(&server_ref()).await;

        let err = controller.admit(&database(), 1).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn unknown_dependent_kind_is_fatal() {
        let (controller, _) = controller_with(Some("Succeeded")).await;
        let rule = ResourceRecord::new("FirewallRule", "allow-office").owned_by(server_ref());

        let err = controller.admit(&rule, 1).await.unwrap_err();
        assert_eq!(
            err,
            GuardError::UnknownResourceKind(crate::domain::ResourceKind::new("FirewallRule"))
        );
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn wrong_owner_kind_is_fatal() {
        let (controller, _) = controller_with(Some("Succeeded")).await;
        let db = ResourceRecord::new("Database", "orders")
            .owned_by(OwnerReference::new("StorageAccount", "blobs"));

        let err = controller.admit(&db, 1).await.unwrap_err();
        assert!(matches!(err, GuardError::UnexpectedOwnerKind { .. }));
    }

    #[tokio::test]
    async fn observed_owner_skips_the_source() {
        let (controller, store) = controller_with(None).await;
        store.remove(&server_ref()).await;

        let server = ResourceRecord::new("DatabaseServer", "pg-main").with_state("READY");
        let admission = controller
            .admit_observed(&database(), Some(&server), 1)
            .unwrap();
        assert!(admission.is_proceed());
        assert_eq!(admission.record.owner_state, Some(RemoteState::new("READY")));
    }

    #[tokio::test]
    async fn observed_declared_owner_missing_does_not_proceed() {
        let (controller, _) = controller_with(Some("Succeeded")).await;

        let err = controller
            .admit_observed::<_, ResourceRecord>(&database(), None, 1)
            .unwrap_err();
        assert_eq!(
            err,
            GuardError::Lookup(crate::domain::LookupError::NotFound(server_ref()))
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn observed_owner_of_dependent_without_reference_is_ignored() {
        let (controller, _) = controller_with(Some("Succeeded")).await;
        let orphan = ResourceRecord::new("Database", "scratch");
        let unrelated = ResourceRecord::new("StorageAccount", "blobs").with_state("Updating");

        let admission = controller
            .admit_observed(&orphan, Some(&unrelated), 1)
            .unwrap();
        assert!(admission.is_proceed());
        assert_eq!(admission.record.owner, None);
        assert_eq!(admission.record.owner_state, None);
    }

    #[tokio::test]
    async fn observed_owner_of_wrong_kind_is_fatal() {
        let (controller, _) = controller_with(Some("Succeeded")).await;
        let unrelated = ResourceRecord::new("StorageAccount", "blobs").with_state("Succeeded");

        let err = controller
            .admit_observed(&database(), Some(&unrelated), 1)
            .unwrap_err();
        assert!(matches!(err, GuardError::UnexpectedOwnerKind { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn record_serializes_flat() {
        let (controller, _) = controller_with(Some("Updating")).await;
        let admission = controller.admit(&database(), 1).await.unwrap();

        let v = serde_json::to_value(&admission.record).unwrap();
        assert_eq!(v["kind"], "Database");
        assert_eq!(v["decision"], "BLOCK");
        assert_eq!(v["owner_state"], "Updating");
        assert!(
            v["reconcile_id"]
                .as_str()
                .is_some_and(|id| !id.is_empty())
        );
    }
}
