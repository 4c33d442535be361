//! PreReconcileCheck port - 1 つのチェック（チェーンの 1 リンク）
//!
//! Decider と同じく純粋関数として設計します（副作用なし、I/O なし）。

use crate::domain::{AdmissionDecision, OwnerLookup, ResourceKind};

/// Everything a check may look at. All I/O has already happened.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub kind: &'a ResourceKind,
    pub name: &'a str,
    pub owner: &'a OwnerLookup,
}

/// One link of a pre-reconcile check chain.
///
/// Returning `Proceed` means "no objection" and hands over to the next link;
/// returning `Block` stops the chain.
pub trait PreReconcileCheck: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn check(&self, ctx: &CheckContext<'_>) -> AdmissionDecision;
}
