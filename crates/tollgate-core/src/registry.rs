//! GuardRegistry - dependent kind ごとのガード設定
//!
//! 起動時に組み立てて（mutable）、実行時は読み取り専用で使います。
//! ロック不要にするため、登録が終わったら `Arc` で共有します。

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::ResourceKind;
use crate::guard::OwnerStateGuard;

/// Maps a dependent kind (e.g. `Database`) to the guard for its owner
/// (e.g. `DatabaseServer` with the database-server allow-set).
#[derive(Debug, Default, Clone)]
pub struct GuardRegistry {
    guards: HashMap<ResourceKind, Arc<OwnerStateGuard>>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("guard for resource kind '{0}' is already registered")]
    AlreadyRegistered(ResourceKind),
}

impl GuardRegistry {
    pub fn new() -> Self {
        Self {
            guards: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        dependent_kind: impl Into<ResourceKind>,
        guard: OwnerStateGuard,
    ) -> Result<(), RegistryError> {
        let dependent_kind = dependent_kind.into();
        if self.guards.contains_key(&dependent_kind) {
            return Err(RegistryError::AlreadyRegistered(dependent_kind));
        }
        self.guards.insert(dependent_kind, Arc::new(guard));
        Ok(())
    }

    pub fn get(&self, dependent_kind: &ResourceKind) -> Option<Arc<OwnerStateGuard>> {
        self.guards.get(dependent_kind).cloned()
    }

    /// Registered dependent kinds, sorted.
    pub fn registered_kinds(&self) -> Vec<ResourceKind> {
        let mut kinds: Vec<_> = self.guards.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}
