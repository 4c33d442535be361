//! InMemoryOwnerStore - 開発・テスト用の owner ストア
//!
//! # 実装詳細
//! - `HashMap<OwnerReference, Entry>` を tokio の `RwLock` で保護
//! - 読み取り（get_state）は並行、書き込みは排他
//! - `fail_with` で通信エラーを再現できる

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::{LookupError, OwnerReference, RemoteState, ResourceRecord};
use crate::ports::OwnerStateSource;

#[derive(Debug, Clone)]
enum Entry {
    State(Option<RemoteState>),
    Failing(String),
}

#[derive(Debug, Default)]
pub struct InMemoryOwnerStore {
    owners: RwLock<HashMap<OwnerReference, Entry>>,
}

impl InMemoryOwnerStore {
    pub fn new() -> Self {
        Self {
            owners: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace an owner and its observed state.
    pub async fn insert(&self, owner: OwnerReference, state: Option<RemoteState>) {
        self.owners.write().await.insert(owner, Entry::State(state));
    }

    /// Insert the owner described by a resource record.
    pub async fn insert_record(&self, record: &ResourceRecord) {
        self.insert(record.reference(), record.state.clone()).await;
    }

    pub async fn remove(&self, owner: &OwnerReference) -> bool {
        self.owners.write().await.remove(owner).is_some()
    }

    /// Make lookups for `owner` fail as if the backend were unreachable.
    pub async fn fail_with(&self, owner: OwnerReference, message: impl Into<String>) {
        self.owners
            .write()
            .await
            .insert(owner, Entry::Failing(message.into()));
    }

    pub async fn len(&self) -> usize {
        self.owners.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.owners.read().await.is_empty()
    }
}

#[async_trait]
impl OwnerStateSource for InMemoryOwnerStore {
    async fn get_state(&self, owner: &OwnerReference) -> Result<Option<RemoteState>, LookupError> {
        let owners = self.owners.read().await;
        match owners.get(owner) {
            Some(Entry::State(state)) => Ok(state.clone()),
            Some(Entry::Failing(message)) => Err(LookupError::Unavailable {
                owner: owner.clone(),
                message: message.clone(),
            }),
            None => Err(LookupError::NotFound(owner.clone())),
        }
    }
}
