//! OwnerStateSource port - owner の現在の状態を取得
//!
//! 実装例: Kubernetes API server の read、クラウド SDK の describe 呼び出し。
//! キャンセルやタイムアウトは実装側の責務です。

use async_trait::async_trait;

use crate::domain::{LookupError, OwnerReference, RemoteState};

/// Fetches the observed remote state of an owner.
///
/// `Ok(None)` means the owner exists but reports no state yet; a missing
/// owner is `Err(LookupError::NotFound)`.
#[async_trait]
pub trait OwnerStateSource: Send + Sync {
    async fn get_state(&self, owner: &OwnerReference) -> Result<Option<RemoteState>, LookupError>;
}
