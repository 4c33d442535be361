//! Errors - エラー型と分類
//!
//! ガード本体（`check_admission`）はエラーを返しません。失敗しうるのは
//! 周辺（owner の取得、リソース種別の配線）だけで、それをここで表します。

use thiserror::Error;

use super::kind::ResourceKind;
use super::owner::OwnerReference;

/// ErrorKind は運用上の分類
///
/// - Transient: 一時的なエラー（requeue して再試行）
/// - Permanent: 配線ミスなど（再試行しても直らない、ログに残して止める）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
}

/// Failure reported by an [`OwnerStateSource`](crate::ports::OwnerStateSource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("owner {0} not found")]
    NotFound(OwnerReference),

    #[error("owner {owner} unavailable: {message}")]
    Unavailable {
        owner: OwnerReference,
        message: String,
    },
}

/// Errors surfaced by the admission path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("owner lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("cannot run on unknown resource type {0}")]
    UnknownResourceKind(ResourceKind),

    #[error("{dependent} declares owner of kind {actual}, expected {expected}")]
    UnexpectedOwnerKind {
        dependent: ResourceKind,
        expected: ResourceKind,
        actual: ResourceKind,
    },
}

impl GuardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lookup(_) => ErrorKind::Transient,
            Self::UnknownResourceKind(_) | Self::UnexpectedOwnerKind { .. } => {
                ErrorKind::Permanent
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}
