//! State - クラウド側が報告するプロビジョニング状態
//!
//! `RemoteState` はプロバイダが返した文字列をそのまま保持します。
//! 照合には `normalized()`（trim + 小文字化）を使い、メッセージには
//! 元の値を使います。

use serde::{Deserialize, Serialize};
use std::fmt;

/// A provisioning state string as reported by a cloud provider.
///
/// The set of values is open: providers add in-progress verbs freely, so
/// this is a newtype rather than an enum. Unknown values are still valid
/// states; whether they block is decided by a
/// [`StateClassifier`](crate::classifier::StateClassifier).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteState(String);

impl RemoteState {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The value exactly as reported.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trimmed, lower-cased form used for allow-set matching.
    pub fn normalized(&self) -> String {
        normalize(&self.0)
    }

    /// `true` for an empty or whitespace-only state.
    pub fn is_unset(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RemoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RemoteState {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RemoteState {
    fn from(s: String) -> Self {
        Self(s)
    }
}

pub(crate) fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Provisioning states commonly reported by cloud resource providers.
pub mod well_known {
    pub const SUCCEEDED: &str = "Succeeded";
    pub const FAILED: &str = "Failed";
    pub const CANCELED: &str = "Canceled";
    pub const READY: &str = "Ready";
    pub const CREATING: &str = "Creating";
    pub const UPDATING: &str = "Updating";
    pub const DELETING: &str = "Deleting";
    pub const DELETED: &str = "Deleted";
    pub const MIGRATING: &str = "Migrating";
    pub const PROVISIONING: &str = "Provisioning";
}
