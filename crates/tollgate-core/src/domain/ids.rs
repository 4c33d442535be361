//! Reconcile identifiers.
//!
//! ULID ベースの ID です。時刻でソートできるので、ログやレコードを
//! 並べたときに評価順になります。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifies one reconcile attempt (one admission evaluation).
///
/// Displayed as `reconcile-<ULID>`; used to correlate the tracing span and
/// the [`AdmissionRecord`](super::record::AdmissionRecord) of an attempt.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconcileId(Ulid);

impl ReconcileId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for ReconcileId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for ReconcileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reconcile-{}", self.0)
    }
}
