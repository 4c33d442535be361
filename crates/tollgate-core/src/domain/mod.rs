//! Domain model (states, owners, decisions, records, errors).
//!
//! ここには I/O を持たない型だけを置きます。

pub mod condition;
pub mod decision;
pub mod errors;
pub mod ids;
pub mod kind;
pub mod owner;
pub mod record;
pub mod resource;
pub mod state;

pub use self::condition::{ConditionStatus, StatusCondition};
pub use self::decision::{AdmissionDecision, owner_not_ready_reason};
pub use self::errors::{ErrorKind, GuardError, LookupError};
pub use self::ids::ReconcileId;
pub use self::kind::ResourceKind;
pub use self::owner::{OwnerLookup, OwnerReference};
pub use self::record::AdmissionRecord;
pub use self::resource::ResourceRecord;
pub use self::state::{RemoteState, well_known};
