//! Ports - 外部とのインターフェース
//!
//! ガードが消費する協力者（リソースストア、クラウド SDK、時計）を trait
//! として定義します。実装の詳細（HTTP, Kubernetes API など）はここには
//! 置きません。

pub mod check;
pub mod clock;
pub mod id_generator;
pub mod owner_state;
pub mod resource;

pub use self::check::{CheckContext, PreReconcileCheck};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::owner_state::OwnerStateSource;
pub use self::resource::{Dependent, HasObservedState};
