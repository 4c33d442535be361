//! App - アプリケーション層
//!
//! ports とガードを組み合わせて、reconcile ループから呼べる形にします。
//!
//! # 主要コンポーネント
//! - **ControllerBuilder**: 構築とワイヤリング（起動時検証）
//! - **AdmissionController**: 1 回の reconcile の admission 判定
//! - **RequeuePolicy**: block されたときの再試行間隔

pub mod builder;
pub mod controller;
pub mod requeue;

pub use self::builder::{BuildError, ControllerBuilder};
pub use self::controller::{Admission, AdmissionController, ReconcileAction};
pub use self::requeue::RequeuePolicy;
