//! tollgate-core
//!
//! Reconciliation admission guard for controllers that manage cloud
//! resources with asynchronous provisioning: before a dependent resource is
//! mutated, check whether its owner reports a provisioning state that allows
//! it.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（RemoteState, OwnerLookup, AdmissionDecision, errors, ...）
//! - **classifier**: 状態文字列 → blocking かどうか（allow-set は設定可能）
//! - **resolver**: owner 参照 → OwnerLookup（I/O はここだけ）
//! - **guard**: OwnerLookup + classifier → AdmissionDecision、チェックチェーン
//! - **registry**: dependent kind ごとのガード
//! - **ports**: 外部協力者の trait（OwnerStateSource, Clock, ...）
//! - **app**: ControllerBuilder / AdmissionController / RequeuePolicy
//! - **config**: JSON 設定
//! - **impls**: InMemoryOwnerStore（開発・テスト用）
//! - **telemetry**: tracing subscriber の初期化

pub mod app;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod guard;
pub mod impls;
pub mod ports;
pub mod registry;
pub mod resolver;
pub mod telemetry;

pub use app::{Admission, AdmissionController, ControllerBuilder, ReconcileAction, RequeuePolicy};
pub use classifier::StateClassifier;
pub use config::GuardConfig;
pub use domain::{AdmissionDecision, GuardError, OwnerLookup, OwnerReference, RemoteState};
pub use guard::{CheckChain, OwnerStateGuard, check_admission};
pub use resolver::{LookupFailurePolicy, resolve_observed, resolve_owner_state};
