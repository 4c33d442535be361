//! Impls - ports の実装
//!
//! # 現在の実装
//! - **InMemoryOwnerStore**: 開発・テスト用の OwnerStateSource

pub mod inmem_store;

pub use self::inmem_store::InMemoryOwnerStore;
