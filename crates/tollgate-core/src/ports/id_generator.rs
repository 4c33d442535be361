//! IdGenerator port - ID 生成の抽象化
//!
//! Clock から時刻部分を取るので、FixedClock を渡せば timestamp 部分が
//! 決定的になります（ランダム部分は毎回変わる）。

use crate::domain::ReconcileId;
use crate::ports::Clock;
use ulid::Ulid;

pub trait IdGenerator: Send + Sync {
    fn generate_reconcile_id(&self) -> ReconcileId;
}

/// ULID-based generator driven by a [`Clock`].
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_reconcile_id(&self) -> ReconcileId {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        ReconcileId::from(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}
