//! Per-user ordering of background snapshot writes.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::carts::models::UserUuid;

#[derive(Debug, Default)]
struct Gate {
    writes: Mutex<()>,
    epoch: AtomicU64,
}

/// Serializes the cache writes scheduled for each user.
///
/// Background writes for one user run one at a time, in the order they
/// acquire the user's gate. Every store mutation advances the user's epoch; a
/// snapshot read under an older epoch is dropped instead of written. Gates
/// are removed once the last lease on them is released.
#[derive(Debug, Clone, Default)]
pub(crate) struct SnapshotGates {
    gates: Arc<DashMap<UserUuid, Arc<Gate>>>,
}

impl SnapshotGates {
    pub(crate) fn lease(&self, user: UserUuid) -> GateLease {
        let gate = Arc::clone(self.gates.entry(user).or_default().value());

        GateLease {
            gate,
            _release: Release {
                gates: Arc::clone(&self.gates),
                user,
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.gates.len()
    }
}

/// A handle on one user's gate.
#[derive(Debug)]
pub(crate) struct GateLease {
    // Dropped before `_release` so the release sees its own handle gone.
    gate: Arc<Gate>,
    _release: Release,
}

impl GateLease {
    pub(crate) fn epoch(&self) -> u64 {
        self.gate.epoch.load(Ordering::Acquire)
    }

    /// Mark every snapshot read so far as stale.
    pub(crate) fn advance(&self) {
        self.gate.epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Wait for the user's earlier background writes to finish.
    pub(crate) async fn serialize(&self) -> MutexGuard<'_, ()> {
        self.gate.writes.lock().await
    }
}

#[derive(Debug)]
struct Release {
    gates: Arc<DashMap<UserUuid, Arc<Gate>>>,
    user: UserUuid,
}

impl Drop for Release {
    fn drop(&mut self) {
        self.gates
            .remove_if(&self.user, |_, gate| Arc::strong_count(gate) == 1);
    }
}
