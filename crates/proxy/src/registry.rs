use crate::role::Role;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Counts the legs currently forwarding traffic.
///
/// Clones share the same counter. Each running leg holds a [`LegGuard`], which gives its slot
/// back when dropped, however the leg ended.
#[derive(Debug, Clone, Default)]
pub struct LegRegistry {
    active: Arc<AtomicUsize>,
}

impl LegRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self, role: Role) -> LegGuard {
        let active = self.active.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(%role, active, "leg started");
        LegGuard { role, active: Arc::clone(&self.active) }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

/// Registration of one running leg.
#[derive(Debug)]
pub struct LegGuard {
    role: Role,
    active: Arc<AtomicUsize>,
}

impl LegGuard {
    pub fn role(&self) -> Role {
        self.role
    }
}

impl Drop for LegGuard {
    fn drop(&mut self) {
        let active = self.active.fetch_sub(1, Ordering::AcqRel) - 1;
        debug!(role = %self.role, active, "leg terminated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_track_active_legs() {
        let registry = LegRegistry::new();
        let upstream = registry.enter(Role::ClientToUpstream);
        let client = registry.clone().enter(Role::UpstreamToClient);
        assert_eq!(registry.active(), 2);
        assert_eq!(client.role(), Role::UpstreamToClient);

        drop(upstream);
        assert_eq!(registry.active(), 1);
        drop(client);
        assert_eq!(registry.active(), 0);
    }
}
