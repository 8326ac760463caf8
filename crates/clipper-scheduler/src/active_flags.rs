//! Per-source "active" flags (§5 "active-scraping map"). Consulted
//! before each article; setting a source's flag false cancels the
//! in-flight source cleanly without touching any other source.

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
pub struct ActiveFlags {
    flags: DashMap<Uuid, Arc<AtomicBool>>,
}

impl ActiveFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source not yet registered is active by default.
    pub fn is_active(&self, source_id: Uuid) -> bool {
        self.flags
            .get(&source_id)
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(true)
    }

    pub fn deactivate(&self, source_id: Uuid) {
        self.flag_for(source_id).store(false, Ordering::SeqCst);
    }

    pub fn activate(&self, source_id: Uuid) {
        self.flag_for(source_id).store(true, Ordering::SeqCst);
    }

    /// Cleared in a deferred finaliser on every exit path so a
    /// deactivated source doesn't stay deactivated across runs.
    pub fn reset(&self, source_id: Uuid) {
        self.flags.remove(&source_id);
    }

    fn flag_for(&self, source_id: Uuid) -> Arc<AtomicBool> {
        self.flags
            .entry(source_id)
            .or_insert_with(|| Arc::new(AtomicBool::new(true)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_source_defaults_active() {
        let flags = ActiveFlags::new();
        assert!(flags.is_active(Uuid::new_v4()));
    }

    #[test]
    fn deactivate_then_activate_roundtrips() {
        let flags = ActiveFlags::new();
        let id = Uuid::new_v4();
        flags.deactivate(id);
        assert!(!flags.is_active(id));
        flags.activate(id);
        assert!(flags.is_active(id));
    }

    #[test]
    fn reset_returns_to_default_active() {
        let flags = ActiveFlags::new();
        let id = Uuid::new_v4();
        flags.deactivate(id);
        flags.reset(id);
        assert!(flags.is_active(id));
    }
}
