//! Per-bed privacy ("pause mode") flags.
//!
//! Written optimistically by the privacy switch and authoritatively by the
//! poller's refresh. Read by polling and occupancy getters to avoid
//! exposing presence while privacy is on.

use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct PrivacyMap {
    flags: DashMap<String, bool>,
}

impl PrivacyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bed with privacy off, keeping any existing flag.
    pub fn track(&self, bed_id: &str) {
        self.flags.entry(bed_id.to_owned()).or_insert(false);
    }

    /// Unknown beds are treated as not private.
    pub fn is_enabled(&self, bed_id: &str) -> bool {
        self.flags.get(bed_id).is_some_and(|flag| *flag)
    }

    /// Store the flag, returning the previous value.
    pub fn set(&self, bed_id: &str, enabled: bool) -> Option<bool> {
        self.flags.insert(bed_id.to_owned(), enabled)
    }

    /// True when every tracked bed has privacy on. Vacuously true with no
    /// beds tracked.
    pub fn all_enabled(&self) -> bool {
        self.flags.iter().all(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
