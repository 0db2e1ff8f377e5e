//! Boundary to the host accessory runtime.
//!
//! The host owns accessory registration, caching and the characteristic
//! objects. The core only needs to look up cached accessories, register
//! or update them with an [`AccessoryContext`], and push characteristic
//! values. [`MemoryHost`] keeps everything in memory, holding only the
//! latest value of each characteristic; the daemon and the tests use it.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::capability::{Capability, Characteristic, Value};
use crate::features::BedFeatures;

/// Static bed facts captured at discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedStats {
    pub bed_id: String,
    pub name: String,
    pub model: String,
}

/// What the core persists with each accessory in the host's cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryContext {
    pub bed_stats: BedStats,
    pub bed_features: BedFeatures,
    /// Poll interval in seconds when the accessory was last configured.
    pub update_interval: u64,
    /// Write debounce delay in seconds.
    pub send_delay: u64,
    /// Ignore entries for this bed; a change forces re-creation.
    pub ignore_list: Vec<String>,
}

impl AccessoryContext {
    pub fn bed_id(&self) -> &str {
        &self.bed_stats.bed_id
    }

    pub fn name(&self) -> &str {
        &self.bed_stats.name
    }
}

/// Host accessory runtime, as seen by the platform and bed controllers.
pub trait Host: Send + Sync {
    /// Accessory restored from the host cache for this bed, if any.
    fn cached_accessory(&self, bed_id: &str) -> Option<AccessoryContext>;

    fn register_accessory(&self, context: AccessoryContext);

    fn update_accessory(&self, context: AccessoryContext);

    fn unregister_accessory(&self, bed_id: &str);

    /// Push a value into an already-registered characteristic.
    fn update_characteristic(
        &self,
        bed_id: &str,
        capability: Capability,
        characteristic: Characteristic,
        value: Value,
    );
}

/// In-memory [`Host`]: a map of accessories plus the latest value of
/// every characteristic. Repeated pushes overwrite, so memory stays
/// bounded by the number of characteristics.
#[derive(Debug, Default)]
pub struct MemoryHost {
    accessories: Mutex<HashMap<String, AccessoryContext>>,
    values: Mutex<HashMap<(String, Capability, Characteristic), Value>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the cache, as if the host restored these from disk.
    pub fn with_cached(contexts: impl IntoIterator<Item = AccessoryContext>) -> Self {
        let host = Self::default();
        {
            let mut accessories = host.accessories.lock().expect("host lock poisoned");
            for context in contexts {
                accessories.insert(context.bed_id().to_owned(), context);
            }
        }
        host
    }

    pub fn accessories(&self) -> Vec<AccessoryContext> {
        let mut list: Vec<_> = self
            .accessories
            .lock()
            .expect("host lock poisoned")
            .values()
            .cloned()
            .collect();
        list.sort_by(|a, b| a.bed_id().cmp(b.bed_id()));
        list
    }

    /// Latest pushed value for a characteristic.
    pub fn value(
        &self,
        bed_id: &str,
        capability: Capability,
        characteristic: Characteristic,
    ) -> Option<Value> {
        self.values
            .lock()
            .expect("host lock poisoned")
            .get(&(bed_id.to_owned(), capability, characteristic))
            .copied()
    }

    /// Number of characteristics holding a value.
    pub fn characteristic_count(&self) -> usize {
        self.values.lock().expect("host lock poisoned").len()
    }
}

impl Host for MemoryHost {
    fn cached_accessory(&self, bed_id: &str) -> Option<AccessoryContext> {
        self.accessories
            .lock()
            .expect("host lock poisoned")
            .get(bed_id)
            .cloned()
    }

    fn register_accessory(&self, context: AccessoryContext) {
        info!(bed = %context.name(), "registering accessory");
        self.accessories
            .lock()
            .expect("host lock poisoned")
            .insert(context.bed_id().to_owned(), context);
    }

    fn update_accessory(&self, context: AccessoryContext) {
        debug!(bed = %context.name(), "updating accessory");
        self.accessories
            .lock()
            .expect("host lock poisoned")
            .insert(context.bed_id().to_owned(), context);
    }

    fn unregister_accessory(&self, bed_id: &str) {
        info!(bed_id, "unregistering accessory");
        self.accessories
            .lock()
            .expect("host lock poisoned")
            .remove(bed_id);
        self.values
            .lock()
            .expect("host lock poisoned")
            .retain(|(id, _, _), _| id != bed_id);
    }

    fn update_characteristic(
        &self,
        bed_id: &str,
        capability: Capability,
        characteristic: Characteristic,
        value: Value,
    ) {
        self.values
            .lock()
            .expect("host lock poisoned")
            .insert((bed_id.to_owned(), capability, characteristic), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Scope;

    #[test]
    fn repeated_pushes_keep_latest_value_only() {
        let host = MemoryHost::new();
        let sensor = Capability::OccupancySensor { scope: Scope::Left };

        for tick in 0..1000 {
            host.update_characteristic(
                "bed-1",
                sensor,
                Characteristic::OccupancyDetected,
                Value::Bool(tick % 2 == 0),
            );
        }
        assert_eq!(host.characteristic_count(), 1);
        assert_eq!(
            host.value("bed-1", sensor, Characteristic::OccupancyDetected),
            Some(Value::Bool(false))
        );

        host.unregister_accessory("bed-1");
        assert_eq!(host.characteristic_count(), 0);
    }
}
