// bedcontrol-core: state coordination between the SleepIQ client and a
// home-automation host (coalesced reads, debounced writes, re-login,
// privacy-gated polling).

pub mod api;
pub mod bed;
pub mod capability;
pub mod coalesce;
pub mod config;
pub mod debounce;
pub mod error;
pub mod features;
pub mod host;
pub mod platform;
pub mod privacy;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::BedApi;
pub use bed::{BedController, clamp_position, clamp_sleep_number};
pub use capability::{Capability, Characteristic, OutletKind, Scope, Side, Value};
pub use coalesce::Coalescer;
pub use config::PlatformConfig;
pub use debounce::Debouncer;
pub use error::{CharacteristicError, CoreError};
pub use features::{BedFeatures, Feature, SideFeatures};
pub use host::{AccessoryContext, BedStats, Host, MemoryHost};
pub use platform::{Platform, TickOutcome};
pub use privacy::PrivacyMap;
pub use session::Session;
