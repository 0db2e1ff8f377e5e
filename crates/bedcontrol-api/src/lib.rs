//! Async client for the SleepIQ smart bed cloud API.
//!
//! [`SleepIqClient`] wraps the vendor's session-authenticated JSON REST
//! API: `PUT /login` issues a session key (sent as the `_k` query
//! parameter) and a session cookie. HTTP 401 surfaces as
//! [`Error::Authentication`] and 404 as [`Error::NotFound`], so callers
//! can tell an expired session from hardware a bed does not have.
//!
//! The client is deliberately thin: it performs no retries, caching, or
//! re-login. Those live in `bedcontrol-core`.

pub mod account;
pub mod auth;
pub mod bed;
pub mod client;
pub mod error;
pub mod foundation;
pub mod models;
pub mod transport;

pub use client::{Credentials, Session, SleepIqClient};
pub use error::Error;
pub use models::{
    Actuator, BedInfo, BedSide, BedSideStatus, BedState, BedStatus, FootwarmingLevel,
    FootwarmingRequest, FootwarmingStatus, FoundationStatus, OnOff, Outlet, OutletStatus,
    PauseMode, Preset, PumpStatus, ResponsiveAirStatus, Sleeper, UnderbedLightStatus,
};
pub use transport::{DEFAULT_BASE_URL, TlsMode, TransportConfig};
