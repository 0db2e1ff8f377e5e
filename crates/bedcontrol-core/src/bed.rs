//! Per-bed accessory controller.
//!
//! Translates host characteristic reads and writes into API calls. Reads
//! go through one coalescer per resource, so several characteristics
//! refreshed together (both occupancy sensors, say) share one request.
//! Slider-style writes (sleep number, actuator position, foot warmer
//! timer) go through one debouncer per target and only the last value
//! of a burst is sent.

use std::sync::Arc;
use std::time::Duration;

use bedcontrol_api::{
    Actuator, BedState, BedStatus, FootwarmingLevel, FootwarmingRequest, FootwarmingStatus,
    FoundationStatus, OnOff, Outlet, OutletStatus, PauseMode, ResponsiveAirStatus,
};
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::api::BedApi;
use crate::capability::{Capability, Characteristic, OutletKind, Scope, Side, Value};
use crate::coalesce::{Coalescer, SharedFuture};
use crate::debounce::Debouncer;
use crate::error::{CharacteristicError, CoreError};
use crate::features::BedFeatures;
use crate::host::{AccessoryContext, Host};
use crate::privacy::PrivacyMap;
use crate::session::Session;

/// Result of one session-wrapped call. `Ok(None)` means the session could
/// not be re-established.
pub type Fetch<T> = Result<Option<T>, CoreError>;

/// Foot warmer timer used when only the level is changed, in minutes.
pub const DEFAULT_FOOTWARMING_MINUTES: u32 = 100;

/// Minutes per step of the foot warmer timer characteristic.
const FOOTWARMING_STEP_MINUTES: u32 = 5;

// ── Value mapping ───────────────────────────────────────────────────

/// Round and clamp an actuator position to 0-100.
#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn clamp_position(value: f64) -> u8 {
    // NaN saturates to 0.
    value.round().clamp(0.0, 100.0) as u8
}

/// Round, clamp to 5-100 and floor to a multiple of 5.
pub fn clamp_sleep_number(value: f64) -> u8 {
    (clamp_position(value) / 5 * 5).max(5)
}

/// Foot warmer level on the 0-3 scale shown to the user.
pub fn footwarming_scale(level: FootwarmingLevel) -> u8 {
    match level {
        FootwarmingLevel::Off => 0,
        FootwarmingLevel::Low => 1,
        FootwarmingLevel::Med => 2,
        FootwarmingLevel::High => 3,
    }
}

/// Inverse of [`footwarming_scale`]; out-of-range input is clamped.
pub fn footwarming_level(scale: f64) -> FootwarmingLevel {
    match clamp_position(scale) {
        0 => FootwarmingLevel::Off,
        1 => FootwarmingLevel::Low,
        2 => FootwarmingLevel::Med,
        _ => FootwarmingLevel::High,
    }
}

// ── Fixed-shape tables ──────────────────────────────────────────────

/// One value per bed side.
#[derive(Debug)]
pub struct Sides<T> {
    pub left: T,
    pub right: T,
}

impl<T> Sides<T> {
    pub fn new(mut make: impl FnMut(Side) -> T) -> Self {
        Self {
            left: make(Side::Left),
            right: make(Side::Right),
        }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// One value per foundation actuator.
#[derive(Debug)]
pub struct Actuators<T> {
    pub head: T,
    pub foot: T,
}

impl<T> Actuators<T> {
    pub fn new(mut make: impl FnMut(Actuator) -> T) -> Self {
        Self {
            head: make(Actuator::Head),
            foot: make(Actuator::Foot),
        }
    }

    pub fn get(&self, actuator: Actuator) -> &T {
        match actuator {
            Actuator::Head => &self.head,
            Actuator::Foot => &self.foot,
        }
    }
}

/// In-flight reads, one table per resource.
struct Pending {
    bed_status: Coalescer<(), Fetch<BedStatus>>,
    pause_mode: Coalescer<(), Fetch<PauseMode>>,
    responsive_air: Coalescer<(), Fetch<ResponsiveAirStatus>>,
    foundation_status: Coalescer<(), Fetch<FoundationStatus>>,
    outlets: Coalescer<Outlet, Fetch<OutletStatus>>,
    footwarming: Coalescer<(), Fetch<FootwarmingStatus>>,
}

impl Pending {
    fn new() -> Self {
        Self {
            bed_status: Coalescer::new(),
            pause_mode: Coalescer::new(),
            responsive_air: Coalescer::new(),
            foundation_status: Coalescer::new(),
            outlets: Coalescer::new(),
            footwarming: Coalescer::new(),
        }
    }
}

/// Pending debounced writes, one per target.
struct Writes {
    sleep_number: Sides<Debouncer<u8>>,
    actuators: Sides<Actuators<Debouncer<u8>>>,
    footwarming_timer: Sides<Debouncer<u32>>,
}

// ── Remote: one bed's view of the API ───────────────────────────────

/// Session-wrapped calls scoped to one bed. Shared by the controller and
/// its debounced write tasks.
struct Remote<A> {
    bed_id: String,
    name: String,
    session: Arc<Session<A>>,
    pending: Pending,
}

impl<A: BedApi> Remote<A> {
    fn handle(&self) -> (Arc<Session<A>>, String) {
        (Arc::clone(&self.session), self.bed_id.clone())
    }

    fn bed_status(&self) -> SharedFuture<Fetch<BedStatus>> {
        let (session, bed_id) = self.handle();
        self.pending.bed_status.coalesce((), move || async move {
            session.call(|| session.api().bed_status(&bed_id)).await
        })
    }

    fn pause_mode(&self) -> SharedFuture<Fetch<PauseMode>> {
        let (session, bed_id) = self.handle();
        self.pending.pause_mode.coalesce((), move || async move {
            session.call(|| session.api().pause_mode(&bed_id)).await
        })
    }

    fn responsive_air(&self) -> SharedFuture<Fetch<ResponsiveAirStatus>> {
        let (session, bed_id) = self.handle();
        self.pending.responsive_air.coalesce((), move || async move {
            session.call(|| session.api().responsive_air(&bed_id)).await
        })
    }

    fn foundation_status(&self) -> SharedFuture<Fetch<FoundationStatus>> {
        let (session, bed_id) = self.handle();
        self.pending.foundation_status.coalesce((), move || async move {
            session.call(|| session.api().foundation_status(&bed_id)).await
        })
    }

    fn outlet(&self, outlet: Outlet) -> SharedFuture<Fetch<OutletStatus>> {
        let (session, bed_id) = self.handle();
        self.pending.outlets.coalesce(outlet, move || async move {
            session
                .call(|| session.api().outlet_status(&bed_id, outlet))
                .await
        })
    }

    fn footwarming(&self) -> SharedFuture<Fetch<FootwarmingStatus>> {
        let (session, bed_id) = self.handle();
        self.pending.footwarming.coalesce((), move || async move {
            session.call(|| session.api().footwarming(&bed_id)).await
        })
    }

    async fn set_pause_mode(&self, mode: PauseMode) -> Fetch<()> {
        self.session
            .call(|| self.session.api().set_pause_mode(&self.bed_id, mode))
            .await
    }

    async fn set_sleep_number(&self, side: Side, number: u8) -> Fetch<()> {
        self.session
            .call(|| {
                self.session
                    .api()
                    .set_sleep_number(&self.bed_id, side.wire(), number)
            })
            .await
    }

    async fn set_responsive_air(&self, side: Side, enabled: bool) -> Fetch<()> {
        let (left, right) = match side {
            Side::Left => (Some(enabled), None),
            Side::Right => (None, Some(enabled)),
        };
        self.session
            .call(|| {
                self.session
                    .api()
                    .set_responsive_air(&self.bed_id, left, right)
            })
            .await
    }

    async fn adjust(&self, side: Side, actuator: Actuator, position: u8) -> Fetch<()> {
        self.session
            .call(|| {
                self.session
                    .api()
                    .adjust(&self.bed_id, side.wire(), actuator, position)
            })
            .await
    }

    async fn set_outlet(&self, outlet: Outlet, on: bool) -> Fetch<()> {
        self.session
            .call(|| {
                self.session
                    .api()
                    .set_outlet(&self.bed_id, outlet, OnOff::from(on))
            })
            .await
    }

    async fn set_footwarming(&self, request: &FootwarmingRequest) -> Fetch<()> {
        self.session
            .call(|| self.session.api().set_footwarming(&self.bed_id, request))
            .await
    }

    /// Change only the timer, keeping the side's current level.
    async fn set_footwarming_timer(&self, side: Side, minutes: u32) -> Fetch<()> {
        let Some(status) = self.footwarming().await? else {
            return Ok(None);
        };
        let request = FootwarmingRequest::for_side(side.wire(), status.level(side.wire()), minutes);
        self.set_footwarming(&request).await
    }

    /// Log the outcome of a fire-and-forget write.
    fn report(&self, what: &str, outcome: &Fetch<()>) {
        match outcome {
            Ok(Some(())) => debug!("[{}] {what} sent", self.name),
            Ok(None) => warn!("[{}] {what} dropped: session could not be restored", self.name),
            Err(e) => warn!(error = %e, "[{}] {what} failed", self.name),
        }
    }
}

/// Convert a call result into what the host expects, logging failures.
fn settle<T>(name: &str, what: &str, fetched: Fetch<T>) -> Result<T, CharacteristicError> {
    match fetched {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            warn!("[{name}] {what}: no data from SleepIQ");
            Err(CharacteristicError::ServiceCommunicationFailure)
        }
        Err(e) => {
            warn!(error = %e, "[{name}] {what} failed");
            Err(e.into())
        }
    }
}

// ── Controller ──────────────────────────────────────────────────────

/// Controller for one physical bed.
///
/// Getters return [`CharacteristicError::ServiceCommunicationFailure`]
/// whenever the API gave no data, never a default value. Debounced
/// setters return immediately; their outcome is only logged.
pub struct BedController<A> {
    remote: Arc<Remote<A>>,
    features: BedFeatures,
    host: Arc<dyn Host>,
    privacy: Arc<PrivacyMap>,
    writes: Writes,
}

impl<A: BedApi> BedController<A> {
    pub fn new(
        context: &AccessoryContext,
        session: Arc<Session<A>>,
        host: Arc<dyn Host>,
        privacy: Arc<PrivacyMap>,
        send_delay: Duration,
    ) -> Self {
        let remote = Arc::new(Remote {
            bed_id: context.bed_id().to_owned(),
            name: context.name().to_owned(),
            session,
            pending: Pending::new(),
        });

        let writes = Writes {
            sleep_number: Sides::new(|side| {
                let remote = Arc::clone(&remote);
                Debouncer::new(send_delay, move |number: u8| {
                    let remote = Arc::clone(&remote);
                    async move {
                        let outcome = remote.set_sleep_number(side, number).await;
                        remote.report(&format!("[{side}] Set Number {number}"), &outcome);
                    }
                })
            }),
            actuators: Sides::new(|side| {
                Actuators::new(|actuator| {
                    let remote = Arc::clone(&remote);
                    Debouncer::new(send_delay, move |position: u8| {
                        let remote = Arc::clone(&remote);
                        async move {
                            let outcome = remote.adjust(side, actuator, position).await;
                            remote.report(
                                &format!("[{side}] Set {actuator} Position {position}"),
                                &outcome,
                            );
                        }
                    })
                })
            }),
            footwarming_timer: Sides::new(|side| {
                let remote = Arc::clone(&remote);
                Debouncer::new(send_delay, move |minutes: u32| {
                    let remote = Arc::clone(&remote);
                    async move {
                        let outcome = remote.set_footwarming_timer(side, minutes).await;
                        remote.report(&format!("[{side}] Set Footwarming Timer {minutes}m"), &outcome);
                    }
                })
            }),
        };

        Self {
            remote,
            features: context.bed_features.clone(),
            host,
            privacy,
            writes,
        }
    }

    pub fn bed_id(&self) -> &str {
        &self.remote.bed_id
    }

    pub fn name(&self) -> &str {
        &self.remote.name
    }

    pub fn features(&self) -> &BedFeatures {
        &self.features
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        self.features.capabilities()
    }

    fn push(&self, capability: Capability, characteristic: Characteristic, value: Value) {
        self.host
            .update_characteristic(self.bed_id(), capability, characteristic, value);
    }

    // ── Characteristic dispatch ──────────────────────────────────────

    /// Read a characteristic of one of this bed's capabilities.
    pub async fn get(
        &self,
        capability: Capability,
        characteristic: Characteristic,
    ) -> Result<Value, CharacteristicError> {
        if !self.features.has(capability) {
            return Err(CharacteristicError::Unsupported);
        }
        match (capability, characteristic) {
            (Capability::PrivacySwitch, Characteristic::On) => {
                self.get_privacy().await.map(Value::from)
            }
            (Capability::OccupancySensor { scope }, Characteristic::OccupancyDetected) => {
                self.get_occupancy(scope).await.map(Value::from)
            }
            (Capability::NumberControl { side }, Characteristic::Brightness) => {
                self.get_number(side).await.map(Value::from)
            }
            // Sliders are always "on"; only their level is meaningful.
            (
                Capability::NumberControl { .. } | Capability::Actuator { .. },
                Characteristic::On,
            ) => Ok(Value::Bool(true)),
            (Capability::ResponsiveAir { side }, Characteristic::On) => {
                self.get_responsive_air(side).await.map(Value::from)
            }
            (Capability::Actuator { side, actuator }, Characteristic::Brightness) => self
                .get_actuator_position(side, actuator)
                .await
                .map(Value::from),
            (Capability::Outlet { scope, kind }, Characteristic::On) => {
                self.get_outlet(scope, kind).await.map(Value::from)
            }
            (Capability::FootWarmer { side }, Characteristic::HeatingLevel) => {
                self.get_footwarming_value(side).await.map(Value::from)
            }
            (Capability::FootWarmer { side }, Characteristic::RemainingDuration) => self
                .get_footwarming_time_remaining(side)
                .await
                .map(Value::from),
            (capability, characteristic) => {
                warn!("[{}] {capability} has no readable {characteristic}", self.name());
                Err(CharacteristicError::Unsupported)
            }
        }
    }

    /// Write a characteristic of one of this bed's capabilities.
    pub async fn set(
        &self,
        capability: Capability,
        characteristic: Characteristic,
        value: Value,
    ) -> Result<(), CharacteristicError> {
        if !self.features.has(capability) {
            return Err(CharacteristicError::Unsupported);
        }
        match (capability, characteristic) {
            (Capability::PrivacySwitch, Characteristic::On) => {
                self.set_privacy(value.as_bool()).await
            }
            (Capability::NumberControl { side }, Characteristic::Brightness) => {
                self.set_number(side, value.as_number());
                Ok(())
            }
            (
                Capability::NumberControl { .. } | Capability::Actuator { .. },
                Characteristic::On,
            ) => Ok(()),
            (Capability::ResponsiveAir { side }, Characteristic::On) => {
                self.set_responsive_air(side, value.as_bool()).await
            }
            (Capability::Actuator { side, actuator }, Characteristic::Brightness) => {
                self.set_actuator_position(side, actuator, value.as_number());
                Ok(())
            }
            (Capability::Outlet { scope, kind }, Characteristic::On) => {
                self.set_outlet(scope, kind, value.as_bool()).await
            }
            (Capability::FootWarmer { side }, Characteristic::HeatingLevel) => {
                self.set_footwarming_value(side, value.as_number()).await
            }
            (Capability::FootWarmer { side }, Characteristic::RemainingDuration) => {
                self.set_footwarming_time_remaining(side, value.as_number());
                Ok(())
            }
            (capability, characteristic) => {
                warn!("[{}] {capability} has no writable {characteristic}", self.name());
                Err(CharacteristicError::Unsupported)
            }
        }
    }

    // ── Privacy ──────────────────────────────────────────────────────

    /// Read pause mode from the API and record it as the bed's privacy flag.
    pub async fn get_privacy(&self) -> Result<bool, CharacteristicError> {
        let mode = settle(self.name(), "Get Privacy Mode", self.remote.pause_mode().await)?;
        let enabled = mode == PauseMode::On;
        self.privacy.set(self.bed_id(), enabled);
        debug!("[{}] Get Privacy Mode -> {enabled}", self.name());
        Ok(enabled)
    }

    /// Toggle privacy. The local flag changes before the API call; enabling
    /// also clears every occupancy sensor.
    pub async fn set_privacy(&self, enabled: bool) -> Result<(), CharacteristicError> {
        debug!("[{}] Set Privacy Mode -> {enabled}", self.name());
        self.privacy.set(self.bed_id(), enabled);

        if enabled {
            for scope in Scope::ALL {
                if self.features.scope(scope).occupancy_sensor {
                    self.push(
                        Capability::OccupancySensor { scope },
                        Characteristic::OccupancyDetected,
                        Value::Bool(false),
                    );
                }
            }
        }

        let outcome = self.remote.set_pause_mode(PauseMode::from(enabled)).await;
        settle(self.name(), "Set Privacy Mode", outcome)
    }

    /// Push a privacy flag learned elsewhere (initial sync, poll refresh).
    pub fn sync_privacy(&self, enabled: bool) {
        self.privacy.set(self.bed_id(), enabled);
        if self.features.privacy {
            self.push(Capability::PrivacySwitch, Characteristic::On, Value::Bool(enabled));
        }
    }

    pub fn is_private(&self) -> bool {
        self.privacy.is_enabled(self.bed_id())
    }

    // ── Occupancy & sleep number ─────────────────────────────────────

    /// Occupancy of one side, or of either side for [`Scope::Any`].
    ///
    /// With privacy on this answers "not occupied" without touching the
    /// network and marks the sensor inactive.
    pub async fn get_occupancy(&self, scope: Scope) -> Result<bool, CharacteristicError> {
        let sensor = Capability::OccupancySensor { scope };
        if self.is_private() {
            debug!("[{}][{scope}] Privacy mode enabled, reporting unoccupied", self.name());
            self.push(sensor, Characteristic::StatusActive, Value::Bool(false));
            return Ok(false);
        }

        let status = settle(self.name(), "Get Occupancy", self.remote.bed_status().await)?;
        let occupied = match scope.side() {
            Some(Side::Left) => status.left_side.is_in_bed,
            Some(Side::Right) => status.right_side.is_in_bed,
            None => status.left_side.is_in_bed || status.right_side.is_in_bed,
        };
        self.push(sensor, Characteristic::StatusActive, Value::Bool(true));
        debug!("[{}][{scope}] Get Occupancy -> {occupied}", self.name());
        Ok(occupied)
    }

    pub async fn get_number(&self, side: Side) -> Result<u8, CharacteristicError> {
        let status = settle(self.name(), "Get Number", self.remote.bed_status().await)?;
        let number = match side {
            Side::Left => status.left_side.sleep_number,
            Side::Right => status.right_side.sleep_number,
        };
        debug!("[{}][{side}] Get Number -> {number}", self.name());
        Ok(number)
    }

    /// Queue a sleep number change; sent after the debounce delay.
    pub fn set_number(&self, side: Side, value: f64) {
        let number = clamp_sleep_number(value);
        debug!("[{}][{side}] Set Number -> {number}", self.name());
        self.writes.sleep_number.get(side).push(number);
    }

    // ── Responsive air ───────────────────────────────────────────────

    pub async fn get_responsive_air(&self, side: Side) -> Result<bool, CharacteristicError> {
        let status = settle(
            self.name(),
            "Get Responsive Air",
            self.remote.responsive_air().await,
        )?;
        let enabled = match side {
            Side::Left => status.left_side_enabled,
            Side::Right => status.right_side_enabled,
        };
        debug!("[{}][{side}] Get Responsive Air -> {enabled}", self.name());
        Ok(enabled)
    }

    pub async fn set_responsive_air(
        &self,
        side: Side,
        enabled: bool,
    ) -> Result<(), CharacteristicError> {
        debug!("[{}][{side}] Set Responsive Air -> {enabled}", self.name());
        let outcome = self.remote.set_responsive_air(side, enabled).await;
        settle(self.name(), "Set Responsive Air", outcome)
    }

    // ── Foundation actuators ─────────────────────────────────────────

    pub async fn get_actuator_position(
        &self,
        side: Side,
        actuator: Actuator,
    ) -> Result<u8, CharacteristicError> {
        let status = settle(
            self.name(),
            "Get Actuator Position",
            self.remote.foundation_status().await,
        )?;
        let Some(position) = status.position(side.wire(), actuator) else {
            warn!(
                "[{}][{side}] Unreadable {actuator} position {:?}",
                self.name(),
                status.raw_position(side.wire(), actuator)
            );
            return Err(CharacteristicError::ServiceCommunicationFailure);
        };
        debug!("[{}][{side}] Get {actuator} Position -> {position}", self.name());
        Ok(position)
    }

    /// Queue an actuator move; sent after the debounce delay.
    pub fn set_actuator_position(&self, side: Side, actuator: Actuator, value: f64) {
        let position = clamp_position(value);
        debug!("[{}][{side}] Set {actuator} Position -> {position}", self.name());
        self.writes.actuators.get(side).get(actuator).push(position);
    }

    // ── Outlets & lights ─────────────────────────────────────────────

    /// State of one side's outlet or light. For [`Scope::Any`], on when
    /// any side that has one is on.
    pub async fn get_outlet(
        &self,
        scope: Scope,
        kind: OutletKind,
    ) -> Result<bool, CharacteristicError> {
        let sides = match scope.side() {
            Some(side) => vec![side],
            None => self.features.outlet_sides(kind),
        };

        let fetches = sides
            .iter()
            .map(|side| self.remote.outlet(kind.outlet(*side)));
        let mut on = false;
        for fetched in join_all(fetches).await {
            let status = settle(self.name(), "Get Outlet", fetched)?;
            on |= status.setting == OnOff::On;
        }

        debug!("[{}][{scope}] Get {kind} -> {on}", self.name());
        Ok(on)
    }

    /// Switch one side's outlet or light, or every side's for [`Scope::Any`].
    pub async fn set_outlet(
        &self,
        scope: Scope,
        kind: OutletKind,
        on: bool,
    ) -> Result<(), CharacteristicError> {
        debug!("[{}][{scope}] Set {kind} -> {on}", self.name());
        let sides = match scope.side() {
            Some(side) => vec![side],
            None => self.features.outlet_sides(kind),
        };

        for side in sides {
            let outcome = self.remote.set_outlet(kind.outlet(side), on).await;
            settle(self.name(), "Set Outlet", outcome)?;
        }
        Ok(())
    }

    // ── Foot warming ─────────────────────────────────────────────────

    async fn footwarming_status(&self) -> Result<FootwarmingStatus, CharacteristicError> {
        settle(
            self.name(),
            "Get Footwarming",
            self.remote.footwarming().await,
        )
    }

    /// Heat level on the 0-3 scale.
    pub async fn get_footwarming_value(&self, side: Side) -> Result<u8, CharacteristicError> {
        let level = self.footwarming_status().await?.level(side.wire());
        debug!("[{}][{side}] Get Footwarming -> {level}", self.name());
        Ok(footwarming_scale(level))
    }

    /// Set the heat level (0-3). Uses the default timer.
    pub async fn set_footwarming_value(
        &self,
        side: Side,
        value: f64,
    ) -> Result<(), CharacteristicError> {
        let level = footwarming_level(value);
        debug!("[{}][{side}] Set Footwarming -> {level}", self.name());
        let request =
            FootwarmingRequest::for_side(side.wire(), level, DEFAULT_FOOTWARMING_MINUTES);
        let outcome = self.remote.set_footwarming(&request).await;
        settle(self.name(), "Set Footwarming", outcome)
    }

    /// Remaining timer in five-minute steps.
    pub async fn get_footwarming_time_remaining(
        &self,
        side: Side,
    ) -> Result<u32, CharacteristicError> {
        let minutes = self.footwarming_status().await?.timer(side.wire());
        debug!("[{}][{side}] Get Footwarming Timer -> {minutes}m", self.name());
        Ok(minutes / FOOTWARMING_STEP_MINUTES)
    }

    /// Queue a timer change (five-minute steps); the current level is kept.
    pub fn set_footwarming_time_remaining(&self, side: Side, value: f64) {
        let minutes = u32::from(clamp_position(value)) * FOOTWARMING_STEP_MINUTES;
        debug!("[{}][{side}] Set Footwarming Timer -> {minutes}m", self.name());
        self.writes.footwarming_timer.get(side).push(minutes);
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Push one family-status snapshot into the occupancy and number
    /// characteristics. Sides flagged out of sync are skipped.
    pub fn apply_family_status(&self, bed: &BedState) {
        if self.is_private() {
            debug!("[Polling][{}] Privacy mode enabled, skipping polling updates", self.name());
            return;
        }

        for side in Side::BOTH {
            let data = match side {
                Side::Left => &bed.left_side,
                Side::Right => &bed.right_side,
            };
            if data.is_out_of_sync() {
                warn!("[Polling][{}][{side}] Polling data out of sync. Devices not updated", self.name());
                continue;
            }

            let features = self.features.side(side);
            if features.occupancy_sensor {
                debug!("[Polling][{}][{side}] Get Occupancy -> {}", self.name(), data.is_in_bed);
                self.push(
                    Capability::OccupancySensor { scope: side.into() },
                    Characteristic::OccupancyDetected,
                    Value::Bool(data.is_in_bed),
                );
            }
            if features.number_control {
                debug!("[Polling][{}][{side}] Get Number -> {}", self.name(), data.sleep_number);
                self.push(
                    Capability::NumberControl { side },
                    Characteristic::Brightness,
                    Value::from(data.sleep_number),
                );
            }
        }

        if self.features.any_side.occupancy_sensor {
            if bed.left_side.is_out_of_sync() || bed.right_side.is_out_of_sync() {
                warn!("[Polling][{}][anySide] Polling data out of sync. Devices not updated", self.name());
            } else {
                let occupied = bed.left_side.is_in_bed || bed.right_side.is_in_bed;
                debug!("[Polling][{}][anySide] Get Occupancy -> {occupied}", self.name());
                self.push(
                    Capability::OccupancySensor { scope: Scope::Any },
                    Characteristic::OccupancyDetected,
                    Value::Bool(occupied),
                );
            }
        }
    }

    /// Cancel any queued writes. Used when the accessory is re-created.
    pub fn cancel_pending_writes(&self) {
        info!("[{}] Cancelling queued writes", self.name());
        for side in Side::BOTH {
            self.writes.sleep_number.get(side).cancel();
            self.writes.footwarming_timer.get(side).cancel();
            for actuator in [Actuator::Head, Actuator::Foot] {
                self.writes.actuators.get(side).get(actuator).cancel();
            }
        }
    }
}
