// The slice of the SleepIQ API the controllers depend on.
//
// `SleepIqClient` implements it for production. Tests substitute an
// in-memory fake so timer-driven behaviour can run on a paused clock.

use std::future::Future;

use bedcontrol_api::{
    Actuator, BedInfo, BedSide, BedState, BedStatus, Error, FootwarmingRequest, FootwarmingStatus,
    FoundationStatus, OnOff, Outlet, OutletStatus, PauseMode, PumpStatus, ResponsiveAirStatus,
    SleepIqClient,
};

/// Vendor API operations used by discovery, polling and the bed controller.
///
/// Implementations must report an expired session through
/// [`Error::is_auth_expired`] and absent hardware through
/// [`Error::is_not_found`]; the session layer branches on both.
pub trait BedApi: Send + Sync + 'static {
    /// Establish (or replace) the session.
    fn login(&self) -> impl Future<Output = Result<(), Error>> + Send;

    fn family_status(&self) -> impl Future<Output = Result<Vec<BedState>, Error>> + Send;

    fn list_beds(&self) -> impl Future<Output = Result<Vec<BedInfo>, Error>> + Send;

    fn bed_status(&self, bed_id: &str) -> impl Future<Output = Result<BedStatus, Error>> + Send;

    fn pause_mode(&self, bed_id: &str) -> impl Future<Output = Result<PauseMode, Error>> + Send;

    fn set_pause_mode(
        &self,
        bed_id: &str,
        mode: PauseMode,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn set_sleep_number(
        &self,
        bed_id: &str,
        side: BedSide,
        sleep_number: u8,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn pump_status(&self, bed_id: &str) -> impl Future<Output = Result<PumpStatus, Error>> + Send;

    fn responsive_air(
        &self,
        bed_id: &str,
    ) -> impl Future<Output = Result<ResponsiveAirStatus, Error>> + Send;

    fn set_responsive_air(
        &self,
        bed_id: &str,
        left: Option<bool>,
        right: Option<bool>,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn foundation_status(
        &self,
        bed_id: &str,
    ) -> impl Future<Output = Result<FoundationStatus, Error>> + Send;

    fn adjust(
        &self,
        bed_id: &str,
        side: BedSide,
        actuator: Actuator,
        position: u8,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn outlet_status(
        &self,
        bed_id: &str,
        outlet: Outlet,
    ) -> impl Future<Output = Result<OutletStatus, Error>> + Send;

    fn set_outlet(
        &self,
        bed_id: &str,
        outlet: Outlet,
        setting: OnOff,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn footwarming(
        &self,
        bed_id: &str,
    ) -> impl Future<Output = Result<FootwarmingStatus, Error>> + Send;

    fn set_footwarming(
        &self,
        bed_id: &str,
        request: &FootwarmingRequest,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

impl BedApi for SleepIqClient {
    async fn login(&self) -> Result<(), Error> {
        SleepIqClient::login(self).await.map(|_| ())
    }

    async fn family_status(&self) -> Result<Vec<BedState>, Error> {
        SleepIqClient::family_status(self).await
    }

    async fn list_beds(&self) -> Result<Vec<BedInfo>, Error> {
        SleepIqClient::list_beds(self).await
    }

    async fn bed_status(&self, bed_id: &str) -> Result<BedStatus, Error> {
        SleepIqClient::bed_status(self, bed_id).await
    }

    async fn pause_mode(&self, bed_id: &str) -> Result<PauseMode, Error> {
        SleepIqClient::pause_mode(self, bed_id).await
    }

    async fn set_pause_mode(&self, bed_id: &str, mode: PauseMode) -> Result<(), Error> {
        SleepIqClient::set_pause_mode(self, bed_id, mode).await
    }

    async fn set_sleep_number(
        &self,
        bed_id: &str,
        side: BedSide,
        sleep_number: u8,
    ) -> Result<(), Error> {
        SleepIqClient::set_sleep_number(self, bed_id, side, sleep_number).await
    }

    async fn pump_status(&self, bed_id: &str) -> Result<PumpStatus, Error> {
        SleepIqClient::pump_status(self, bed_id).await
    }

    async fn responsive_air(&self, bed_id: &str) -> Result<ResponsiveAirStatus, Error> {
        SleepIqClient::responsive_air(self, bed_id).await
    }

    async fn set_responsive_air(
        &self,
        bed_id: &str,
        left: Option<bool>,
        right: Option<bool>,
    ) -> Result<(), Error> {
        SleepIqClient::set_responsive_air(self, bed_id, left, right).await
    }

    async fn foundation_status(&self, bed_id: &str) -> Result<FoundationStatus, Error> {
        SleepIqClient::foundation_status(self, bed_id).await
    }

    async fn adjust(
        &self,
        bed_id: &str,
        side: BedSide,
        actuator: Actuator,
        position: u8,
    ) -> Result<(), Error> {
        SleepIqClient::adjust(self, bed_id, side, actuator, position).await
    }

    async fn outlet_status(&self, bed_id: &str, outlet: Outlet) -> Result<OutletStatus, Error> {
        SleepIqClient::outlet_status(self, bed_id, outlet).await
    }

    async fn set_outlet(&self, bed_id: &str, outlet: Outlet, setting: OnOff) -> Result<(), Error> {
        SleepIqClient::set_outlet(self, bed_id, outlet, setting).await
    }

    async fn footwarming(&self, bed_id: &str) -> Result<FootwarmingStatus, Error> {
        SleepIqClient::footwarming(self, bed_id).await
    }

    async fn set_footwarming(
        &self,
        bed_id: &str,
        request: &FootwarmingRequest,
    ) -> Result<(), Error> {
        SleepIqClient::set_footwarming(self, bed_id, request).await
    }
}
