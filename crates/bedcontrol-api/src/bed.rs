// Bed, pause mode, and pump endpoints

use serde_json::json;
use tracing::debug;

use crate::client::SleepIqClient;
use crate::error::Error;
use crate::models::{
    BedInfo, BedList, BedSide, BedState, BedStatus, FamilyStatus, PauseMode, PauseModeStatus,
    PumpStatus, ResponsiveAirStatus,
};

impl SleepIqClient {
    /// Occupancy and sleep number for every bed on the account.
    ///
    /// `GET /bed/familyStatus`
    pub async fn family_status(&self) -> Result<Vec<BedState>, Error> {
        debug!("fetching family status");
        let status: FamilyStatus = self.get("bed/familyStatus", &[]).await?;
        Ok(status.beds)
    }

    /// Static description of every bed on the account.
    ///
    /// `GET /bed`
    pub async fn list_beds(&self) -> Result<Vec<BedInfo>, Error> {
        debug!("listing beds");
        let list: BedList = self.get("bed", &[]).await?;
        Ok(list.beds)
    }

    /// `GET /bed/{id}/status`
    pub async fn bed_status(&self, bed_id: &str) -> Result<BedStatus, Error> {
        debug!(bed_id, "fetching bed status");
        self.get(&Self::bed_path(bed_id, "status"), &[]).await
    }

    /// `GET /bed/{id}/pauseMode`
    pub async fn pause_mode(&self, bed_id: &str) -> Result<PauseMode, Error> {
        debug!(bed_id, "fetching pause mode");
        let status: PauseModeStatus = self.get(&Self::bed_path(bed_id, "pauseMode"), &[]).await?;
        Ok(status.pause_mode)
    }

    /// `PUT /bed/{id}/pauseMode?mode={on|off}`
    pub async fn set_pause_mode(&self, bed_id: &str, mode: PauseMode) -> Result<(), Error> {
        debug!(bed_id, %mode, "setting pause mode");
        let mode = mode.to_string();
        self.put_unit(
            &Self::bed_path(bed_id, "pauseMode"),
            &[("mode", mode.as_str())],
            &json!({}),
        )
        .await
    }

    /// Inflate or deflate one side to the given sleep number.
    ///
    /// `PUT /bed/{id}/sleepNumber`
    pub async fn set_sleep_number(
        &self,
        bed_id: &str,
        side: BedSide,
        sleep_number: u8,
    ) -> Result<(), Error> {
        debug!(bed_id, %side, sleep_number, "setting sleep number");
        self.put_unit(
            &Self::bed_path(bed_id, "sleepNumber"),
            &[],
            &json!({ "side": side, "sleepNumber": sleep_number }),
        )
        .await
    }

    /// `GET /bed/{id}/pump/status`
    pub async fn pump_status(&self, bed_id: &str) -> Result<PumpStatus, Error> {
        debug!(bed_id, "fetching pump status");
        self.get(&Self::bed_path(bed_id, "pump/status"), &[]).await
    }

    /// Stop any running pump task.
    ///
    /// `PUT /bed/{id}/pump/forceIdle`
    pub async fn force_idle(&self, bed_id: &str) -> Result<(), Error> {
        debug!(bed_id, "forcing pump idle");
        self.put_unit(&Self::bed_path(bed_id, "pump/forceIdle"), &[], &json!({}))
            .await
    }

    /// `GET /bed/{id}/responsiveAir`
    pub async fn responsive_air(&self, bed_id: &str) -> Result<ResponsiveAirStatus, Error> {
        debug!(bed_id, "fetching responsive air");
        self.get(&Self::bed_path(bed_id, "responsiveAir"), &[])
            .await
    }

    /// Enable or disable responsive air. `None` leaves that side unchanged.
    ///
    /// `PUT /bed/{id}/responsiveAir`
    pub async fn set_responsive_air(
        &self,
        bed_id: &str,
        left: Option<bool>,
        right: Option<bool>,
    ) -> Result<(), Error> {
        debug!(bed_id, ?left, ?right, "setting responsive air");
        let mut body = serde_json::Map::new();
        if let Some(enabled) = left {
            body.insert("leftSideEnabled".into(), enabled.into());
        }
        if let Some(enabled) = right {
            body.insert("rightSideEnabled".into(), enabled.into());
        }
        self.put_unit(&Self::bed_path(bed_id, "responsiveAir"), &[], &body)
            .await
    }
}
