// Adjustable foundation endpoints
//
// Beds without a foundation answer these paths with 404, which discovery
// treats as "hardware absent".

use serde_json::json;
use tracing::debug;

use crate::client::SleepIqClient;
use crate::error::Error;
use crate::models::{
    Actuator, BedSide, FootwarmingRequest, FootwarmingStatus, FoundationStatus, OnOff, Outlet,
    OutletStatus, Preset, UnderbedLightStatus,
};

fn foundation_path(bed_id: &str, rest: &str) -> String {
    SleepIqClient::bed_path(bed_id, &format!("foundation/{rest}"))
}

impl SleepIqClient {
    /// `GET /bed/{id}/foundation/status`
    pub async fn foundation_status(&self, bed_id: &str) -> Result<FoundationStatus, Error> {
        debug!(bed_id, "fetching foundation status");
        self.get(&foundation_path(bed_id, "status"), &[]).await
    }

    /// Move one actuator to an absolute position (0-100).
    ///
    /// `PUT /bed/{id}/foundation/adjustment/micro`
    pub async fn adjust(
        &self,
        bed_id: &str,
        side: BedSide,
        actuator: Actuator,
        position: u8,
    ) -> Result<(), Error> {
        debug!(bed_id, %side, %actuator, position, "adjusting foundation");
        self.put_unit(
            &foundation_path(bed_id, "adjustment/micro"),
            &[],
            &json!({
                "speed": 0,
                "side": side,
                "position": position,
                "actuator": actuator,
            }),
        )
        .await
    }

    /// `PUT /bed/{id}/foundation/preset`
    pub async fn preset(&self, bed_id: &str, side: BedSide, preset: Preset) -> Result<(), Error> {
        debug!(bed_id, %side, ?preset, "applying preset");
        self.put_unit(
            &foundation_path(bed_id, "preset"),
            &[],
            &json!({ "speed": 0, "side": side, "preset": preset }),
        )
        .await
    }

    /// `GET /bed/{id}/foundation/outlet?outletId={n}`
    pub async fn outlet_status(&self, bed_id: &str, outlet: Outlet) -> Result<OutletStatus, Error> {
        debug!(bed_id, outlet = outlet.id(), "fetching outlet status");
        let id = outlet.id().to_string();
        self.get(&foundation_path(bed_id, "outlet"), &[("outletId", id.as_str())])
            .await
    }

    /// `PUT /bed/{id}/foundation/outlet?outletId={n}&setting={0|1}`
    pub async fn set_outlet(&self, bed_id: &str, outlet: Outlet, setting: OnOff) -> Result<(), Error> {
        debug!(bed_id, outlet = outlet.id(), ?setting, "setting outlet");
        let id = outlet.id().to_string();
        let setting = u8::from(setting).to_string();
        self.put_unit(
            &foundation_path(bed_id, "outlet"),
            &[("outletId", id.as_str()), ("setting", setting.as_str())],
            &json!({}),
        )
        .await
    }

    /// Start or stop head, massage and foot motion on one side.
    ///
    /// `PUT /bed/{id}/foundation/motion`
    pub async fn motion(
        &self,
        bed_id: &str,
        side: BedSide,
        head: OnOff,
        massage: OnOff,
        foot: OnOff,
    ) -> Result<(), Error> {
        debug!(bed_id, %side, "setting foundation motion");
        self.put_unit(
            &foundation_path(bed_id, "motion"),
            &[],
            &json!({
                "side": side,
                "headMotion": head,
                "massageMotion": massage,
                "footMotion": foot,
            }),
        )
        .await
    }

    /// `GET /bed/{id}/foundation/underbedLight`
    pub async fn underbed_light(&self, bed_id: &str) -> Result<UnderbedLightStatus, Error> {
        debug!(bed_id, "fetching under-bed light");
        self.get(&foundation_path(bed_id, "underbedLight"), &[])
            .await
    }

    /// `PUT /bed/{id}/foundation/underbedLight`
    pub async fn set_underbed_light(&self, bed_id: &str, enable_auto: bool) -> Result<(), Error> {
        debug!(bed_id, enable_auto, "setting under-bed light");
        self.put_unit(
            &foundation_path(bed_id, "underbedLight"),
            &[],
            &json!({ "enableAuto": enable_auto }),
        )
        .await
    }

    /// `GET /bed/{id}/foundation/footwarming`
    pub async fn footwarming(&self, bed_id: &str) -> Result<FootwarmingStatus, Error> {
        debug!(bed_id, "fetching foot warming status");
        self.get(&foundation_path(bed_id, "footwarming"), &[])
            .await
    }

    /// `PUT /bed/{id}/foundation/footwarming`
    pub async fn set_footwarming(
        &self,
        bed_id: &str,
        request: &FootwarmingRequest,
    ) -> Result<(), Error> {
        debug!(bed_id, ?request, "setting foot warming");
        self.put_unit(&foundation_path(bed_id, "footwarming"), &[], request)
            .await
    }

    /// Start or stop massage on one side. `timer_minutes` defaults to 15
    /// in the vendor app.
    ///
    /// `PUT /bed/{id}/foundation/adjustment`
    pub async fn massage(
        &self,
        bed_id: &str,
        side: BedSide,
        head: OnOff,
        wave_mode: OnOff,
        foot: OnOff,
        timer_minutes: u32,
    ) -> Result<(), Error> {
        debug!(bed_id, %side, timer_minutes, "setting massage");
        self.put_unit(
            &foundation_path(bed_id, "adjustment"),
            &[],
            &json!({
                "side": side,
                "headMassageMotor": head,
                "massageWaveMode": wave_mode,
                "footMassageMotor": foot,
                "massageTimer": timer_minutes,
            }),
        )
        .await
    }
}
