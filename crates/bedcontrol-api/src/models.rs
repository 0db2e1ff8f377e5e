// SleepIQ API wire types
//
// Request and response shapes for the vendor's JSON REST API. Field names
// on the wire are camelCase. Fields use `#[serde(default)]` liberally
// because the API omits values depending on bed generation and firmware.

use serde::{Deserialize, Serialize};

// ── Login / account ──────────────────────────────────────────────────

/// Response of `PUT /login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: String,
    pub key: String,
    #[serde(default)]
    pub registration_state: i64,
    #[serde(default)]
    pub edp_login_status: i64,
    #[serde(default)]
    pub edp_login_message: Option<String>,
}

/// Response of `GET /registration`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub account_id: String,
    #[serde(default)]
    pub registration_state: serde_json::Value,
}

/// One sleeper on the account (`GET /sleeper`). Only the fields the
/// bridge uses are modelled; the rest land in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sleeper {
    pub sleeper_id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub bed_id: Option<String>,
    /// 0 = left, 1 = right.
    #[serde(default)]
    pub side: Option<u8>,
    #[serde(default)]
    pub is_account_owner: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleeperList {
    #[serde(default)]
    pub sleepers: Vec<Sleeper>,
}

// ── Beds ─────────────────────────────────────────────────────────────

/// Per-side status as reported by family status and bed status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedSideStatus {
    #[serde(default)]
    pub is_in_bed: bool,
    #[serde(default)]
    pub alert_detailed_message: String,
    #[serde(default)]
    pub sleep_number: u8,
    #[serde(default)]
    pub alert_id: i64,
    #[serde(default)]
    pub last_link: String,
    #[serde(default)]
    pub pressure: i64,
}

impl BedSideStatus {
    /// Message the API attaches to a side whose readings are stale.
    pub const OUT_OF_SYNC: &'static str = "Data Out of Sync";

    /// Whether the API flagged this side's data as out of sync.
    pub fn is_out_of_sync(&self) -> bool {
        self.alert_detailed_message == Self::OUT_OF_SYNC
    }
}

/// One bed inside `GET /bed/familyStatus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedState {
    #[serde(default)]
    pub status: i64,
    pub bed_id: String,
    #[serde(default)]
    pub left_side: BedSideStatus,
    #[serde(default)]
    pub right_side: BedSideStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FamilyStatus {
    #[serde(default)]
    pub beds: Vec<BedState>,
}

/// Static bed description from `GET /bed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedInfo {
    pub bed_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub generation: Option<String>,
    #[serde(default)]
    pub dual_sleep: bool,
    #[serde(default)]
    pub sleeper_left_id: Option<String>,
    #[serde(default)]
    pub sleeper_right_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BedList {
    #[serde(default)]
    pub beds: Vec<BedInfo>,
}

/// `GET /bed/{id}/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedStatus {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub left_side: BedSideStatus,
    #[serde(default)]
    pub right_side: BedSideStatus,
}

// ── Sides & pause mode ───────────────────────────────────────────────

/// Side selector as the write endpoints expect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum BedSide {
    #[serde(rename = "L")]
    #[strum(serialize = "L")]
    Left,
    #[serde(rename = "R")]
    #[strum(serialize = "R")]
    Right,
}

/// Privacy ("pause") mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PauseMode {
    #[default]
    Off,
    On,
}

impl From<bool> for PauseMode {
    fn from(enabled: bool) -> Self {
        if enabled { Self::On } else { Self::Off }
    }
}

/// `GET /bed/{id}/pauseMode`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseModeStatus {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub bed_id: Option<String>,
    pub pause_mode: PauseMode,
}

// ── Pump / responsive air ────────────────────────────────────────────

/// `GET /bed/{id}/pump/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpStatus {
    #[serde(default)]
    pub active_task: i64,
    #[serde(default)]
    pub chamber_type: i64,
    #[serde(default)]
    pub left_side_sleep_number: u8,
    #[serde(default)]
    pub right_side_sleep_number: u8,
}

/// `GET /bed/{id}/responsiveAir`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsiveAirStatus {
    #[serde(default)]
    pub adjustment_threshold: i64,
    #[serde(default)]
    pub in_bed_timeout: i64,
    #[serde(default)]
    pub out_of_bed_timeout: i64,
    #[serde(default)]
    pub poll_frequency: i64,
    #[serde(default)]
    pub pref_sync_state: String,
    #[serde(default)]
    pub left_side_enabled: bool,
    #[serde(default)]
    pub right_side_enabled: bool,
}

// ── Foundation ───────────────────────────────────────────────────────

/// Head or foot actuator of an adjustable foundation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Actuator {
    #[serde(rename = "H")]
    #[strum(serialize = "H")]
    Head,
    #[serde(rename = "F")]
    #[strum(serialize = "F")]
    Foot,
}

/// Foundation presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Preset {
    Flat,
    ZeroG,
    Snore,
    PartnerSnore,
    WatchTv,
    Read,
    Favorite,
}

impl From<Preset> for u8 {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Flat => 1,
            Preset::ZeroG => 2,
            Preset::Snore => 3,
            Preset::PartnerSnore => 4,
            Preset::WatchTv => 5,
            Preset::Read => 6,
            Preset::Favorite => 128,
        }
    }
}

impl TryFrom<u8> for Preset {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Flat),
            2 => Ok(Self::ZeroG),
            3 => Ok(Self::Snore),
            4 => Ok(Self::PartnerSnore),
            5 => Ok(Self::WatchTv),
            6 => Ok(Self::Read),
            128 => Ok(Self::Favorite),
            other => Err(format!("unknown preset code {other}")),
        }
    }
}

/// `GET /bed/{id}/foundation/status`.
///
/// Positions are reported as hexadecimal strings (`"32"` is 50).
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationStatus {
    #[serde(default)]
    pub fs_type: String,
    #[serde(default)]
    pub fs_configured: bool,
    #[serde(default)]
    pub fs_is_moving: bool,
    #[serde(default)]
    pub fs_needs_homing: bool,
    #[serde(default)]
    pub fs_outlets_on: bool,
    #[serde(default)]
    pub fs_left_head_position: String,
    #[serde(default)]
    pub fs_right_head_position: String,
    #[serde(default)]
    pub fs_left_foot_position: String,
    #[serde(default)]
    pub fs_right_foot_position: String,
    #[serde(default)]
    pub fs_current_position_preset_left: String,
    #[serde(default)]
    pub fs_current_position_preset_right: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FoundationStatus {
    /// Raw hex position string for one side's actuator.
    pub fn raw_position(&self, side: BedSide, actuator: Actuator) -> &str {
        match (side, actuator) {
            (BedSide::Left, Actuator::Head) => &self.fs_left_head_position,
            (BedSide::Right, Actuator::Head) => &self.fs_right_head_position,
            (BedSide::Left, Actuator::Foot) => &self.fs_left_foot_position,
            (BedSide::Right, Actuator::Foot) => &self.fs_right_foot_position,
        }
    }

    /// Decoded actuator position, `None` if the field is missing or not hex.
    pub fn position(&self, side: BedSide, actuator: Actuator) -> Option<u8> {
        u8::from_str_radix(self.raw_position(side, actuator).trim(), 16).ok()
    }
}

/// Foundation outlet numbering: 1-2 are plugs, 3-4 are under-bed lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Outlet {
    LeftPlug,
    RightPlug,
    LeftLight,
    RightLight,
}

impl Outlet {
    pub const ALL: [Self; 4] = [
        Self::LeftPlug,
        Self::RightPlug,
        Self::LeftLight,
        Self::RightLight,
    ];

    /// Wire id of this outlet.
    pub fn id(self) -> u8 {
        u8::from(self)
    }
}

impl From<Outlet> for u8 {
    fn from(outlet: Outlet) -> Self {
        match outlet {
            Outlet::LeftPlug => 1,
            Outlet::RightPlug => 2,
            Outlet::LeftLight => 3,
            Outlet::RightLight => 4,
        }
    }
}

impl TryFrom<u8> for Outlet {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::LeftPlug),
            2 => Ok(Self::RightPlug),
            3 => Ok(Self::LeftLight),
            4 => Ok(Self::RightLight),
            other => Err(format!("unknown outlet id {other}")),
        }
    }
}

/// Binary on/off setting shared by outlets, motion and massage endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OnOff {
    Off,
    On,
}

impl From<bool> for OnOff {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl From<OnOff> for u8 {
    fn from(value: OnOff) -> Self {
        match value {
            OnOff::Off => 0,
            OnOff::On => 1,
        }
    }
}

impl TryFrom<u8> for OnOff {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            other => Err(format!("expected 0 or 1, got {other}")),
        }
    }
}

/// `GET /bed/{id}/foundation/outlet`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletStatus {
    #[serde(default)]
    pub bed_id: Option<String>,
    pub outlet: Outlet,
    pub setting: OnOff,
    #[serde(default)]
    pub timer: Option<serde_json::Value>,
}

/// `GET /bed/{id}/foundation/underbedLight`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderbedLightStatus {
    #[serde(default)]
    pub enable_auto: bool,
    #[serde(default)]
    pub pref_sync_state: String,
}

// ── Foot warming ─────────────────────────────────────────────────────

/// Foot warmer heat level, carried on the wire as a vendor code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(into = "u8", try_from = "u8")]
pub enum FootwarmingLevel {
    Off,
    Low,
    Med,
    High,
}

impl From<FootwarmingLevel> for u8 {
    fn from(level: FootwarmingLevel) -> Self {
        match level {
            FootwarmingLevel::Off => 0,
            FootwarmingLevel::Low => 31,
            FootwarmingLevel::Med => 57,
            FootwarmingLevel::High => 72,
        }
    }
}

impl TryFrom<u8> for FootwarmingLevel {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Off),
            31 => Ok(Self::Low),
            57 => Ok(Self::Med),
            72 => Ok(Self::High),
            other => Err(format!("unknown foot warming code {other}")),
        }
    }
}

/// `GET /bed/{id}/foundation/footwarming`. Timers are in minutes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FootwarmingStatus {
    pub foot_warming_status_left: FootwarmingLevel,
    pub foot_warming_status_right: FootwarmingLevel,
    #[serde(default)]
    pub foot_warming_timer_left: u32,
    #[serde(default)]
    pub foot_warming_timer_right: u32,
}

impl FootwarmingStatus {
    pub fn level(&self, side: BedSide) -> FootwarmingLevel {
        match side {
            BedSide::Left => self.foot_warming_status_left,
            BedSide::Right => self.foot_warming_status_right,
        }
    }

    pub fn timer(&self, side: BedSide) -> u32 {
        match side {
            BedSide::Left => self.foot_warming_timer_left,
            BedSide::Right => self.foot_warming_timer_right,
        }
    }
}

/// Body of `PUT /bed/{id}/foundation/footwarming`. Unset fields are
/// omitted so one side can be changed without touching the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FootwarmingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foot_warming_status_left: Option<FootwarmingLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foot_warming_status_right: Option<FootwarmingLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foot_warming_timer_left: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foot_warming_timer_right: Option<u32>,
}

impl FootwarmingRequest {
    /// Request changing a single side.
    pub fn for_side(side: BedSide, level: FootwarmingLevel, timer_minutes: u32) -> Self {
        match side {
            BedSide::Left => Self {
                foot_warming_status_left: Some(level),
                foot_warming_timer_left: Some(timer_minutes),
                ..Self::default()
            },
            BedSide::Right => Self {
                foot_warming_status_right: Some(level),
                foot_warming_timer_right: Some(timer_minutes),
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn foundation_positions_are_hex() {
        let status: FoundationStatus = serde_json::from_value(json!({
            "fsLeftHeadPosition": "32",
            "fsRightHeadPosition": "3c",
            "fsLeftFootPosition": "46",
            "fsRightFootPosition": "50",
            "fsType": "Split Head",
        }))
        .unwrap();

        assert_eq!(status.position(BedSide::Left, Actuator::Head), Some(50));
        assert_eq!(status.position(BedSide::Right, Actuator::Head), Some(60));
        assert_eq!(status.position(BedSide::Left, Actuator::Foot), Some(70));
        assert_eq!(status.position(BedSide::Right, Actuator::Foot), Some(80));
        assert_eq!(status.extra.len(), 0);
    }

    #[test]
    fn missing_position_decodes_to_none() {
        let status = FoundationStatus::default();
        assert_eq!(status.position(BedSide::Left, Actuator::Head), None);
    }

    #[test]
    fn footwarming_codes_map_to_levels() {
        let status: FootwarmingStatus = serde_json::from_value(json!({
            "footWarmingStatusLeft": 31,
            "footWarmingStatusRight": 72,
            "footWarmingTimerLeft": 50,
            "footWarmingTimerRight": 0,
        }))
        .unwrap();
        assert_eq!(status.level(BedSide::Left), FootwarmingLevel::Low);
        assert_eq!(status.level(BedSide::Right), FootwarmingLevel::High);
        assert_eq!(status.timer(BedSide::Left), 50);

        let bad = serde_json::from_value::<FootwarmingStatus>(json!({
            "footWarmingStatusLeft": 12,
            "footWarmingStatusRight": 0,
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn footwarming_request_omits_other_side() {
        let body =
            serde_json::to_value(FootwarmingRequest::for_side(BedSide::Right, FootwarmingLevel::Med, 100))
                .unwrap();
        assert_eq!(
            body,
            json!({ "footWarmingStatusRight": 57, "footWarmingTimerRight": 100 })
        );
    }

    #[test]
    fn out_of_sync_flag() {
        let side = BedSideStatus {
            alert_detailed_message: BedSideStatus::OUT_OF_SYNC.into(),
            ..BedSideStatus::default()
        };
        assert!(side.is_out_of_sync());
        assert!(!BedSideStatus::default().is_out_of_sync());
    }
}
