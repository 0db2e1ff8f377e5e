//! Tagged capability model.
//!
//! A bed exposes a fixed, finite set of controllable things. Each is a
//! [`Capability`] variant carrying only the side/actuator selection its
//! get and set logic needs; the host addresses characteristics through
//! these tags rather than by service name.

use std::fmt;

use bedcontrol_api::{Actuator, BedSide, Outlet};
use serde::{Deserialize, Serialize};

/// One of the two independently controllable halves of the mattress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Side {
    #[serde(rename = "leftSide")]
    #[strum(serialize = "leftSide")]
    Left,
    #[serde(rename = "rightSide")]
    #[strum(serialize = "rightSide")]
    Right,
}

impl Side {
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];

    pub fn wire(self) -> BedSide {
        match self {
            Self::Left => BedSide::Left,
            Self::Right => BedSide::Right,
        }
    }
}

impl From<Side> for BedSide {
    fn from(side: Side) -> Self {
        side.wire()
    }
}

/// A side, or the "either side" aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Scope {
    #[serde(rename = "leftSide")]
    #[strum(serialize = "leftSide")]
    Left,
    #[serde(rename = "rightSide")]
    #[strum(serialize = "rightSide")]
    Right,
    #[serde(rename = "anySide")]
    #[strum(serialize = "anySide")]
    Any,
}

impl Scope {
    pub const ALL: [Self; 3] = [Self::Left, Self::Right, Self::Any];

    /// Parse the key used in ignore rules (`leftSide`, `rightSide`, `anySide`).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "leftSide" => Some(Self::Left),
            "rightSide" => Some(Self::Right),
            "anySide" => Some(Self::Any),
            _ => None,
        }
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Self::Left => Some(Side::Left),
            Self::Right => Some(Side::Right),
            Self::Any => None,
        }
    }
}

impl From<Side> for Scope {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => Self::Left,
            Side::Right => Self::Right,
        }
    }
}

/// Foundation outlets come in two kinds per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutletKind {
    Outlet,
    Light,
}

impl OutletKind {
    /// Vendor outlet id for this kind on `side`.
    pub fn outlet(self, side: Side) -> Outlet {
        match (self, side) {
            (Self::Outlet, Side::Left) => Outlet::LeftPlug,
            (Self::Outlet, Side::Right) => Outlet::RightPlug,
            (Self::Light, Side::Left) => Outlet::LeftLight,
            (Self::Light, Side::Right) => Outlet::RightLight,
        }
    }
}

/// Something a bed exposes to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Capability {
    PrivacySwitch,
    OccupancySensor { scope: Scope },
    NumberControl { side: Side },
    ResponsiveAir { side: Side },
    Actuator { side: Side, actuator: Actuator },
    Outlet { scope: Scope, kind: OutletKind },
    FootWarmer { side: Side },
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrivacySwitch => f.write_str("Privacy Switch"),
            Self::OccupancySensor { scope } => write!(f, "{scope} Occupancy Sensor"),
            Self::NumberControl { side } => write!(f, "{side} Number Control"),
            Self::ResponsiveAir { side } => write!(f, "{side} Responsive Air"),
            Self::Actuator {
                side,
                actuator: Actuator::Head,
            } => write!(f, "{side} Head Control"),
            Self::Actuator {
                side,
                actuator: Actuator::Foot,
            } => write!(f, "{side} Foot Control"),
            Self::Outlet {
                scope,
                kind: OutletKind::Outlet,
            } => write!(f, "{scope} Outlet"),
            Self::Outlet {
                scope,
                kind: OutletKind::Light,
            } => write!(f, "{scope} Light"),
            Self::FootWarmer { side } => write!(f, "{side} Foot Warmer"),
        }
    }
}

/// Characteristic slots the controllers read and push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Characteristic {
    On,
    OccupancyDetected,
    /// Cleared on occupancy sensors while privacy hides presence.
    StatusActive,
    /// Sleep number or actuator position, 0-100.
    Brightness,
    /// Foot warmer level on the 0-3 scale.
    HeatingLevel,
    /// Foot warmer timer in five-minute steps.
    RemainingDuration,
}

/// Characteristic value exchanged with the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
}

impl Value {
    pub fn as_bool(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Number(n) => n.abs() > f64::EPSILON,
        }
    }

    pub fn as_number(self) -> f64 {
        match self {
            Self::Bool(b) => f64::from(u8::from(b)),
            Self::Number(n) => n,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn outlet_ids_per_side() {
        assert_eq!(OutletKind::Outlet.outlet(Side::Left), Outlet::LeftPlug);
        assert_eq!(OutletKind::Outlet.outlet(Side::Right), Outlet::RightPlug);
        assert_eq!(OutletKind::Light.outlet(Side::Left), Outlet::LeftLight);
        assert_eq!(OutletKind::Light.outlet(Side::Right), Outlet::RightLight);
    }

    #[test]
    fn capability_names() {
        assert_eq!(
            Capability::OccupancySensor { scope: Scope::Any }.to_string(),
            "anySide Occupancy Sensor"
        );
        assert_eq!(
            Capability::Actuator {
                side: Side::Left,
                actuator: Actuator::Foot
            }
            .to_string(),
            "leftSide Foot Control"
        );
    }

    #[test]
    fn scope_keys() {
        assert_eq!(Scope::from_key("anySide"), Some(Scope::Any));
        assert_eq!(Scope::from_key("middle"), None);
        assert_eq!(Scope::Right.side(), Some(Side::Right));
        assert_eq!(Scope::Any.side(), None);
    }
}
