//! Per-bed feature descriptor and ignore rules.
//!
//! The descriptor is computed once at discovery (probing the API for
//! optional foundation hardware), narrowed by the user's ignore list, and
//! persisted in the host's accessory context. Ignore entries have the form
//! `bedId`, `bedId.side`, `bedId.privacy`, `bedId.foundation` or
//! `bedId.side.feature`, with `side` one of `leftSide`, `rightSide`,
//! `anySide`.

use std::str::FromStr;

use bedcontrol_api::Actuator;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::capability::{Capability, OutletKind, Scope, Side};

/// Feature names accepted in `bedId.side.feature` ignore entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum Feature {
    OccupancySensor,
    NumberControl,
    ResponsiveAir,
    HeadControl,
    FootControl,
    Outlet,
    Light,
    Footwarming,
}

/// Capabilities present on one side (or the any-side aggregate).
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideFeatures {
    pub occupancy_sensor: bool,
    pub number_control: bool,
    pub responsive_air: bool,
    pub head_control: bool,
    pub foot_control: bool,
    pub outlet: bool,
    pub light: bool,
    pub footwarming: bool,
}

impl SideFeatures {
    /// Air-chamber features every side starts with before probing.
    fn chamber() -> Self {
        Self {
            occupancy_sensor: true,
            number_control: true,
            responsive_air: true,
            ..Self::default()
        }
    }

    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::OccupancySensor => self.occupancy_sensor,
            Feature::NumberControl => self.number_control,
            Feature::ResponsiveAir => self.responsive_air,
            Feature::HeadControl => self.head_control,
            Feature::FootControl => self.foot_control,
            Feature::Outlet => self.outlet,
            Feature::Light => self.light,
            Feature::Footwarming => self.footwarming,
        }
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        let slot = match feature {
            Feature::OccupancySensor => &mut self.occupancy_sensor,
            Feature::NumberControl => &mut self.number_control,
            Feature::ResponsiveAir => &mut self.responsive_air,
            Feature::HeadControl => &mut self.head_control,
            Feature::FootControl => &mut self.foot_control,
            Feature::Outlet => &mut self.outlet,
            Feature::Light => &mut self.light,
            Feature::Footwarming => &mut self.footwarming,
        };
        *slot = enabled;
    }

    pub fn outlet_kind(&self, kind: OutletKind) -> bool {
        match kind {
            OutletKind::Outlet => self.outlet,
            OutletKind::Light => self.light,
        }
    }

    pub fn actuator(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Head => self.head_control,
            Actuator::Foot => self.foot_control,
        }
    }
}

/// Everything discovery learned about one bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedFeatures {
    pub privacy: bool,
    pub foundation: bool,
    pub left_side: SideFeatures,
    pub right_side: SideFeatures,
    pub any_side: SideFeatures,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}

impl BedFeatures {
    /// Starting point before probing: privacy, chamber features per side,
    /// and any-side occupancy. No foundation.
    pub fn baseline(model: impl Into<String>, serial_number: impl Into<String>) -> Self {
        Self {
            privacy: true,
            foundation: false,
            left_side: SideFeatures::chamber(),
            right_side: SideFeatures::chamber(),
            any_side: SideFeatures {
                occupancy_sensor: true,
                ..SideFeatures::default()
            },
            manufacturer: "Sleep Number".into(),
            model: model.into(),
            serial_number: serial_number.into(),
        }
    }

    pub fn scope(&self, scope: Scope) -> &SideFeatures {
        match scope {
            Scope::Left => &self.left_side,
            Scope::Right => &self.right_side,
            Scope::Any => &self.any_side,
        }
    }

    pub fn scope_mut(&mut self, scope: Scope) -> &mut SideFeatures {
        match scope {
            Scope::Left => &mut self.left_side,
            Scope::Right => &mut self.right_side,
            Scope::Any => &mut self.any_side,
        }
    }

    pub fn side(&self, side: Side) -> &SideFeatures {
        self.scope(side.into())
    }

    /// Recompute the any-side outlet and light from the two sides.
    pub fn aggregate_outlets(&mut self) {
        self.any_side.outlet = self.left_side.outlet || self.right_side.outlet;
        self.any_side.light = self.left_side.light || self.right_side.light;
    }

    /// Sides that have the given outlet kind.
    pub fn outlet_sides(&self, kind: OutletKind) -> Vec<Side> {
        Side::BOTH
            .into_iter()
            .filter(|side| self.side(*side).outlet_kind(kind))
            .collect()
    }

    /// Apply the per-bed ignore entries. Unknown entries are logged and
    /// otherwise skipped.
    pub fn apply_ignore(&mut self, bed_name: &str, entries: &[String]) {
        for entry in entries {
            match entry.parse::<IgnoreRule>() {
                Ok(rule) => {
                    info!("Ignoring bed {bed_name} {}", rule.describe());
                    self.apply(rule);
                }
                Err(UnknownIgnoreEntry) => {
                    error!("Unknown ignore list value: {entry}");
                }
            }
        }
    }

    fn apply(&mut self, rule: IgnoreRule) {
        match rule {
            IgnoreRule::Scope(scope) => *self.scope_mut(scope) = SideFeatures::default(),
            IgnoreRule::Privacy => self.privacy = false,
            IgnoreRule::Foundation => self.foundation = false,
            IgnoreRule::Feature(scope, feature) => self.scope_mut(scope).set(feature, false),
        }
    }

    /// The capabilities this bed exposes. Foundation hardware is only
    /// listed while the foundation itself is enabled.
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut caps = Vec::new();
        if self.privacy {
            caps.push(Capability::PrivacySwitch);
        }

        for side in Side::BOTH {
            let f = self.side(side);
            if f.occupancy_sensor {
                caps.push(Capability::OccupancySensor { scope: side.into() });
            }
            if f.number_control {
                caps.push(Capability::NumberControl { side });
            }
            if f.responsive_air {
                caps.push(Capability::ResponsiveAir { side });
            }
            if !self.foundation {
                continue;
            }
            for actuator in [Actuator::Head, Actuator::Foot] {
                if f.actuator(actuator) {
                    caps.push(Capability::Actuator { side, actuator });
                }
            }
            for kind in [OutletKind::Outlet, OutletKind::Light] {
                if f.outlet_kind(kind) {
                    caps.push(Capability::Outlet {
                        scope: side.into(),
                        kind,
                    });
                }
            }
            if f.footwarming {
                caps.push(Capability::FootWarmer { side });
            }
        }

        if self.any_side.occupancy_sensor {
            caps.push(Capability::OccupancySensor { scope: Scope::Any });
        }
        if self.foundation {
            for kind in [OutletKind::Outlet, OutletKind::Light] {
                if self.any_side.outlet_kind(kind) {
                    caps.push(Capability::Outlet {
                        scope: Scope::Any,
                        kind,
                    });
                }
            }
        }
        caps
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

// ── Ignore rules ────────────────────────────────────────────────────

/// One parsed ignore entry. The leading bed id segment is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreRule {
    Scope(Scope),
    Privacy,
    Foundation,
    Feature(Scope, Feature),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownIgnoreEntry;

impl IgnoreRule {
    fn describe(self) -> String {
        match self {
            Self::Scope(scope) => scope.to_string(),
            Self::Privacy => "privacy".into(),
            Self::Foundation => "foundation".into(),
            Self::Feature(scope, feature) => format!("{scope} {feature}"),
        }
    }
}

impl FromStr for IgnoreRule {
    type Err = UnknownIgnoreEntry;

    /// Parses a full `bedId.…` entry; the bed id segment is not checked.
    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = entry.split('.').collect();
        match parts.as_slice() {
            [_, "privacy"] => Ok(Self::Privacy),
            [_, "foundation"] => Ok(Self::Foundation),
            [_, scope] => Scope::from_key(scope)
                .map(Self::Scope)
                .ok_or(UnknownIgnoreEntry),
            [_, scope, feature] => {
                let scope = Scope::from_key(scope).ok_or(UnknownIgnoreEntry)?;
                let feature = feature.parse().map_err(|_| UnknownIgnoreEntry)?;
                Ok(Self::Feature(scope, feature))
            }
            _ => Err(UnknownIgnoreEntry),
        }
    }
}

/// Ignore entries that address `bed_id` (first dot-separated segment).
pub fn bed_ignore_list(ignore: &[String], bed_id: &str) -> Vec<String> {
    ignore
        .iter()
        .filter(|entry| entry.split('.').next() == Some(bed_id))
        .cloned()
        .collect()
}

/// Whether the whole bed is excluded.
pub fn is_bed_ignored(ignore: &[String], bed_id: &str) -> bool {
    ignore.iter().any(|entry| entry == bed_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn with_foundation() -> BedFeatures {
        let mut f = BedFeatures::baseline("P6", "bed-1");
        f.foundation = true;
        for side in [Scope::Left, Scope::Right] {
            let s = f.scope_mut(side);
            s.head_control = true;
            s.foot_control = true;
            s.footwarming = true;
        }
        f.left_side.outlet = true;
        f.right_side.light = true;
        f.aggregate_outlets();
        f
    }

    #[test]
    fn parses_ignore_rules() {
        assert_eq!("b.leftSide".parse::<IgnoreRule>(), Ok(IgnoreRule::Scope(Scope::Left)));
        assert_eq!("b.privacy".parse::<IgnoreRule>(), Ok(IgnoreRule::Privacy));
        assert_eq!("b.foundation".parse::<IgnoreRule>(), Ok(IgnoreRule::Foundation));
        assert_eq!(
            "b.anySide.occupancySensor".parse::<IgnoreRule>(),
            Ok(IgnoreRule::Feature(Scope::Any, Feature::OccupancySensor))
        );
        assert_eq!("b.middle".parse::<IgnoreRule>(), Err(UnknownIgnoreEntry));
        assert_eq!("b.leftSide.jacuzzi".parse::<IgnoreRule>(), Err(UnknownIgnoreEntry));
        assert_eq!("b.leftSide.outlet.x".parse::<IgnoreRule>(), Err(UnknownIgnoreEntry));
    }

    #[test]
    fn side_rule_clears_every_feature() {
        let mut f = with_foundation();
        f.apply_ignore("Master", &["b.leftSide".into()]);
        assert_eq!(f.left_side, SideFeatures::default());
        assert!(f.right_side.number_control);
    }

    #[test]
    fn feature_rule_clears_one_feature() {
        let mut f = BedFeatures::baseline("P6", "bed-1");
        f.apply_ignore(
            "Master",
            &["b.rightSide.responsiveAir".into(), "b.privacy".into(), "b.bogus".into()],
        );
        assert!(!f.right_side.responsive_air);
        assert!(f.right_side.number_control);
        assert!(!f.privacy);
    }

    #[test]
    fn bed_list_filters_by_first_segment() {
        let ignore: Vec<String> = vec![
            "111".into(),
            "222.leftSide".into(),
            "222.privacy".into(),
            "2222.rightSide".into(),
        ];
        assert_eq!(
            bed_ignore_list(&ignore, "222"),
            vec!["222.leftSide".to_string(), "222.privacy".to_string()]
        );
        assert!(is_bed_ignored(&ignore, "111"));
        assert!(!is_bed_ignored(&ignore, "222"));
    }

    #[test]
    fn baseline_capabilities() {
        let caps = BedFeatures::baseline("P6", "bed-1").capabilities();
        assert_eq!(
            caps,
            vec![
                Capability::PrivacySwitch,
                Capability::OccupancySensor { scope: Scope::Left },
                Capability::NumberControl { side: Side::Left },
                Capability::ResponsiveAir { side: Side::Left },
                Capability::OccupancySensor { scope: Scope::Right },
                Capability::NumberControl { side: Side::Right },
                Capability::ResponsiveAir { side: Side::Right },
                Capability::OccupancySensor { scope: Scope::Any },
            ]
        );
    }

    #[test]
    fn foundation_gates_hardware_capabilities() {
        let mut f = with_foundation();
        assert!(f.has(Capability::Actuator {
            side: Side::Right,
            actuator: Actuator::Foot
        }));
        assert!(f.has(Capability::Outlet {
            scope: Scope::Any,
            kind: OutletKind::Light
        }));
        assert_eq!(f.outlet_sides(OutletKind::Outlet), vec![Side::Left]);

        f.apply_ignore("Master", &["b.foundation".into()]);
        assert!(!f.has(Capability::Actuator {
            side: Side::Right,
            actuator: Actuator::Foot
        }));
        assert!(!f.has(Capability::FootWarmer { side: Side::Left }));
    }

    #[test]
    fn persists_in_camel_case() {
        let json = serde_json::to_value(BedFeatures::baseline("P6", "bed-1")).unwrap();
        assert_eq!(json["leftSide"]["occupancySensor"], true);
        assert_eq!(json["anySide"]["numberControl"], false);
        assert_eq!(json["serialNumber"], "bed-1");
    }
}
