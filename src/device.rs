// License: MIT

//! This module defines the editor-facing data model: [`PlacedObject`],
//! [`WireConnection`] and the [`DeviceKind`] enum.

use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of a placed object.
///
/// The scene editor tags every object with one of these; all branching in the
/// engine happens through this enum rather than through free-form strings, so
/// a new kind has to be handled everywhere the compiler points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Panel,
    Inverter,
    Battery,
    Load,
    Grid,
    Meter,
    Vcb,
    Acb,
    Acdb,
    LtPanel,
    HtPanel,
    Transformer,
    Pss,
    MasterPlc,
    Structure,
    Tinshed,
    Obstacle,
    Tree,
    Polygon,
}

impl Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Panel => write!(f, "Panel"),
            DeviceKind::Inverter => write!(f, "Inverter"),
            DeviceKind::Battery => write!(f, "Battery"),
            DeviceKind::Load => write!(f, "Load"),
            DeviceKind::Grid => write!(f, "Grid"),
            DeviceKind::Meter => write!(f, "Meter"),
            DeviceKind::Vcb => write!(f, "VCB"),
            DeviceKind::Acb => write!(f, "ACB"),
            DeviceKind::Acdb => write!(f, "ACDB"),
            DeviceKind::LtPanel => write!(f, "LT Panel"),
            DeviceKind::HtPanel => write!(f, "HT Panel"),
            DeviceKind::Transformer => write!(f, "Transformer"),
            DeviceKind::Pss => write!(f, "PSS"),
            DeviceKind::MasterPlc => write!(f, "Master PLC"),
            DeviceKind::Structure => write!(f, "Structure"),
            DeviceKind::Tinshed => write!(f, "Tinshed"),
            DeviceKind::Obstacle => write!(f, "Obstacle"),
            DeviceKind::Tree => write!(f, "Tree"),
            DeviceKind::Polygon => write!(f, "Polygon"),
        }
    }
}

/// A vertex of a polygon-shaped object, in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned bounding box of a placed object, in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Bounds {
    /// Returns true if the two boxes overlap, or come closer than `margin`
    /// on either axis.
    pub fn overlaps(&self, other: &Bounds, margin: f64) -> bool {
        self.x < other.x + other.w + margin
            && self.x + self.w + margin > other.x
            && self.y < other.y + other.h + margin
            && self.y + self.h + margin > other.y
    }

    /// Returns true if the point lies inside the box.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

/// A PLC rule attached to a breaker or a master PLC.
///
/// Two shapes exist in the wild: threshold rules
/// (`{param: "Voltage", op, val, action}`) on breakers and time-window rules
/// (`{type: "Time", val, val2, action, targetId}`) on master PLCs.  Both are
/// carried by one struct with optional fields.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LogicRule {
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default, rename = "type")]
    pub rule_type: Option<String>,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub val: Option<f64>,
    #[serde(default)]
    pub val2: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, rename = "targetId")]
    pub target_id: Option<String>,
}

/// One electrical or physical device placed on the canvas.
///
/// Produced by the scene editor; the engine never mutates these.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacedObject {
    pub id: String,
    /// The editor tags objects with a `type` field; an unknown or missing
    /// tag is a deserialization error, never a silent default.
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    /// Free-form refinement of the kind, e.g. `earth`, `la`, `net_meter`.
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub w: f64,
    #[serde(default)]
    pub h: f64,
    /// Absolute elevation of the object's top, in meters.
    #[serde(default)]
    pub h_z: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub vertices: Option<Vec<Vertex>>,

    /// Panel nameplate rating in watts.
    #[serde(default)]
    pub watts: Option<f64>,
    /// Inverter capacity in kW.
    #[serde(default, rename = "capKw")]
    pub cap_kw: Option<f64>,
    /// Battery capacity in kWh.
    #[serde(default, rename = "capKwh")]
    pub cap_kwh: Option<f64>,
    /// Monthly consumption of a load box, in kWh.
    #[serde(default)]
    pub units: Option<f64>,

    /// Open attribute map: efficiencies, voltage ratings, degradation rates,
    /// PLC rule lists, PSS logic mode, mounting type, unit costs.
    #[serde(default)]
    pub specifications: HashMap<String, Value>,

    /// Display toggles from the editor.  Only meaningful to the engine on
    /// breaker-class devices and the grid; never authoritative for power
    /// availability elsewhere.
    #[serde(default, rename = "isOn")]
    pub is_on: Option<bool>,
    #[serde(default, rename = "isEnergized")]
    pub is_energized: Option<bool>,
}

impl Default for PlacedObject {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: DeviceKind::Obstacle,
            subtype: None,
            label: None,
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            h_z: 0.0,
            rotation: 0.0,
            vertices: None,
            watts: None,
            cap_kw: None,
            cap_kwh: None,
            units: None,
            specifications: HashMap::new(),
            is_on: None,
            is_energized: None,
        }
    }
}

impl PlacedObject {
    /// Returns the bounding box of the object.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }

    /// Looks up a numeric specification value.  Editors emit both JSON
    /// numbers and numeric strings, so both are accepted.
    pub fn spec_f64(&self, key: &str) -> Option<f64> {
        match self.specifications.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            other => {
                tracing::debug!("Specification {key:?} has non-numeric value: {other}");
                None
            }
        }
    }

    /// Looks up a string specification value.
    pub fn spec_str(&self, key: &str) -> Option<&str> {
        match self.specifications.get(key)? {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Parses the `custom_logic` rule list, skipping malformed entries.
    pub fn logic_rules(&self) -> Vec<LogicRule> {
        let Some(Value::Array(raw)) = self.specifications.get("custom_logic") else {
            return vec![];
        };
        raw.iter()
            .filter_map(|entry| match serde_json::from_value(entry.clone()) {
                Ok(rule) => Some(rule),
                Err(err) => {
                    tracing::warn!("Skipping malformed logic rule on {:?}: {err}", self.id);
                    None
                }
            })
            .collect()
    }

    /// The display name used in findings and BOQ line items.
    pub fn display_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.kind.to_string())
    }
}

/// Predicates for checking the kind of a [`PlacedObject`].
pub(crate) trait KindPredicates {
    fn obj_kind(&self) -> DeviceKind;
    fn obj_subtype(&self) -> Option<&str>;

    fn is_panel(&self) -> bool {
        self.obj_kind() == DeviceKind::Panel
    }

    fn is_inverter(&self) -> bool {
        self.obj_kind() == DeviceKind::Inverter
    }

    fn is_battery(&self) -> bool {
        self.obj_kind() == DeviceKind::Battery
    }

    fn is_load(&self) -> bool {
        self.obj_kind() == DeviceKind::Load
    }

    fn is_grid(&self) -> bool {
        self.obj_kind() == DeviceKind::Grid
    }

    fn is_transformer(&self) -> bool {
        self.obj_kind() == DeviceKind::Transformer
    }

    fn is_pss(&self) -> bool {
        self.obj_kind() == DeviceKind::Pss
    }

    /// Meters are matched by kind or by a `meter`-bearing subtype, so that
    /// net-meter and check-meter variants qualify too.
    fn is_meter_like(&self) -> bool {
        self.obj_kind() == DeviceKind::Meter
            || self
                .obj_subtype()
                .is_some_and(|s| s.to_ascii_lowercase().contains("meter"))
    }

    /// Breaker-class devices whose `isOn` flag removes their edges from the
    /// adjacency graph.
    fn is_switchable_breaker(&self) -> bool {
        matches!(
            self.obj_kind(),
            DeviceKind::Acdb | DeviceKind::LtPanel | DeviceKind::HtPanel
        )
    }

    /// Breakers that can carry PLC threshold rules.
    fn is_plc_breaker(&self) -> bool {
        matches!(self.obj_kind(), DeviceKind::Vcb | DeviceKind::Acb)
    }
}

impl KindPredicates for PlacedObject {
    fn obj_kind(&self) -> DeviceKind {
        self.kind
    }

    fn obj_subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }
}

/// An undirected wire between two placed objects.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireConnection {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: WireKind,
    /// Routing waypoints, kept for the editor's benefit; ignored here.
    #[serde(default)]
    pub path: Option<Vec<Vertex>>,
    #[serde(default)]
    pub specifications: HashMap<String, Value>,
}

/// The electrical class of a wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireKind {
    Dc,
    Ac,
    Earth,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_deserialization() {
        let obj: PlacedObject = serde_json::from_value(json!({
            "id": "p1",
            "type": "panel",
            "x": 1.0, "y": 2.0, "w": 2.0, "h": 1.0,
            "h_z": 0.5,
            "watts": 550,
            "isOn": true,
            "specifications": {"efficiency": "97.5"}
        }))
        .unwrap();

        assert_eq!(obj.kind, DeviceKind::Panel);
        assert_eq!(obj.watts, Some(550.0));
        assert_eq!(obj.is_on, Some(true));
        assert_eq!(obj.spec_f64("efficiency"), Some(97.5));
        assert_eq!(obj.spec_f64("missing"), None);
    }

    #[test]
    fn test_object_type_tag_is_required() {
        // A missing or unknown type tag must fail loudly, not fall back to
        // some default kind.
        let missing = serde_json::from_value::<PlacedObject>(json!({
            "id": "p1",
            "watts": 550
        }));
        assert!(missing.is_err());

        let unknown = serde_json::from_value::<PlacedObject>(json!({
            "id": "p1",
            "type": "flux_capacitor"
        }));
        assert!(unknown.is_err());

        // Geometry and ratings stay optional.
        let minimal: PlacedObject =
            serde_json::from_value(json!({"id": "g1", "type": "grid"})).unwrap();
        assert_eq!(minimal.kind, DeviceKind::Grid);
        assert_eq!(minimal.w, 0.0);
    }

    #[test]
    fn test_kind_round_trip() {
        for (kind, tag) in [
            (DeviceKind::LtPanel, "\"lt_panel\""),
            (DeviceKind::MasterPlc, "\"master_plc\""),
            (DeviceKind::Pss, "\"pss\""),
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), tag);
        }
    }

    #[test]
    fn test_bounds_overlap_with_margin() {
        let a = Bounds { x: 0.0, y: 0.0, w: 1.0, h: 1.0 };
        let near = Bounds { x: 1.1, y: 0.0, w: 1.0, h: 1.0 };
        let far = Bounds { x: 1.3, y: 0.0, w: 1.0, h: 1.0 };

        // 0.1 m gap is bridged by the 0.2 m margin, 0.3 m is not.
        assert!(!a.overlaps(&near, 0.0));
        assert!(a.overlaps(&near, 0.2));
        assert!(!a.overlaps(&far, 0.2));
    }

    #[test]
    fn test_logic_rules_skip_malformed() {
        let mut obj = PlacedObject {
            id: "vcb1".into(),
            kind: DeviceKind::Vcb,
            ..Default::default()
        };
        obj.specifications.insert(
            "custom_logic".into(),
            json!([
                {"param": "Voltage", "op": ">", "val": 400, "action": "Trip"},
                {"val": "not-a-number"}
            ]),
        );

        let rules = obj.logic_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].param.as_deref(), Some("Voltage"));
        assert_eq!(rules[0].val, Some(400.0));
    }
}
