// License: MIT

//! Shared fixture constructors for the test modules.

use serde_json::Value;

use crate::device::{DeviceKind, PlacedObject, WireConnection, WireKind};

/// A 1x1 m object of the given kind at the origin.
pub(crate) fn obj(id: &str, kind: DeviceKind) -> PlacedObject {
    PlacedObject {
        id: id.into(),
        kind,
        w: 1.0,
        h: 1.0,
        ..Default::default()
    }
}

/// A 550 W panel with an explicit footprint.
pub(crate) fn panel_at(id: &str, x: f64, y: f64, w: f64, h: f64) -> PlacedObject {
    PlacedObject {
        x,
        y,
        w,
        h,
        watts: Some(550.0),
        ..obj(id, DeviceKind::Panel)
    }
}

pub(crate) fn wire(id: &str, from: &str, to: &str, kind: WireKind) -> WireConnection {
    WireConnection {
        id: id.into(),
        from: from.into(),
        to: to.into(),
        kind,
        path: None,
        specifications: Default::default(),
    }
}

/// Returns the object with one specification entry added.
pub(crate) fn with_spec(mut object: PlacedObject, key: &str, value: Value) -> PlacedObject {
    object.specifications.insert(key.into(), value);
    object
}

/// Returns the object with its subtype set.
pub(crate) fn with_subtype(mut object: PlacedObject, subtype: &str) -> PlacedObject {
    object.subtype = Some(subtype.into());
    object
}
