// License: MIT

//! The shared electrical rule table: nominal voltages, AC/DC classification
//! and the voltage-compatibility check.
//!
//! Both the batch validator and the live [`validate_connection`] entry point
//! are written against this one table, so the two can never diverge in their
//! classification or tolerance rules.

use serde::Serialize;

use crate::device::{DeviceKind, KindPredicates, PlacedObject, WireKind};

/// Relative tolerance when comparing nominal voltages.
pub(crate) const VOLTAGE_TOLERANCE: f64 = 0.1;

/// The current class of a device, for wire-type compatibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurrentClass {
    /// Carries DC only: panels, batteries.
    Dc,
    /// Carries AC only: grid, loads, switchgear, transformers.
    Ac,
    /// Bridges both sides: inverters.
    Hybrid,
}

/// Returns the current class of a device, or `None` for kinds that carry no
/// wire-type rule (meters, PLCs, structures, site features).
pub fn current_class(kind: DeviceKind) -> Option<CurrentClass> {
    match kind {
        DeviceKind::Panel | DeviceKind::Battery => Some(CurrentClass::Dc),
        DeviceKind::Grid
        | DeviceKind::Load
        | DeviceKind::Acdb
        | DeviceKind::LtPanel
        | DeviceKind::HtPanel
        | DeviceKind::Vcb
        | DeviceKind::Acb
        | DeviceKind::Transformer
        | DeviceKind::Pss => Some(CurrentClass::Ac),
        DeviceKind::Inverter => Some(CurrentClass::Hybrid),
        DeviceKind::Meter
        | DeviceKind::MasterPlc
        | DeviceKind::Structure
        | DeviceKind::Tinshed
        | DeviceKind::Obstacle
        | DeviceKind::Tree
        | DeviceKind::Polygon => None,
    }
}

/// Returns the nominal operating voltage of a device, in volts.
///
/// Defaults apply when the object carries no explicit rating.  Kinds without
/// a defined operating voltage return `None` and are exempt from voltage
/// checks.  Transformers are handled by [`check_voltage_pair`] through their
/// winding ratings instead.
pub fn nominal_voltage(obj: &PlacedObject) -> Option<f64> {
    match obj.kind {
        DeviceKind::Grid => Some(obj.spec_f64("voltage").unwrap_or(11_000.0)),
        DeviceKind::Panel => Some(40.0),
        DeviceKind::Inverter => Some(obj.spec_f64("output_voltage").unwrap_or(230.0)),
        DeviceKind::Battery => Some(48.0),
        DeviceKind::Load => Some(230.0),
        DeviceKind::Vcb => Some(
            obj.spec_f64("voltage_rating")
                .map_or(11_000.0, |kv| kv * 1000.0),
        ),
        DeviceKind::Acb => Some(obj.spec_f64("voltage_rating").unwrap_or(415.0)),
        DeviceKind::Pss => Some(415.0),
        DeviceKind::Meter
        | DeviceKind::Acdb
        | DeviceKind::LtPanel
        | DeviceKind::HtPanel
        | DeviceKind::Transformer
        | DeviceKind::MasterPlc
        | DeviceKind::Structure
        | DeviceKind::Tinshed
        | DeviceKind::Obstacle
        | DeviceKind::Tree
        | DeviceKind::Polygon => None,
    }
}

/// The outcome of checking one edge for voltage compatibility.
#[derive(Clone, Debug, PartialEq)]
pub enum VoltageCheck {
    /// Voltages are compatible, or at least one side has no defined voltage.
    Ok,
    /// Incompatible voltages; carries the human-readable description and
    /// whether a transformer was involved.
    Mismatch { message: String, transformer: bool },
}

fn within_tolerance(reference: f64, other: f64) -> bool {
    (reference - other).abs() <= reference.abs() * VOLTAGE_TOLERANCE
}

/// Checks the pair of endpoints of one edge for voltage compatibility.
///
/// Edges touching a transformer compare the other side against the
/// transformer's primary and secondary winding voltages; a mismatch is
/// reported only when neither winding is within tolerance.  All other edges
/// compare the two nominal voltages directly, with the tolerance taken
/// relative to the first side.
pub fn check_voltage_pair(a: &PlacedObject, b: &PlacedObject) -> VoltageCheck {
    if a.is_transformer() && b.is_transformer() {
        return VoltageCheck::Ok;
    }
    if let Some((transformer, other)) = match (a.is_transformer(), b.is_transformer()) {
        (true, _) => Some((a, b)),
        (_, true) => Some((b, a)),
        _ => None,
    } {
        let Some(voltage) = nominal_voltage(other) else {
            return VoltageCheck::Ok;
        };
        let primary = transformer.spec_f64("primary_voltage").unwrap_or(11_000.0);
        let secondary = transformer.spec_f64("secondary_voltage").unwrap_or(415.0);
        if within_tolerance(primary, voltage) || within_tolerance(secondary, voltage) {
            return VoltageCheck::Ok;
        }
        return VoltageCheck::Mismatch {
            message: format!(
                "Voltage Mismatch: {} ({:.0} V) matches neither winding of {} ({:.0}/{:.0} V)",
                other.display_name(),
                voltage,
                transformer.display_name(),
                primary,
                secondary,
            ),
            transformer: true,
        };
    }

    let (Some(va), Some(vb)) = (nominal_voltage(a), nominal_voltage(b)) else {
        return VoltageCheck::Ok;
    };
    if within_tolerance(va, vb) {
        return VoltageCheck::Ok;
    }
    VoltageCheck::Mismatch {
        message: format!(
            "Voltage Mismatch between {} ({:.0} V) and {} ({:.0} V)",
            a.display_name(),
            va,
            b.display_name(),
            vb,
        ),
        transformer: false,
    }
}

/// Severity of a live connection issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionIssueKind {
    Error,
    Warning,
}

/// An issue found while validating a single wire gesture.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConnectionIssue {
    #[serde(rename = "type")]
    pub kind: ConnectionIssueKind,
    pub message: String,
}

/// Validates a single wire before the editor commits it.
///
/// Called on every wire-drawing gesture.  A `dc` wire touching an AC-only
/// endpoint, or an `ac` wire touching a DC-only endpoint, is an error.
/// Voltage incompatibilities use the same rule as the batch validator, but
/// transformer mismatches are downgraded to a warning here since the wire is
/// not committed yet.  Earth wires carry no electrical rule.
pub fn validate_connection(
    from: &PlacedObject,
    to: &PlacedObject,
    wire: WireKind,
) -> Option<ConnectionIssue> {
    match wire {
        WireKind::Earth => return None,
        WireKind::Dc | WireKind::Ac => {}
    }

    for obj in [from, to] {
        let Some(class) = current_class(obj.kind) else {
            continue;
        };
        let incompatible = match wire {
            WireKind::Dc => class == CurrentClass::Ac,
            WireKind::Ac => class == CurrentClass::Dc,
            WireKind::Earth => false,
        };
        if incompatible {
            let wire_name = match wire {
                WireKind::Dc => "DC",
                WireKind::Ac => "AC",
                WireKind::Earth => "Earth",
            };
            return Some(ConnectionIssue {
                kind: ConnectionIssueKind::Error,
                message: format!(
                    "{} wire cannot connect to {} ({} device)",
                    wire_name,
                    obj.display_name(),
                    match class {
                        CurrentClass::Dc => "DC",
                        CurrentClass::Ac => "AC",
                        CurrentClass::Hybrid => "hybrid",
                    },
                ),
            });
        }
    }

    match check_voltage_pair(from, to) {
        VoltageCheck::Ok => None,
        VoltageCheck::Mismatch { message, transformer } => Some(ConnectionIssue {
            kind: if transformer {
                ConnectionIssueKind::Warning
            } else {
                ConnectionIssueKind::Error
            },
            message,
        }),
    }
}
