// License: MIT

//! Reachability checks: panels to inverters, inverters to metering, loads to
//! a power source.

use crate::device::KindPredicates;
use crate::report::Severity;

use super::LayoutValidator;

impl LayoutValidator<'_> {
    /// Every panel must reach an inverter, directly or through touching
    /// panel strings.  Failures aggregate into one error.
    pub(super) fn check_panel_reachability(&mut self) {
        let panels: Vec<_> = self.graph.objects().filter(|o| o.is_panel()).collect();
        if panels.is_empty() {
            return;
        }

        let disconnected = panels
            .iter()
            .filter(|p| !matches!(self.graph.is_reachable(&p.id, |n| n.is_inverter()), Ok(true)))
            .count();

        if disconnected > 0 {
            self.issue(
                Severity::Error,
                format!("Some panels not connected to Inverter ({disconnected} affected)"),
            );
        } else {
            self.passed(format!("All {} panels connected to an inverter", panels.len()));
        }
    }

    /// Every inverter must reach the grid or any metering device.
    pub(super) fn check_inverter_reachability(&mut self) {
        let inverters: Vec<_> = self.graph.objects().filter(|o| o.is_inverter()).collect();
        if inverters.is_empty() {
            return;
        }

        let mut all_connected = true;
        for inverter in &inverters {
            let connected = matches!(
                self.graph
                    .is_reachable(&inverter.id, |n| n.is_grid() || n.is_meter_like()),
                Ok(true)
            );
            if !connected {
                all_connected = false;
                self.issue(
                    Severity::Error,
                    format!("Inverter '{}' not connected to Meter/Grid", inverter.id),
                );
            }
        }
        if all_connected {
            self.passed(format!(
                "All {} inverters connected to metering/grid",
                inverters.len()
            ));
        }
    }

    /// Loads may legitimately be unpowered in a partial design, so a
    /// disconnected load is only a warning.
    pub(super) fn check_load_reachability(&mut self) {
        let loads: Vec<_> = self.graph.objects().filter(|o| o.is_load()).collect();
        for load in loads {
            let powered = matches!(
                self.graph
                    .is_reachable(&load.id, |n| n.is_grid() || n.is_inverter()),
                Ok(true)
            );
            if !powered {
                self.issue(
                    Severity::Warning,
                    format!("Load '{}' is not connected to a power source", load.id),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::validate;
    use crate::device::{DeviceKind, WireKind};
    use crate::report::Severity;
    use crate::test_utils::{obj, panel_at, wire};

    #[test]
    fn test_disconnected_panel_is_an_error() {
        let objects = vec![
            panel_at("p1", 0.0, 0.0, 2.0, 1.0),
            panel_at("p2", 50.0, 0.0, 2.0, 1.0),
            obj("i1", DeviceKind::Inverter),
            obj("m1", DeviceKind::Meter),
        ];
        let wires = vec![
            wire("w1", "p1", "i1", WireKind::Dc),
            wire("w2", "i1", "m1", WireKind::Ac),
        ];

        let report = validate(&objects, &wires);
        assert_eq!(report.error_count(), 1);
        assert!(report.issues.iter().any(|f| f
            .message
            .contains("Some panels not connected to Inverter")));

        // Removing the stray panel clears the error.
        let trimmed: Vec<_> = objects
            .iter()
            .filter(|o| o.id != "p2")
            .cloned()
            .collect();
        assert_eq!(validate(&trimmed, &wires).error_count(), 0);
    }

    #[test]
    fn test_panel_connected_through_touching_string() {
        // p2 has no wire, but touches p1 which is wired to the inverter.
        let objects = vec![
            panel_at("p1", 0.0, 0.0, 2.0, 1.0),
            panel_at("p2", 2.1, 0.0, 2.0, 1.0),
            obj("i1", DeviceKind::Inverter),
            obj("m1", DeviceKind::Meter),
        ];
        let wires = vec![
            wire("w1", "p1", "i1", WireKind::Dc),
            wire("w2", "i1", "m1", WireKind::Ac),
        ];

        let report = validate(&objects, &wires);
        assert_eq!(report.error_count(), 0);
        assert!(report
            .validations
            .iter()
            .any(|v| v.contains("2 panels connected")));
    }

    #[test]
    fn test_inverter_must_reach_metering() {
        let objects = vec![obj("i1", DeviceKind::Inverter), obj("m1", DeviceKind::Meter)];

        let report = validate(&objects, &[]);
        assert!(report
            .issues
            .iter()
            .any(|f| f.severity == Severity::Error
                && f.message.contains("Inverter 'i1' not connected to Meter/Grid")));

        let wires = vec![wire("w1", "i1", "m1", WireKind::Ac)];
        let report = validate(&objects, &wires);
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn test_unpowered_load_is_a_warning() {
        let objects = vec![obj("l1", DeviceKind::Load)];

        let report = validate(&objects, &[]);
        assert_eq!(report.error_count(), 0);
        assert!(report
            .issues
            .iter()
            .any(|f| f.severity == Severity::Warning
                && f.message.contains("Load 'l1' is not connected")));
    }
}
