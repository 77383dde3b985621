// License: MIT

//! Batch validation of a layout's electrical topology.
//!
//! All checks run over the rebuilt adjacency graph and collect findings into
//! a [`ValidationReport`]; nothing here ever fails outright, a broken layout
//! just produces more findings.

mod reachability;
mod switching;

use crate::device::{PlacedObject, WireConnection};
use crate::electrical::{check_voltage_pair, VoltageCheck};
use crate::report::{Finding, Severity, ValidationReport};
use crate::LayoutGraph;

pub(crate) struct LayoutValidator<'a> {
    graph: &'a LayoutGraph<'a>,
    report: ValidationReport,
}

/// Validates the layout and returns every issue and passed-check line.
///
/// Re-validation of an unchanged layout is idempotent.
pub fn validate(objects: &[PlacedObject], wires: &[WireConnection]) -> ValidationReport {
    let graph = LayoutGraph::build(objects, wires);
    let mut validator = LayoutValidator {
        graph: &graph,
        report: ValidationReport::default(),
    };

    validator.check_panel_reachability();
    validator.check_inverter_reachability();
    validator.check_load_reachability();
    validator.check_safety_presence();
    validator.check_battery_pairing();
    validator.check_voltage_compatibility();
    validator.check_switching_systems();
    validator.check_static_plc_rules();

    validator.report
}

impl LayoutValidator<'_> {
    fn issue(&mut self, severity: Severity, message: impl Into<String>) {
        self.report.issues.push(Finding::new(severity, message));
    }

    fn passed(&mut self, message: impl Into<String>) {
        self.report.validations.push(message.into());
    }

    /// Scans every committed edge with the shared voltage rule table.
    /// Mismatches are electrically unsafe, so they surface as CRITICAL.
    fn check_voltage_compatibility(&mut self) {
        let mismatches: Vec<_> = self
            .graph
            .edges()
            .filter_map(|(a, b)| match check_voltage_pair(a, b) {
                VoltageCheck::Ok => None,
                VoltageCheck::Mismatch { message, .. } => Some(message),
            })
            .collect();
        for message in mismatches {
            self.issue(Severity::Critical, message);
        }
    }
}
