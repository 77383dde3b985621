// License: MIT

/*!
# Solar Layout Engine

This is a library for analysing solar-electrical layouts: a set of placed
devices (panels, inverters, batteries, breakers, loads, the grid connection)
and the wires between them.

The devices and wires are represented as an undirected graph, which makes it
easy to reason about connectivity — whether every panel can reach an
inverter, every inverter can reach a meter or the grid, and every switching
system has a viable power source.

## Analysis

The main entry point is [`analyze`], which takes the placed objects, the
wires, and the run parameters, and produces a single [`AnalysisReport`]
combining:

- topology and electrical validation findings,
- a Monte Carlo shadow-loss estimate,
- a month-by-month energy balance with battery and grid-trip behaviour,
- a 25-year financial projection with break-even detection,
- a bill-of-quantities rollup.

The analysis never fails: broken layouts produce reports with findings, not
errors.  [`analyze_with_rng`] accepts a caller-seeded RNG for reproducible
shadow sampling.

## Live checks

Editors wanting immediate feedback while a wire is being drawn can call
[`validate_connection`] on the two endpoints.  It applies the same electrical
rules as the batch validation, so the two can never disagree.
*/

mod analysis;
pub use analysis::{analyze, analyze_with_rng};

mod boq;
pub use boq::{boq_total, build_boq, BoqItem, BoqOverride, ExtraCostItem};

mod config;
pub use config::AnalysisParams;

mod device;
pub use device::{
    Bounds, DeviceKind, LogicRule, PlacedObject, Vertex, WireConnection, WireKind,
};

mod electrical;
pub use electrical::{validate_connection, ConnectionIssue, ConnectionIssueKind};

mod error;
pub use error::Error;

mod finance;
pub use finance::{project, Degradation, Projection, PROJECTION_YEARS};

mod graph;
pub use graph::validation::validate;
pub use graph::{iterators, LayoutGraph};

mod report;
pub use report::{
    AnalysisReport, Finding, MonthlyRecord, RoiStatus, Severity, ValidationReport, Verdict,
    YearlyRecord, MONTHS,
};

mod shadow;
pub use shadow::estimate_shadow_loss;

mod simulation;
pub use simulation::{capacities, simulate, Capacities, SimulationOutcome};

#[cfg(test)]
mod test_utils;
