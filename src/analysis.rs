// License: MIT

//! The batch entry point: runs validation, shadow estimation, the energy
//! balance, the financial projection and the BOQ rollup, and merges the
//! results into one [`AnalysisReport`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::boq::{boq_total, build_boq};
use crate::config::AnalysisParams;
use crate::device::{PlacedObject, WireConnection};
use crate::finance::{project, Degradation};
use crate::graph::validation::validate;
use crate::report::{AnalysisReport, Verdict, MONTHS};
use crate::shadow::estimate_shadow_loss;
use crate::simulation::{capacities, simulate, Capacities, SimulationOutcome};

/// Runs the full analysis, seeding the shadow estimator from entropy.
///
/// Apart from the Monte Carlo sampling, the result is a pure function of its
/// inputs; nothing is shared between calls, so concurrent invocations are
/// safe.
pub fn analyze(
    objects: &[PlacedObject],
    wires: &[WireConnection],
    params: &AnalysisParams,
) -> AnalysisReport {
    let mut rng = StdRng::from_entropy();
    analyze_with_rng(objects, wires, params, &mut rng)
}

/// Runs the full analysis with a caller-provided RNG, for reproducible
/// shadow sampling.
pub fn analyze_with_rng<R: Rng>(
    objects: &[PlacedObject],
    wires: &[WireConnection],
    params: &AnalysisParams,
    rng: &mut R,
) -> AnalysisReport {
    tracing::debug!(
        objects = objects.len(),
        wires = wires.len(),
        "Starting layout analysis."
    );

    let validation = validate(objects, wires);
    let caps = capacities(objects);

    let shadow_loss = estimate_shadow_loss(objects, params.latitude, params.longitude, rng);
    let shadow_derate = 1.0 - shadow_loss;

    let sim = simulate(objects, shadow_derate, params);

    let boq = build_boq(
        objects,
        wires,
        &params.extra_cost_items,
        &params.boq_overrides,
        caps.dc_kwp,
    );
    let system_cost = if params.system_cost > 0.0 {
        params.system_cost
    } else {
        boq_total(&boq)
    };

    let projection = project(
        sim.annual_generation,
        sim.annual_savings,
        system_cost,
        Degradation::from_objects(objects),
        params.is_commercial,
    );

    let score = ((100.0 - 20.0 * validation.error_count() as f64).max(0.0) * shadow_derate)
        .round() as u32;
    let verdict = Verdict::from_score(score);
    let suggestions = derive_suggestions(&caps, &sim, shadow_loss);

    tracing::debug!(score, ?verdict, shadow_loss, "Layout analysis complete.");

    AnalysisReport {
        valid: validation.is_valid(),
        verdict,
        score,
        dc_capacity: caps.dc_kwp,
        ac_capacity: caps.ac_kw,
        battery_capacity: caps.battery_kwh,
        battery_backup_hours: sim.battery_backup_hours,
        annual_generation: sim.annual_generation,
        system_cost,
        monthly_data: sim.monthly,
        yearly_data: projection.yearly,
        boq,
        shadow_loss,
        issues: validation.issues.iter().map(ToString::to_string).collect(),
        validations: validation.validations,
        suggestions,
        break_even_year: projection.break_even_year,
        break_even_month: projection.break_even_month,
        monthly_gen_data: sim.monthly_gen,
        monthly_loss_data: sim.monthly_loss,
        months: MONTHS.to_vec(),
    }
}

/// Heuristic advice lines derived from the sizing and the simulation.
fn derive_suggestions(
    caps: &Capacities,
    sim: &SimulationOutcome,
    shadow_loss: f64,
) -> Vec<String> {
    let mut suggestions = vec![];

    if caps.dc_kwp > 0.0 && caps.ac_kw > 0.0 && caps.dc_kwp > caps.ac_kw * 1.25 {
        suggestions.push(format!(
            "Inverter capacity ({:.1} kW) is low for {:.1} kWp of panels; consider adding inverter capacity",
            caps.ac_kw, caps.dc_kwp
        ));
    }

    let total_export: f64 = sim.monthly.iter().map(|m| m.net_export).sum();
    if caps.battery_kwh == 0.0
        && sim.annual_generation > 0.0
        && total_export > sim.annual_generation * 0.25
    {
        suggestions.push(
            "A large share of generation is exported; battery storage could raise self-consumption"
                .to_owned(),
        );
    }

    if shadow_loss > 0.1 {
        suggestions.push(format!(
            "Shadow losses are {:.0}%; consider moving panels away from taller obstructions",
            shadow_loss * 100.0
        ));
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::device::{DeviceKind, WireKind};
    use crate::test_utils::{obj, panel_at, wire, with_subtype};

    fn healthy_layout() -> (Vec<PlacedObject>, Vec<WireConnection>) {
        let inverter = PlacedObject {
            cap_kw: Some(5.0),
            ..obj("i1", DeviceKind::Inverter)
        };
        let objects = vec![
            panel_at("p1", 0.0, 0.0, 2.0, 1.0),
            panel_at("p2", 2.1, 0.0, 2.0, 1.0),
            obj("db1", DeviceKind::Acdb),
            inverter,
            obj("m1", DeviceKind::Meter),
            obj("g1", DeviceKind::Grid),
            with_subtype(obj("e1", DeviceKind::Structure), "earth"),
            with_subtype(obj("la1", DeviceKind::Structure), "la"),
        ];
        let wires = vec![
            wire("w1", "p1", "db1", WireKind::Dc),
            wire("w2", "db1", "i1", WireKind::Dc),
            wire("w3", "i1", "m1", WireKind::Ac),
            wire("w4", "m1", "g1", WireKind::Ac),
        ];
        (objects, wires)
    }

    #[test]
    fn test_end_to_end_healthy_layout() {
        let (objects, wires) = healthy_layout();
        let params = AnalysisParams {
            base_load: 300.0,
            system_cost: 80_000.0,
            ..Default::default()
        };

        let mut rng = StdRng::seed_from_u64(11);
        let report = analyze_with_rng(&objects, &wires, &params, &mut rng);

        assert!(report.valid);
        assert_eq!(report.score, 100);
        assert_eq!(report.verdict, Verdict::Optimized);
        assert!((report.dc_capacity - 1.1).abs() < 1e-9);
        assert!((report.ac_capacity - 5.0).abs() < 1e-9);
        assert_eq!(report.monthly_data.len(), 12);
        assert_eq!(report.yearly_data.len(), 25);
        assert_eq!(report.months[0], "Jan");
        assert_eq!(report.shadow_loss, 0.0);
        assert!(report.annual_generation > 0.0);
        assert!((report.system_cost - 80_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_errors_pull_the_score_down() {
        // A lone panel with no inverter: one topology error.
        let objects = vec![panel_at("p1", 0.0, 0.0, 2.0, 1.0)];
        let mut rng = StdRng::seed_from_u64(11);
        let report = analyze_with_rng(&objects, &[], &AnalysisParams::default(), &mut rng);

        assert!(!report.valid);
        assert_eq!(report.score, 80);
        assert_eq!(report.verdict, Verdict::NeedsImprovement);
        assert!(report
            .issues
            .iter()
            .any(|i| i.starts_with("ERROR: Some panels not connected")));
    }

    #[test]
    fn test_empty_inputs_do_not_panic() {
        let mut rng = StdRng::seed_from_u64(11);
        let report = analyze_with_rng(&[], &[], &AnalysisParams::default(), &mut rng);

        assert_eq!(report.dc_capacity, 0.0);
        assert_eq!(report.shadow_loss, 0.0);
        assert_eq!(report.annual_generation, 0.0);
        assert_eq!(report.yearly_data.len(), 25);
        assert_eq!(report.break_even_year, None);
        // Only the two safety warnings.
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues.iter().all(|i| i.starts_with("WARNING:")));
    }

    #[test]
    fn test_system_cost_falls_back_to_boq() {
        let (objects, wires) = healthy_layout();
        let params = AnalysisParams::default();

        let mut rng = StdRng::seed_from_u64(11);
        let report = analyze_with_rng(&objects, &wires, &params, &mut rng);

        // No explicit cost: the wiring and mounting lines still give the
        // rollup a non-zero total, which becomes the system cost.
        assert!((report.system_cost - boq_total(&report.boq)).abs() < 1e-9);
        assert!(report.system_cost > 0.0);
    }

    #[test]
    fn test_shadowed_layout_scores_lower_and_suggests() {
        let mut slab = obj("s1", DeviceKind::Obstacle);
        slab.x = -500.0;
        slab.y = -500.0;
        slab.w = 1000.0;
        slab.h = 1000.0;
        slab.h_z = 10.0;
        let (mut objects, wires) = healthy_layout();
        objects.push(slab);

        let mut rng = StdRng::seed_from_u64(11);
        let report = analyze_with_rng(&objects, &wires, &AnalysisParams::default(), &mut rng);

        assert!(report.shadow_loss > 0.95);
        assert!(report.score < 10);
        assert_eq!(report.verdict, Verdict::Critical);
        assert!(report
            .suggestions
            .iter()
            .any(|s| s.contains("taller obstructions")));
    }

    #[test]
    fn test_report_serializes_with_camel_case_keys() {
        let mut rng = StdRng::seed_from_u64(11);
        let report = analyze_with_rng(&[], &[], &AnalysisParams::default(), &mut rng);
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("dcCapacity").is_some());
        assert!(json.get("batteryBackupHours").is_some());
        assert!(json.get("monthlyGenData").is_some());
        assert!(json.get("breakEvenYear").is_some());
    }
}
