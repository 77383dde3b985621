// License: MIT

//! Bill-of-quantities rollup: device grouping, mounting structures, wiring,
//! caller extras, overrides and the benchmark fallback.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::device::{DeviceKind, PlacedObject, WireConnection};

/// Per-unit mounting structure rates by mounting type.
const STRUCTURE_RATE_RCC: f64 = 2500.0;
const STRUCTURE_RATE_TINSHED: f64 = 1800.0;
const STRUCTURE_RATE_GROUND: f64 = 3200.0;

/// Flat per-wire rate for the wiring line item.
const WIRING_RATE_PER_WIRE: f64 = 450.0;

/// Benchmark installed cost per kWp, used when no line item carries a cost.
const BENCHMARK_COST_PER_KWP: f64 = 45_000.0;

/// Totals below this are treated as "no pricing data".
const NEGLIGIBLE_COST: f64 = 1.0;

/// One line item of the bill of quantities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoqItem {
    pub count: u32,
    /// Total cost of the line item.
    pub cost: f64,
    #[serde(rename = "type")]
    pub category: String,
}

/// A caller-supplied cost entry merged into the BOQ as a single-count item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtraCostItem {
    pub name: String,
    pub cost: f64,
}

/// A partial override applied onto one generated line item.
///
/// Unset fields keep the generated values; a zero-cost override effectively
/// deletes the item's cost contribution.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoqOverride {
    pub count: Option<u32>,
    pub cost: Option<f64>,
    #[serde(rename = "type")]
    pub category: Option<String>,
}

fn add_count(boq: &mut BTreeMap<String, BoqItem>, name: String, unit_cost: f64, category: &str) {
    let item = boq.entry(name).or_insert_with(|| BoqItem {
        count: 0,
        cost: 0.0,
        category: category.to_owned(),
    });
    item.count += 1;
    item.cost += unit_cost;
}

/// Rolls up the bill of quantities.
///
/// Devices group by `label || kind`; mounting structures split by their
/// `mounting_type`; one wiring item covers all wires.  Overrides apply last
/// and shallow-merge onto whatever was generated.  When the rollup carries
/// no cost at all and DC capacity exists, a benchmark line item stands in.
pub fn build_boq(
    objects: &[PlacedObject],
    wires: &[WireConnection],
    extra_items: &[ExtraCostItem],
    overrides: &BTreeMap<String, BoqOverride>,
    dc_capacity_kwp: f64,
) -> BTreeMap<String, BoqItem> {
    let mut boq = BTreeMap::new();

    for object in objects {
        match object.kind {
            DeviceKind::Grid => continue,
            DeviceKind::Structure | DeviceKind::Tinshed => {
                let rate = match object.spec_str("mounting_type").unwrap_or("rcc") {
                    "tinshed" => ("Mounting Structure (tinshed)", STRUCTURE_RATE_TINSHED),
                    "ground" => ("Mounting Structure (ground)", STRUCTURE_RATE_GROUND),
                    _ => ("Mounting Structure (rcc)", STRUCTURE_RATE_RCC),
                };
                add_count(&mut boq, rate.0.to_owned(), rate.1, "structure");
            }
            DeviceKind::Obstacle | DeviceKind::Tree | DeviceKind::Polygon => continue,
            _ => {
                let unit_cost = object.spec_f64("cost").unwrap_or(0.0);
                add_count(&mut boq, object.display_name(), unit_cost, "equipment");
            }
        }
    }

    if !wires.is_empty() {
        boq.insert(
            "Wiring & Cabling".to_owned(),
            BoqItem {
                count: wires.len() as u32,
                cost: wires.len() as f64 * WIRING_RATE_PER_WIRE,
                category: "wiring".to_owned(),
            },
        );
    }

    for extra in extra_items {
        boq.insert(
            extra.name.clone(),
            BoqItem {
                count: 1,
                cost: extra.cost,
                category: "extra".to_owned(),
            },
        );
    }

    for (name, patch) in overrides {
        let entry = boq.entry(name.clone()).or_insert_with(|| BoqItem {
            count: 0,
            cost: 0.0,
            category: "equipment".to_owned(),
        });
        if let Some(count) = patch.count {
            entry.count = count;
        }
        if let Some(cost) = patch.cost {
            entry.cost = cost;
        }
        if let Some(category) = &patch.category {
            entry.category = category.clone();
        }
    }

    if boq_total(&boq) < NEGLIGIBLE_COST && dc_capacity_kwp > 0.0 {
        boq.insert(
            "System Cost (benchmark)".to_owned(),
            BoqItem {
                count: 1,
                cost: dc_capacity_kwp * BENCHMARK_COST_PER_KWP,
                category: "benchmark".to_owned(),
            },
        );
    }

    boq
}

/// Sums the cost of every line item.
pub fn boq_total(boq: &BTreeMap<String, BoqItem>) -> f64 {
    boq.values().map(|item| item.cost).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceKind, PlacedObject, WireKind};
    use crate::test_utils::{obj, panel_at, wire, with_spec};
    use serde_json::json;

    const EPS: f64 = 1e-9;

    fn priced(object: PlacedObject, cost: f64) -> PlacedObject {
        with_spec(object, "cost", json!(cost))
    }

    #[test]
    fn test_grouping_by_label_or_kind() {
        let mut labeled = priced(panel_at("p1", 0.0, 0.0, 2.0, 1.0), 9000.0);
        labeled.label = Some("Mono PERC 550".into());
        let mut labeled2 = labeled.clone();
        labeled2.id = "p2".into();
        let objects = vec![
            labeled,
            labeled2,
            priced(obj("i1", DeviceKind::Inverter), 40_000.0),
            obj("g1", DeviceKind::Grid),
        ];

        let boq = build_boq(&objects, &[], &[], &BTreeMap::new(), 1.1);
        let panels = &boq["Mono PERC 550"];
        assert_eq!(panels.count, 2);
        assert!((panels.cost - 18_000.0).abs() < EPS);
        assert_eq!(boq["Inverter"].count, 1);
        // The grid never appears.
        assert_eq!(boq.len(), 2);
    }

    #[test]
    fn test_structures_split_by_mounting_type() {
        let objects = vec![
            with_spec(obj("s1", DeviceKind::Structure), "mounting_type", json!("rcc")),
            with_spec(obj("s2", DeviceKind::Structure), "mounting_type", json!("rcc")),
            with_spec(obj("s3", DeviceKind::Structure), "mounting_type", json!("ground")),
        ];
        let boq = build_boq(&objects, &[], &[], &BTreeMap::new(), 0.0);

        assert_eq!(boq["Mounting Structure (rcc)"].count, 2);
        assert!((boq["Mounting Structure (rcc)"].cost - 2.0 * STRUCTURE_RATE_RCC).abs() < EPS);
        assert_eq!(boq["Mounting Structure (ground)"].count, 1);
    }

    #[test]
    fn test_wiring_and_extras() {
        let wires = vec![
            wire("w1", "a", "b", WireKind::Dc),
            wire("w2", "b", "c", WireKind::Ac),
        ];
        let extras = vec![ExtraCostItem {
            name: "Net Meter Liaison".into(),
            cost: 7_500.0,
        }];
        let boq = build_boq(&[], &wires, &extras, &BTreeMap::new(), 0.0);

        assert_eq!(boq["Wiring & Cabling"].count, 2);
        assert!((boq["Wiring & Cabling"].cost - 900.0).abs() < EPS);
        assert_eq!(boq["Net Meter Liaison"].count, 1);
    }

    #[test]
    fn test_overrides_are_idempotent_and_can_zero_out() {
        let objects = vec![priced(obj("i1", DeviceKind::Inverter), 40_000.0)];
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "Inverter".to_owned(),
            BoqOverride {
                cost: Some(0.0),
                ..Default::default()
            },
        );

        let once = build_boq(&objects, &[], &[], &overrides, 0.0);
        assert!((once["Inverter"].cost).abs() < EPS);
        // Type survives a cost-only override.
        assert_eq!(once["Inverter"].category, "equipment");

        let twice = build_boq(&objects, &[], &[], &overrides, 0.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_benchmark_fallback() {
        // Unpriced panels: the rollup is zero, so the benchmark stands in.
        let objects = vec![panel_at("p1", 0.0, 0.0, 2.0, 1.0)];
        let boq = build_boq(&objects, &[], &[], &BTreeMap::new(), 0.55);

        let benchmark = &boq["System Cost (benchmark)"];
        assert!((benchmark.cost - 0.55 * BENCHMARK_COST_PER_KWP).abs() < EPS);
        assert!((boq_total(&boq) - benchmark.cost).abs() < EPS);

        // With no DC capacity there is nothing to benchmark against.
        let boq = build_boq(&[], &[], &[], &BTreeMap::new(), 0.0);
        assert!(boq_total(&boq) < NEGLIGIBLE_COST);
        assert!(!boq.contains_key("System Cost (benchmark)"));
    }
}
