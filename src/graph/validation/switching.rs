// License: MIT

//! Safety-equipment, battery-pairing, PSS and static PLC checks.

use crate::device::{KindPredicates, PlacedObject};
use crate::electrical::nominal_voltage;
use crate::report::Severity;

use super::LayoutValidator;

/// True if the grid object is live from the editor's point of view.
fn is_live_grid(obj: &PlacedObject) -> bool {
    obj.is_grid() && obj.is_on != Some(false)
}

impl LayoutValidator<'_> {
    /// Earthing and a lightning arrestor are expected in every layout.
    pub(super) fn check_safety_presence(&mut self) {
        let has_earth = self
            .graph
            .objects()
            .any(|o| o.subtype.as_deref() == Some("earth"));
        let has_la = self
            .graph
            .objects()
            .any(|o| o.subtype.as_deref() == Some("la"));

        if has_earth {
            self.passed("Earthing present".to_owned());
        } else {
            self.issue(Severity::Warning, "No earthing found in the layout");
        }
        if has_la {
            self.passed("Lightning arrestor present".to_owned());
        } else {
            self.issue(Severity::Warning, "No lightning arrestor found in the layout");
        }
    }

    /// A battery wired straight into an inverter needs a hybrid inverter.
    pub(super) fn check_battery_pairing(&mut self) {
        let batteries: Vec<_> = self.graph.objects().filter(|o| o.is_battery()).collect();
        for battery in batteries {
            let Ok(neighbors) = self.graph.neighbors(&battery.id) else {
                continue;
            };
            let adjacent_inverter = neighbors.into_iter().find(|n| n.is_inverter());

            match adjacent_inverter {
                Some(inverter) if inverter.spec_str("inverter_type") != Some("hybrid") => {
                    self.issue(
                        Severity::Error,
                        format!(
                            "Battery '{}' connected to non-hybrid inverter '{}'",
                            battery.id, inverter.id
                        ),
                    );
                }
                _ => self.passed(format!("Battery '{}' correctly configured", battery.id)),
            }
        }
    }

    /// A power switching system needs at least two connections and at least
    /// one viable source.
    pub(super) fn check_switching_systems(&mut self) {
        let systems: Vec<_> = self.graph.objects().filter(|o| o.is_pss()).collect();
        for pss in systems {
            let degree = self
                .graph
                .neighbors(&pss.id)
                .map(|n| n.count())
                .unwrap_or(0);
            if degree < 2 {
                self.issue(
                    Severity::Warning,
                    format!("PSS '{}' has fewer than 2 connections", pss.id),
                );
            }

            let live_grid = matches!(self.graph.is_reachable(&pss.id, is_live_grid), Ok(true));
            let battery = matches!(
                self.graph.is_reachable(&pss.id, |n| n.is_battery()),
                Ok(true)
            );

            if pss.spec_str("logic") == Some("manual_grid") && !live_grid {
                self.issue(
                    Severity::Critical,
                    format!(
                        "PSS '{}' is set to manual grid but no live grid is reachable",
                        pss.id
                    ),
                );
            }
            if !live_grid && !battery {
                self.issue(
                    Severity::Critical,
                    format!("No power source available for PSS '{}'", pss.id),
                );
            } else {
                self.passed(format!("PSS '{}' has a viable power source", pss.id));
            }
        }
    }

    /// A breaker trip rule that its own static rating already satisfies
    /// would trip the moment the breaker energizes.
    pub(super) fn check_static_plc_rules(&mut self) {
        let breakers: Vec<_> = self.graph.objects().filter(|o| o.is_plc_breaker()).collect();
        for breaker in breakers {
            let Some(rating) = nominal_voltage(breaker) else {
                continue;
            };
            for rule in breaker.logic_rules() {
                if rule.param.as_deref() != Some("Voltage")
                    || rule.action.as_deref() != Some("Trip")
                {
                    continue;
                }
                let (Some(op), Some(val)) = (rule.op.as_deref(), rule.val) else {
                    continue;
                };
                let satisfied = match op {
                    ">" => rating > val,
                    ">=" => rating >= val,
                    "<" => rating < val,
                    "<=" => rating <= val,
                    "=" | "==" => (rating - val).abs() < f64::EPSILON,
                    _ => false,
                };
                if satisfied {
                    self.issue(
                        Severity::Warning,
                        format!(
                            "Trip rule (Voltage {op} {val}) on '{}' is already satisfied \
                             by its {rating:.0} V rating and will trip immediately",
                            breaker.id
                        ),
                    );
                }
            }
        }
    }
}
