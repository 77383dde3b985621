// License: MIT

//! The energy balance simulator: one representative day per month, at
//! one-hour steps, with battery state carried across hours and months.

use crate::config::AnalysisParams;
use crate::device::{DeviceKind, KindPredicates, PlacedObject};
use crate::report::{MonthlyRecord, MONTHS};

/// Relative generation strength per calendar month.
const SEASONALITY: [f64; 12] = [
    0.8, 0.9, 1.1, 1.2, 1.25, 1.1, 1.0, 0.95, 0.95, 1.0, 0.9, 0.8,
];

/// Width of the daily generation bell curve, in hours.
const GENERATION_SIGMA: f64 = 2.5;

/// One-way battery conversion efficiency.
const BATTERY_EFFICIENCY: f64 = 0.95;

/// Fallback weighted inverter efficiency.
const DEFAULT_INVERTER_EFFICIENCY: f64 = 0.975;

/// Days represented by the per-month sample day.
const DAYS_PER_MONTH: f64 = 30.0;

/// Nameplate capacities derived from the object list.
#[derive(Clone, Copy, Debug, Default)]
pub struct Capacities {
    /// Σ panel watts / 1000, kWp.
    pub dc_kwp: f64,
    /// Σ inverter capacity, kW.
    pub ac_kw: f64,
    /// Σ battery capacity, kWh.
    pub battery_kwh: f64,
    /// Capacity-weighted inverter efficiency, as a fraction.
    pub inverter_efficiency: f64,
}

/// Derives nameplate capacities and the weighted inverter efficiency.
pub fn capacities(objects: &[PlacedObject]) -> Capacities {
    let dc_kwp = objects
        .iter()
        .filter(|o| o.is_panel())
        .filter_map(|o| o.watts)
        .sum::<f64>()
        / 1000.0;
    let battery_kwh = objects
        .iter()
        .filter(|o| o.is_battery())
        .filter_map(|o| o.cap_kwh)
        .sum();

    let mut ac_kw = 0.0;
    let mut weighted_eff = 0.0;
    for inverter in objects.iter().filter(|o| o.is_inverter()) {
        let cap = inverter.cap_kw.unwrap_or(0.0);
        let eff = inverter
            .spec_f64("efficiency")
            .map(|e| if e > 1.0 { e / 100.0 } else { e })
            .unwrap_or(DEFAULT_INVERTER_EFFICIENCY);
        ac_kw += cap;
        weighted_eff += eff * cap;
    }
    let inverter_efficiency = if ac_kw > 0.0 {
        weighted_eff / ac_kw
    } else {
        DEFAULT_INVERTER_EFFICIENCY
    };

    Capacities {
        dc_kwp,
        ac_kw,
        battery_kwh,
        inverter_efficiency,
    }
}

/// Battery state-of-charge, in kWh of stored energy.
#[derive(Clone, Copy, Debug)]
struct BatteryState {
    capacity_kwh: f64,
    soc_kwh: f64,
}

/// Energy flows of one simulated hour, all in kWh.
#[derive(Clone, Copy, Debug, Default)]
struct HourFlows {
    generation: f64,
    load: f64,
    export: f64,
    import: f64,
    /// Energy added to the battery (state-of-charge delta).
    charged: f64,
    /// Energy removed from the battery (state-of-charge delta).
    discharged: f64,
    /// Deficit left unserved when the grid is down and the battery empty.
    unmet: f64,
}

/// Settles one hour of generation against load, battery and grid.
///
/// Surplus charges the battery up to its headroom at the one-way conversion
/// efficiency; the remainder exports.  Deficit discharges the battery first,
/// then imports, or goes unmet if the grid is down this hour.
fn simulate_hour(
    generation: f64,
    load: f64,
    grid_available: bool,
    battery: &mut BatteryState,
) -> HourFlows {
    let mut flows = HourFlows {
        generation,
        load,
        ..Default::default()
    };

    let net = generation - load;
    if net >= 0.0 {
        let headroom = (battery.capacity_kwh - battery.soc_kwh).max(0.0);
        let accepted = (net * BATTERY_EFFICIENCY).min(headroom);
        battery.soc_kwh += accepted;
        flows.charged = accepted;
        flows.export = net - accepted / BATTERY_EFFICIENCY;
    } else {
        let deficit = -net;
        let deliverable = battery.soc_kwh * BATTERY_EFFICIENCY;
        let delivered = deficit.min(deliverable);
        battery.soc_kwh -= delivered / BATTERY_EFFICIENCY;
        flows.discharged = delivered / BATTERY_EFFICIENCY;

        let remaining = deficit - delivered;
        if grid_available {
            flows.import = remaining;
        } else {
            flows.unmet = remaining;
        }
    }

    flows
}

/// Hourly load multiplier: morning and evening peaks, a night trough.
fn load_multiplier(hour: u32) -> f64 {
    match hour {
        7..=9 | 18..=22 => 1.5,
        1..=5 => 0.5,
        _ => 1.0,
    }
}

/// Normalized generation bell for one hour of the sample day.
fn generation_bell(hour: u32) -> f64 {
    if !(6..=18).contains(&hour) {
        return 0.0;
    }
    let x = hour as f64 - 12.0;
    (-x * x / (2.0 * GENERATION_SIGMA * GENERATION_SIGMA)).exp()
}

/// A time window during which a master PLC rule trips the grid.
#[derive(Clone, Copy, Debug)]
struct GridTripWindow {
    start: f64,
    end: f64,
}

impl GridTripWindow {
    /// The window wraps past midnight when `start >= end`.
    fn contains(&self, hour: f64) -> bool {
        if self.start < self.end {
            hour >= self.start && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

/// Collects the master PLC time windows that trip a grid object.
fn grid_trip_windows(objects: &[PlacedObject]) -> Vec<GridTripWindow> {
    let mut windows = vec![];
    for plc in objects.iter().filter(|o| o.kind == DeviceKind::MasterPlc) {
        for rule in plc.logic_rules() {
            if rule.rule_type.as_deref() != Some("Time")
                || rule.action.as_deref() != Some("Trip")
            {
                continue;
            }
            let targets_grid = rule
                .target_id
                .as_ref()
                .and_then(|tid| objects.iter().find(|o| &o.id == tid))
                .is_some_and(|o| o.is_grid());
            if !targets_grid {
                continue;
            }
            let (Some(start), Some(end)) = (rule.val, rule.val2) else {
                continue;
            };
            windows.push(GridTripWindow { start, end });
        }
    }
    windows
}

/// Results of a full 12-month simulation.
#[derive(Clone, Debug)]
pub struct SimulationOutcome {
    pub monthly: Vec<MonthlyRecord>,
    pub annual_generation: f64,
    pub annual_savings: f64,
    /// Monthly generation series, kWh, parallel to [`MONTHS`].
    pub monthly_gen: Vec<f64>,
    /// Monthly shadow-attributable loss series, kWh.
    pub monthly_loss: Vec<f64>,
    /// Battery capacity expressed in hours of average load.
    pub battery_backup_hours: f64,
}

/// Runs the monthly/hourly energy balance.
///
/// `shadow_derate` is `1 - shadow loss ratio`.  Battery state-of-charge is
/// carried across hours and across months within this one call; the function
/// keeps no state between calls.
pub fn simulate(
    objects: &[PlacedObject],
    shadow_derate: f64,
    params: &AnalysisParams,
) -> SimulationOutcome {
    let caps = capacities(objects);

    let load_units: f64 = objects
        .iter()
        .filter(|o| o.is_load())
        .filter_map(|o| o.units)
        .sum();
    let total_monthly_load = params.base_load + load_units;
    let hourly_base_load = total_monthly_load / DAYS_PER_MONTH / 24.0;

    let grid_exists = objects
        .iter()
        .any(|o| o.is_grid() && o.is_on != Some(false));
    let trip_windows = grid_trip_windows(objects);

    let mut battery = BatteryState {
        capacity_kwh: caps.battery_kwh,
        soc_kwh: 0.0,
    };

    let mut monthly = Vec::with_capacity(12);
    let mut monthly_gen = Vec::with_capacity(12);
    let mut monthly_loss = Vec::with_capacity(12);
    let mut annual_generation = 0.0;
    let mut annual_savings = 0.0;

    for (month, &season) in SEASONALITY.iter().enumerate() {
        let mut day_gen = 0.0;
        let mut day_load = 0.0;
        let mut day_export = 0.0;
        let mut day_import = 0.0;
        let mut day_shadow_loss = 0.0;

        for hour in 0..24u32 {
            let potential =
                caps.dc_kwp * generation_bell(hour) * season * caps.inverter_efficiency;
            let generation = potential * shadow_derate;
            let load = hourly_base_load * load_multiplier(hour);

            let grid_up = grid_exists
                && !trip_windows.iter().any(|w| w.contains(hour as f64));

            let flows = simulate_hour(generation, load, grid_up, &mut battery);
            day_gen += flows.generation;
            day_load += flows.load;
            day_export += flows.export;
            day_import += flows.import;
            day_shadow_loss += potential - generation;
        }

        let generation = day_gen * DAYS_PER_MONTH;
        let load = day_load * DAYS_PER_MONTH;
        let net_export = day_export * DAYS_PER_MONTH;
        let net_import = day_import * DAYS_PER_MONTH;
        let shadow_loss = day_shadow_loss * DAYS_PER_MONTH;

        let export_value = net_export * params.export_rate;
        let import_cost = net_import * params.grid_rate;
        let savings = load * params.grid_rate - (import_cost - export_value);
        let gross_metering_income = generation * params.export_rate;

        annual_generation += generation;
        annual_savings += savings;
        monthly_gen.push(generation);
        monthly_loss.push(shadow_loss);
        monthly.push(MonthlyRecord {
            month: MONTHS[month],
            generation,
            load,
            net_export,
            net_import,
            savings,
            shadow_loss,
            gross_metering_income,
        });
    }

    let battery_backup_hours = if hourly_base_load > 0.0 {
        caps.battery_kwh / hourly_base_load
    } else {
        0.0
    };

    SimulationOutcome {
        monthly,
        annual_generation,
        annual_savings,
        monthly_gen,
        monthly_loss,
        battery_backup_hours,
    }
}
