// License: MIT

//! The 25-year financial projection: panel degradation, accelerated
//! depreciation for commercial systems, and break-even detection.

use crate::device::{KindPredicates, PlacedObject};
use crate::report::{RoiStatus, YearlyRecord};

/// Number of projected years.
pub const PROJECTION_YEARS: u32 = 25;

/// First-year degradation when the panels carry no explicit rate.
const DEFAULT_DEGRADATION_YEAR1: f64 = 0.02;

/// Annual degradation from year two onwards.
const DEFAULT_DEGRADATION_ANNUAL: f64 = 0.004;

/// WDV depreciation: 60% of book value in year one, 40% thereafter.
const WDV_RATE_YEAR1: f64 = 0.60;
const WDV_RATE_LATER: f64 = 0.40;

/// Flat corporate tax rate backing the depreciation benefit.
const TAX_RATE: f64 = 0.30;

/// Panel degradation parameters, as fractions per year.
#[derive(Clone, Copy, Debug)]
pub struct Degradation {
    pub year1: f64,
    pub annual: f64,
}

impl Default for Degradation {
    fn default() -> Self {
        Self {
            year1: DEFAULT_DEGRADATION_YEAR1,
            annual: DEFAULT_DEGRADATION_ANNUAL,
        }
    }
}

impl Degradation {
    /// Reads the rates from the first panel's specifications, percentages
    /// accepted, falling back to the defaults.
    pub fn from_objects(objects: &[PlacedObject]) -> Self {
        let Some(panel) = objects.iter().find(|o| o.is_panel()) else {
            return Self::default();
        };
        let as_fraction = |v: f64| if v >= 1.0 { v / 100.0 } else { v };
        Self {
            year1: panel
                .spec_f64("degradation_year1")
                .map_or(DEFAULT_DEGRADATION_YEAR1, as_fraction),
            annual: panel
                .spec_f64("degradation_annual")
                .map_or(DEFAULT_DEGRADATION_ANNUAL, as_fraction),
        }
    }

    /// Remaining output fraction in year `y` (1-based).
    pub fn factor(&self, year: u32) -> f64 {
        let extra = if year > 1 {
            (year - 1) as f64 * self.annual
        } else {
            0.0
        };
        (1.0 - self.year1 - extra).max(0.0)
    }
}

/// A complete 25-year projection.
#[derive(Clone, Debug)]
pub struct Projection {
    pub yearly: Vec<YearlyRecord>,
    pub break_even_year: Option<u32>,
    pub break_even_month: Option<u32>,
}

/// Projects generation and savings over 25 years.
///
/// Commercial systems add the written-down-value depreciation tax benefit to
/// each year's savings.  Break-even is the first year whose cumulative
/// savings reach the system cost; the month within that year is interpolated
/// from how far into the year the crossing falls.
pub fn project(
    annual_generation: f64,
    annual_savings: f64,
    system_cost: f64,
    degradation: Degradation,
    is_commercial: bool,
) -> Projection {
    let mut yearly = Vec::with_capacity(PROJECTION_YEARS as usize);
    let mut cumulative = 0.0;
    let mut book_value = system_cost;
    let mut break_even_year = None;
    let mut break_even_month = None;

    for year in 1..=PROJECTION_YEARS {
        let factor = degradation.factor(year);
        let generation = annual_generation * factor;
        let energy_savings = annual_savings * factor;

        let ad_benefit = if is_commercial {
            let rate = if year == 1 { WDV_RATE_YEAR1 } else { WDV_RATE_LATER };
            let depreciation = book_value * rate;
            book_value -= depreciation;
            depreciation * TAX_RATE
        } else {
            0.0
        };
        let savings = energy_savings + ad_benefit;

        let previous_cumulative = cumulative;
        cumulative += savings;

        let roi_status = if break_even_year.is_some() {
            RoiStatus::Profitable
        } else if cumulative >= system_cost && system_cost > 0.0 {
            break_even_year = Some(year);
            if savings > 0.0 {
                let months = ((system_cost - previous_cumulative) / savings * 12.0).ceil();
                break_even_month = Some((months.max(1.0) as u32).min(12));
            }
            RoiStatus::BreakEven
        } else {
            RoiStatus::Recovering
        };

        yearly.push(YearlyRecord {
            year,
            generation,
            savings,
            energy_savings,
            ad_benefit,
            cumulative,
            roi_status,
        });
    }

    Projection {
        yearly,
        break_even_year,
        break_even_month,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceKind;
    use crate::test_utils::{obj, with_spec};
    use serde_json::json;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_break_even_boundary_case() {
        let projection = project(
            25_000.0,
            20000.0,
            100_000.0,
            Degradation { year1: 0.0, annual: 0.0 },
            false,
        );

        assert_eq!(projection.break_even_year, Some(5));
        assert_eq!(projection.break_even_month, Some(12));
        assert_eq!(projection.yearly[3].roi_status, RoiStatus::Recovering);
        assert_eq!(projection.yearly[4].roi_status, RoiStatus::BreakEven);
        assert_eq!(projection.yearly[5].roi_status, RoiStatus::Profitable);
        assert_eq!(projection.yearly.len(), 25);
    }

    #[test]
    fn test_break_even_interpolation() {
        // Crosses 100k midway through year 3: 40k + 40k + 40k.
        let projection = project(
            0.0,
            40_000.0,
            100_000.0,
            Degradation { year1: 0.0, annual: 0.0 },
            false,
        );
        assert_eq!(projection.break_even_year, Some(3));
        // (100000 - 80000) / 40000 * 12 = 6.
        assert_eq!(projection.break_even_month, Some(6));
    }

    #[test]
    fn test_degradation_factor() {
        let deg = Degradation::default();
        assert!((deg.factor(1) - 0.98).abs() < EPS);
        assert!((deg.factor(2) - 0.976).abs() < EPS);
        assert!((deg.factor(25) - (1.0 - 0.02 - 24.0 * 0.004)).abs() < EPS);

        let harsh = Degradation { year1: 0.5, annual: 0.5 };
        assert_eq!(harsh.factor(10), 0.0);
    }

    #[test]
    fn test_degradation_read_from_panel_specs() {
        let panel = with_spec(
            with_spec(obj("p1", DeviceKind::Panel), "degradation_year1", json!(3)),
            "degradation_annual",
            json!(0.005),
        );
        let deg = Degradation::from_objects(&[panel]);
        assert!((deg.year1 - 0.03).abs() < EPS);
        assert!((deg.annual - 0.005).abs() < EPS);

        let deg = Degradation::from_objects(&[]);
        assert!((deg.year1 - 0.02).abs() < EPS);
    }

    #[test]
    fn test_commercial_depreciation_schedule() {
        let projection = project(
            10_000.0,
            0.0,
            100_000.0,
            Degradation { year1: 0.0, annual: 0.0 },
            true,
        );

        // Year 1: 60% of 100k depreciated, 30% tax benefit.
        assert!((projection.yearly[0].ad_benefit - 18_000.0).abs() < EPS);
        // Year 2: 40% of the remaining 40k.
        assert!((projection.yearly[1].ad_benefit - 4_800.0).abs() < EPS);
        // Year 3: 40% of 24k.
        assert!((projection.yearly[2].ad_benefit - 2_880.0).abs() < EPS);
        // Savings are the benefit alone, energy savings being zero.
        assert!((projection.yearly[0].savings - 18_000.0).abs() < EPS);
        assert!(projection.yearly[0].energy_savings.abs() < EPS);
    }

    #[test]
    fn test_zero_cost_never_breaks_even() {
        let projection = project(0.0, 1000.0, 0.0, Degradation::default(), false);
        assert_eq!(projection.break_even_year, None);
        assert!(projection
            .yearly
            .iter()
            .all(|y| y.roi_status == RoiStatus::Recovering));
    }
}
