// License: MIT

//! Output types for the analysis: findings, monthly and yearly records, and
//! the merged [`AnalysisReport`].

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

use crate::boq::BoqItem;

/// Month names, in report order.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Severity of a validation finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Topology broken: a device unreachable from its required source.
    Error,
    /// Electrically unsafe: voltage mismatch, switching system without a
    /// viable source.
    Critical,
    /// Soft best-practice gap.
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// One issue found while validating a layout.
///
/// Rendered on the report boundary as the severity-prefixed strings the
/// reporting layer expects, e.g. `ERROR: Some panels not connected to
/// Inverter`.
#[derive(Clone, Debug, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub(crate) fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// The outcome of the batch graph validation.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    pub issues: Vec<Finding>,
    pub validations: Vec<String>,
}

impl ValidationReport {
    /// Number of `ERROR`-severity findings; drives the performance score.
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    /// True when no error- or critical-severity findings exist.
    pub fn is_valid(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|f| matches!(f.severity, Severity::Error | Severity::Critical))
    }
}

/// Energy and financial totals for one simulated month.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month: &'static str,
    /// Delivered AC generation, kWh.
    pub generation: f64,
    /// Consumption, kWh.
    pub load: f64,
    /// Energy exported to the grid, kWh.
    pub net_export: f64,
    /// Energy imported from the grid, kWh.
    pub net_import: f64,
    /// Net-metering settlement value for the month.
    pub savings: f64,
    /// Generation lost to shadowing, kWh.
    pub shadow_loss: f64,
    /// What the month's generation would earn under gross metering, for
    /// comparison against the net settlement.
    pub gross_metering_income: f64,
}

/// ROI status label for one projected year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RoiStatus {
    Recovering,
    #[serde(rename = "Break Even")]
    BreakEven,
    Profitable,
}

impl Display for RoiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoiStatus::Recovering => write!(f, "Recovering"),
            RoiStatus::BreakEven => write!(f, "Break Even"),
            RoiStatus::Profitable => write!(f, "Profitable"),
        }
    }
}

/// One year of the 25-year financial projection.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRecord {
    pub year: u32,
    /// Degraded generation, kWh.
    pub generation: f64,
    /// Total savings for the year, including any depreciation benefit.
    pub savings: f64,
    /// Savings from energy alone.
    pub energy_savings: f64,
    /// Accelerated-depreciation tax benefit (commercial systems only).
    pub ad_benefit: f64,
    /// Cumulative savings through this year.
    pub cumulative: f64,
    pub roi_status: RoiStatus,
}

/// Overall verdict, derived from the performance score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Verdict {
    #[serde(rename = "System Optimized")]
    Optimized,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    #[serde(rename = "Critical Issues")]
    Critical,
}

impl Verdict {
    /// Maps a 0-100 score onto a verdict.
    pub fn from_score(score: u32) -> Self {
        if score > 80 {
            Verdict::Optimized
        } else if score > 50 {
            Verdict::NeedsImprovement
        } else {
            Verdict::Critical
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Optimized => write!(f, "System Optimized"),
            Verdict::NeedsImprovement => write!(f, "Needs Improvement"),
            Verdict::Critical => write!(f, "Critical Issues"),
        }
    }
}

/// The merged output record of one analysis run.
///
/// Consumed read-only by the reporting and evaluation layers.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub valid: bool,
    pub verdict: Verdict,
    pub score: u32,

    /// Nameplate DC capacity, kWp.
    pub dc_capacity: f64,
    /// Inverter AC capacity, kW.
    pub ac_capacity: f64,
    /// Battery capacity, kWh.
    pub battery_capacity: f64,
    /// Battery capacity expressed in hours of average load.
    pub battery_backup_hours: f64,

    /// First-year generation, kWh.
    pub annual_generation: f64,
    pub system_cost: f64,

    pub monthly_data: Vec<MonthlyRecord>,
    pub yearly_data: Vec<YearlyRecord>,
    pub boq: BTreeMap<String, BoqItem>,
    /// Shadow-loss ratio in [0, 1].
    pub shadow_loss: f64,

    /// Severity-prefixed issue strings.
    pub issues: Vec<String>,
    pub validations: Vec<String>,
    pub suggestions: Vec<String>,

    pub break_even_year: Option<u32>,
    pub break_even_month: Option<u32>,

    /// Convenience series for charting, parallel to [`MONTHS`].
    pub monthly_gen_data: Vec<f64>,
    pub monthly_loss_data: Vec<f64>,
    pub months: Vec<&'static str>,
}
