// License: MIT

//! This module contains the caller-supplied parameters for an analysis run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::boq::{BoqOverride, ExtraCostItem};

/// Site and financial parameters for an analysis run.
///
/// Everything the engine needs beyond the object and wire lists is carried
/// here explicitly; the engine keeps no ambient configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisParams {
    /// Baseline monthly consumption in kWh, before load boxes are added.
    pub base_load: f64,
    /// Grid import tariff, currency per kWh.
    pub grid_rate: f64,
    /// Net-metering export tariff, currency per kWh.
    pub export_rate: f64,
    /// Total installed cost.  When zero, the BOQ rollup is used instead.
    pub system_cost: f64,
    /// Enables the commercial accelerated-depreciation branch.
    pub is_commercial: bool,
    /// Caller-supplied cost line items merged into the BOQ.
    pub extra_cost_items: Vec<ExtraCostItem>,
    /// Overrides applied onto generated BOQ line items, keyed by item name.
    pub boq_overrides: BTreeMap<String, BoqOverride>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            base_load: 0.0,
            grid_rate: 8.0,
            export_rate: 4.0,
            system_cost: 0.0,
            is_commercial: false,
            extra_cost_items: vec![],
            boq_overrides: BTreeMap::new(),
            latitude: 20.0,
            longitude: 77.0,
        }
    }
}
