//! Core pipeline types: array topologies, the winning selection, and the
//! complete design outcome.

use serde::Serialize;

use crate::catalog::compatibility::CompatibilityRecord;
use crate::catalog::intelligence::QualitySignals;
use crate::catalog::inverter::InverterSpec;
use crate::catalog::panel::PanelSpec;
use crate::config::DesignRequirements;
use crate::engine::compliance::ComplianceResult;
use crate::engine::financial::FinancialEstimates;
use crate::engine::location::LocationFactors;
use crate::simulation::SimulatedProduction;

/// One series/parallel wiring topology for a (panel, inverter) pair.
///
/// Voltage and current envelope figures are temperature-corrected:
/// voltages at −10 °C (worst cold ceiling), currents at +85 °C (worst hot
/// ceiling). Computed fresh per design run, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayConfiguration {
    /// Panels wired in series per string.
    pub panels_per_string: u32,
    /// Parallel strings.
    pub string_count: u32,
    /// Total panel count.
    pub total_panels: u32,
    /// Total DC power at STC (W).
    pub total_power_w: f64,
    /// String open-circuit voltage at −10 °C (V).
    pub max_string_voltage_v: f64,
    /// String maximum-power voltage at +85 °C (V).
    pub min_string_voltage_v: f64,
    /// Array short-circuit current at +85 °C (A).
    pub max_array_current_a: f64,
    /// DC power over inverter AC rating.
    pub power_ratio: f64,
    /// False for the zeroed "incompatible pair" sentinel.
    pub compatible: bool,
}

impl ArrayConfiguration {
    /// The sentinel returned when no admissible topology exists for a
    /// pair. A normal per-pair outcome, not an error: the selector skips
    /// the pair.
    pub fn incompatible() -> Self {
        Self {
            panels_per_string: 0,
            string_count: 0,
            total_panels: 0,
            total_power_w: 0.0,
            max_string_voltage_v: 0.0,
            min_string_voltage_v: 0.0,
            max_array_current_a: 0.0,
            power_ratio: 0.0,
            compatible: false,
        }
    }
}

/// Per-factor breakdown of a combination's weighted objective (each
/// factor on a 0–100 scale before weighting).
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    /// Proximity of the DC/AC ratio to the preferred 1.1.
    pub ratio_score: f64,
    /// Pairwise compatibility score.
    pub compatibility_score: f64,
    /// Mean of panel and inverter reliability signals.
    pub reliability_score: f64,
    /// Priority-specific factor (efficiency, cost, space, or reliability).
    pub priority_score: f64,
    /// Climate adjustment factor.
    pub climate_score: f64,
}

/// The engine's final equipment choice, immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentSelection {
    /// Chosen panel.
    pub panel: PanelSpec,
    /// Chosen inverter.
    pub inverter: InverterSpec,
    /// Resolved panel quality signals.
    pub panel_signals: QualitySignals,
    /// Resolved inverter quality signals.
    pub inverter_signals: QualitySignals,
    /// Compatibility record (precomputed or fallback) for the pair.
    pub compatibility: CompatibilityRecord,
    /// Winning wiring topology.
    pub array: ArrayConfiguration,
    /// Weighted objective value of the combination.
    pub score: f64,
    /// Per-factor score breakdown.
    pub breakdown: ScoreBreakdown,
}

/// Everything a design run produces, handed back as plain data.
#[derive(Debug, Clone, Serialize)]
pub struct DesignOutcome {
    /// Requirements echoed back for traceability.
    pub requirements: DesignRequirements,
    /// Derived climate factors used throughout the run.
    pub location: LocationFactors,
    /// Winning equipment combination.
    pub selection: EquipmentSelection,
    /// Rule-evaluation result for the winning combination.
    pub compliance: ComplianceResult,
    /// Cost, production, and cash-flow estimates.
    pub financial: FinancialEstimates,
    /// Hourly-simulation estimate, when a simulator was attached.
    pub production: Option<SimulatedProduction>,
}
