//! Cross-product search for the highest-scoring compatible combination.

use crate::config::{DesignRequirements, OptimizationPriority};
use crate::engine::array::{ArrayConfigurator, POWER_RATIO_IDEAL};
use crate::engine::location::LocationFactors;
use crate::engine::ranking::{RankedInverter, RankedPanel};
use crate::engine::scoring::CompatibilityScorer;
use crate::engine::types::{ArrayConfiguration, EquipmentSelection, ScoreBreakdown};

/// Weight of DC/AC ratio proximity in the combination objective.
const WEIGHT_RATIO: f64 = 0.30;
/// Weight of the pairwise compatibility score.
const WEIGHT_COMPATIBILITY: f64 = 0.25;
/// Weight of mean component reliability.
const WEIGHT_RELIABILITY: f64 = 0.20;
/// Weight of the priority-specific factor.
const WEIGHT_PRIORITY: f64 = 0.15;
/// Weight of the climate adjustment.
const WEIGHT_CLIMATE: f64 = 0.10;

/// Enumerates shortlisted panel×inverter pairs, wires each pair through
/// the topology search and compatibility scoring, and keeps the
/// highest-scoring compatible combination.
///
/// The cross-product is bounded to `pair_limit` entries per family for
/// tractability. Returns `None` when every pair is electrically
/// incompatible; the caller escalates that to the fatal
/// "no compatible equipment" failure.
#[derive(Debug, Clone, Copy)]
pub struct CombinationSelector {
    pair_limit: usize,
}

impl CombinationSelector {
    /// Creates a selector taking `pair_limit` candidates per shortlist.
    pub fn new(pair_limit: usize) -> Self {
        Self { pair_limit }
    }

    /// Picks the best combination, or `None` when no pair survives.
    pub fn select(
        &self,
        panels: &[RankedPanel],
        inverters: &[RankedInverter],
        requirements: &DesignRequirements,
        location: &LocationFactors,
        scorer: &CompatibilityScorer<'_>,
    ) -> Option<EquipmentSelection> {
        let panel_pool = &panels[..panels.len().min(self.pair_limit)];
        let inverter_pool = &inverters[..inverters.len().min(self.pair_limit)];

        let mut best: Option<EquipmentSelection> = None;

        for ranked_panel in panel_pool {
            for ranked_inverter in inverter_pool {
                let array = ArrayConfigurator::configure(
                    &ranked_panel.panel,
                    &ranked_inverter.inverter,
                    requirements,
                );
                if !array.compatible {
                    continue;
                }

                let compatibility =
                    scorer.score(&ranked_panel.panel, &ranked_inverter.inverter);
                let breakdown = score_combination(
                    ranked_panel,
                    ranked_inverter,
                    &array,
                    compatibility.overall_score,
                    requirements,
                    location,
                );
                let score = WEIGHT_RATIO * breakdown.ratio_score
                    + WEIGHT_COMPATIBILITY * breakdown.compatibility_score
                    + WEIGHT_RELIABILITY * breakdown.reliability_score
                    + WEIGHT_PRIORITY * breakdown.priority_score
                    + WEIGHT_CLIMATE * breakdown.climate_score;

                // Strict improvement keeps shortlist order on ties.
                if best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(EquipmentSelection {
                        panel: ranked_panel.panel.clone(),
                        inverter: ranked_inverter.inverter.clone(),
                        panel_signals: ranked_panel.signals.clone(),
                        inverter_signals: ranked_inverter.signals.clone(),
                        compatibility,
                        array,
                        score,
                        breakdown,
                    });
                }
            }
        }

        best
    }
}

fn score_combination(
    panel: &RankedPanel,
    inverter: &RankedInverter,
    array: &ArrayConfiguration,
    compatibility_score: f64,
    requirements: &DesignRequirements,
    location: &LocationFactors,
) -> ScoreBreakdown {
    let ratio_score =
        100.0 * (1.0 - ((array.power_ratio - POWER_RATIO_IDEAL).abs() / 0.2).min(1.0));

    let reliability_score = (panel.signals.reliability + inverter.signals.reliability) / 2.0;

    let priority_score = match requirements.design.priority {
        OptimizationPriority::Efficiency => {
            100.0 * ((panel.panel.efficiency_pct - 15.0) / 8.0).clamp(0.0, 1.0)
        }
        OptimizationPriority::Cost => {
            let equipment = panel.signals.price * f64::from(array.total_panels)
                + inverter.signals.price;
            let per_watt = if array.total_power_w > 0.0 {
                equipment / array.total_power_w
            } else {
                f64::INFINITY
            };
            // 0.50 $/W or better scores 100, 1.40 $/W or worse scores 0.
            100.0 * ((1.40 - per_watt) / 0.90).clamp(0.0, 1.0)
        }
        OptimizationPriority::Space => {
            100.0 * ((panel.panel.power_density_w_m2() - 140.0) / 90.0).clamp(0.0, 1.0)
        }
        OptimizationPriority::Reliability => reliability_score,
    };

    let climate_score = if requirements.site.climate_zone.is_hot() {
        (panel.signals.hot_multiplier * location.high_temp_multiplier * 100.0).clamp(0.0, 100.0)
    } else {
        (panel.signals.cold_multiplier * location.low_temp_multiplier * 100.0).clamp(0.0, 100.0)
    };

    ScoreBreakdown {
        ratio_score,
        compatibility_score,
        reliability_score,
        priority_score,
        climate_score,
    }
}
