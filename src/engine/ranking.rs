//! Priority-weighted catalog shortlisting.

use std::cmp::Ordering;

use crate::catalog::intelligence::QualitySignals;
use crate::catalog::inverter::InverterSpec;
use crate::catalog::panel::PanelSpec;
use crate::catalog::store::CatalogStore;
use crate::config::{DesignRequirements, OptimizationPriority};

/// A shortlisted panel with its resolved signals and rank score.
#[derive(Debug, Clone)]
pub struct RankedPanel {
    pub panel: PanelSpec,
    pub signals: QualitySignals,
    pub score: f64,
}

/// A shortlisted inverter with its resolved signals and rank score.
#[derive(Debug, Clone)]
pub struct RankedInverter {
    pub inverter: InverterSpec,
    pub signals: QualitySignals,
    pub score: f64,
}

/// Scores the catalog against the stated priority and truncates to a
/// shortlist.
///
/// Scoring is additive across independent 0–100 factors: power proximity
/// to the target is always on; exactly one further factor contributes,
/// selected by the optimization priority. An empty catalog yields an
/// empty shortlist, which downstream stages treat as "no design
/// possible". Ties keep catalog order (stable sort), so ranking is
/// deterministic.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRanker {
    shortlist_size: usize,
}

impl CandidateRanker {
    /// Creates a ranker keeping `shortlist_size` candidates per family.
    pub fn new(shortlist_size: usize) -> Self {
        Self { shortlist_size }
    }

    /// Shortlists panels, best first.
    pub fn shortlist_panels(
        &self,
        store: &CatalogStore,
        requirements: &DesignRequirements,
    ) -> Vec<RankedPanel> {
        let mut ranked: Vec<RankedPanel> = store
            .panels()
            .iter()
            .map(|panel| {
                let signals =
                    QualitySignals::for_panel(store.intelligence(&panel.key()), panel.power_w);
                let score = panel_proximity_score(panel, requirements)
                    + panel_priority_score(panel, &signals, requirements.design.priority);
                RankedPanel {
                    panel: panel.clone(),
                    signals,
                    score,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked.truncate(self.shortlist_size);
        ranked
    }

    /// Shortlists inverters, best first.
    pub fn shortlist_inverters(
        &self,
        store: &CatalogStore,
        requirements: &DesignRequirements,
    ) -> Vec<RankedInverter> {
        let mut ranked: Vec<RankedInverter> = store
            .inverters()
            .iter()
            .map(|inverter| {
                let signals = QualitySignals::for_inverter(
                    store.intelligence(&inverter.key()),
                    inverter.max_ac_power_w,
                );
                let score = inverter_proximity_score(inverter, requirements)
                    + inverter_priority_score(inverter, &signals, requirements.design.priority);
                RankedInverter {
                    inverter: inverter.clone(),
                    signals,
                    score,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked.truncate(self.shortlist_size);
        ranked
    }
}

/// How finely the module size divides into the target: the unavoidable
/// overshoot of rounding up to whole panels, 0–100 (0.15 overshoot or
/// worse scores zero).
fn panel_proximity_score(panel: &PanelSpec, requirements: &DesignRequirements) -> f64 {
    let target = requirements.design.target_power_w;
    if panel.power_w <= 0.0 || target <= 0.0 {
        return 0.0;
    }
    let panels = (target / panel.power_w).ceil();
    let overshoot = (panels * panel.power_w - target) / target;
    100.0 * (1.0 - (overshoot / 0.15).min(1.0))
}

/// Proximity of the target DC power to 1.1× the inverter AC rating,
/// 0–100 (a half-unit of ratio off scores zero).
fn inverter_proximity_score(inverter: &InverterSpec, requirements: &DesignRequirements) -> f64 {
    if inverter.max_ac_power_w <= 0.0 {
        return 0.0;
    }
    let ratio = requirements.design.target_power_w / inverter.max_ac_power_w;
    100.0 * (1.0 - ((ratio - 1.1).abs() / 0.5).min(1.0))
}

fn panel_priority_score(
    panel: &PanelSpec,
    signals: &QualitySignals,
    priority: OptimizationPriority,
) -> f64 {
    match priority {
        OptimizationPriority::Cost => {
            let per_watt = if panel.power_w > 0.0 {
                signals.price / panel.power_w
            } else {
                f64::INFINITY
            };
            // 0.30 $/W or better scores 100, 0.90 $/W or worse scores 0.
            100.0 * ((0.90 - per_watt) / 0.60).clamp(0.0, 1.0)
        }
        OptimizationPriority::Efficiency => {
            // 15% scores 0, 23% scores 100.
            100.0 * ((panel.efficiency_pct - 15.0) / 8.0).clamp(0.0, 1.0)
        }
        OptimizationPriority::Reliability => signals.reliability,
        OptimizationPriority::Space => {
            // 140 W/m² scores 0, 230 W/m² scores 100.
            100.0 * ((panel.power_density_w_m2() - 140.0) / 90.0).clamp(0.0, 1.0)
        }
    }
}

fn inverter_priority_score(
    inverter: &InverterSpec,
    signals: &QualitySignals,
    priority: OptimizationPriority,
) -> f64 {
    match priority {
        OptimizationPriority::Cost => {
            let per_watt = if inverter.max_ac_power_w > 0.0 {
                signals.price / inverter.max_ac_power_w
            } else {
                f64::INFINITY
            };
            // 0.08 $/W or better scores 100, 0.30 $/W or worse scores 0.
            100.0 * ((0.30 - per_watt) / 0.22).clamp(0.0, 1.0)
        }
        // Efficiency and space do not differentiate inverters in this
        // catalog model; the reliability signal stands in.
        OptimizationPriority::Efficiency
        | OptimizationPriority::Reliability
        | OptimizationPriority::Space => signals.reliability,
    }
}
