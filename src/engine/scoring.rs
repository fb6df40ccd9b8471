//! Pairwise compatibility: precomputed table lookup with a local
//! fallback heuristic.

use crate::catalog::compatibility::CompatibilityRecord;
use crate::catalog::inverter::InverterSpec;
use crate::catalog::panel::PanelSpec;
use crate::catalog::store::CatalogStore;
use crate::engine::array::{ArrayConfigurator, POWER_RATIO_MAX};

/// Penalty when no string length fits the inverter voltage window.
const VOLTAGE_PENALTY: f64 = 30.0;
/// Penalty when a single string already exceeds the current ceiling.
const CURRENT_PENALTY: f64 = 20.0;
/// Penalty when the shortest admissible string overshoots the band.
const RATIO_OVERSHOOT_PENALTY: f64 = 25.0;
/// Penalty when one panel alone exceeds the inverter AC rating.
const RATIO_MISMATCH_PENALTY: f64 = 15.0;

/// Consults the precomputed compatibility table, falling back to a local
/// heuristic built on the same temperature-corrected envelope as the
/// topology search.
///
/// Never fails: a pair missing from the table is "unknown, assume
/// neutral" and gets a fallback record with `precomputed = false`.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityScorer<'a> {
    store: &'a CatalogStore,
}

impl<'a> CompatibilityScorer<'a> {
    /// Creates a scorer over a catalog snapshot.
    pub fn new(store: &'a CatalogStore) -> Self {
        Self { store }
    }

    /// Returns the table entry for the pair, or the fallback assessment.
    pub fn score(&self, panel: &PanelSpec, inverter: &InverterSpec) -> CompatibilityRecord {
        if let Some(record) = self.store.compatibility(&panel.key(), &inverter.key()) {
            return record.clone();
        }
        Self::fallback(panel, inverter)
    }

    /// Local heuristic: starts from 100 and applies a fixed penalty per
    /// violated envelope check.
    pub fn fallback(panel: &PanelSpec, inverter: &InverterSpec) -> CompatibilityRecord {
        let envelope = ArrayConfigurator::string_envelope(panel, inverter);
        let mut record = CompatibilityRecord::clean_fallback(panel.key(), inverter.key());
        let mut score = 100.0;

        if envelope.max_panels_per_string < 1
            || envelope.min_panels_per_string > envelope.max_panels_per_string
        {
            score -= VOLTAGE_PENALTY;
            record.voltage_score = 100.0 - VOLTAGE_PENALTY;
            record.limitations.push(format!(
                "no string length fits the {:.0}-{:.0} V window at temperature extremes",
                inverter.mppt_min_v, inverter.max_dc_voltage_v
            ));
        }

        if envelope.max_strings < 1 {
            score -= CURRENT_PENALTY;
            record.current_score = 100.0 - CURRENT_PENALTY;
            record.limitations.push(format!(
                "string short-circuit current {:.2} A exceeds the {:.1} A ceiling",
                envelope.isc_hot_a, inverter.max_short_circuit_current_a
            ));
        }

        let min_string_ratio = f64::from(envelope.min_panels_per_string.max(1)) * panel.power_w
            / inverter.max_ac_power_w;
        if min_string_ratio > POWER_RATIO_MAX {
            score -= RATIO_OVERSHOOT_PENALTY;
            record.power_score = 100.0 - RATIO_OVERSHOOT_PENALTY;
            record.limitations.push(format!(
                "shortest admissible string already oversizes the inverter by {:.0}%",
                (min_string_ratio - 1.0) * 100.0
            ));
        } else if panel.power_w > inverter.max_ac_power_w {
            score -= RATIO_MISMATCH_PENALTY;
            record.power_score = 100.0 - RATIO_MISMATCH_PENALTY;
            record
                .limitations
                .push("single module power exceeds the inverter AC rating".to_string());
        }

        record.overall_score = score.max(0.0);
        if !record.limitations.is_empty() {
            record
                .recommendations
                .push("verify this pairing against a larger inverter model".to_string());
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> PanelSpec {
        PanelSpec {
            maker: "Helios".to_string(),
            model: "HS-350M".to_string(),
            power_w: 350.0,
            voc_v: 45.0,
            isc_a: 8.0,
            vmp_v: 37.0,
            imp_a: 9.46,
            temp_coeff_voc_pct_per_c: -0.30,
            temp_coeff_isc_pct_per_c: 0.05,
            efficiency_pct: 19.8,
            width_mm: 1046.0,
            height_mm: 1690.0,
            weight_kg: 19.5,
            warranty_years: 25,
        }
    }

    fn inverter() -> InverterSpec {
        InverterSpec {
            maker: "Vertex".to_string(),
            model: "VX-5000".to_string(),
            max_ac_power_w: 5000.0,
            max_dc_voltage_v: 600.0,
            mppt_min_v: 150.0,
            mppt_max_v: 550.0,
            max_input_current_a: 15.0,
            max_short_circuit_current_a: 20.0,
            mppt_count: 2,
            output_voltage_v: 230.0,
            output_frequency_hz: 50.0,
            warranty_years: 10,
        }
    }

    #[test]
    fn precomputed_record_wins_over_fallback() {
        let store = CatalogStore::demo();
        let scorer = CompatibilityScorer::new(&store);
        let record = scorer.score(&store.panels()[0], &store.inverters()[1]);
        assert!(record.precomputed);
        assert_eq!(record.overall_score, 92.0);
    }

    #[test]
    fn unknown_pair_gets_fallback_record() {
        let store = CatalogStore::new();
        let scorer = CompatibilityScorer::new(&store);
        let record = scorer.score(&panel(), &inverter());
        assert!(!record.precomputed);
        assert_eq!(record.overall_score, 100.0);
        assert!(record.limitations.is_empty());
    }

    #[test]
    fn voltage_window_violation_costs_thirty() {
        let mut p = panel();
        p.voc_v = 700.0; // one panel already above the DC ceiling at -10 °C
        p.vmp_v = 580.0;
        let record = CompatibilityScorer::fallback(&p, &inverter());
        assert_eq!(record.voltage_score, 70.0);
        assert!(record.overall_score <= 70.0);
        assert!(!record.limitations.is_empty());
    }

    #[test]
    fn current_violation_costs_twenty() {
        let mut p = panel();
        p.isc_a = 25.0; // hot-corrected above the 20 A ceiling
        let record = CompatibilityScorer::fallback(&p, &inverter());
        assert_eq!(record.current_score, 80.0);
        assert!(record.overall_score <= 80.0);
    }

    #[test]
    fn ratio_overshoot_costs_twenty_five() {
        let mut inv = inverter();
        inv.max_ac_power_w = 1200.0; // five-panel minimum string ≈ 1.46 ratio
        let record = CompatibilityScorer::fallback(&panel(), &inv);
        assert_eq!(record.power_score, 75.0);
        assert!(record.overall_score <= 75.0);
    }

    #[test]
    fn single_module_above_ac_rating_costs_fifteen() {
        let mut p = panel();
        let mut inv = inverter();
        p.power_w = 600.0;
        inv.max_ac_power_w = 550.0;
        inv.mppt_min_v = 30.0; // keep the minimum string at one panel
        let record = CompatibilityScorer::fallback(&p, &inv);
        // One panel gives ratio 600/550 ≈ 1.09, inside the band, but the
        // module still outrates the inverter output stage.
        assert_eq!(record.power_score, 85.0);
    }

    #[test]
    fn score_never_goes_negative() {
        let mut p = panel();
        p.voc_v = 900.0;
        p.vmp_v = 750.0;
        p.isc_a = 40.0;
        p.power_w = 9000.0;
        let record = CompatibilityScorer::fallback(&p, &inverter());
        assert!(record.overall_score >= 0.0);
    }
}
