//! Bounded series/parallel topology search for one (panel, inverter) pair.

use crate::catalog::inverter::InverterSpec;
use crate::catalog::panel::{COLD_EXTREME_C, HOT_EXTREME_C, PanelSpec};
use crate::config::DesignRequirements;
use crate::engine::types::ArrayConfiguration;

/// Lower bound of the admissible DC-oversizing band.
pub const POWER_RATIO_MIN: f64 = 0.9;
/// Upper bound of the admissible DC-oversizing band.
pub const POWER_RATIO_MAX: f64 = 1.3;
/// Empirically preferred DC-oversizing ratio.
pub const POWER_RATIO_IDEAL: f64 = 1.1;

/// Temperature-corrected electrical envelope and string-count bounds for
/// a (panel, inverter) pair.
#[derive(Debug, Clone)]
pub struct StringEnvelope {
    /// Panel open-circuit voltage at −10 °C (V).
    pub voc_cold_v: f64,
    /// Panel maximum-power voltage at +85 °C (V).
    pub vmp_hot_v: f64,
    /// Panel short-circuit current at +85 °C (A).
    pub isc_hot_a: f64,
    /// Fewest series panels keeping the string inside the MPPT window.
    pub min_panels_per_string: u32,
    /// Most series panels below the inverter DC voltage ceiling.
    pub max_panels_per_string: u32,
    /// Most parallel strings below the short-circuit current ceiling.
    pub max_strings: u32,
}

impl StringEnvelope {
    /// True when at least one string length satisfies both voltage
    /// bounds and at least one string fits the current ceiling.
    pub fn admits_any_string(&self) -> bool {
        self.min_panels_per_string <= self.max_panels_per_string && self.max_strings >= 1
    }
}

/// Exhaustive bounded search for the wiring topology closest to the
/// ideal DC/AC ratio.
///
/// The search space is small (tens of string lengths × tens of strings)
/// and scanned in ascending order with strict improvement, so the result
/// is deterministic and ties break toward the lowest `panels_per_string`,
/// then the lowest `string_count`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrayConfigurator;

impl ArrayConfigurator {
    /// Computes the temperature-corrected envelope and string bounds.
    pub fn string_envelope(panel: &PanelSpec, inverter: &InverterSpec) -> StringEnvelope {
        let voc_cold_v = panel.voc_at(COLD_EXTREME_C);
        let vmp_hot_v = panel.vmp_at(HOT_EXTREME_C);
        let isc_hot_a = panel.isc_at(HOT_EXTREME_C);

        let max_panels_per_string = if voc_cold_v > 0.0 {
            (inverter.max_dc_voltage_v / voc_cold_v).floor() as u32
        } else {
            0
        };
        let min_panels_per_string = if vmp_hot_v > 0.0 {
            (inverter.mppt_min_v / vmp_hot_v).ceil().max(1.0) as u32
        } else {
            u32::MAX
        };
        let max_strings = if isc_hot_a > 0.0 {
            (inverter.max_short_circuit_current_a / isc_hot_a).floor() as u32
        } else {
            0
        };

        StringEnvelope {
            voc_cold_v,
            vmp_hot_v,
            isc_hot_a,
            min_panels_per_string,
            max_panels_per_string,
            max_strings,
        }
    }

    /// Searches the admissible topology closest to [`POWER_RATIO_IDEAL`].
    ///
    /// Admissible means the DC/AC ratio falls inside
    /// [`POWER_RATIO_MIN`, `POWER_RATIO_MAX`] and the array covers the
    /// requested target power. When nothing is admissible the
    /// [`ArrayConfiguration::incompatible`] sentinel is returned, a
    /// normal per-pair outcome rather than an error.
    pub fn configure(
        panel: &PanelSpec,
        inverter: &InverterSpec,
        requirements: &DesignRequirements,
    ) -> ArrayConfiguration {
        if panel.power_w <= 0.0 || inverter.max_ac_power_w <= 0.0 {
            return ArrayConfiguration::incompatible();
        }

        let envelope = Self::string_envelope(panel, inverter);
        if !envelope.admits_any_string() {
            return ArrayConfiguration::incompatible();
        }

        let panels_needed =
            (requirements.design.target_power_w / panel.power_w).ceil().max(1.0) as u32;

        let mut best: Option<ArrayConfiguration> = None;
        let mut best_deviation = f64::INFINITY;

        for panels_per_string in envelope.min_panels_per_string..=envelope.max_panels_per_string {
            for string_count in 1..=envelope.max_strings {
                let total_panels = panels_per_string * string_count;
                let total_power_w = f64::from(total_panels) * panel.power_w;
                let power_ratio = total_power_w / inverter.max_ac_power_w;

                if !(POWER_RATIO_MIN..=POWER_RATIO_MAX).contains(&power_ratio) {
                    continue;
                }
                if total_panels < panels_needed {
                    continue;
                }

                let deviation = (power_ratio - POWER_RATIO_IDEAL).abs();
                if deviation < best_deviation {
                    best_deviation = deviation;
                    best = Some(ArrayConfiguration {
                        panels_per_string,
                        string_count,
                        total_panels,
                        total_power_w,
                        max_string_voltage_v: f64::from(panels_per_string) * envelope.voc_cold_v,
                        min_string_voltage_v: f64::from(panels_per_string) * envelope.vmp_hot_v,
                        max_array_current_a: f64::from(string_count) * envelope.isc_hot_a,
                        power_ratio,
                        compatible: true,
                    });
                }
            }
        }

        best.unwrap_or_else(ArrayConfiguration::incompatible)
    }
}
