use serde::{Deserialize, Serialize};

/// An immutable string-inverter catalog record.
///
/// Input-side limits (`max_dc_voltage_v`, the MPPT window,
/// `max_input_current_a`, `max_short_circuit_current_a`) bound the array
/// topology search; output-side ratings drive utility and protection
/// checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InverterSpec {
    /// Manufacturer name.
    pub maker: String,
    /// Model designation.
    pub model: String,
    /// Maximum AC output power (W).
    pub max_ac_power_w: f64,
    /// Absolute maximum DC input voltage (V).
    pub max_dc_voltage_v: f64,
    /// MPPT window lower bound (V).
    pub mppt_min_v: f64,
    /// MPPT window upper bound (V).
    pub mppt_max_v: f64,
    /// Maximum operating input current per MPPT tracker (A).
    pub max_input_current_a: f64,
    /// Maximum tolerated array short-circuit current (A).
    pub max_short_circuit_current_a: f64,
    /// Number of independent MPPT trackers.
    pub mppt_count: u32,
    /// Nominal AC output voltage (V).
    pub output_voltage_v: f64,
    /// Nominal AC output frequency (Hz).
    pub output_frequency_hz: f64,
    /// Product warranty (years).
    pub warranty_years: u32,
}

impl InverterSpec {
    /// Stable catalog key, `"<maker> <model>"`.
    pub fn key(&self) -> String {
        format!("{} {}", self.maker, self.model)
    }

    /// Maximum AC output current (A), derived from rated power and
    /// nominal output voltage.
    pub fn max_output_current_a(&self) -> f64 {
        if self.output_voltage_v > 0.0 {
            self.max_ac_power_w / self.output_voltage_v
        } else {
            0.0
        }
    }
}
