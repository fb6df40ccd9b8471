//! Contract for the external hourly-irradiance production simulator.
//!
//! The simulator itself is a collaborator outside this engine; the core
//! builds a [`SimulationRequest`] for the winning design and consumes
//! the response. A non-success response is a hard failure of the design
//! run; the core never substitutes a default for it.

use serde::Serialize;

/// Site parameters forwarded to the simulator.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSite {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub timezone: String,
    pub albedo: f64,
}

/// Panel electrical parameters forwarded to the simulator.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationPanel {
    pub power_w: f64,
    pub voc_v: f64,
    pub isc_a: f64,
    pub vmp_v: f64,
    pub imp_a: f64,
    pub temp_coeff_voc_pct_per_c: f64,
}

/// Array topology forwarded to the simulator.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationArray {
    pub panels_per_string: u32,
    pub string_count: u32,
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
}

/// Inverter parameters forwarded to the simulator.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationInverter {
    pub max_ac_power_w: f64,
    pub mppt_min_v: f64,
    pub mppt_max_v: f64,
}

/// One complete simulation request.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRequest {
    pub site: SimulationSite,
    pub panel: SimulationPanel,
    pub array: SimulationArray,
    pub inverter: SimulationInverter,
    /// Weather year to simulate.
    pub year: i32,
}

/// Simulator response envelope.
#[derive(Debug, Clone)]
pub struct SimulationResponse {
    /// Annual energy yield (kWh).
    pub annual_energy_kwh: f64,
    /// Energy yield per calendar month, January first (kWh).
    pub monthly_energy_kwh: [f64; 12],
    /// Ratio of actual to nameplate-continuous output.
    pub capacity_factor: f64,
    /// Overall plant performance ratio.
    pub performance_ratio: f64,
    /// Peak AC power observed (kW).
    pub peak_power_kw: f64,
    /// False when the simulation failed; the run must then abort.
    pub success: bool,
    /// Failure description when `success` is false.
    pub error_message: Option<String>,
}

impl SimulationResponse {
    /// A failed response carrying a diagnostic message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            annual_energy_kwh: 0.0,
            monthly_energy_kwh: [0.0; 12],
            capacity_factor: 0.0,
            performance_ratio: 0.0,
            peak_power_kw: 0.0,
            success: false,
            error_message: Some(message.into()),
        }
    }
}

/// Successful simulation figures carried into the design outcome.
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedProduction {
    pub annual_energy_kwh: f64,
    pub monthly_energy_kwh: [f64; 12],
    pub capacity_factor: f64,
    pub performance_ratio: f64,
    pub peak_power_kw: f64,
}

impl SimulatedProduction {
    /// Extracts the production figures from a successful response.
    /// Callers must check `response.success` first.
    pub fn from_response(response: &SimulationResponse) -> Self {
        Self {
            annual_energy_kwh: response.annual_energy_kwh,
            monthly_energy_kwh: response.monthly_energy_kwh,
            capacity_factor: response.capacity_factor,
            performance_ratio: response.performance_ratio,
            peak_power_kw: response.peak_power_kw,
        }
    }
}

/// The external hourly-production simulator seam.
pub trait ProductionSimulator {
    /// Runs one simulation; implementations report failure through
    /// `SimulationResponse::success`, not panics.
    fn simulate(&self, request: &SimulationRequest) -> SimulationResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_response_is_marked_unsuccessful() {
        let r = SimulationResponse::failure("weather service timeout");
        assert!(!r.success);
        assert_eq!(r.error_message.as_deref(), Some("weather service timeout"));
        assert_eq!(r.annual_energy_kwh, 0.0);
    }

    #[test]
    fn production_copies_response_figures() {
        let mut monthly = [0.0; 12];
        monthly[5] = 620.0;
        let r = SimulationResponse {
            annual_energy_kwh: 6100.0,
            monthly_energy_kwh: monthly,
            capacity_factor: 0.14,
            performance_ratio: 0.81,
            peak_power_kw: 4.7,
            success: true,
            error_message: None,
        };
        let p = SimulatedProduction::from_response(&r);
        assert_eq!(p.annual_energy_kwh, 6100.0);
        assert_eq!(p.monthly_energy_kwh[5], 620.0);
    }
}
